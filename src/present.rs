use std::io::Write as _;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::ValueEnum;
use colored::*;

use crate::colors;
use crate::config::SizeBand;
use crate::risk::{self, RiskLevel};
use crate::scanner::FileRecord;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GroupBy {
    #[default]
    None,
    Type,
    Size,
    Time,
    Risk,
    Location,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    Risk,
    Name,
    Size,
    Mtime,
    Atime,
    /// risk_score x size_score heuristic
    Importance,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Txt,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PresentOptions {
    pub group_by: GroupBy,
    pub sort_by: SortBy,
    pub min_risk: Option<u8>,
    pub max_risk: Option<u8>,
}

/// One displayable group of records.
#[derive(Debug)]
pub struct Group {
    pub label: String,
    pub records: Vec<FileRecord>,
}

#[derive(Debug)]
pub struct View {
    pub groups: Vec<Group>,
    pub total: usize,
    pub total_size_bytes: u64,
}

impl View {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn records(&self) -> impl Iterator<Item = &FileRecord> {
        self.groups.iter().flat_map(|g| g.records.iter())
    }
}

/// Pure transform: filter by risk bounds, then group, then sort within each
/// group. No side effects.
pub struct ListPresenter<'a> {
    size_band: &'a SizeBand,
}

impl<'a> ListPresenter<'a> {
    pub fn new(size_band: &'a SizeBand) -> Self {
        Self { size_band }
    }

    pub fn present(&self, records: &[FileRecord], options: &PresentOptions) -> View {
        let min = options.min_risk.unwrap_or(0);
        let max = options.max_risk.unwrap_or(100);

        let filtered: Vec<FileRecord> = records
            .iter()
            .filter(|r| r.risk_score >= min && r.risk_score <= max)
            .cloned()
            .collect();

        let total = filtered.len();
        let total_size_bytes = filtered.iter().map(|r| r.size_bytes).sum();

        let mut groups = self.group(filtered, options.group_by);
        for group in &mut groups {
            self.sort(&mut group.records, options.sort_by);
        }

        View {
            groups,
            total,
            total_size_bytes,
        }
    }

    fn group(&self, records: Vec<FileRecord>, group_by: GroupBy) -> Vec<Group> {
        if group_by == GroupBy::None {
            if records.is_empty() {
                return Vec::new();
            }
            return vec![Group {
                label: "all files".to_string(),
                records,
            }];
        }

        let now = Utc::now();
        let mut labeled: Vec<(String, FileRecord)> = records
            .into_iter()
            .map(|r| (group_label(&r, group_by, now), r))
            .collect();
        labeled.sort_by(|a, b| a.0.cmp(&b.0));

        let mut groups: Vec<Group> = Vec::new();
        for (label, record) in labeled {
            match groups.last_mut() {
                Some(group) if group.label == label => group.records.push(record),
                _ => groups.push(Group {
                    label,
                    records: vec![record],
                }),
            }
        }
        groups
    }

    fn sort(&self, records: &mut [FileRecord], sort_by: SortBy) {
        match sort_by {
            SortBy::Name => records.sort_by_key(|r| r.file_name()),
            SortBy::Size => records.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes)),
            SortBy::Mtime => records.sort_by(|a, b| b.modified_at.cmp(&a.modified_at)),
            SortBy::Atime => records.sort_by(|a, b| b.accessed_at.cmp(&a.accessed_at)),
            SortBy::Risk => records.sort_by(|a, b| b.risk_score.cmp(&a.risk_score)),
            SortBy::Importance => {
                let band = *self.size_band;
                records.sort_by(|a, b| {
                    let ia = importance(a, &band);
                    let ib = importance(b, &band);
                    ib.partial_cmp(&ia).unwrap_or(std::cmp::Ordering::Equal)
                });
            }
        }
    }

    /// Render a view to the terminal in the standard listing format.
    pub fn print(&self, view: &View, detailed: bool, show_risk: bool) {
        println!();
        println!("{}", "SCAN RESULTS".bold().color(colors::HEADER));
        println!("{}", "─".repeat(50).color(colors::PATH));
        println!(
            "{} files, {:.2} MB total",
            view.total.to_string().color(colors::SUCCESS),
            view.total_size_bytes as f64 / (1024.0 * 1024.0)
        );

        for group in &view.groups {
            println!();
            if view.groups.len() > 1 || group.label != "all files" {
                println!("{}", group.label.bold().color(colors::HEADER));
            }

            for (i, record) in group.records.iter().enumerate() {
                if show_risk {
                    let level_color = colors::risk_color(record.risk_level);
                    println!(
                        "{:3}. [{:>3} {:8}] {}",
                        i + 1,
                        record.risk_score.to_string().color(level_color),
                        record.risk_level.label().color(level_color),
                        record.path.display().to_string().color(colors::PATH)
                    );
                } else {
                    println!(
                        "{:3}. {}",
                        i + 1,
                        record.path.display().to_string().color(colors::PATH)
                    );
                }

                if detailed {
                    let size_mb = record.size_bytes as f64 / (1024.0 * 1024.0);
                    println!(
                        "     type: {}, size: {:.2} MB, ext: {}",
                        record.file_type.label().color(colors::HEADER),
                        size_mb,
                        if record.extension.is_empty() {
                            "-"
                        } else {
                            record.extension.as_str()
                        }
                    );
                    println!(
                        "     modified: {}, accessed: {}",
                        format_stamp(record.modified_at),
                        format_stamp(record.accessed_at)
                    );
                }
            }
        }
    }

    /// Serialize records for export. JSON carries every FileRecord field and
    /// round-trips; CSV includes risk_level as a redundant, re-derivable
    /// column; TXT is the human listing.
    pub fn export(&self, records: &[FileRecord], format: ExportFormat) -> Result<Vec<u8>> {
        match format {
            ExportFormat::Json => {
                serde_json::to_vec_pretty(records).context("Failed to serialize catalog to JSON")
            }
            ExportFormat::Csv => export_csv(records),
            ExportFormat::Txt => Ok(export_txt(records)),
        }
    }
}

/// Re-parse a JSON export. `selected` defaults to false when omitted and
/// risk_level is re-derived from risk_score rather than trusted.
pub fn import_json(data: &[u8]) -> Result<Vec<FileRecord>> {
    let mut records: Vec<FileRecord> =
        serde_json::from_slice(data).context("Failed to parse exported catalog")?;
    for record in &mut records {
        record.risk_level = RiskLevel::from_score(record.risk_score);
    }
    Ok(records)
}

fn importance(record: &FileRecord, band: &SizeBand) -> f64 {
    record.risk_score as f64 * risk::size_score(record.size_bytes, band)
}

fn group_label(record: &FileRecord, group_by: GroupBy, now: DateTime<Utc>) -> String {
    match group_by {
        GroupBy::None => "all files".to_string(),
        GroupBy::Type => record.file_type.label().to_string(),
        GroupBy::Risk => record.risk_level.label().to_string(),
        GroupBy::Location => record
            .path
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "/".to_string()),
        GroupBy::Size => {
            const MB: u64 = 1024 * 1024;
            match record.size_bytes {
                s if s < MB => "under 1 MB".to_string(),
                s if s < 10 * MB => "1-10 MB".to_string(),
                s if s < 100 * MB => "10-100 MB".to_string(),
                _ => "over 100 MB".to_string(),
            }
        }
        GroupBy::Time => match record.modified_at {
            None => "unknown age".to_string(),
            Some(m) if now - m <= Duration::days(1) => "today".to_string(),
            Some(m) if now - m <= Duration::days(7) => "this week".to_string(),
            Some(m) if now - m <= Duration::days(30) => "this month".to_string(),
            Some(_) => "older".to_string(),
        },
    }
}

fn format_stamp(stamp: Option<DateTime<Utc>>) -> String {
    stamp
        .map(|s| s.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn export_csv(records: &[FileRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "path",
        "size_bytes",
        "modified_at",
        "accessed_at",
        "extension",
        "file_type",
        "risk_score",
        "risk_level",
        "selected",
    ])?;

    for record in records {
        writer.write_record([
            record.path.display().to_string(),
            record.size_bytes.to_string(),
            record
                .modified_at
                .map(|s| s.to_rfc3339())
                .unwrap_or_default(),
            record
                .accessed_at
                .map(|s| s.to_rfc3339())
                .unwrap_or_default(),
            record.extension.clone(),
            record.file_type.label().to_string(),
            record.risk_score.to_string(),
            record.risk_level.label().to_string(),
            record.selected.to_string(),
        ])?;
    }

    let inner = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {e}"))?;
    Ok(inner)
}

fn export_txt(records: &[FileRecord]) -> Vec<u8> {
    let mut out = Vec::new();
    for record in records {
        // Plain listing, one file per line
        let _ = writeln!(
            out,
            "{:>3} {:8} {:>12}  {}",
            record.risk_score,
            record.risk_level.label(),
            record.size_bytes,
            record.path.display()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::FileType;
    use chrono::Duration;
    use std::path::PathBuf;

    fn record(path: &str, size: u64, score: u8, file_type: FileType, age_days: i64) -> FileRecord {
        let now = Utc::now();
        FileRecord {
            path: PathBuf::from(path),
            size_bytes: size,
            modified_at: Some(now - Duration::days(age_days)),
            accessed_at: Some(now - Duration::days(age_days)),
            extension: crate::classify::extension_of(std::path::Path::new(path)),
            file_type,
            risk_score: score,
            risk_level: RiskLevel::from_score(score),
            selected: false,
        }
    }

    fn sample() -> Vec<FileRecord> {
        vec![
            record("/t/report.docx", 500 * 1024, 78, FileType::Document, 2),
            record("/t/cache.tmp", 2 * 1024, 12, FileType::Temporary, 40),
            record("/t/song.mp3", 4 * 1024 * 1024, 55, FileType::Audio, 10),
            record("/t/notes.txt", 900, 40, FileType::Document, 5),
        ]
    }

    #[test]
    fn risk_filter_is_inclusive_and_applied_before_grouping() {
        let band = SizeBand::default();
        let presenter = ListPresenter::new(&band);
        let options = PresentOptions {
            min_risk: Some(40),
            max_risk: Some(78),
            group_by: GroupBy::Type,
            ..Default::default()
        };

        let view = presenter.present(&sample(), &options);
        assert_eq!(view.total, 3);
        let names: Vec<String> = view.records().map(|r| r.file_name()).collect();
        assert!(!names.contains(&"cache.tmp".to_string()));
        // Bounds are inclusive on both ends
        assert!(names.contains(&"report.docx".to_string()));
        assert!(names.contains(&"notes.txt".to_string()));
    }

    #[test]
    fn groups_by_risk_level() {
        let band = SizeBand::default();
        let presenter = ListPresenter::new(&band);
        let options = PresentOptions {
            group_by: GroupBy::Risk,
            ..Default::default()
        };

        let view = presenter.present(&sample(), &options);
        let labels: Vec<&str> = view.groups.iter().map(|g| g.label.as_str()).collect();
        assert!(labels.contains(&"HIGH"));
        assert!(labels.contains(&"SAFE"));
        for group in &view.groups {
            for record in &group.records {
                assert_eq!(record.risk_level.label(), group.label);
            }
        }
    }

    #[test]
    fn sorts_by_size_descending() {
        let band = SizeBand::default();
        let presenter = ListPresenter::new(&band);
        let options = PresentOptions {
            sort_by: SortBy::Size,
            ..Default::default()
        };

        let view = presenter.present(&sample(), &options);
        let sizes: Vec<u64> = view.records().map(|r| r.size_bytes).collect();
        assert!(sizes.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn importance_weighs_risk_and_size_together() {
        let band = SizeBand::default();
        let presenter = ListPresenter::new(&band);
        let options = PresentOptions {
            sort_by: SortBy::Importance,
            ..Default::default()
        };

        let view = presenter.present(&sample(), &options);
        let first = view.records().next().unwrap();
        // report.docx: high risk and a size near the band midpoint
        assert_eq!(first.file_name(), "report.docx");
    }

    #[test]
    fn json_export_round_trips() {
        let band = SizeBand::default();
        let presenter = ListPresenter::new(&band);
        let records = sample();

        let data = presenter.export(&records, ExportFormat::Json).unwrap();
        let parsed = import_json(&data).unwrap();
        assert_eq!(parsed, records);
    }

    #[test]
    fn json_import_defaults_selected_and_rederives_level() {
        let raw = r#"[{
            "path": "/t/a.txt",
            "size_bytes": 10,
            "modified_at": null,
            "accessed_at": null,
            "extension": "txt",
            "file_type": "document",
            "risk_score": 91,
            "risk_level": "SAFE"
        }]"#;

        let parsed = import_json(raw.as_bytes()).unwrap();
        assert!(!parsed[0].selected);
        // A tampered level is corrected from the score
        assert_eq!(parsed[0].risk_level, RiskLevel::Critical);
    }

    #[test]
    fn csv_risk_level_column_matches_score_derivation() {
        let band = SizeBand::default();
        let presenter = ListPresenter::new(&band);
        let records = sample();

        let data = presenter.export(&records, ExportFormat::Csv).unwrap();
        let mut reader = csv::Reader::from_reader(data.as_slice());
        let mut rows = 0;
        for row in reader.records() {
            let row = row.unwrap();
            let score: u8 = row[6].parse().unwrap();
            assert_eq!(&row[7], RiskLevel::from_score(score).label());
            rows += 1;
        }
        assert_eq!(rows, records.len());
    }

    #[test]
    fn txt_export_lists_every_record() {
        let band = SizeBand::default();
        let presenter = ListPresenter::new(&band);
        let records = sample();

        let data = presenter.export(&records, ExportFormat::Txt).unwrap();
        let text = String::from_utf8(data).unwrap();
        assert_eq!(text.lines().count(), records.len());
        assert!(text.contains("report.docx"));
    }
}
