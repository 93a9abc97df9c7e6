use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::FileType;
use crate::config::{Config, SizeBand};
use crate::scanner::FileRecord;

/// Coarse risk bucket, a pure function of the 0-100 risk score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    #[default]
    Safe,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Fixed thresholds: 0-24 SAFE, 25-49 LOW, 50-74 MEDIUM, 75-89 HIGH,
    /// 90-100 CRITICAL.
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=24 => RiskLevel::Safe,
            25..=49 => RiskLevel::Low,
            50..=74 => RiskLevel::Medium,
            75..=89 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "SAFE",
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

/// Sibling visibility needed by the relation factor: which (stem, extension)
/// pairs exist per directory. Built once from the fully materialized catalog.
pub struct ScoreContext {
    pub now: DateTime<Utc>,
    stems: HashMap<PathBuf, HashMap<String, HashSet<String>>>,
}

impl ScoreContext {
    pub fn build(records: &[FileRecord], now: DateTime<Utc>) -> Self {
        let mut stems: HashMap<PathBuf, HashMap<String, HashSet<String>>> = HashMap::new();
        for record in records {
            let (Some(dir), Some(stem)) = (record.path.parent(), record.path.file_stem()) else {
                continue;
            };
            stems
                .entry(dir.to_path_buf())
                .or_default()
                .entry(stem.to_string_lossy().to_lowercase())
                .or_default()
                .insert(record.extension.clone());
        }
        Self { now, stems }
    }

    fn sibling_extensions(&self, path: &Path) -> usize {
        let (Some(dir), Some(stem)) = (path.parent(), path.file_stem()) else {
            return 0;
        };
        self.stems
            .get(dir)
            .and_then(|by_stem| by_stem.get(&stem.to_string_lossy().to_lowercase()))
            .map(|exts| exts.len())
            .unwrap_or(0)
    }
}

/// Computes deletion-risk scores. Never fails: missing data falls back to the
/// most conservative bucket.
pub struct RiskScorer<'a> {
    config: &'a Config,
}

impl<'a> RiskScorer<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Score one record against the catalog context.
    pub fn score(&self, record: &FileRecord, ctx: &ScoreContext) -> (u8, RiskLevel) {
        let w = &self.config.weights;

        let weighted = type_score(record.file_type) * w.type_weight
            + size_score(record.size_bytes, &self.config.size_band) * w.size_weight
            + recency_score(
                record.modified_at,
                ctx.now,
                self.config.recent_window_hours,
                self.config.age_horizon_days,
            ) * w.recency_weight
            + location_score(&record.path) * w.location_weight
            + relation_score(record, ctx) * w.relation_weight;

        let score = weighted.round().clamp(0.0, 100.0) as u8;
        (score, RiskLevel::from_score(score))
    }

    /// Annotate every record in place. The catalog must be complete before
    /// this runs; the relation factor looks at directory siblings.
    pub fn annotate(&self, records: &mut [FileRecord], now: DateTime<Utc>) {
        let ctx = ScoreContext::build(records, now);
        for record in records.iter_mut() {
            let (score, level) = self.score(record, &ctx);
            record.risk_score = score;
            record.risk_level = level;
        }
    }
}

/// Per-type base score. Documents and configs are harder to regenerate than
/// temp files.
pub fn type_score(file_type: FileType) -> f64 {
    match file_type {
        FileType::Temporary => 5.0,
        FileType::Archive => 30.0,
        FileType::Executable => 35.0,
        FileType::Code => 40.0,
        FileType::Unknown => 50.0,
        FileType::Image | FileType::Audio | FileType::Video => 55.0,
        FileType::Spreadsheet | FileType::Presentation => 65.0,
        FileType::Document => 70.0,
        FileType::Config => 80.0,
    }
}

/// Non-monotonic size curve: peaks at the geometric midpoint of the band and
/// falls off log-linearly, hitting zero at the band edges and beyond.
/// Mid-sized files are more likely meaningful user content than caches or
/// raw dumps.
pub fn size_score(size_bytes: u64, band: &SizeBand) -> f64 {
    if size_bytes == 0 {
        return 0.0;
    }
    let min = band.min_bytes.max(1) as f64;
    let max = band.max_bytes.max(band.min_bytes + 1) as f64;
    let mid = (min * max).sqrt();
    let half_width = (mid / min).ln();
    if half_width <= 0.0 {
        return 0.0;
    }
    let distance = ((size_bytes as f64) / mid).ln().abs();
    (100.0 * (1.0 - distance / half_width)).clamp(0.0, 100.0)
}

/// Inverse age: near 100 inside the recent window, linear decay to 0 at the
/// horizon. Missing timestamps land in the oldest bucket so unreadable files
/// never look freshly used.
pub fn recency_score(
    modified_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    recent_window_hours: u64,
    age_horizon_days: u64,
) -> f64 {
    let Some(modified) = modified_at else {
        return 0.0;
    };
    let age_hours = (now - modified).num_hours().max(0) as f64;
    let window = recent_window_hours as f64;
    let horizon = (age_horizon_days * 24) as f64;

    if age_hours <= window {
        100.0
    } else if age_hours >= horizon {
        0.0
    } else {
        100.0 * (1.0 - (age_hours - window) / (horizon - window))
    }
}

/// Path-prefix score: user content areas rate high, scratch areas low.
pub fn location_score(path: &Path) -> f64 {
    let components: Vec<String> = path
        .parent()
        .map(|dir| {
            dir.components()
                .map(|c| c.as_os_str().to_string_lossy().to_lowercase())
                .collect()
        })
        .unwrap_or_default();

    if components
        .iter()
        .any(|c| c == "documents" || c == "desktop" || c == "pictures")
    {
        return 80.0;
    }
    if components
        .iter()
        .any(|c| c == "downloads" || c == "tmp" || c == "temp" || c == "cache" || c == "caches")
    {
        return 20.0;
    }
    if let Some(home) = dirs::home_dir() {
        if path.starts_with(&home) {
            return 60.0;
        }
    }
    40.0
}

/// Bonus when a same-stem sibling with a different extension exists in the
/// same directory (report.docx next to report.pdf suggests an active set).
pub fn relation_score(record: &FileRecord, ctx: &ScoreContext) -> f64 {
    if ctx.sibling_extensions(&record.path) > 1 {
        100.0
    } else {
        0.0
    }
}
