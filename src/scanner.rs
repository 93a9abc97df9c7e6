use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use walkdir::WalkDir;

use crate::classify::{self, FileType};
use crate::config::Config;
use crate::paths::{CanonicalPath, PathError, PathResolver};
use crate::risk::RiskLevel;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid scan root: {0}")]
    InvalidRoot(#[from] PathError),

    #[error("scan failed: {0}")]
    Io(#[from] std::io::Error),
}

/// One file found during a scan. Created by the scanner, annotated with type
/// and risk immediately after, then immutable except for `selected`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified_at: Option<DateTime<Utc>>,
    pub accessed_at: Option<DateTime<Utc>>,
    pub extension: String,
    pub file_type: FileType,
    pub risk_score: u8,
    /// Derived from risk_score; re-derived on import rather than trusted.
    #[serde(default)]
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub selected: bool,
}

impl FileRecord {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }

    pub fn age_days(&self, now: DateTime<Utc>) -> Option<i64> {
        self.modified_at.map(|m| (now - m).num_days())
    }
}

/// Materialized scan output. The full catalog is built before scoring so the
/// relation factor sees every directory sibling.
#[derive(Debug, Default)]
pub struct Catalog {
    pub records: Vec<FileRecord>,
    pub total_size_bytes: u64,
    /// Entries skipped because they could not be stat'd.
    pub warnings: usize,
}

impl Catalog {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

pub struct Scanner {
    resolver: PathResolver,
}

impl Scanner {
    pub fn new(config: &Config) -> Self {
        Self {
            resolver: PathResolver::new(&config.trash_roots),
        }
    }

    /// Validate the root, then walk it up to `max_depth` (0 = direct
    /// children). A root that fails resolution aborts this scan; an entry
    /// that fails to stat only bumps the warning count.
    pub fn scan(&self, root: &Path, max_depth: usize) -> Result<Catalog, ScanError> {
        let root = self.resolver.resolve(root)?;
        Ok(self.scan_resolved(&root, max_depth))
    }

    fn scan_resolved(&self, root: &CanonicalPath, max_depth: usize) -> Catalog {
        let mut catalog = Catalog::default();

        // walkdir depth 1 is a direct child, our depth 0
        let walker = WalkDir::new(root.as_path())
            .min_depth(1)
            .max_depth(max_depth + 1)
            .follow_links(false)
            .into_iter();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(_) => {
                    catalog.warnings += 1;
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            // walkdir already bounds the walk; the resolver's depth guard is
            // the authoritative check
            if !PathResolver::is_within_depth(root.as_path(), entry.path(), max_depth) {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(_) => {
                    catalog.warnings += 1;
                    continue;
                }
            };

            let record = Self::record_from(entry.path(), &metadata);
            catalog.total_size_bytes += record.size_bytes;
            catalog.records.push(record);
        }

        catalog
    }

    fn record_from(path: &Path, metadata: &fs::Metadata) -> FileRecord {
        let modified_at: Option<DateTime<Utc>> = metadata.modified().ok().map(Into::into);
        let accessed_at: Option<DateTime<Utc>> = metadata.accessed().ok().map(Into::into);

        FileRecord {
            path: path.to_path_buf(),
            size_bytes: metadata.len(),
            modified_at,
            accessed_at,
            extension: classify::extension_of(path),
            file_type: classify::classify(path),
            risk_score: 0,
            risk_level: RiskLevel::Safe,
            selected: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::risk::RiskScorer;
    use std::fs;
    use tempfile::TempDir;

    fn config_rooted_at(root: &Path) -> Config {
        Config {
            trash_roots: vec![root.to_path_buf()],
            ..Config::default()
        }
    }

    #[test]
    fn scan_collects_files_with_metadata() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), b"hello").unwrap();
        fs::write(tmp.path().join("b.tmp"), b"x").unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("sub/c.pdf"), b"pdf").unwrap();

        let config = config_rooted_at(tmp.path());
        let scanner = Scanner::new(&config);
        let catalog = scanner.scan(tmp.path(), 3).unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.total_size_bytes, 9);
        assert_eq!(catalog.warnings, 0);

        let a = catalog
            .records
            .iter()
            .find(|r| r.file_name() == "a.txt")
            .unwrap();
        assert_eq!(a.size_bytes, 5);
        assert_eq!(a.extension, "txt");
        assert_eq!(a.file_type, FileType::Document);
        assert!(a.modified_at.is_some());
        assert!(!a.selected);
    }

    #[test]
    fn scan_respects_max_depth() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("top.txt"), b"1").unwrap();
        fs::create_dir_all(tmp.path().join("a/b")).unwrap();
        fs::write(tmp.path().join("a/mid.txt"), b"2").unwrap();
        fs::write(tmp.path().join("a/b/deep.txt"), b"3").unwrap();

        let config = config_rooted_at(tmp.path());
        let scanner = Scanner::new(&config);

        // Depth 0: direct children only
        let catalog = scanner.scan(tmp.path(), 0).unwrap();
        let names: Vec<String> = catalog.records.iter().map(|r| r.file_name()).collect();
        assert_eq!(names, vec!["top.txt"]);

        // Depth 1 reaches a/mid.txt but not a/b/deep.txt
        let catalog = scanner.scan(tmp.path(), 1).unwrap();
        assert_eq!(catalog.len(), 2);

        let catalog = scanner.scan(tmp.path(), 2).unwrap();
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn scan_rejects_unconfigured_root() {
        let tmp = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();

        let config = config_rooted_at(tmp.path());
        let scanner = Scanner::new(&config);
        let err = scanner.scan(other.path(), 1).unwrap_err();
        assert!(matches!(err, ScanError::InvalidRoot(_)));
    }

    #[test]
    #[cfg(unix)]
    fn scan_does_not_follow_symlinks() {
        let tmp = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret.txt"), b"x").unwrap();
        std::os::unix::fs::symlink(outside.path(), tmp.path().join("link")).unwrap();
        fs::write(tmp.path().join("real.txt"), b"y").unwrap();

        let config = config_rooted_at(tmp.path());
        let scanner = Scanner::new(&config);
        let catalog = scanner.scan(tmp.path(), 3).unwrap();

        let names: Vec<String> = catalog.records.iter().map(|r| r.file_name()).collect();
        assert_eq!(names, vec!["real.txt"]);
    }

    #[test]
    fn rescanning_unchanged_directory_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("Documents")).unwrap();
        fs::write(tmp.path().join("Documents/report.docx"), vec![0u8; 4096]).unwrap();
        fs::write(tmp.path().join("Documents/report.pdf"), vec![0u8; 2048]).unwrap();
        fs::write(tmp.path().join("old.log"), b"log").unwrap();

        let config = config_rooted_at(tmp.path());
        let scanner = Scanner::new(&config);
        let scorer = RiskScorer::new(&config);
        let now = Utc::now();

        let mut first = scanner.scan(tmp.path(), 3).unwrap();
        scorer.annotate(&mut first.records, now);
        let mut second = scanner.scan(tmp.path(), 3).unwrap();
        scorer.annotate(&mut second.records, now);

        first.records.sort_by(|a, b| a.path.cmp(&b.path));
        second.records.sort_by(|a, b| a.path.cmp(&b.path));
        assert_eq!(first.records, second.records);
    }
}
