use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use colored::*;
use fs_extra::file::CopyOptions;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::colors;
use crate::config::Config;
use crate::scanner::FileRecord;

const MANIFEST_FILE: &str = "manifest.json";
const CANCELLED_REASON: &str = "cancelled before processing";

#[derive(Debug, Error)]
pub enum BackupError {
    /// Without a durable manifest nothing may be deleted.
    #[error("failed to write backup manifest: {0}")]
    ManifestWriteFailed(String),

    #[error("backup failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("no backup found with id {0}")]
    BackupNotFound(String),

    #[error("restore failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Deletion run lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Planned,
    BackingUp,
    Deleting,
    Completed,
    PartialFailure,
}

impl RunState {
    pub fn label(&self) -> &'static str {
        match self {
            RunState::Planned => "planned",
            RunState::BackingUp => "backing up",
            RunState::Deleting => "deleting",
            RunState::Completed => "completed",
            RunState::PartialFailure => "partial failure",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub original_path: PathBuf,
    pub backup_path: PathBuf,
    pub size_bytes: u64,
    pub checksum: String,
}

/// Durable record of one deletion run. Written before any delete so whatever
/// was actually removed is always recoverable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupManifest {
    pub backup_id: String,
    pub created_at: DateTime<Utc>,
    pub description: String,
    pub entries: Vec<ManifestEntry>,
}

/// Per-file result of a deletion run.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub backed_up: bool,
    pub deleted: bool,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct RunReport {
    pub backup_id: String,
    pub state: RunState,
    pub outcomes: Vec<FileOutcome>,
    pub cancelled: bool,
}

impl RunReport {
    pub fn planned(&self) -> usize {
        self.outcomes.len()
    }

    pub fn backed_up(&self) -> usize {
        self.outcomes.iter().filter(|o| o.backed_up).count()
    }

    pub fn deleted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.deleted).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.error.as_deref(), Some(e) if e != CANCELLED_REASON))
            .count()
    }

    /// Files the run never got to, e.g. after cancellation.
    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.error.as_deref() == Some(CANCELLED_REASON))
            .count()
    }

    /// Process exit code: 0 when at least one file made it through, 4 when
    /// every selected file failed.
    pub fn exit_code(&self) -> u8 {
        if self.planned() == 0 || self.deleted() > 0 {
            0
        } else {
            4
        }
    }
}

/// Backs up selected files into a per-run bundle, then deletes them. One file
/// at a time; a failed copy excludes that file from deletion and never aborts
/// the batch.
pub struct BackupExecutor<'a> {
    config: &'a Config,
}

impl<'a> BackupExecutor<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Run the PLANNED -> BACKING_UP -> DELETING pipeline for the selected
    /// records. `cancel` is checked between files, never mid-file.
    pub fn execute(
        &self,
        records: &[&FileRecord],
        description: &str,
        cancel: &AtomicBool,
    ) -> Result<RunReport, BackupError> {
        let mut outcomes: Vec<FileOutcome> = records
            .iter()
            .map(|r| FileOutcome {
                path: r.path.clone(),
                backed_up: false,
                deleted: false,
                error: None,
            })
            .collect();

        let created_at = Utc::now();
        let backup_id = self.unique_backup_id(created_at);
        let bundle_dir = self.config.backup_root.join(&backup_id);
        fs::create_dir_all(&bundle_dir)?;

        let mut manifest = BackupManifest {
            backup_id: backup_id.clone(),
            created_at,
            description: description.to_string(),
            entries: Vec::new(),
        };

        let mut was_cancelled = false;

        let pb = ProgressBar::new(records.len() as u64 * 2);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        for (record, outcome) in records.iter().copied().zip(outcomes.iter_mut()) {
            pb.inc(1);
            if cancel.load(Ordering::SeqCst) {
                was_cancelled = true;
                break;
            }

            match self.backup_one(record, &bundle_dir) {
                Ok(entry) => {
                    manifest.entries.push(entry);
                    outcome.backed_up = true;
                    pb.set_message("backed up");
                }
                Err(e) => {
                    outcome.error = Some(format!("backup copy failed: {e}"));
                    pb.set_message("copy failed");
                }
            }
        }

        // Write-ahead: the manifest must be durable before the first delete.
        // A manifest that cannot be written aborts the whole run with nothing
        // removed.
        self.write_manifest(&bundle_dir, &manifest)
            .map_err(|e| BackupError::ManifestWriteFailed(e.to_string()))?;

        for outcome in outcomes.iter_mut() {
            pb.inc(1);
            if !outcome.backed_up {
                continue;
            }
            if cancel.load(Ordering::SeqCst) {
                was_cancelled = true;
                break;
            }

            match fs::remove_file(&outcome.path) {
                Ok(()) => {
                    outcome.deleted = true;
                    pb.set_message("deleted");
                }
                Err(e) => {
                    // The file stays both backed up and in place
                    outcome.error = Some(format!("delete failed: {e}"));
                    pb.set_message("delete failed");
                }
            }
        }

        pb.finish_and_clear();

        let all_done = outcomes.iter().all(|o| o.backed_up && o.deleted);
        let state = if all_done && !was_cancelled {
            RunState::Completed
        } else {
            RunState::PartialFailure
        };

        if was_cancelled {
            for outcome in outcomes.iter_mut() {
                if !outcome.backed_up && outcome.error.is_none() {
                    outcome.error = Some(CANCELLED_REASON.to_string());
                }
            }
        }

        Ok(RunReport {
            backup_id,
            state,
            outcomes,
            cancelled: was_cancelled,
        })
    }

    fn unique_backup_id(&self, created_at: DateTime<Utc>) -> String {
        let base = created_at.format("%Y%m%d-%H%M%S").to_string();
        let mut candidate = base.clone();
        let mut counter = 1;
        while self.config.backup_root.join(&candidate).exists() {
            candidate = format!("{base}-{counter}");
            counter += 1;
        }
        candidate
    }

    /// Copy one file into the bundle and verify the copy byte-for-byte via
    /// size and checksum before it counts as backed up.
    fn backup_one(&self, record: &FileRecord, bundle_dir: &Path) -> anyhow::Result<ManifestEntry> {
        let file_name = record
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "unnamed".to_string());

        // Unique destination name within the bundle
        let mut dest = bundle_dir.join(&file_name);
        let mut counter = 1;
        while dest.exists() {
            dest = bundle_dir.join(format!("{counter}_{file_name}"));
            counter += 1;
        }

        let source_checksum = hash_file(&record.path)?;

        let options = CopyOptions::new().overwrite(false);
        fs_extra::file::copy(&record.path, &dest, &options)?;

        let copied = fs::metadata(&dest)?;
        if copied.len() != record.size_bytes {
            anyhow::bail!(
                "size mismatch after copy: expected {}, got {}",
                record.size_bytes,
                copied.len()
            );
        }
        let dest_checksum = hash_file(&dest)?;
        if dest_checksum != source_checksum {
            anyhow::bail!("checksum mismatch after copy");
        }

        Ok(ManifestEntry {
            original_path: record.path.clone(),
            backup_path: dest,
            size_bytes: record.size_bytes,
            checksum: source_checksum,
        })
    }

    fn write_manifest(&self, bundle_dir: &Path, manifest: &BackupManifest) -> anyhow::Result<()> {
        let manifest_path = bundle_dir.join(MANIFEST_FILE);
        let temp_path = bundle_dir.join(format!("{MANIFEST_FILE}.tmp"));
        let data = serde_json::to_string_pretty(manifest)?;
        fs::write(&temp_path, &data)?;
        fs::rename(&temp_path, &manifest_path)?;
        Ok(())
    }
}

/// Outcome of restoring a single manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored,
    /// Original path now holds a different file; skipped unless forced.
    TargetExists,
    CopyFailed(String),
}

#[derive(Debug)]
pub struct RestoreStatus {
    pub original_path: PathBuf,
    pub outcome: RestoreOutcome,
}

/// Replays a backup manifest, copying files back to their original paths.
pub struct RestoreEngine<'a> {
    config: &'a Config,
}

impl<'a> RestoreEngine<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn load_manifest(&self, backup_id: &str) -> Result<BackupManifest, RestoreError> {
        let manifest_path = self
            .config
            .backup_root
            .join(backup_id)
            .join(MANIFEST_FILE);
        if !manifest_path.exists() {
            return Err(RestoreError::BackupNotFound(backup_id.to_string()));
        }
        let data = fs::read_to_string(&manifest_path)?;
        serde_json::from_str(&data)
            .map_err(|_| RestoreError::BackupNotFound(backup_id.to_string()))
    }

    /// Restore every entry, reporting per-entry status. An occupied original
    /// path is never overwritten silently; pass `force` to opt in.
    pub fn restore(&self, backup_id: &str, force: bool) -> Result<Vec<RestoreStatus>, RestoreError> {
        let manifest = self.load_manifest(backup_id)?;
        let mut statuses = Vec::with_capacity(manifest.entries.len());

        for entry in &manifest.entries {
            let outcome = self.restore_entry(entry, force);
            statuses.push(RestoreStatus {
                original_path: entry.original_path.clone(),
                outcome,
            });
        }

        Ok(statuses)
    }

    fn restore_entry(&self, entry: &ManifestEntry, force: bool) -> RestoreOutcome {
        if entry.original_path.exists() && !force {
            // Identical content means the restore already happened
            match hash_file(&entry.original_path) {
                Ok(checksum) if checksum == entry.checksum => return RestoreOutcome::Restored,
                _ => return RestoreOutcome::TargetExists,
            }
        }

        if let Some(parent) = entry.original_path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                return RestoreOutcome::CopyFailed(e.to_string());
            }
        }

        let options = CopyOptions::new().overwrite(force);
        match fs_extra::file::copy(&entry.backup_path, &entry.original_path, &options) {
            Ok(_) => RestoreOutcome::Restored,
            Err(e) => RestoreOutcome::CopyFailed(e.to_string()),
        }
    }

    /// All manifests under the backup root, newest first.
    pub fn list_backups(&self) -> Result<Vec<BackupManifest>, RestoreError> {
        let mut manifests = Vec::new();

        if !self.config.backup_root.exists() {
            return Ok(manifests);
        }

        for entry in fs::read_dir(&self.config.backup_root)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let id = entry.file_name().to_string_lossy().to_string();
            if let Ok(manifest) = self.load_manifest(&id) {
                manifests.push(manifest);
            }
        }

        manifests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(manifests)
    }

    /// Age-based retention: remove bundles older than the cutoff. Returns
    /// (removed ids, failed ids with reasons).
    pub fn prune(&self, older_than_days: i64) -> Result<(Vec<String>, Vec<(String, String)>), RestoreError> {
        let cutoff = Utc::now() - chrono::Duration::days(older_than_days);
        let mut removed = Vec::new();
        let mut failed = Vec::new();

        for manifest in self.list_backups()? {
            if manifest.created_at >= cutoff {
                continue;
            }
            let bundle_dir = self.config.backup_root.join(&manifest.backup_id);
            match fs::remove_dir_all(&bundle_dir) {
                Ok(()) => removed.push(manifest.backup_id),
                Err(e) => failed.push((manifest.backup_id, e.to_string())),
            }
        }

        Ok((removed, failed))
    }
}

/// Streaming BLAKE3 hash, 8KB chunks.
fn hash_file(path: &Path) -> anyhow::Result<String> {
    let mut hasher = blake3::Hasher::new();
    let mut file = fs::File::open(path)?;

    let mut buffer = [0u8; 8192];
    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hasher.finalize().to_string())
}

/// Print the end-of-run summary. Always shown, partial failure included.
pub fn print_run_summary(report: &RunReport) {
    println!();
    println!("{}", "CLEANUP SUMMARY".bold().color(colors::HEADER));
    println!("{}", "─".repeat(50).color(colors::PATH));
    println!("state:     {}", report.state.label());
    println!("backup id: {}", report.backup_id.to_string().color(colors::PATH));
    println!("planned:   {}", report.planned());
    println!("backed up: {}", report.backed_up().to_string().color(colors::SUCCESS));
    println!("deleted:   {}", report.deleted().to_string().color(colors::SUCCESS));
    println!("failed:    {}", report.failed().to_string().color(colors::WARNING));
    println!("skipped:   {}", report.skipped());

    let failures: Vec<&FileOutcome> = report
        .outcomes
        .iter()
        .filter(|o| o.error.is_some())
        .collect();
    if !failures.is_empty() {
        println!();
        println!("{} {} files had problems:", "!".yellow(), failures.len());
        for outcome in failures {
            println!(
                "   • {}: {}",
                outcome.path.display(),
                outcome.error.as_deref().unwrap_or("unknown")
            );
        }
    }

    if report.cancelled {
        println!();
        println!("{} Run cancelled before completing the selection", "!".yellow());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::FileType;
    use crate::risk::RiskLevel;
    use std::sync::atomic::AtomicBool;
    use tempfile::TempDir;

    fn test_config(root: &Path) -> Config {
        Config {
            trash_roots: vec![root.join("trash")],
            backup_root: root.join("backups"),
            ..Config::default()
        }
    }

    fn record_for(path: &Path) -> FileRecord {
        let metadata = fs::metadata(path).unwrap();
        FileRecord {
            path: path.to_path_buf(),
            size_bytes: metadata.len(),
            modified_at: metadata.modified().ok().map(Into::into),
            accessed_at: metadata.accessed().ok().map(Into::into),
            extension: crate::classify::extension_of(path),
            file_type: FileType::Unknown,
            risk_score: 50,
            risk_level: RiskLevel::Medium,
            selected: true,
        }
    }

    fn stage_files(dir: &Path, names: &[(&str, &[u8])]) -> Vec<FileRecord> {
        fs::create_dir_all(dir).unwrap();
        names
            .iter()
            .map(|(name, content)| {
                let path = dir.join(name);
                fs::write(&path, content).unwrap();
                record_for(&path)
            })
            .collect()
    }

    #[test]
    fn completed_run_backs_up_then_deletes() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        let records = stage_files(
            &tmp.path().join("trash"),
            &[("a.txt", b"alpha"), ("b.txt", b"bravo")],
        );
        let refs: Vec<&FileRecord> = records.iter().collect();

        let executor = BackupExecutor::new(&config);
        let cancel = AtomicBool::new(false);
        let report = executor.execute(&refs, "test run", &cancel).unwrap();

        assert_eq!(report.state, RunState::Completed);
        assert_eq!(report.deleted(), 2);
        assert_eq!(report.exit_code(), 0);
        for record in &records {
            assert!(!record.path.exists());
        }

        // Every deleted file has a verified manifest entry
        let restore = RestoreEngine::new(&config);
        let manifest = restore.load_manifest(&report.backup_id).unwrap();
        assert_eq!(manifest.entries.len(), 2);
        for entry in &manifest.entries {
            assert!(entry.backup_path.exists());
            assert_eq!(fs::metadata(&entry.backup_path).unwrap().len(), entry.size_bytes);
            assert_eq!(hash_file(&entry.backup_path).unwrap(), entry.checksum);
        }
    }

    #[test]
    fn failed_copy_excludes_file_from_deletion() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        let records = stage_files(
            &tmp.path().join("trash"),
            &[("one.txt", b"1"), ("two.txt", b"2"), ("three.txt", b"3")],
        );

        // Simulate an unreadable file #2: swap it for a directory so the
        // backup copy fails while the path stays occupied
        fs::remove_file(&records[1].path).unwrap();
        fs::create_dir(&records[1].path).unwrap();

        let refs: Vec<&FileRecord> = records.iter().collect();
        let executor = BackupExecutor::new(&config);
        let cancel = AtomicBool::new(false);
        let report = executor.execute(&refs, "partial", &cancel).unwrap();

        assert_eq!(report.state, RunState::PartialFailure);
        assert_eq!(report.deleted(), 2);
        assert_eq!(report.failed(), 1);
        // Partial success still exits 0
        assert_eq!(report.exit_code(), 0);

        // #1 and #3 are gone, #2 remains on disk untouched
        assert!(!records[0].path.exists());
        assert!(records[1].path.exists());
        assert!(!records[2].path.exists());

        let failed = report.outcomes.iter().find(|o| o.error.is_some()).unwrap();
        assert_eq!(failed.path, records[1].path);
        assert!(!failed.backed_up);
        assert!(!failed.deleted);
    }

    #[test]
    fn run_where_everything_fails_exits_nonzero() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        let records = stage_files(&tmp.path().join("trash"), &[("only.txt", b"x")]);
        fs::remove_file(&records[0].path).unwrap();
        fs::create_dir(&records[0].path).unwrap();

        let refs: Vec<&FileRecord> = records.iter().collect();
        let executor = BackupExecutor::new(&config);
        let cancel = AtomicBool::new(false);
        let report = executor.execute(&refs, "doomed", &cancel).unwrap();

        assert_eq!(report.state, RunState::PartialFailure);
        assert_eq!(report.deleted(), 0);
        assert_eq!(report.exit_code(), 4);
    }

    #[test]
    fn cancellation_between_files_stops_processing() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        let records = stage_files(
            &tmp.path().join("trash"),
            &[("a.txt", b"a"), ("b.txt", b"b")],
        );
        let refs: Vec<&FileRecord> = records.iter().collect();

        let executor = BackupExecutor::new(&config);
        let cancel = AtomicBool::new(true);
        let report = executor.execute(&refs, "cancelled", &cancel).unwrap();

        assert!(report.cancelled);
        assert_eq!(report.state, RunState::PartialFailure);
        assert_eq!(report.deleted(), 0);
        for record in &records {
            assert!(record.path.exists());
        }
        assert!(report
            .outcomes
            .iter()
            .all(|o| o.error.as_deref() == Some("cancelled before processing")));
    }

    #[test]
    fn restore_puts_files_back() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        let records = stage_files(&tmp.path().join("trash"), &[("doc.txt", b"contents")]);
        let refs: Vec<&FileRecord> = records.iter().collect();

        let executor = BackupExecutor::new(&config);
        let cancel = AtomicBool::new(false);
        let report = executor.execute(&refs, "restore test", &cancel).unwrap();
        assert!(!records[0].path.exists());

        let restore = RestoreEngine::new(&config);
        let statuses = restore.restore(&report.backup_id, false).unwrap();
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].outcome, RestoreOutcome::Restored);
        assert_eq!(fs::read(&records[0].path).unwrap(), b"contents");
    }

    #[test]
    fn restore_refuses_occupied_target_without_force() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        let records = stage_files(
            &tmp.path().join("trash"),
            &[("keep.txt", b"original"), ("other.txt", b"other")],
        );
        let refs: Vec<&FileRecord> = records.iter().collect();

        let executor = BackupExecutor::new(&config);
        let cancel = AtomicBool::new(false);
        let report = executor.execute(&refs, "occupied", &cancel).unwrap();

        // A different file now occupies keep.txt's original path
        fs::write(&records[0].path, b"squatter").unwrap();

        let restore = RestoreEngine::new(&config);
        let statuses = restore.restore(&report.backup_id, false).unwrap();

        let keep = statuses
            .iter()
            .find(|s| s.original_path == records[0].path)
            .unwrap();
        let other = statuses
            .iter()
            .find(|s| s.original_path == records[1].path)
            .unwrap();

        assert_eq!(keep.outcome, RestoreOutcome::TargetExists);
        assert_eq!(fs::read(&records[0].path).unwrap(), b"squatter");
        // The unoccupied entry restores normally
        assert_eq!(other.outcome, RestoreOutcome::Restored);
        assert_eq!(fs::read(&records[1].path).unwrap(), b"other");

        // Force overwrites the squatter
        let statuses = restore.restore(&report.backup_id, true).unwrap();
        let keep = statuses
            .iter()
            .find(|s| s.original_path == records[0].path)
            .unwrap();
        assert_eq!(keep.outcome, RestoreOutcome::Restored);
        assert_eq!(fs::read(&records[0].path).unwrap(), b"original");
    }

    #[test]
    fn restore_unknown_id_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        let restore = RestoreEngine::new(&config);
        let err = restore.restore("20200101-000000", false).unwrap_err();
        assert!(matches!(err, RestoreError::BackupNotFound(_)));
    }

    #[test]
    fn list_backups_returns_newest_first() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());

        for (id, days_ago) in [("old-run", 10), ("new-run", 1)] {
            let dir = config.backup_root.join(id);
            fs::create_dir_all(&dir).unwrap();
            let manifest = BackupManifest {
                backup_id: id.to_string(),
                created_at: Utc::now() - chrono::Duration::days(days_ago),
                description: String::new(),
                entries: Vec::new(),
            };
            fs::write(
                dir.join(MANIFEST_FILE),
                serde_json::to_string(&manifest).unwrap(),
            )
            .unwrap();
        }

        let restore = RestoreEngine::new(&config);
        let manifests = restore.list_backups().unwrap();
        let ids: Vec<&str> = manifests.iter().map(|m| m.backup_id.as_str()).collect();
        assert_eq!(ids, vec!["new-run", "old-run"]);
    }

    #[test]
    fn prune_removes_only_bundles_past_retention() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());

        for (id, days_ago) in [("stale", 45), ("fresh", 2)] {
            let dir = config.backup_root.join(id);
            fs::create_dir_all(&dir).unwrap();
            let manifest = BackupManifest {
                backup_id: id.to_string(),
                created_at: Utc::now() - chrono::Duration::days(days_ago),
                description: String::new(),
                entries: Vec::new(),
            };
            fs::write(
                dir.join(MANIFEST_FILE),
                serde_json::to_string(&manifest).unwrap(),
            )
            .unwrap();
        }

        let restore = RestoreEngine::new(&config);
        let (removed, failed) = restore.prune(30).unwrap();

        assert_eq!(removed, vec!["stale"]);
        assert!(failed.is_empty());
        assert!(!config.backup_root.join("stale").exists());
        assert!(config.backup_root.join("fresh").exists());
    }
}
