use anyhow::{Context, Result};
use chrono::Duration;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::present::{ExportFormat, GroupBy, SortBy};

#[derive(Parser, Debug)]
#[command(
    name = "trashsift",
    about = "Trash cleanup engine with risk scoring and recoverable deletion",
    version,
    long_about = "trashsift scans configured trash locations, scores every file's\n\
                  deletion risk across weighted factors, and deletes only after a\n\
                  verified, restorable backup has been written.\n\n\
                  Features:\n\
                  • Risk scoring: type, size, recency, location and relation factors\n\
                  • Scoped scanning: only whitelisted trash roots, never system paths\n\
                  • Safe cleanup: write-ahead manifest, checksum-verified backups\n\
                  • Recoverable: every deletion run can be restored by backup id"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan, classify and score without touching anything
    Scan(ScanArgs),

    /// Select files by filters and delete them behind a verified backup
    Clean(CleanArgs),

    /// List or prune backup bundles
    #[command(subcommand)]
    Backups(BackupsArgs),

    /// Restore a previous deletion run by backup id
    Restore(RestoreArgs),

    /// Show effective configuration
    Config,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Trash root to scan (default: first configured root)
    pub path: Option<PathBuf>,

    /// Traversal depth, 0 = direct children only
    #[arg(long)]
    pub depth: Option<usize>,

    /// Show detailed per-file fields
    #[arg(short = 'd', long)]
    pub detailed: bool,

    /// Force risk scoring even when no risk option requires it
    #[arg(short = 'r', long)]
    pub risk_analysis: bool,

    /// Group results
    #[arg(short = 'g', long, value_enum, default_value_t = GroupBy::None)]
    pub group_by: GroupBy,

    /// Sort results
    #[arg(short = 'S', long, value_enum, default_value_t = SortBy::Risk)]
    pub sort_by: SortBy,

    /// Keep only files with risk score >= N
    #[arg(short = 'm', long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub min_risk: Option<u8>,

    /// Keep only files with risk score <= N
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub max_risk: Option<u8>,

    /// Export the view instead of printing it
    #[arg(short = 'x', long, value_enum)]
    pub export: Option<ExportFormat>,

    /// Write the export here instead of stdout
    #[arg(long)]
    pub export_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Trash root to clean (default: first configured root)
    pub path: Option<PathBuf>,

    /// Traversal depth, 0 = direct children only
    #[arg(long)]
    pub depth: Option<usize>,

    /// Glob filter on file names
    #[arg(long, conflicts_with = "regex")]
    pub pattern: Option<String>,

    /// Regex filter on file names
    #[arg(long)]
    pub regex: Option<String>,

    /// Only files at least this old (e.g. 30d, 12h, 45m)
    #[arg(long, value_parser = parse_duration)]
    pub older_than: Option<Duration>,

    /// Only files at least this large (e.g. 500KB, 2MB)
    #[arg(long, value_parser = parse_size)]
    pub size_limit: Option<u64>,

    /// Only files with risk score >= N
    #[arg(short = 'm', long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub min_risk: Option<u8>,

    /// Only files with risk score <= N
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub max_risk: Option<u8>,

    /// Decide file by file instead of taking the whole filter match
    #[arg(short = 'I', long)]
    pub interactive: bool,

    /// Print would-be actions without backing up or deleting
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[derive(Subcommand, Debug)]
pub enum BackupsArgs {
    /// List backup bundles, newest first
    List,

    /// Remove bundles older than the retention window
    Prune {
        /// Override the configured retention in days
        #[arg(long)]
        older_than_days: Option<i64>,

        /// Skip confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Backup id as shown by `backups list`
    pub backup_id: String,

    /// Overwrite original paths that are occupied by other files
    #[arg(long)]
    pub force: bool,
}

/// Parse durations of the form 30d, 12h, 45m. A bare number means days.
pub fn parse_duration(value: &str) -> Result<Duration> {
    let value = value.trim();
    let (number, unit) = match value.char_indices().find(|(_, c)| c.is_alphabetic()) {
        Some((idx, _)) => value.split_at(idx),
        None => (value, "d"),
    };
    let amount: i64 = number
        .trim()
        .parse()
        .with_context(|| format!("Invalid duration: {value}"))?;

    match unit.trim().to_lowercase().as_str() {
        "d" | "day" | "days" => Ok(Duration::days(amount)),
        "h" | "hour" | "hours" => Ok(Duration::hours(amount)),
        "m" | "min" | "mins" | "minute" | "minutes" => Ok(Duration::minutes(amount)),
        other => anyhow::bail!("Unknown duration unit: {other}"),
    }
}

/// Parse sizes of the form 500KB, 2MB, 1GB. A bare number means bytes.
pub fn parse_size(value: &str) -> Result<u64> {
    let value = value.trim();
    let (number, unit) = match value.char_indices().find(|(_, c)| c.is_alphabetic()) {
        Some((idx, _)) => value.split_at(idx),
        None => (value, "b"),
    };
    let amount: u64 = number
        .trim()
        .parse()
        .with_context(|| format!("Invalid size: {value}"))?;

    let multiplier: u64 = match unit.trim().to_lowercase().as_str() {
        "b" => 1,
        "kb" | "k" => 1024,
        "mb" | "m" => 1024 * 1024,
        "gb" | "g" => 1024 * 1024 * 1024,
        other => anyhow::bail!("Unknown size unit: {other}"),
    };

    Ok(amount * multiplier)
}
