//! trashsift - trash cleanup engine with risk scoring and recoverable deletion

pub mod backup;
pub mod classify;
pub mod cli;
pub mod config;
pub mod paths;
pub mod present;
pub mod risk;
pub mod scanner;
pub mod select;

// Re-exports for easy access
pub use backup::{
    BackupExecutor, BackupManifest, FileOutcome, ManifestEntry, RestoreEngine, RestoreOutcome,
    RunReport, RunState,
};
pub use classify::FileType;
pub use cli::{Cli, Commands};
pub use config::{Config, RiskWeights, SizeBand};
pub use paths::{CanonicalPath, PathError, PathResolver};
pub use present::{ExportFormat, GroupBy, ListPresenter, PresentOptions, SortBy, View};
pub use risk::{RiskLevel, RiskScorer, ScoreContext};
pub use scanner::{Catalog, FileRecord, ScanError, Scanner};
pub use select::{Criteria, Decision, DecisionSource, Pattern, SelectionEngine};

pub mod colors {
    use colored::Color;

    use crate::risk::RiskLevel;

    pub const CRITICAL: Color = Color::TrueColor { r: 255, g: 82, b: 82 };
    pub const HIGH: Color = Color::TrueColor { r: 255, g: 107, b: 157 };
    pub const MEDIUM: Color = Color::TrueColor { r: 255, g: 154, b: 61 };
    pub const LOW: Color = Color::TrueColor { r: 77, g: 150, b: 255 };
    pub const SAFE: Color = Color::TrueColor { r: 77, g: 255, b: 157 };
    pub const SUCCESS: Color = Color::TrueColor { r: 77, g: 255, b: 157 };
    pub const HEADER: Color = Color::TrueColor { r: 157, g: 77, b: 255 };
    pub const PATH: Color = Color::TrueColor { r: 77, g: 195, b: 255 };
    pub const WARNING: Color = Color::TrueColor { r: 255, g: 217, b: 61 };

    pub fn risk_color(level: RiskLevel) -> Color {
        match level {
            RiskLevel::Safe => SAFE,
            RiskLevel::Low => LOW,
            RiskLevel::Medium => MEDIUM,
            RiskLevel::High => HIGH,
            RiskLevel::Critical => CRITICAL,
        }
    }
}

/// Current version of trashsift
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes for the CLI surface
pub mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const INVALID_ARGS: u8 = 1;
    pub const NO_MATCHES: u8 = 2;
    pub const INVALID_ROOT: u8 = 3;
    pub const TOTAL_FAILURE: u8 = 4;
}
