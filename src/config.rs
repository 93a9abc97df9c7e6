use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::*;
use serde::{Deserialize, Serialize};

use crate::colors;

const WEIGHT_EPSILON: f64 = 1e-6;

/// Risk factor weights. Must sum to 1.0; the loader refuses a config where
/// they do not.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiskWeights {
    pub type_weight: f64,
    pub size_weight: f64,
    pub recency_weight: f64,
    pub location_weight: f64,
    pub relation_weight: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            type_weight: 0.30,
            size_weight: 0.20,
            recency_weight: 0.25,
            location_weight: 0.15,
            relation_weight: 0.10,
        }
    }
}

impl RiskWeights {
    pub fn sum(&self) -> f64 {
        self.type_weight
            + self.size_weight
            + self.recency_weight
            + self.location_weight
            + self.relation_weight
    }

    pub fn validate(&self) -> Result<()> {
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_EPSILON {
            anyhow::bail!("risk weights must sum to 1.0, got {sum}");
        }
        Ok(())
    }
}

/// Size band for the risk size curve. Files near the geometric midpoint of
/// the band score highest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SizeBand {
    pub min_bytes: u64,
    pub max_bytes: u64,
}

impl Default for SizeBand {
    fn default() -> Self {
        Self {
            min_bytes: 1024,
            max_bytes: 100 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directories cleanup is allowed to operate on.
    #[serde(default = "default_trash_roots")]
    pub trash_roots: Vec<PathBuf>,

    /// Where backup bundles are written before deletion.
    #[serde(default = "default_backup_root")]
    pub backup_root: PathBuf,

    /// Traversal bound; 0 means direct children of the root only.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    #[serde(default)]
    pub weights: RiskWeights,

    #[serde(default)]
    pub size_band: SizeBand,

    /// Files modified within this window score near 100 on recency.
    #[serde(default = "default_recent_window_hours")]
    pub recent_window_hours: u64,

    /// Recency decays to zero at this age.
    #[serde(default = "default_age_horizon_days")]
    pub age_horizon_days: u64,

    /// Backup bundles older than this are eligible for pruning.
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
}

fn default_trash_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Some(home) = dirs::home_dir() {
        roots.push(home.join(".local/share/Trash/files"));
        roots.push(home.join(".Trash"));
    }
    roots
}

fn default_backup_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".trashsift-backups")
}

fn default_max_depth() -> usize {
    3
}

fn default_recent_window_hours() -> u64 {
    24
}

fn default_age_horizon_days() -> u64 {
    30
}

fn default_retention_days() -> i64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trash_roots: default_trash_roots(),
            backup_root: default_backup_root(),
            max_depth: default_max_depth(),
            weights: RiskWeights::default(),
            size_band: SizeBand::default(),
            recent_window_hours: default_recent_window_hours(),
            age_horizon_days: default_age_horizon_days(),
            retention_days: default_retention_days(),
        }
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".trashsift.json"))
    }

    /// Get the path to the config backup file
    pub fn backup_path() -> Result<PathBuf> {
        let config_path = Self::config_path()?;
        Ok(config_path.with_extension("json.backup"))
    }

    /// Load config from disk, or create the default one if none exists.
    /// Fails fast when the risk weights do not sum to 1.0.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let config = if config_path.exists() {
            let data = fs::read_to_string(&config_path).context("Failed to read config file")?;

            match serde_json::from_str::<Config>(&data) {
                Ok(config) => config,
                Err(e) => {
                    // Config is corrupted, try backup
                    eprintln!("{} Config corrupted, trying backup...", "warning:".yellow());
                    match Self::load_backup() {
                        Ok(backup) => {
                            eprintln!("{} Restored from backup", "ok:".green());
                            backup
                        }
                        Err(_) => return Err(e.into()),
                    }
                }
            }
        } else {
            let config = Config::default();
            config.save()?;
            config
        };

        config.weights.validate()?;
        Ok(config)
    }

    fn load_backup() -> Result<Self> {
        let backup_path = Self::backup_path()?;
        if backup_path.exists() {
            let data = fs::read_to_string(&backup_path).context("Failed to read backup file")?;
            serde_json::from_str(&data).context("Failed to parse backup file")
        } else {
            Err(anyhow::anyhow!("No backup file found"))
        }
    }

    /// Save config to disk with backup
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        let backup_path = Self::backup_path()?;

        if config_path.exists() {
            fs::copy(&config_path, &backup_path).context("Failed to create backup")?;
        }

        // Write to temp file first, then rename into place
        let temp_path = config_path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&temp_path, &data).context("Failed to write temp config")?;
        fs::rename(&temp_path, &config_path).context("Failed to finalize config")?;

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("{}", "CURRENT CONFIGURATION".bold().color(colors::HEADER));
        println!();

        println!("{} Trash roots ({}):", "•".cyan(), self.trash_roots.len());
        for root in &self.trash_roots {
            println!("  - {}", root.display());
        }
        println!("{} Backup root: {}", "•".cyan(), self.backup_root.display());
        println!("{} Max depth: {}", "•".cyan(), self.max_depth);
        println!(
            "{} Weights: type={} size={} recency={} location={} relation={}",
            "•".cyan(),
            self.weights.type_weight,
            self.weights.size_weight,
            self.weights.recency_weight,
            self.weights.location_weight,
            self.weights.relation_weight,
        );
        println!(
            "{} Size band: {} - {} bytes",
            "•".cyan(),
            self.size_band.min_bytes,
            self.size_band.max_bytes
        );
        println!(
            "{} Recent window: {}h, horizon: {}d",
            "•".cyan(),
            self.recent_window_hours,
            self.age_horizon_days
        );
        println!("{} Backup retention: {} days", "•".cyan(), self.retention_days);
    }
}
