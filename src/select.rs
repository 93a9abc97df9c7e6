use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use colored::*;
use dialoguer::{theme::ColorfulTheme, Select};
use globset::{Glob, GlobMatcher};
use regex::Regex;

use crate::colors;
use crate::scanner::FileRecord;

/// Typed pattern filter. Globs and regexes go through the same matcher
/// interface instead of being handed to a shell.
#[derive(Debug, Clone)]
pub enum Pattern {
    Glob(GlobMatcher),
    Regex(Regex),
}

impl Pattern {
    pub fn glob(pattern: &str) -> Result<Self> {
        let matcher = Glob::new(pattern)
            .with_context(|| format!("Invalid glob pattern: {pattern}"))?
            .compile_matcher();
        Ok(Pattern::Glob(matcher))
    }

    pub fn regex(pattern: &str) -> Result<Self> {
        let regex =
            Regex::new(pattern).with_context(|| format!("Invalid regex pattern: {pattern}"))?;
        Ok(Pattern::Regex(regex))
    }

    /// Match against the file name, not the full path.
    pub fn matches(&self, record: &FileRecord) -> bool {
        let name = record.file_name();
        match self {
            Pattern::Glob(matcher) => matcher.is_match(&name),
            Pattern::Regex(regex) => regex.is_match(&name),
        }
    }
}

/// Selection filters. All present criteria must hold (AND semantics).
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    pub pattern: Option<Pattern>,
    pub older_than: Option<Duration>,
    pub min_size_bytes: Option<u64>,
    pub min_risk: Option<u8>,
    pub max_risk: Option<u8>,
}

impl Criteria {
    pub fn matches(&self, record: &FileRecord, now: DateTime<Utc>) -> bool {
        if let Some(pattern) = &self.pattern {
            if !pattern.matches(record) {
                return false;
            }
        }

        if let Some(older_than) = self.older_than {
            // Missing mtime counts as old (consistent with the scorer's
            // oldest-bucket fallback)
            let old_enough = match record.modified_at {
                Some(modified) => now - modified >= older_than,
                None => true,
            };
            if !old_enough {
                return false;
            }
        }

        if let Some(min_size) = self.min_size_bytes {
            if record.size_bytes < min_size {
                return false;
            }
        }

        if let Some(min_risk) = self.min_risk {
            if record.risk_score < min_risk {
                return false;
            }
        }
        if let Some(max_risk) = self.max_risk {
            if record.risk_score > max_risk {
                return false;
            }
        }

        true
    }
}

/// Per-file verdict from an interactive source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Skip,
    AcceptRest,
    Abort,
}

/// Suspension point for interactive selection. The terminal implementation
/// prompts; tests feed a script.
pub trait DecisionSource {
    fn next_decision(&mut self, record: &FileRecord) -> Result<Decision>;
}

/// dialoguer-backed prompt, one file at a time.
pub struct TerminalDecisions;

impl DecisionSource for TerminalDecisions {
    fn next_decision(&mut self, record: &FileRecord) -> Result<Decision> {
        println!();
        println!(
            "{} {} ({:.2} MB, risk {} {})",
            "?".color(colors::WARNING),
            record.path.display().to_string().color(colors::PATH),
            record.size_bytes as f64 / (1024.0 * 1024.0),
            record.risk_score,
            record.risk_level.label()
        );

        let choice = Select::with_theme(&ColorfulTheme::default())
            .items(&["Delete", "Skip", "Delete all remaining", "Abort"])
            .default(1)
            .interact()
            .context("Failed to read selection")?;

        Ok(match choice {
            0 => Decision::Accept,
            1 => Decision::Skip,
            2 => Decision::AcceptRest,
            _ => Decision::Abort,
        })
    }
}

/// Marks records selected. Only ever mutates the `selected` flag.
pub struct SelectionEngine {
    now: DateTime<Utc>,
}

impl SelectionEngine {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Batch selection: mark every record matching all criteria. Returns the
    /// number selected.
    pub fn select(&self, records: &mut [FileRecord], criteria: &Criteria) -> usize {
        let mut selected = 0;
        for record in records.iter_mut() {
            if criteria.matches(record, self.now) {
                record.selected = true;
                selected += 1;
            }
        }
        selected
    }

    /// Interactive pass over the already-filtered candidates. Abort leaves
    /// undecided files unselected and keeps everything chosen so far.
    pub fn select_interactive(
        &self,
        records: &mut [FileRecord],
        criteria: &Criteria,
        decisions: &mut dyn DecisionSource,
    ) -> Result<usize> {
        let mut selected = 0;
        let mut accept_rest = false;

        for record in records.iter_mut() {
            if !criteria.matches(record, self.now) {
                continue;
            }

            if accept_rest {
                record.selected = true;
                selected += 1;
                continue;
            }

            match decisions.next_decision(record)? {
                Decision::Accept => {
                    record.selected = true;
                    selected += 1;
                }
                Decision::Skip => {}
                Decision::AcceptRest => {
                    record.selected = true;
                    selected += 1;
                    accept_rest = true;
                }
                Decision::Abort => break,
            }
        }

        Ok(selected)
    }
}
