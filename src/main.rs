use std::fs;
use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use colored::*;

use trashsift::backup::{self, BackupExecutor, RestoreEngine, RestoreOutcome};
use trashsift::cli::{BackupsArgs, CleanArgs, Cli, Commands, RestoreArgs, ScanArgs};
use trashsift::colors;
use trashsift::config::Config;
use trashsift::exit_codes;
use trashsift::paths::PathError;
use trashsift::present::{GroupBy, ListPresenter, PresentOptions, SortBy};
use trashsift::risk::RiskScorer;
use trashsift::scanner::{Catalog, ScanError, Scanner};
use trashsift::select::{Criteria, Pattern, SelectionEngine, TerminalDecisions};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::from(classify_error(&err))
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    let config = Config::load().context("Failed to load configuration")?;

    match cli.command {
        Commands::Scan(args) => handle_scan(&config, &args, cli.verbose),
        Commands::Clean(args) => handle_clean(&config, &args, cli.verbose),
        Commands::Backups(args) => handle_backups(&config, args),
        Commands::Restore(args) => handle_restore(&config, &args),
        Commands::Config => {
            config.display();
            Ok(exit_codes::SUCCESS)
        }
    }
}

/// Map failures that escaped a handler onto the CLI exit-code contract.
fn classify_error(err: &anyhow::Error) -> u8 {
    if err.downcast_ref::<ScanError>().is_some() || err.downcast_ref::<PathError>().is_some() {
        exit_codes::INVALID_ROOT
    } else if err.downcast_ref::<trashsift::backup::BackupError>().is_some() {
        exit_codes::TOTAL_FAILURE
    } else {
        exit_codes::INVALID_ARGS
    }
}

fn default_root(config: &Config) -> Result<PathBuf> {
    config
        .trash_roots
        .first()
        .cloned()
        .context("No trash roots configured")
}

fn scan_root(config: &Config, path: &Option<PathBuf>, depth: Option<usize>) -> Result<Catalog> {
    let root = match path {
        Some(path) => path.clone(),
        None => default_root(config)?,
    };
    let depth = depth.unwrap_or(config.max_depth);

    println!("{} {}", "Scanning:".color(colors::HEADER), root.display());

    let scanner = Scanner::new(config);
    let catalog = scanner.scan(&root, depth)?;
    Ok(catalog)
}

fn handle_scan(config: &Config, args: &ScanArgs, verbose: bool) -> Result<u8> {
    let mut catalog = scan_root(config, &args.path, args.depth)?;

    if catalog.warnings > 0 {
        println!(
            "{} {} entries could not be read",
            "!".yellow(),
            catalog.warnings
        );
    }

    // Scoring runs when any requested output depends on it, or when forced
    let need_risk = args.risk_analysis
        || args.detailed
        || args.min_risk.is_some()
        || args.max_risk.is_some()
        || args.group_by == GroupBy::Risk
        || matches!(args.sort_by, SortBy::Risk | SortBy::Importance)
        || args.export.is_some();

    if need_risk {
        let scorer = RiskScorer::new(config);
        scorer.annotate(&mut catalog.records, Utc::now());
    }

    let presenter = ListPresenter::new(&config.size_band);
    let options = PresentOptions {
        group_by: args.group_by,
        sort_by: args.sort_by,
        min_risk: args.min_risk,
        max_risk: args.max_risk,
    };
    let view = presenter.present(&catalog.records, &options);

    if let Some(format) = args.export {
        let ordered: Vec<_> = view.records().cloned().collect();
        let data = presenter.export(&ordered, format)?;
        match &args.export_file {
            Some(path) => {
                fs::write(path, &data)
                    .with_context(|| format!("Failed to write export to {}", path.display()))?;
                println!(
                    "{} Exported {} records to {}",
                    "ok:".green(),
                    ordered.len(),
                    path.display().to_string().color(colors::PATH)
                );
            }
            None => {
                std::io::stdout().write_all(&data)?;
            }
        }
    } else {
        presenter.print(&view, args.detailed, need_risk);
    }

    if verbose {
        println!();
        println!(
            "scanned {} files, {} shown after filters",
            catalog.len(),
            view.total
        );
    }

    if view.is_empty() {
        return Ok(exit_codes::NO_MATCHES);
    }
    Ok(exit_codes::SUCCESS)
}

fn handle_clean(config: &Config, args: &CleanArgs, verbose: bool) -> Result<u8> {
    let mut catalog = scan_root(config, &args.path, args.depth)?;

    let scorer = RiskScorer::new(config);
    scorer.annotate(&mut catalog.records, Utc::now());

    let criteria = build_criteria(args)?;
    let engine = SelectionEngine::new(Utc::now());

    let selected = if args.interactive {
        let mut decisions = TerminalDecisions;
        engine.select_interactive(&mut catalog.records, &criteria, &mut decisions)?
    } else {
        engine.select(&mut catalog.records, &criteria)
    };

    if selected == 0 {
        println!("{} No files matched the selection", "i".cyan());
        return Ok(exit_codes::NO_MATCHES);
    }

    let chosen: Vec<_> = catalog.records.iter().filter(|r| r.selected).collect();
    let total_size: u64 = chosen.iter().map(|r| r.size_bytes).sum();

    println!(
        "{} {} files selected ({:.2} MB)",
        "selection:".color(colors::HEADER),
        selected,
        total_size as f64 / (1024.0 * 1024.0)
    );

    if args.dry_run {
        println!();
        println!("{} DRY RUN: nothing will be deleted", "~".yellow());
        for (i, record) in chosen.iter().enumerate() {
            println!(
                "{:3}. [{:>3} {:8}] {}",
                i + 1,
                record.risk_score,
                record.risk_level.label(),
                record.path.display().to_string().color(colors::PATH)
            );
        }
        println!();
        println!(
            "{} Would back up and delete {} files ({:.2} MB)",
            "~".yellow(),
            selected,
            total_size as f64 / (1024.0 * 1024.0)
        );
        return Ok(exit_codes::SUCCESS);
    }

    if !args.yes && !args.interactive {
        use dialoguer::{theme::ColorfulTheme, Confirm};
        let confirm = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Back up and delete {selected} files?"))
            .default(false)
            .interact()
            .context("Failed to get confirmation")?;

        if !confirm {
            println!("{} Cleanup cancelled", "i".cyan());
            return Ok(exit_codes::SUCCESS);
        }
    }

    let description = describe_selection(args, selected);
    let executor = BackupExecutor::new(config);
    let cancel = AtomicBool::new(false);
    let report = executor.execute(&chosen, &description, &cancel)?;

    backup::print_run_summary(&report);

    if verbose {
        println!();
        println!("backup bundle: {}", config.backup_root.join(&report.backup_id).display());
    }

    Ok(report.exit_code())
}

fn build_criteria(args: &CleanArgs) -> Result<Criteria> {
    let pattern = match (&args.pattern, &args.regex) {
        (Some(glob), _) => Some(Pattern::glob(glob)?),
        (None, Some(regex)) => Some(Pattern::regex(regex)?),
        (None, None) => None,
    };

    Ok(Criteria {
        pattern,
        older_than: args.older_than,
        min_size_bytes: args.size_limit,
        min_risk: args.min_risk,
        max_risk: args.max_risk,
    })
}

fn describe_selection(args: &CleanArgs, selected: usize) -> String {
    let mut parts = Vec::new();
    if let Some(pattern) = &args.pattern {
        parts.push(format!("pattern={pattern}"));
    }
    if let Some(regex) = &args.regex {
        parts.push(format!("regex={regex}"));
    }
    if let Some(older_than) = args.older_than {
        parts.push(format!("older-than={}d", older_than.num_days()));
    }
    if let Some(size) = args.size_limit {
        parts.push(format!("size-limit={size}B"));
    }
    if let Some(min) = args.min_risk {
        parts.push(format!("min-risk={min}"));
    }
    if let Some(max) = args.max_risk {
        parts.push(format!("max-risk={max}"));
    }
    if args.interactive {
        parts.push("interactive".to_string());
    }
    if parts.is_empty() {
        parts.push("all files".to_string());
    }
    format!("{} ({} files)", parts.join(", "), selected)
}

fn handle_backups(config: &Config, args: BackupsArgs) -> Result<u8> {
    let engine = RestoreEngine::new(config);

    match args {
        BackupsArgs::List => {
            let manifests = engine.list_backups()?;
            if manifests.is_empty() {
                println!("{} No backups found", "i".cyan());
                return Ok(exit_codes::SUCCESS);
            }

            println!();
            println!("{}", "BACKUPS".bold().color(colors::HEADER));
            println!("{}", "─".repeat(50).color(colors::PATH));
            for manifest in manifests {
                let total: u64 = manifest.entries.iter().map(|e| e.size_bytes).sum();
                println!(
                    "• {} ({} files, {:.2} MB) {}",
                    manifest.backup_id.color(colors::PATH),
                    manifest.entries.len(),
                    total as f64 / (1024.0 * 1024.0),
                    manifest.description.dimmed()
                );
            }
        }
        BackupsArgs::Prune {
            older_than_days,
            yes,
        } => {
            let days = older_than_days.unwrap_or(config.retention_days);

            if !yes {
                use dialoguer::{theme::ColorfulTheme, Confirm};
                let confirm = Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt(format!("Remove backup bundles older than {days} days?"))
                    .default(false)
                    .interact()
                    .context("Failed to get confirmation")?;
                if !confirm {
                    println!("{} Prune cancelled", "i".cyan());
                    return Ok(exit_codes::SUCCESS);
                }
            }

            let (removed, failed) = engine.prune(days)?;
            println!(
                "{} Removed {} bundles",
                "ok:".green(),
                removed.len().to_string().color(colors::SUCCESS)
            );
            for (id, reason) in failed {
                println!("{} Could not remove {id}: {reason}", "!".yellow());
            }
        }
    }

    Ok(exit_codes::SUCCESS)
}

fn handle_restore(config: &Config, args: &RestoreArgs) -> Result<u8> {
    let engine = RestoreEngine::new(config);
    let statuses = engine.restore(&args.backup_id, args.force)?;

    if statuses.is_empty() {
        println!("{} Backup {} holds no files", "i".cyan(), args.backup_id);
        return Ok(exit_codes::SUCCESS);
    }

    println!();
    println!("{}", "RESTORE RESULTS".bold().color(colors::HEADER));
    println!("{}", "─".repeat(50).color(colors::PATH));

    let mut restored = 0;
    for status in &statuses {
        match &status.outcome {
            RestoreOutcome::Restored => {
                restored += 1;
                println!(
                    "{} {}",
                    "restored:".green(),
                    status.original_path.display().to_string().color(colors::PATH)
                );
            }
            RestoreOutcome::TargetExists => {
                println!(
                    "{} {} (occupied by a different file, use --force to overwrite)",
                    "skipped:".yellow(),
                    status.original_path.display()
                );
            }
            RestoreOutcome::CopyFailed(reason) => {
                println!(
                    "{} {}: {}",
                    "failed:".red(),
                    status.original_path.display(),
                    reason
                );
            }
        }
    }

    println!();
    println!("{} {}/{} files restored", "ok:".green(), restored, statuses.len());

    if restored == 0 {
        return Ok(exit_codes::TOTAL_FAILURE);
    }
    Ok(exit_codes::SUCCESS)
}
