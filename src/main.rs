mod cli;
mod logging;
mod reporter;

use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, DuplicatesArgs, WatchArgs};
use colored::*;
use content_ledger::analysis::{find_duplicates, suggest_cleanup, CleanupAction};
use content_ledger::config::load_configuration;
use content_ledger::extensions::file_sizes::format_size;
use content_ledger::extensions::{AnalysisReport, ExtensionReport, SizeBucket};
use content_ledger::{AppConfig, ContinuousMonitor, CycleResult, ScanEngine};
use dotenv::dotenv;
use reporter::CliReporter;
use tracing::{error, info};

fn main() {
    dotenv().ok();

    let _guard = logging::init_logger();

    let mut config = match load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();
    if let Some(root) = args.root {
        config.root_path = root;
    }

    let result = match args.command.unwrap_or(Commands::Scan) {
        Commands::Scan => run_scan(config),
        Commands::Watch(watch) => run_watch(config, watch),
        Commands::Duplicates(dupes) => run_duplicates(config, dupes),
        Commands::CleanStore => run_clean_store(config),
        Commands::Analyze => run_analyze(config),
        Commands::PrintConfig => {
            println!("Configuration: {:#?}", config);
            Ok(())
        }
    };

    if let Err(err) = result {
        error!("Error: {:#}", err);
        process::exit(1);
    }
}

fn run_scan(config: AppConfig) -> Result<()> {
    let engine = ScanEngine::new(config);
    let reporter = CliReporter::new();
    let result = engine
        .run_cycle(&reporter)
        .context("scan cycle failed")?;
    print_cycle(&result);
    Ok(())
}

fn run_watch(mut config: AppConfig, args: WatchArgs) -> Result<()> {
    if let Some(interval) = args.interval {
        config.interval_seconds = interval;
    }
    let monitor = ContinuousMonitor::new(config);
    let reporter = CliReporter::new();

    let summary = monitor.run_with(&reporter, args.cycles, |cycle, result| {
        if let Ok(result) = result {
            println!("{}", format!("Cycle {}", cycle).bold());
            print_cycle(result);
        }
    });
    info!(
        "{} cycles, {} failed",
        format!("{}", summary.cycles).cyan(),
        format!("{}", summary.failures).red(),
    );
    Ok(())
}

fn run_duplicates(config: AppConfig, args: DuplicatesArgs) -> Result<()> {
    let engine = ScanEngine::new(config);
    let records = if args.stored {
        engine.load_inventory()?
    } else {
        engine.scan_files(&CliReporter::new())?
    };

    let report = find_duplicates(&records);
    if report.is_empty() {
        println!("{}", "No duplicate files found".green());
        return Ok(());
    }

    println!(
        "{} duplicate groups, {} redundant files, {} wasted",
        format!("{}", report.group_count()).red(),
        format!("{}", report.total_duplicates).red(),
        format_size(report.wasted_space).red(),
    );
    for (digest, files) in report.largest_groups(args.limit) {
        println!("\n{} ({} copies)", digest.as_str().dimmed(), files.len());
        for file in files {
            println!("  {}", file.display_path());
        }
    }

    println!("\n{}", "Cleanup suggestions".bold());
    for suggestion in suggest_cleanup(&report) {
        let label = format!("{:<6}", suggestion.action.to_string());
        let action = match suggestion.action {
            CleanupAction::Keep => label.green(),
            CleanupAction::Delete => label.red(),
        };
        println!(
            "  {} {}  ({})",
            action,
            suggestion.record.display_path(),
            suggestion.reason
        );
    }
    Ok(())
}

fn run_clean_store(config: AppConfig) -> Result<()> {
    let engine = ScanEngine::new(config);
    let cleanup = engine.clean_store().context("store cleanup failed")?;
    println!(
        "Store cleaned: {} -> {} records ({} removed)",
        cleanup.before,
        cleanup.after,
        format!("{}", cleanup.removed()).yellow(),
    );
    Ok(())
}

fn run_analyze(config: AppConfig) -> Result<()> {
    let engine = ScanEngine::new(config);
    let report = engine.analyze_inventory()?;
    print_extensions(&report);
    Ok(())
}

fn print_cycle(result: &CycleResult) {
    println!();
    info!(
        "Scan: {}, Hash: {}, Store: {}",
        format!("{:.2}s", result.scan_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.hash_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.store_write_duration.as_secs_f64()).green(),
    );
    info!(
        "{} files scanned, {} unchanged, {} hashed, {} too large, {} failed",
        format!("{}", result.stats.scanned).cyan(),
        format!("{}", result.stats.reused).cyan(),
        format!("{}", result.stats.hashed).cyan(),
        format!("{}", result.stats.too_large).yellow(),
        format!("{}", result.stats.failed).red(),
    );
    info!(
        "Store: {} -> {} records",
        result.previous_count,
        format!("{}", result.records.len()).cyan(),
    );
    info!(
        "{} duplicate groups, {} redundant files, {} wasted",
        format!("{}", result.duplicates.group_count()).red(),
        format!("{}", result.duplicates.total_duplicates).red(),
        format_size(result.duplicates.wasted_space).red(),
    );

    println!("{}", "Folder distribution".bold());
    for (group, count) in &result.folder_counts {
        println!("  {:<20} {}", group.to_string(), count);
    }

    if let Some(extensions) = &result.extensions {
        print_extensions(extensions);
    }
}

fn print_extensions(report: &ExtensionReport) {
    for (_, analysis) in &report.analyses {
        match analysis {
            AnalysisReport::FileTypes(stats) => {
                println!(
                    "{} ({} files, {} extensions)",
                    "File types".bold(),
                    stats.total_files,
                    stats.unique_extensions()
                );
                for (ext, count) in stats.top(10) {
                    println!("  {:<20} {}", ext, count);
                }
            }
            AnalysisReport::FileSizes(stats) => {
                println!(
                    "{} ({} total)",
                    "File sizes".bold(),
                    format_size(stats.total_size)
                );
                for bucket in SizeBucket::ALL {
                    println!("  {:<20} {}", bucket.label(), stats.count(bucket));
                }
            }
        }
    }

    for (_, changes) in &report.changes {
        if changes.is_empty() {
            continue;
        }
        println!(
            "{}: {} new, {} modified, {} deleted",
            "Changes".bold(),
            format!("{}", changes.new_files.len()).green(),
            format!("{}", changes.modified_files.len()).yellow(),
            format!("{}", changes.deleted_files.len()).red(),
        );
    }
}
