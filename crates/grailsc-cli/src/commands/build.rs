//! Build command - compile stale sources and reconcile class file timestamps

use super::{display_path, init_tracing, load_config, make_builder};
use crate::ProjectArgs;
use anyhow::{bail, Context, Result};
use grailsc_build::{BuildSummary, ExecutionState};
use std::path::Path;

/// Build command arguments
#[derive(Debug, Default)]
pub struct BuildArgs {
    pub project: ProjectArgs,
    /// JSON output
    pub json: bool,
    /// Verbose output
    pub verbose: bool,
    /// Quiet output (errors only)
    pub quiet: bool,
}

/// Run the build command
pub fn run(args: BuildArgs) -> Result<()> {
    let config = load_config(&args.project)?;
    init_tracing(args.verbose, config.log_level());

    let mut builder = make_builder(&config, &args.project);
    let summary = builder.build().context("Build failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if !args.quiet {
        print_summary(config.root(), &summary);
    }

    if let ExecutionState::FailedRecoverable(diagnostics) = &summary.state {
        if args.quiet {
            for message in &diagnostics.messages {
                eprintln!("{}", message);
            }
        }
        bail!("Compilation failed ({:?})", diagnostics.kind);
    }

    Ok(())
}

fn print_summary(root: &Path, summary: &BuildSummary) {
    match &summary.state {
        ExecutionState::Idle => {
            println!(
                "Up to date ({} source files checked in {:.2}s)",
                summary.scanned_files,
                summary.total_time.as_secs_f64()
            );
        }
        ExecutionState::Succeeded => {
            println!("\n{}", "=".repeat(60));
            println!(
                "Build succeeded in {:.2}s",
                summary.total_time.as_secs_f64()
            );
            println!("{}", "=".repeat(60));
            println!("  Scanned: {} files", summary.scanned_files);
            println!("  Compiled: {} sources", summary.stale.len());
            println!("  Class files stamped: {}", summary.reconciled);
            for mapping in &summary.stale {
                println!("    {}", display_path(root, &mapping.source));
            }
            if !summary.injected.is_empty() {
                println!("  Injected: {} artefact classes", summary.injected.len());
                for class in &summary.injected {
                    println!("    {} ({})", class.name, class.properties.join(", "));
                }
            }
            println!("{}", "=".repeat(60));
        }
        ExecutionState::FailedRecoverable(diagnostics) => {
            println!("\n{}", "=".repeat(60));
            println!(
                "Build failed after {:.2}s ({} stale sources)",
                summary.total_time.as_secs_f64(),
                summary.stale.len()
            );
            println!("{}", "=".repeat(60));
            for message in &diagnostics.messages {
                println!("  {}", message);
            }
            println!("{}", "=".repeat(60));
        }
    }
}
