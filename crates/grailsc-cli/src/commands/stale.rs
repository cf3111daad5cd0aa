//! Stale command - report what the next build would compile

use super::{display_path, init_tracing, load_config, make_builder};
use crate::ProjectArgs;
use anyhow::{Context, Result};

pub fn run(args: &ProjectArgs, json: bool) -> Result<()> {
    let config = load_config(args)?;
    init_tracing(false, config.log_level());

    let builder = make_builder(&config, args);
    let report = builder.scan().context("Failed to scan sources")?;
    let mappings = report.run.mappings();

    if json {
        println!(
            "{}",
            serde_json::json!({
                "scanned_files": report.scanned_files,
                "stale": mappings,
            })
        );
        return Ok(());
    }

    if mappings.is_empty() {
        println!("All {} source files are up to date", report.scanned_files);
        return Ok(());
    }

    let root = config.root();
    for mapping in &mappings {
        println!(
            "{} -> {}",
            display_path(root, &mapping.source),
            display_path(root, &mapping.output)
        );
    }
    println!(
        "{} of {} source files stale",
        mappings.len(),
        report.scanned_files
    );

    Ok(())
}
