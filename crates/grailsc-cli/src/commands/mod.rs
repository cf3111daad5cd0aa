pub mod build;
pub mod stale;

use crate::ProjectArgs;
use anyhow::{Context, Result};
use grailsc_build::{Builder, CommandCompiler};
use grailsc_config::{Config, ConfigLoader};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::debug;

static TRACING_INIT: Once = Once::new();

/// Initialize the fmt subscriber on stderr.
///
/// `RUST_LOG` wins; otherwise `-v` selects debug, then the configured level,
/// then warnings only.
pub fn init_tracing(verbose: bool, configured: Option<&str>) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let level = if verbose {
                "debug"
            } else {
                configured.unwrap_or("warn")
            };
            EnvFilter::new(format!("grailsc_build={level},grailsc={level}"))
        });

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(filter)
            .init();
    });
}

/// Load layered configuration for the project
pub fn load_config(args: &ProjectArgs) -> Result<Config> {
    let start = match &args.project_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    ConfigLoader::new()
        .load_from_directory(&start)
        .with_context(|| format!("Failed to load configuration from {}", start.display()))
}

/// Build a driver from configuration, with CLI flags taking precedence
pub fn make_builder(config: &Config, args: &ProjectArgs) -> Builder<CommandCompiler> {
    let compiler = CommandCompiler::new(config.compiler_command())
        .with_args(config.compiler_args().iter().cloned());

    let source_dirs = if args.sources.is_empty() {
        config.source_dirs()
    } else {
        args.sources.iter().map(|p| resolve(&config.base_dir, p)).collect()
    };
    let dest_dir = match &args.destdir {
        Some(dest) => resolve(&config.base_dir, dest),
        None => config.dest_dir(),
    };
    debug!(
        compiler = config.compiler_command(),
        dest = %dest_dir.display(),
        sources = source_dirs.len(),
        "configured build"
    );

    config.artefact_roots().into_iter().fold(
        Builder::new(compiler)
            .with_source_dirs(source_dirs)
            .with_dest_dir(dest_dir),
        |builder, root| builder.with_artefact_root(root),
    )
}

/// Shorten a path for display relative to the project root
pub fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
