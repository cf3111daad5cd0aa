use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

/// Incremental Groovy/Java compiler driver for Grails projects.
///
/// Compiles only the sources whose class files are missing or out of date,
/// applies Grails artefact injection while compiling, and stamps the produced
/// class files so unchanged sources are skipped next time.
///
/// EXAMPLES:
///     grailsc build                       Compile stale sources
///     grailsc build --destdir out         Compile into ./out
///     grailsc build --src grails-app/domain --src src/groovy
///     grailsc stale                       List sources needing compilation
///     grailsc stale --json                List them as JSON
///
/// ENVIRONMENT VARIABLES:
///     GRAILSC_DESTDIR   Destination directory for class files
///     GRAILSC_COMPILER  Compiler program (default: groovyc)
///     GRAILSC_JSON      Set to 'true' for JSON output by default
///     RUST_LOG          Log filter (e.g. grailsc_build=debug)
#[derive(Parser)]
#[command(name = "grailsc")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile sources whose class files are missing or older than the source
    ///
    /// EXAMPLES:
    ///     grailsc build                 Build using grailsc.toml
    ///     grailsc build --json          Print the build summary as JSON
    ///     grailsc build -q              Only report errors
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        project: ProjectArgs,
        /// Output the build summary in JSON format
        #[arg(long, env = "GRAILSC_JSON")]
        json: bool,
        /// Verbose output (debug logging)
        #[arg(long, short = 'v')]
        verbose: bool,
        /// Quiet output (errors only)
        #[arg(long, short = 'q', conflicts_with = "verbose")]
        quiet: bool,
    },

    /// List stale sources and the class files they produce, without compiling
    ///
    /// EXAMPLES:
    ///     grailsc stale
    ///     grailsc stale --json
    #[command(visible_alias = "s")]
    Stale {
        #[command(flatten)]
        project: ProjectArgs,
        /// Output in JSON format
        #[arg(long, env = "GRAILSC_JSON")]
        json: bool,
    },
}

/// Options shared by every command that reads a project
#[derive(clap::Args, Debug, Default)]
pub struct ProjectArgs {
    /// Destination directory for class files
    #[arg(long, short = 'd', value_name = "DIR")]
    pub destdir: Option<PathBuf>,
    /// Source directory (repeatable; replaces the configured ones)
    #[arg(long = "src", value_name = "DIR")]
    pub sources: Vec<PathBuf>,
    /// Project directory (defaults to the current directory)
    #[arg(long, short = 'C', value_name = "DIR")]
    pub project_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            project,
            json,
            verbose,
            quiet,
        } => commands::build::run(commands::build::BuildArgs {
            project,
            json,
            verbose,
            quiet,
        }),
        Commands::Stale { project, json } => commands::stale::run(&project, json),
    }
}
