//! Build orchestration: scan every source directory, then compile once
use crate::compile_list::CompileRun;
use crate::compiler::Compiler;
use crate::error::{BuildError, BuildResult};
use crate::executor::{ExecutionState, Executor};
use crate::extender::GrailsCompiler;
use crate::pipeline::ClassNode;
use crate::resource_loader::{configure_resource_loader, GrailsResourceLoader};
use crate::scanner::scan_dir;
use crate::source::{OutputMapping, SourceKind};

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Build configuration
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Source directories, scanned in order
    pub source_dirs: Vec<PathBuf>,
    /// Destination directory for class files
    pub dest_dir: PathBuf,
    /// Directories holding plugin artefacts (`grails-app` trees)
    pub artefact_roots: Vec<PathBuf>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source_dirs: vec![PathBuf::from("src/groovy"), PathBuf::from("src/java")],
            dest_dir: PathBuf::from("target/classes"),
            artefact_roots: Vec::new(),
        }
    }
}

/// Outcome of a build
#[derive(Debug, Clone, Serialize)]
pub struct BuildSummary {
    /// Number of files seen in the source directories
    pub scanned_files: usize,
    /// Stale sources and the outputs they map to
    pub stale: Vec<OutputMapping>,
    pub state: ExecutionState,
    /// Number of outputs whose timestamp was reconciled
    pub reconciled: usize,
    /// Artefact classes that received injected properties
    pub injected: Vec<ClassNode>,
    pub scan_time: Duration,
    pub compile_time: Duration,
    pub total_time: Duration,
}

impl BuildSummary {
    /// Whether the build finished without compiler diagnostics
    pub fn is_success(&self) -> bool {
        !matches!(self.state, ExecutionState::FailedRecoverable(_))
    }
}

/// Result of scanning without compiling
#[derive(Debug)]
pub struct ScanReport {
    pub run: CompileRun,
    pub scanned_files: usize,
}

/// Main builder driving scan and compile
pub struct Builder<C> {
    config: BuildConfig,
    compiler: C,
}

impl<C: Compiler> Builder<C> {
    /// Create a builder around a base compiler
    pub fn new(compiler: C) -> Self {
        Self {
            config: BuildConfig::default(),
            compiler,
        }
    }

    /// Replace the source directories
    pub fn with_source_dirs(mut self, source_dirs: Vec<PathBuf>) -> Self {
        self.config.source_dirs = source_dirs;
        self
    }

    /// Set destination directory
    pub fn with_dest_dir(mut self, dest_dir: impl Into<PathBuf>) -> Self {
        self.config.dest_dir = dest_dir.into();
        self
    }

    /// Add a plugin artefact root
    pub fn with_artefact_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.artefact_roots.push(root.into());
        self
    }

    /// Scan every source directory into a fresh run
    pub fn scan(&self) -> BuildResult<ScanReport> {
        let mut run = CompileRun::new();
        let mut scanned_files = 0;

        for src_dir in &self.config.source_dirs {
            if !src_dir.is_dir() {
                return Err(BuildError::SourceDirNotFound(src_dir.clone()));
            }
            let files = discover_files(src_dir)?;
            scanned_files += files.len();
            let selected = scan_dir(&mut run, src_dir, &self.config.dest_dir, &files)?;
            debug!(src = %src_dir.display(), files = files.len(), selected, "scanned");
        }

        Ok(ScanReport { run, scanned_files })
    }

    /// Scan, compile the stale set, and reconcile output timestamps.
    ///
    /// Compiler diagnostics are reported in the summary; a compiler fault is
    /// returned as an error.
    pub fn build(&mut self) -> BuildResult<BuildSummary> {
        let build_start = Instant::now();
        self.prepare_dest_dir()?;

        let loader = self.configure_artefacts()?;

        let scan_start = Instant::now();
        let ScanReport { run, scanned_files } = self.scan()?;
        let scan_time = scan_start.elapsed();
        let stale = run.mappings();

        info!(scanned = scanned_files, stale = stale.len(), "scan complete");

        let mut compiler = GrailsCompiler::new(&mut self.compiler);
        if let Some(loader) = loader {
            compiler = compiler.with_loader(loader);
        }
        let mut executor = Executor::new(compiler, &self.config.dest_dir);
        let execution = executor.compile(run)?;

        let total_time = build_start.elapsed();
        info!(
            compiled = execution.compiled,
            secs = total_time.as_secs_f64(),
            "build finished"
        );

        Ok(BuildSummary {
            scanned_files,
            stale,
            state: execution.state,
            reconciled: execution.reconciled,
            injected: execution.injected,
            scan_time,
            compile_time: execution.compile_time,
            total_time,
        })
    }

    fn prepare_dest_dir(&self) -> BuildResult<()> {
        let dest = &self.config.dest_dir;
        if dest.exists() && !dest.is_dir() {
            return Err(BuildError::InvalidDestination(dest.clone()));
        }
        fs::create_dir_all(dest).map_err(|e| BuildError::io(dest, e))
    }

    /// Publish a resource loader over every Groovy artefact under the roots
    fn configure_artefacts(&self) -> BuildResult<Option<Arc<GrailsResourceLoader>>> {
        if self.config.artefact_roots.is_empty() {
            return Ok(None);
        }

        let mut resources = Vec::new();
        for root in &self.config.artefact_roots {
            for file in discover_files(root)? {
                if SourceKind::from_file_name(&file) == Some(SourceKind::Groovy) {
                    resources.push(root.join(file));
                }
            }
        }
        Ok(Some(configure_resource_loader(resources)))
    }
}

/// Relative names of every file below a directory, in a stable order.
///
/// Symbolic links are followed; a link back to an ancestor is skipped. Names
/// that are not valid UTF-8 cannot be passed to the compiler and are skipped.
pub fn discover_files(dir: &Path) -> BuildResult<Vec<String>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.loop_ancestor().is_some() => {
                warn!(path = ?e.path(), "skipping symlink loop");
                continue;
            }
            Err(e) => {
                let path = e.path().unwrap_or(dir).to_path_buf();
                return Err(match e.into_io_error() {
                    Some(io) => BuildError::io(path, io),
                    None => BuildError::BuildFailed(format!("cannot walk {}", path.display())),
                });
            }
        };

        if entry.file_type().is_file() {
            let relative = entry
                .path()
                .strip_prefix(dir)
                .map_err(|_| {
                    BuildError::BuildFailed(format!(
                        "Path {} is not under {}",
                        entry.path().display(),
                        dir.display()
                    ))
                })?;
            match relative.to_str() {
                Some(name) => files.push(name.to_string()),
                None => warn!(path = ?entry.path(), "skipping file with non UTF-8 name"),
            }
        }
    }

    Ok(files)
}
