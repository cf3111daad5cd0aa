//! Compilation of the accumulated compile list and timestamp reconciliation
//!
//! After every compile attempt the recorded outputs are stamped with the time
//! the attempt started, so the next scan does not select the same sources
//! again. The destination directory itself is only stamped when the compiler
//! did not fault.

use crate::compile_list::CompileRun;
use crate::compiler::{CompileDiagnostics, CompileOutcome, Compiler, CompilerFault};
use crate::error::{BuildError, BuildResult};
use crate::pipeline::ClassNode;
use serde::Serialize;
use std::fs::File;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, error, info, warn};

/// Prefix of the summary line written on unexpected compiler failures
pub const COMPILER_ERROR_PREFIX: &str = "Groovy Compiler error: ";

/// Final state of an executor run that did not fault
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum ExecutionState {
    /// Nothing was stale
    Idle,
    Succeeded,
    /// The compiler reported errors in the input
    FailedRecoverable(CompileDiagnostics),
}

/// Result of [`Executor::compile`]
#[derive(Debug, Clone)]
pub struct Execution {
    pub state: ExecutionState,
    /// Number of sources handed to the compiler
    pub compiled: usize,
    /// Number of outputs whose timestamp was reconciled
    pub reconciled: usize,
    /// Timestamp applied during reconciliation
    pub reconciled_at: Option<SystemTime>,
    /// Classes whose properties were injected while compiling
    pub injected: Vec<ClassNode>,
    pub compile_time: Duration,
}

impl Execution {
    fn idle() -> Self {
        Self {
            state: ExecutionState::Idle,
            compiled: 0,
            reconciled: 0,
            reconciled_at: None,
            injected: Vec::new(),
            compile_time: Duration::ZERO,
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.state, ExecutionState::Succeeded)
    }

    pub fn diagnostics(&self) -> Option<&CompileDiagnostics> {
        match &self.state {
            ExecutionState::FailedRecoverable(diagnostics) => Some(diagnostics),
            _ => None,
        }
    }
}

/// Compiles a [`CompileRun`] into a destination directory
pub struct Executor<C> {
    compiler: C,
    dest_dir: PathBuf,
}

impl<C: Compiler> Executor<C> {
    pub fn new(compiler: C, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            compiler,
            dest_dir: dest_dir.into(),
        }
    }

    /// Compile every source of the run.
    ///
    /// An empty run returns immediately without touching the filesystem.
    /// Diagnostics about the input are reported in the returned state; a
    /// compiler fault is written to stderr and returned as
    /// [`BuildError::CompilerFault`]. Recorded outputs are reconciled on
    /// every path, including a panic unwinding out of the compiler.
    pub fn compile(&mut self, run: CompileRun) -> BuildResult<Execution> {
        if run.is_empty() {
            debug!("nothing to compile");
            return Ok(Execution::idle());
        }

        let now = SystemTime::now();
        let start = Instant::now();
        let (sources, destinations) = run.into_parts();
        let compiled = sources.len();
        let reconciliation = Reconciliation::new(destinations, now);

        info!(files = compiled, dest = %self.dest_dir.display(), "compiling");
        let (outcome, injected) = match self.compiler.make_compile_unit() {
            Ok(mut unit) => {
                unit.add_sources(sources);
                let outcome = self.compiler.compile(&mut unit, &self.dest_dir);
                (outcome, unit.injected_classes())
            }
            Err(e) => (
                CompileOutcome::Fault(CompilerFault::from_error(&e)),
                Vec::new(),
            ),
        };
        let compile_time = start.elapsed();

        let state = match outcome {
            CompileOutcome::Success => ExecutionState::Succeeded,
            CompileOutcome::Diagnostics(diagnostics) => {
                warn!(
                    kind = ?diagnostics.kind,
                    messages = diagnostics.messages.len(),
                    "compilation reported errors"
                );
                ExecutionState::FailedRecoverable(diagnostics)
            }
            CompileOutcome::Fault(fault) => {
                eprintln!("{}", fault.trace);
                eprintln!("{}{}", COMPILER_ERROR_PREFIX, fault.message);
                error!(message = %fault.message, "compiler fault");
                reconciliation.finish();
                return Err(BuildError::compiler_fault(fault.message, fault.trace));
            }
        };

        if let Err(e) = set_modified(&self.dest_dir, now) {
            warn!(dest = %self.dest_dir.display(), error = %e, "could not stamp destination");
        }
        let reconciled = reconciliation.finish();

        Ok(Execution {
            state,
            compiled,
            reconciled,
            reconciled_at: Some(now),
            injected,
            compile_time,
        })
    }
}

/// Stamps recorded outputs when the compile attempt's scope ends
struct Reconciliation {
    files: Vec<PathBuf>,
    time: SystemTime,
    done: bool,
}

impl Reconciliation {
    fn new(files: Vec<PathBuf>, time: SystemTime) -> Self {
        Self {
            files,
            time,
            done: false,
        }
    }

    /// Reconcile now and return the number of stamped files
    fn finish(mut self) -> usize {
        self.done = true;
        self.reconcile()
    }

    fn reconcile(&self) -> usize {
        let mut stamped = 0;
        for file in &self.files {
            match set_modified(file, self.time) {
                Ok(()) => stamped += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!(file = %file.display(), "no output to reconcile");
                }
                Err(e) => warn!(file = %file.display(), error = %e, "could not reconcile"),
            }
        }
        stamped
    }
}

impl Drop for Reconciliation {
    fn drop(&mut self) {
        if !self.done {
            self.reconcile();
        }
    }
}

/// Set the modification time of a file or directory.
///
/// Only ownership of the path is required, not write permission.
pub fn set_modified(path: &Path, time: SystemTime) -> io::Result<()> {
    open_for_times(path)?.set_modified(time)
}

#[cfg(unix)]
fn open_for_times(path: &Path) -> io::Result<File> {
    // futimens checks ownership, not the descriptor's access mode
    File::open(path)
}

#[cfg(windows)]
fn open_for_times(path: &Path) -> io::Result<File> {
    use std::os::windows::fs::OpenOptionsExt;

    const FILE_WRITE_ATTRIBUTES: u32 = 0x0100;
    const FILE_FLAG_BACKUP_SEMANTICS: u32 = 0x0200_0000;

    File::options()
        .access_mode(FILE_WRITE_ATTRIBUTES)
        .custom_flags(FILE_FLAG_BACKUP_SEMANTICS)
        .open(path)
}

#[cfg(not(any(unix, windows)))]
fn open_for_times(path: &Path) -> io::Result<File> {
    File::options().write(true).open(path)
}
