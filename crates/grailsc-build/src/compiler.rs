//! Base compiler interface and the external-command compiler
use crate::error::BuildResult;
use crate::pipeline::{CompilationUnit, Phase};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Kind of a well-formed compiler diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// Several errors collected over the whole unit
    MultipleErrors,
    /// A single compilation failure
    CompilationFailed,
}

/// Problems the compiler reported with its input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileDiagnostics {
    pub kind: DiagnosticKind,
    pub messages: Vec<String>,
}

impl CompileDiagnostics {
    pub fn new(kind: DiagnosticKind, messages: Vec<String>) -> Self {
        Self { kind, messages }
    }
}

/// An unexpected failure inside the compiler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerFault {
    pub message: String,
    pub trace: String,
}

impl CompilerFault {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            trace: message.clone(),
            message,
        }
    }

    /// Build a fault from an error and its chain of causes
    pub fn from_error(error: &dyn std::error::Error) -> Self {
        let mut trace = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            trace.push_str("\ncaused by: ");
            trace.push_str(&cause.to_string());
            source = cause.source();
        }
        Self {
            message: error.to_string(),
            trace,
        }
    }
}

/// Result of handing a compilation unit to the compiler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    Success,
    /// Recoverable: the input has errors
    Diagnostics(CompileDiagnostics),
    /// Fatal: the compiler itself failed
    Fault(CompilerFault),
}

/// The underlying language compiler
pub trait Compiler {
    /// Create the unit that compilation runs through
    fn make_compile_unit(&self) -> BuildResult<CompilationUnit> {
        Ok(CompilationUnit::new())
    }

    /// Compile every source of the unit into `dest_dir`.
    ///
    /// The unit stays with the caller, which reads the classes back after
    /// the phases ran.
    fn compile(&mut self, unit: &mut CompilationUnit, dest_dir: &Path) -> CompileOutcome;
}

impl<C: Compiler + ?Sized> Compiler for &mut C {
    fn make_compile_unit(&self) -> BuildResult<CompilationUnit> {
        (**self).make_compile_unit()
    }

    fn compile(&mut self, unit: &mut CompilationUnit, dest_dir: &Path) -> CompileOutcome {
        (**self).compile(unit, dest_dir)
    }
}

/// Runs in-process phase operations, then delegates code generation to an
/// external compiler command (`groovyc` by default) at the output phase.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    program: String,
    args: Vec<String>,
}

impl CommandCompiler {
    pub const DEFAULT_PROGRAM: &'static str = "groovyc";

    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Arguments placed before `-d <dest>` and the source files
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// The command that compiles `sources` into `dest_dir`
    pub fn command(&self, sources: &[PathBuf], dest_dir: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).arg("-d").arg(dest_dir).args(sources);
        command
    }

    fn run_external(&self, sources: &[PathBuf], dest_dir: &Path) -> CompileOutcome {
        info!(program = %self.program, files = sources.len(), "invoking compiler");
        let output = match self.command(sources, dest_dir).output() {
            Ok(output) => output,
            Err(e) => {
                return CompileOutcome::Fault(CompilerFault {
                    message: format!("failed to start '{}': {}", self.program, e),
                    trace: format!("{:?}", e),
                })
            }
        };

        if output.status.success() {
            return CompileOutcome::Success;
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let report = format!("{}{}", stdout, stderr);
        debug!(status = ?output.status.code(), "compiler reported errors");

        let messages = report
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        CompileOutcome::Diagnostics(CompileDiagnostics::new(classify_failure(&report), messages))
    }
}

impl Default for CommandCompiler {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PROGRAM)
    }
}

impl Compiler for CommandCompiler {
    fn compile(&mut self, unit: &mut CompilationUnit, dest_dir: &Path) -> CompileOutcome {
        for phase in Phase::all() {
            if phase == Phase::Parsing {
                unit.load_classes();
            }

            if let Err(e) = unit.run_phase(phase) {
                return CompileOutcome::Diagnostics(CompileDiagnostics::new(
                    DiagnosticKind::CompilationFailed,
                    vec![e.to_string()],
                ));
            }

            if phase == Phase::Output {
                let outcome = self.run_external(unit.sources(), dest_dir);
                if outcome != CompileOutcome::Success {
                    return outcome;
                }
            }
        }
        CompileOutcome::Success
    }
}

/// Decide whether a failed compiler run reported one error or several
pub fn classify_failure(report: &str) -> DiagnosticKind {
    if report.contains("MultipleCompilationErrorsException") {
        return DiagnosticKind::MultipleErrors;
    }

    let error_count = report
        .lines()
        .rev()
        .find_map(|line| {
            let line = line.trim();
            let count = line
                .strip_suffix(" errors")
                .or_else(|| line.strip_suffix(" error"))?;
            count.trim().parse::<usize>().ok()
        })
        .unwrap_or(1);

    if error_count > 1 {
        DiagnosticKind::MultipleErrors
    } else {
        DiagnosticKind::CompilationFailed
    }
}
