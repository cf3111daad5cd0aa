//! Build driver error types
use std::path::PathBuf;
use thiserror::Error;

pub type BuildResult<T> = Result<T, BuildError>;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Source directory not found: {0}")]
    SourceDirNotFound(PathBuf),

    #[error("Destination directory is not a directory: {0}")]
    InvalidDestination(PathBuf),

    #[error("Groovy Compiler error: {message}")]
    CompilerFault { message: String, trace: String },

    #[error("Phase operation '{operation}' is already registered for phase {phase}")]
    DuplicateOperation { operation: String, phase: String },

    #[error("I/O error at {path}: {error}")]
    IoError {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("Build failed: {0}")]
    BuildFailed(String),
}

impl BuildError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            error,
        }
    }

    /// Create a compiler fault error
    pub fn compiler_fault(message: impl Into<String>, trace: impl Into<String>) -> Self {
        Self::CompilerFault {
            message: message.into(),
            trace: trace.into(),
        }
    }
}
