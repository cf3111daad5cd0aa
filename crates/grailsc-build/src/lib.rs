//! Grailsc build driver
//!
//! Incremental compilation of mixed Groovy/Java source trees:
//! - Staleness scanning against compiled class files
//! - Run-scoped compile list and destination ledger
//! - Phase-extensible compilation units with Grails-aware injection
//! - Compile execution with failure classification
//! - Timestamp reconciliation so unchanged sources are not recompiled

pub mod builder;
pub mod compile_list;
pub mod compiler;
pub mod error;
pub mod executor;
pub mod extender;
pub mod injection;
pub mod pipeline;
pub mod resource_loader;
pub mod scanner;
pub mod source;

// Re-export main types
pub use builder::{discover_files, BuildConfig, BuildSummary, Builder, ScanReport};
pub use compile_list::CompileRun;
pub use compiler::{
    CommandCompiler, CompileDiagnostics, CompileOutcome, Compiler, CompilerFault, DiagnosticKind,
};
pub use error::{BuildError, BuildResult};
pub use executor::{Execution, ExecutionState, Executor, COMPILER_ERROR_PREFIX};
pub use extender::{GrailsCompiler, INJECTION_PHASE};
pub use injection::{ClassInjector, DomainClassInjector, GrailsAwareInjection};
pub use pipeline::{ClassNode, CompilationUnit, OperationError, Phase, PhaseOperation};
pub use resource_loader::{configure_resource_loader, GrailsResourceLoader, ResourceLoaderHolder};
pub use scanner::scan_dir;
pub use source::{OutputMapping, SourceCandidate, SourceKind};
