//! Compilation phases and phase-bound operations
//!
//! A compilation unit runs its phases in a fixed order. Operations are
//! registered against a phase and are applied to every class of the unit when
//! that phase runs, after the phases before it and before the phases after it.

use crate::error::{BuildError, BuildResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Compilation phase, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Initialization,
    Parsing,
    Conversion,
    SemanticAnalysis,
    /// After semantic resolution, before any code generation
    Canonicalization,
    InstructionSelection,
    ClassGeneration,
    /// Class files are written
    Output,
    Finalization,
}

impl Phase {
    /// Get phase name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialization => "initialization",
            Self::Parsing => "parsing",
            Self::Conversion => "conversion",
            Self::SemanticAnalysis => "semantic-analysis",
            Self::Canonicalization => "canonicalization",
            Self::InstructionSelection => "instruction-selection",
            Self::ClassGeneration => "class-generation",
            Self::Output => "output",
            Self::Finalization => "finalization",
        }
    }

    /// Get all phases in execution order
    pub fn all() -> [Phase; 9] {
        [
            Self::Initialization,
            Self::Parsing,
            Self::Conversion,
            Self::SemanticAnalysis,
            Self::Canonicalization,
            Self::InstructionSelection,
            Self::ClassGeneration,
            Self::Output,
            Self::Finalization,
        ]
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A class declared by one source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassNode {
    /// Fully qualified class name
    pub name: String,
    /// Source file declaring the class
    pub source: PathBuf,
    /// Properties injected into the class by phase operations
    pub properties: Vec<String>,
}

impl ClassNode {
    pub fn new(name: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            properties: Vec::new(),
        }
    }

    /// Read a source file and derive its class from the package declaration
    /// and the file stem.
    ///
    /// The source encoding is not interpreted; undecodable bytes never affect
    /// the package line.
    pub fn from_source(path: &Path) -> BuildResult<Self> {
        let bytes = fs::read(path).map_err(|e| BuildError::io(path, e))?;
        let text = String::from_utf8_lossy(&bytes);
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();

        let name = match package_declaration(&text) {
            Some(package) => format!("{}.{}", package, stem),
            None => stem.to_string(),
        };
        Ok(Self::new(name, path))
    }

    /// Class name without its package
    pub fn simple_name(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map_or(self.name.as_str(), |(_, simple)| simple)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p == name)
    }

    /// Add a property unless it is already declared. Returns whether it was added.
    pub fn add_property(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.has_property(&name) {
            return false;
        }
        self.properties.push(name);
        true
    }
}

/// Extract the package name from a `package a.b.c` declaration
fn package_declaration(text: &str) -> Option<&str> {
    text.lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("package "))
        .map(|rest| rest.trim().trim_end_matches(';').trim())
        .filter(|package| !package.is_empty())
}

/// Failure raised by a phase operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed on {class}: {message}")]
pub struct OperationError {
    pub operation: String,
    pub class: String,
    pub message: String,
}

/// An operation applied to every class when its phase runs
pub trait PhaseOperation {
    /// Name used to identify the operation within a unit
    fn name(&self) -> &str;

    /// Apply the operation to one class
    fn call(&mut self, class: &mut ClassNode) -> Result<(), OperationError>;
}

/// Sources, their classes, and the operations registered per phase
#[derive(Default)]
pub struct CompilationUnit {
    sources: Vec<PathBuf>,
    classes: Vec<ClassNode>,
    operations: BTreeMap<Phase, Vec<Box<dyn PhaseOperation>>>,
}

impl CompilationUnit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operation to run at `phase`.
    ///
    /// An operation name may appear at most once per phase.
    pub fn add_phase_operation(
        &mut self,
        operation: Box<dyn PhaseOperation>,
        phase: Phase,
    ) -> BuildResult<()> {
        if self.has_operation(operation.name(), phase) {
            return Err(BuildError::DuplicateOperation {
                operation: operation.name().to_string(),
                phase: phase.to_string(),
            });
        }
        self.operations.entry(phase).or_default().push(operation);
        Ok(())
    }

    pub fn has_operation(&self, name: &str, phase: Phase) -> bool {
        self.operation_names(phase).any(|n| n == name)
    }

    /// Names of the operations registered at a phase, in registration order
    pub fn operation_names(&self, phase: Phase) -> impl Iterator<Item = &str> {
        self.operations
            .get(&phase)
            .into_iter()
            .flatten()
            .map(|op| op.name())
    }

    /// Total number of registered operations across all phases
    pub fn operation_count(&self) -> usize {
        self.operations.values().map(Vec::len).sum()
    }

    pub fn add_sources(&mut self, sources: impl IntoIterator<Item = PathBuf>) {
        self.sources.extend(sources);
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn add_class(&mut self, class: ClassNode) {
        self.classes.push(class);
    }

    pub fn classes(&self) -> &[ClassNode] {
        &self.classes
    }

    /// Read every Groovy source into a class node. Java sources are left to
    /// the external compiler.
    ///
    /// A source that cannot be read gets no class node, so no operation sees
    /// it; compiling it stays the external compiler's job.
    pub fn load_classes(&mut self) {
        for source in &self.sources {
            if source.extension().and_then(|e| e.to_str()) != Some("groovy") {
                continue;
            }
            match ClassNode::from_source(source) {
                Ok(class) => self.classes.push(class),
                Err(e) => warn!(source = %source.display(), error = %e, "not modelled"),
            }
        }
    }

    /// Classes that phase operations injected properties into
    pub fn injected_classes(&self) -> Vec<ClassNode> {
        self.classes
            .iter()
            .filter(|class| !class.properties.is_empty())
            .cloned()
            .collect()
    }

    /// Run the operations of one phase over every class
    pub fn run_phase(&mut self, phase: Phase) -> Result<(), OperationError> {
        let Some(operations) = self.operations.get_mut(&phase) else {
            return Ok(());
        };
        for operation in operations.iter_mut() {
            for class in self.classes.iter_mut() {
                operation.call(class)?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for CompilationUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let operations: BTreeMap<Phase, Vec<&str>> = self
            .operations
            .iter()
            .map(|(phase, ops)| (*phase, ops.iter().map(|op| op.name()).collect()))
            .collect();
        f.debug_struct("CompilationUnit")
            .field("sources", &self.sources)
            .field("classes", &self.classes)
            .field("operations", &operations)
            .finish()
    }
}
