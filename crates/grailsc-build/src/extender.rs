//! Base compiler wrapper that adds Grails-aware injection to every unit
use crate::compiler::{CompileOutcome, Compiler};
use crate::error::BuildResult;
use crate::injection::GrailsAwareInjection;
use crate::pipeline::{CompilationUnit, Phase};
use crate::resource_loader::GrailsResourceLoader;
use std::path::Path;
use std::sync::Arc;

/// Phase at which the injection runs
pub const INJECTION_PHASE: Phase = Phase::Canonicalization;

/// A compiler identical to its base, except that each unit it creates carries
/// exactly one [`GrailsAwareInjection`] at the canonicalization phase.
#[derive(Debug, Clone)]
pub struct GrailsCompiler<C> {
    base: C,
    loader: Option<Arc<GrailsResourceLoader>>,
}

impl<C: Compiler> GrailsCompiler<C> {
    /// Wrap a base compiler; injection resolves artefacts via the published loader
    pub fn new(base: C) -> Self {
        Self { base, loader: None }
    }

    /// Resolve artefacts through a specific loader instead
    pub fn with_loader(mut self, loader: Arc<GrailsResourceLoader>) -> Self {
        self.loader = Some(loader);
        self
    }
}

impl<C: Compiler> Compiler for GrailsCompiler<C> {
    fn make_compile_unit(&self) -> BuildResult<CompilationUnit> {
        let mut unit = self.base.make_compile_unit()?;
        if !unit.has_operation(GrailsAwareInjection::NAME, INJECTION_PHASE) {
            let injection = match &self.loader {
                Some(loader) => GrailsAwareInjection::with_loader(Arc::clone(loader)),
                None => GrailsAwareInjection::new(),
            };
            unit.add_phase_operation(Box::new(injection), INJECTION_PHASE)?;
        }
        Ok(unit)
    }

    fn compile(&mut self, unit: &mut CompilationUnit, dest_dir: &Path) -> CompileOutcome {
        self.base.compile(unit, dest_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{ClassNode, OperationError, PhaseOperation};
    use pretty_assertions::assert_eq;

    struct Noop(&'static str);

    impl PhaseOperation for Noop {
        fn name(&self) -> &str {
            self.0
        }

        fn call(&mut self, _class: &mut ClassNode) -> Result<(), OperationError> {
            Ok(())
        }
    }

    /// Base compiler registering its own operations around canonicalization
    struct Base;

    impl Compiler for Base {
        fn make_compile_unit(&self) -> BuildResult<CompilationUnit> {
            let mut unit = CompilationUnit::new();
            unit.add_phase_operation(Box::new(Noop("resolve")), Phase::SemanticAnalysis)?;
            unit.add_phase_operation(Box::new(Noop("verify")), Phase::Canonicalization)?;
            unit.add_phase_operation(Box::new(Noop("emit")), Phase::ClassGeneration)?;
            Ok(unit)
        }

        fn compile(&mut self, _unit: &mut CompilationUnit, _dest_dir: &Path) -> CompileOutcome {
            CompileOutcome::Success
        }
    }

    #[test]
    fn test_injection_registered_at_canonicalization() {
        let compiler = GrailsCompiler::new(Base);
        let unit = compiler.make_compile_unit().unwrap();

        assert_eq!(
            unit.operation_names(Phase::Canonicalization).collect::<Vec<_>>(),
            vec!["verify", GrailsAwareInjection::NAME]
        );
        assert_eq!(
            unit.operation_names(Phase::SemanticAnalysis).collect::<Vec<_>>(),
            vec!["resolve"]
        );
        assert_eq!(
            unit.operation_names(Phase::ClassGeneration).collect::<Vec<_>>(),
            vec!["emit"]
        );
        assert_eq!(unit.operation_count(), 4);
    }

    #[test]
    fn test_exactly_one_injection_when_wrapped_twice() {
        let compiler = GrailsCompiler::new(GrailsCompiler::new(Base));
        let unit = compiler.make_compile_unit().unwrap();

        let injections = unit
            .operation_names(INJECTION_PHASE)
            .filter(|name| *name == GrailsAwareInjection::NAME)
            .count();
        assert_eq!(injections, 1);
    }

    #[test]
    fn test_each_unit_gets_its_own_injection() {
        let compiler = GrailsCompiler::new(Base);
        let first = compiler.make_compile_unit().unwrap();
        let second = compiler.make_compile_unit().unwrap();

        assert!(first.has_operation(GrailsAwareInjection::NAME, INJECTION_PHASE));
        assert!(second.has_operation(GrailsAwareInjection::NAME, INJECTION_PHASE));
    }
}
