//! Grails-aware class injection, run at the canonicalization phase
use crate::pipeline::{ClassNode, OperationError, PhaseOperation};
use crate::resource_loader::{artefact_kind, GrailsResourceLoader, ResourceLoaderHolder};
use std::path::Path;
use std::sync::Arc;
use tracing::trace;

/// Augments artefact classes before code generation
pub trait ClassInjector {
    /// Whether this injector applies to the given artefact source
    fn should_inject(&self, source: &Path) -> bool;

    fn perform_injection(&self, class: &mut ClassNode);
}

/// Gives domain classes their identity and optimistic-locking properties
#[derive(Debug, Default, Clone, Copy)]
pub struct DomainClassInjector;

impl DomainClassInjector {
    pub const PROPERTIES: [&'static str; 2] = ["id", "version"];
}

impl ClassInjector for DomainClassInjector {
    fn should_inject(&self, source: &Path) -> bool {
        artefact_kind(source) == Some("domain")
    }

    fn perform_injection(&self, class: &mut ClassNode) {
        for property in Self::PROPERTIES {
            if class.add_property(property) {
                trace!(class = %class.name, property, "injected property");
            }
        }
    }
}

/// Applies every matching [`ClassInjector`] to classes backed by an artefact.
///
/// Classes the resource loader does not know are left untouched. Without an
/// explicit loader, the one published in [`ResourceLoaderHolder`] is used.
pub struct GrailsAwareInjection {
    loader: Option<Arc<GrailsResourceLoader>>,
    injectors: Vec<Box<dyn ClassInjector>>,
}

impl GrailsAwareInjection {
    pub const NAME: &'static str = "grails-aware-injection";

    /// Injection resolving artefacts through the published loader
    pub fn new() -> Self {
        Self {
            loader: None,
            injectors: default_injectors(),
        }
    }

    /// Injection resolving artefacts through a specific loader
    pub fn with_loader(loader: Arc<GrailsResourceLoader>) -> Self {
        Self {
            loader: Some(loader),
            injectors: default_injectors(),
        }
    }

    /// Replace the injectors
    pub fn with_injectors(mut self, injectors: Vec<Box<dyn ClassInjector>>) -> Self {
        self.injectors = injectors;
        self
    }
}

impl Default for GrailsAwareInjection {
    fn default() -> Self {
        Self::new()
    }
}

fn default_injectors() -> Vec<Box<dyn ClassInjector>> {
    vec![Box::new(DomainClassInjector)]
}

impl PhaseOperation for GrailsAwareInjection {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn call(&mut self, class: &mut ClassNode) -> Result<(), OperationError> {
        let Some(loader) = self.loader.clone().or_else(ResourceLoaderHolder::get) else {
            return Ok(());
        };
        let Some(resource) = loader.load_class_resource(&class.name) else {
            return Ok(());
        };

        for injector in &self.injectors {
            if injector.should_inject(resource) {
                injector.perform_injection(class);
            }
        }
        Ok(())
    }
}
