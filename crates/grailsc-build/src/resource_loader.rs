//! Resource loader over plugin artefact sources
//!
//! The loader maps class names to the artefact files that declare them. Once
//! configured it is published in a process-wide holder so that compilation
//! phases can look artefacts up without being handed the loader directly.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Name of the directory containing Grails artefacts
pub const GRAILS_APP_DIR: &str = "grails-app";

/// Looks up artefact sources by fully qualified class name
#[derive(Debug, Clone, Default)]
pub struct GrailsResourceLoader {
    resources: Vec<PathBuf>,
    by_class: HashMap<String, PathBuf>,
}

impl GrailsResourceLoader {
    /// Create a loader over a set of artefact files
    pub fn new(resources: impl IntoIterator<Item = PathBuf>) -> Self {
        let resources: Vec<PathBuf> = resources.into_iter().collect();
        let by_class = resources
            .iter()
            .filter_map(|path| artefact_class_name(path).map(|name| (name, path.clone())))
            .collect();
        Self { resources, by_class }
    }

    /// Artefact file declaring the given class
    pub fn load_class_resource(&self, class_name: &str) -> Option<&Path> {
        self.by_class.get(class_name).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Class name of an artefact from its path below `grails-app/<kind>/`.
///
/// `grails-app/domain/org/Book.groovy` declares `org.Book`.
pub fn artefact_class_name(path: &Path) -> Option<String> {
    let relative = artefact_relative_path(path)?;
    let mut segments: Vec<String> = relative
        .parent()
        .into_iter()
        .flat_map(|p| p.components())
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str().map(str::to_string),
            _ => None,
        })
        .collect();
    segments.push(relative.file_stem()?.to_str()?.to_string());
    Some(segments.join("."))
}

/// Artefact kind (`domain`, `controllers`, ...) of a path under `grails-app`
pub fn artefact_kind(path: &Path) -> Option<&str> {
    let mut components = path.components().skip_while(|c| !is_grails_app(c));
    components.next()?;
    match components.next()? {
        Component::Normal(kind) => kind.to_str(),
        _ => None,
    }
}

fn artefact_relative_path(path: &Path) -> Option<PathBuf> {
    let mut components = path.components().skip_while(|c| !is_grails_app(c));
    components.next()?;
    components.next()?;
    let relative: PathBuf = components.collect();
    (!relative.as_os_str().is_empty()).then_some(relative)
}

fn is_grails_app(component: &Component<'_>) -> bool {
    matches!(component, Component::Normal(s) if s.to_str() == Some(GRAILS_APP_DIR))
}

static HOLDER: RwLock<Option<Arc<GrailsResourceLoader>>> = parking_lot::const_rwlock(None);

/// Process-wide slot for the configured resource loader
pub struct ResourceLoaderHolder;

impl ResourceLoaderHolder {
    /// Publish a loader, replacing any previous one
    pub fn set(loader: Arc<GrailsResourceLoader>) {
        *HOLDER.write() = Some(loader);
    }

    /// The currently published loader
    pub fn get() -> Option<Arc<GrailsResourceLoader>> {
        HOLDER.read().clone()
    }

    pub fn clear() {
        *HOLDER.write() = None;
    }
}

/// Build a loader over the given artefact resources and publish it
pub fn configure_resource_loader(
    resources: impl IntoIterator<Item = PathBuf>,
) -> Arc<GrailsResourceLoader> {
    let loader = Arc::new(GrailsResourceLoader::new(resources));
    debug!(artefacts = loader.len(), "configured resource loader");
    ResourceLoaderHolder::set(Arc::clone(&loader));
    loader
}
