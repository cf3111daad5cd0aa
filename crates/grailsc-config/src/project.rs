//! Project Configuration (grailsc.toml)
//!
//! Handles project-level configuration stored in `grailsc.toml` at the project root.

use crate::{read_toml, ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project configuration from grailsc.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Project metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectSection>,

    /// Source and destination directories
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildSection>,

    /// External compiler invocation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler: Option<CompilerSection>,

    /// Plugin artefacts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugins: Option<PluginsSection>,
}

/// Project metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProjectSection {
    /// Project name
    pub name: String,
}

/// Build directories
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    /// Source directories (default: ["src/groovy", "src/java"])
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<PathBuf>,

    /// Destination directory (default: "target/classes")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,
}

/// Compiler configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct CompilerSection {
    /// Compiler program (default: "groovyc")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Extra arguments passed before the destination and sources
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

/// Plugin configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct PluginsSection {
    /// Directories containing `grails-app` artefacts
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub artefacts: Vec<PathBuf>,
}

impl ProjectConfig {
    /// Load project configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let config: Self = read_toml(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the project configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(project) = &self.project {
            if project.name.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "project.name".to_string(),
                    reason: "name cannot be empty".to_string(),
                });
            }
        }

        if let Some(build) = &self.build {
            if build.sources.iter().any(|s| s.as_os_str().is_empty()) {
                return Err(ConfigError::InvalidValue {
                    field: "build.sources".to_string(),
                    reason: "source directory cannot be empty".to_string(),
                });
            }
            if let Some(destination) = &build.destination {
                if build.sources.contains(destination) {
                    return Err(ConfigError::InvalidValue {
                        field: "build.destination".to_string(),
                        reason: format!(
                            "'{}' is also a source directory",
                            destination.display()
                        ),
                    });
                }
            }
        }

        if let Some(command) = self.compiler.as_ref().and_then(|c| c.command.as_deref()) {
            if command.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "compiler.command".to_string(),
                    reason: "command cannot be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Get the project name, if present
    pub fn project_name(&self) -> Option<&str> {
        self.project.as_ref().map(|p| p.name.as_str())
    }

    /// Configured source directories (empty if not set)
    pub fn sources(&self) -> &[PathBuf] {
        self.build.as_ref().map_or(&[], |b| b.sources.as_slice())
    }

    pub fn destination(&self) -> Option<&Path> {
        self.build.as_ref().and_then(|b| b.destination.as_deref())
    }

    pub fn compiler_command(&self) -> Option<&str> {
        self.compiler.as_ref().and_then(|c| c.command.as_deref())
    }

    /// Configured artefact roots (empty if not set)
    pub fn artefacts(&self) -> &[PathBuf] {
        self.plugins.as_ref().map_or(&[], |p| p.artefacts.as_slice())
    }
}
