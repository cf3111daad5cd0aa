//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::global::GlobalConfig;
use crate::project::{BuildSection, CompilerSection, ProjectConfig};
use crate::{ConfigError, ConfigResult, PROJECT_CONFIG_FILE};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding the destination directory
pub const ENV_DESTDIR: &str = "GRAILSC_DESTDIR";

/// Environment variable overriding the compiler program
pub const ENV_COMPILER: &str = "GRAILSC_COMPILER";

/// Compiler used when nothing else names one
pub const DEFAULT_COMPILER: &str = "groovyc";

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Global config (~/.grailsc/config.toml) - lowest priority
/// 2. Project config (./grailsc.toml) - overrides global
/// 3. Environment variables (GRAILSC_*) - overrides project
/// 4. CLI flags - highest priority (handled by caller)
pub struct ConfigLoader {
    global_config_path: Option<PathBuf>,
}

/// Merged configuration result
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,

    /// Directory holding grailsc.toml, if one was found
    pub project_root: Option<PathBuf>,

    /// Directory the search started from; relative paths resolve here
    /// when no project root exists
    pub base_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Use an explicit global config file instead of ~/.grailsc/config.toml
    pub fn with_global_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config_path = Some(path.into());
        self
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find grailsc.toml, then loads and merges
    /// global config if it exists.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project_config) = self.find_project_config(start_dir)?;
        let global_config = self.load_global_config()?;
        let project_config = self.apply_env_overrides(project_config)?;

        Ok(Config {
            project: project_config,
            global: global_config,
            project_root,
            base_dir: start_dir.to_path_buf(),
        })
    }

    /// Load configuration from a specific project config file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let project_config = ProjectConfig::load_from_file(config_path)?;
        let global_config = self.load_global_config()?;
        let project_config = self.apply_env_overrides(project_config)?;

        let project_root = config_path.parent().map(|p| p.to_path_buf());
        let base_dir = project_root.clone().unwrap_or_default();

        Ok(Config {
            project: project_config,
            global: global_config,
            project_root,
            base_dir,
        })
    }

    /// Walk up from `start_dir` looking for grailsc.toml
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, ProjectConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(PROJECT_CONFIG_FILE);

            if config_path.is_file() {
                let project_config = ProjectConfig::load_from_file(&config_path)?;
                return Ok((Some(current), project_config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, ProjectConfig::default())),
            }
        }
    }

    /// Load the global config; a missing file or home directory yields defaults
    fn load_global_config(&mut self) -> ConfigResult<GlobalConfig> {
        if self.global_config_path.is_none() {
            match GlobalConfig::global_config_path() {
                Ok(path) => self.global_config_path = Some(path),
                Err(ConfigError::HomeNotFound) => return Ok(GlobalConfig::default()),
                Err(e) => return Err(e),
            }
        }

        match &self.global_config_path {
            Some(path) if path.exists() => GlobalConfig::load_from_file(path),
            _ => Ok(GlobalConfig::default()),
        }
    }

    /// Apply GRAILSC_DESTDIR and GRAILSC_COMPILER to the project config
    fn apply_env_overrides(&self, mut config: ProjectConfig) -> ConfigResult<ProjectConfig> {
        if let Ok(dest) = env::var(ENV_DESTDIR) {
            if dest.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: ENV_DESTDIR.to_string(),
                    reason: "destination cannot be empty".to_string(),
                });
            }
            config
                .build
                .get_or_insert_with(BuildSection::default)
                .destination = Some(PathBuf::from(dest));
        }

        if let Ok(command) = env::var(ENV_COMPILER) {
            if command.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: ENV_COMPILER.to_string(),
                    reason: "command cannot be empty".to_string(),
                });
            }
            config
                .compiler
                .get_or_insert_with(CompilerSection::default)
                .command = Some(command);
        }

        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Directory relative paths are resolved against
    pub fn root(&self) -> &Path {
        self.project_root.as_deref().unwrap_or(&self.base_dir)
    }

    /// Source directories, resolved against the root
    /// (default: src/groovy and src/java)
    pub fn source_dirs(&self) -> Vec<PathBuf> {
        let configured = self.project.sources();
        if configured.is_empty() {
            vec![self.resolve("src/groovy"), self.resolve("src/java")]
        } else {
            configured.iter().map(|p| self.resolve(p)).collect()
        }
    }

    /// Destination directory, resolved against the root (default: target/classes)
    pub fn dest_dir(&self) -> PathBuf {
        match self.project.destination() {
            Some(dest) => self.resolve(dest),
            None => self.resolve("target/classes"),
        }
    }

    /// Effective compiler program (env/project > global > groovyc)
    pub fn compiler_command(&self) -> &str {
        self.project
            .compiler_command()
            .or_else(|| self.global.compiler_command())
            .unwrap_or(DEFAULT_COMPILER)
    }

    pub fn compiler_args(&self) -> &[String] {
        self.project
            .compiler
            .as_ref()
            .map_or(&[], |c| c.args.as_slice())
    }

    /// Artefact roots, resolved against the root
    pub fn artefact_roots(&self) -> Vec<PathBuf> {
        self.project
            .artefacts()
            .iter()
            .map(|p| self.resolve(p))
            .collect()
    }

    pub fn log_level(&self) -> Option<&str> {
        self.global.log_level()
    }

    fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root().join(path)
        }
    }
}
