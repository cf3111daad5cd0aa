//! Global Configuration (~/.grailsc/config.toml)
//!
//! Handles user-level configuration stored in `~/.grailsc/config.toml`.

use crate::{read_toml, ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global user configuration from ~/.grailsc/config.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    /// Default compiler used when a project does not name one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler: Option<GlobalCompilerConfig>,

    /// Logging preferences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

/// Default compiler settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GlobalCompilerConfig {
    /// Compiler program
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

/// Logging preferences
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level ("error", "warn", "info", "debug", "trace")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl GlobalConfig {
    /// Load global configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let config: Self = read_toml(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the global configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(level) = self.log_level() {
            if !is_valid_level(level) {
                return Err(ConfigError::InvalidValue {
                    field: "logging.level".to_string(),
                    reason: format!(
                        "must be one of error, warn, info, debug, trace; got '{}'",
                        level
                    ),
                });
            }
        }
        Ok(())
    }

    /// Get the global config file path (~/.grailsc/config.toml)
    pub fn global_config_path() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".grailsc").join("config.toml"))
    }

    /// Default compiler command
    pub fn compiler_command(&self) -> Option<&str> {
        self.compiler.as_ref().and_then(|c| c.command.as_deref())
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }
}

fn is_valid_level(level: &str) -> bool {
    matches!(level, "error" | "warn" | "info" | "debug" | "trace")
}
