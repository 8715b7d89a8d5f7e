//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Validation
//!
//! Config values are validated after parsing: the PATH cache window must be
//! positive and script extensions must be bare (no leading dot).

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Default staleness window of the PATH executable index, in seconds.
pub const DEFAULT_PATH_CACHE_TTL_SECS: u64 = 300;

/// Shell configuration.
///
/// # Example
///
/// ```toml
/// commands = "/etc/pcshell/commands.json"
/// history = true
/// path_cache_ttl_secs = 300
///
/// [scripts]
/// py = "python3"
/// sh = "sh"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ShellConfig {
    /// Command declaration table (JSON). Embedded table when unset.
    pub commands: Option<PathBuf>,

    /// Persist line history between sessions.
    pub history: Option<bool>,

    /// Staleness window of the PATH index.
    pub path_cache_ttl_secs: Option<u64>,

    /// `[VersionInfo]` TOML file.
    pub version_file: Option<PathBuf>,

    /// Script extension to interpreter command.
    pub scripts: Option<BTreeMap<String, String>>,
}

impl ShellConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path_cache_ttl_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "path_cache_ttl_secs must be greater than zero".to_string(),
            ));
        }

        if let Some(scripts) = &self.scripts {
            for (ext, interpreter) in scripts {
                if ext.is_empty() || ext.starts_with('.') {
                    return Err(ConfigError::InvalidValue(format!(
                        "invalid script extension '{}', use the bare extension (e.g. 'py')",
                        ext
                    )));
                }
                if interpreter.trim().is_empty() {
                    return Err(ConfigError::InvalidValue(format!(
                        "empty interpreter for script extension '{}'",
                        ext
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Interpreters used when no `[scripts]` table is configured.
pub fn default_scripts() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("py".to_string(), "python3".to_string()),
        ("sh".to_string(), "sh".to_string()),
    ])
}
