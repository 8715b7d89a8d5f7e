//! core::config
//!
//! Configuration schema and loading.
//!
//! # Locations
//!
//! Searched in order, first existing file wins:
//! 1. An explicit path (the `--config` flag); it must exist
//! 2. `$PCSHELL_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/pcshell/config.toml`
//! 4. `~/.pcshell/config.toml` (canonical location)
//!
//! A missing config file is not an error; defaults are used. A missing
//! `--config` file, or one that cannot be read, parsed or validated, is an
//! error the caller reports with a CONFIG band code (see
//! [`ConfigError::to_shell_error`]) before starting on defaults.
//!
//! # Example
//!
//! ```no_run
//! use pcshell::core::config::Config;
//!
//! let config = Config::load(None).unwrap();
//! println!("history: {}", config.history());
//! println!("PATH cache window: {:?}", config.path_cache_ttl());
//! ```

pub mod schema;

pub use schema::{default_scripts, ShellConfig, DEFAULT_PATH_CACHE_TTL_SECS};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::core::errors::{codes, ShellError};

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file '{0}' does not exist")]
    NotFound(PathBuf),

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

impl ConfigError {
    /// Map to the error shown to the user.
    pub fn to_shell_error(&self) -> ShellError {
        let code = match self {
            ConfigError::NotFound(_) => codes::CONFIG_FILE_NOT_FOUND,
            ConfigError::ReadError { .. } => codes::CONFIG_FILE_INVALID,
            ConfigError::ParseError { .. } => codes::CONFIG_PARSE_ERROR,
            ConfigError::InvalidValue(_) => codes::CONFIG_VALUE_INVALID,
        };
        ShellError::new(code, "failed to load configuration; using defaults")
            .with_details(self.to_string())
    }
}

/// Loaded configuration with defaults applied by the accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub shell: ShellConfig,
    /// Path the config was loaded from, if any.
    loaded_from: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the explicit path or the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if `explicit` does not exist, or if a config file
    /// exists but cannot be read, parsed, or validated.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load_file(path);
        }

        for path in Self::search_paths() {
            if path.exists() {
                return Self::load_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Candidate locations, in search order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(path) = std::env::var("PCSHELL_CONFIG") {
            paths.push(PathBuf::from(path));
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg_home).join("pcshell/config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".pcshell/config.toml"));
        }

        paths
    }

    /// Read, parse and validate one config file.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let shell: ShellConfig = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        shell.validate()?;

        tracing::debug!(path = %path.display(), "loaded config");

        Ok(Self {
            shell,
            loaded_from: Some(path.to_path_buf()),
        })
    }

    /// Directory holding per-user shell state (`~/.pcshell`).
    pub fn state_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".pcshell"))
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Command declaration table override.
    pub fn commands(&self) -> Option<&Path> {
        self.shell.commands.as_deref()
    }

    /// Whether line history is persisted. Defaults to `true`.
    pub fn history(&self) -> bool {
        self.shell.history.unwrap_or(true)
    }

    /// Where line history is persisted.
    pub fn history_path(&self) -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("history"))
    }

    /// Staleness window of the PATH index. Defaults to five minutes.
    pub fn path_cache_ttl(&self) -> Duration {
        Duration::from_secs(
            self.shell
                .path_cache_ttl_secs
                .unwrap_or(DEFAULT_PATH_CACHE_TTL_SECS),
        )
    }

    pub fn version_file(&self) -> Option<&Path> {
        self.shell.version_file.as_deref()
    }

    /// Script extension to interpreter map. Defaults to `py` and `sh`.
    pub fn scripts(&self) -> BTreeMap<String, String> {
        self.shell.scripts.clone().unwrap_or_else(default_scripts)
    }

    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }
}
