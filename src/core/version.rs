//! core::version
//!
//! Name and version metadata shown in the startup banner and by `version`.
//!
//! The compiled package metadata is the default. A deployment can ship a
//! `version.toml` instead:
//!
//! ```toml
//! [VersionInfo]
//! Name = "pc"
//! Version = "1.3.0"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors from loading version metadata.
#[derive(Debug, Error)]
pub enum VersionError {
    #[error("failed to read version file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse version file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },
}

/// Name and version of the running shell.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VersionInfo {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Version")]
    pub version: String,
}

#[derive(Deserialize)]
struct VersionFile {
    #[serde(rename = "VersionInfo")]
    info: VersionInfo,
}

impl VersionInfo {
    /// Metadata compiled into the binary.
    pub fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Load from a TOML file with a `[VersionInfo]` table.
    pub fn load(path: &Path) -> Result<Self, VersionError> {
        let contents = fs::read_to_string(path).map_err(|e| VersionError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str::<VersionFile>(&contents)
            .map(|f| f.info)
            .map_err(|e| VersionError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }

    /// Load from `path` if given, else the compiled metadata.
    pub fn resolve(path: Option<&Path>) -> Result<Self, VersionError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::current()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn current_uses_package_metadata() {
        let info = VersionInfo::current();
        assert_eq!(info.name, "pcshell");
        assert!(!info.version.is_empty());
    }

    #[test]
    fn load_reads_version_table() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("version.toml");
        fs::write(&path, "[VersionInfo]\nName = \"PythonCMD\"\nVersion = \"1.3\"\n").unwrap();

        let info = VersionInfo::load(&path).unwrap();
        assert_eq!(info.name, "PythonCMD");
        assert_eq!(info.version, "1.3");
    }

    #[test]
    fn missing_table_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("version.toml");
        fs::write(&path, "name = \"x\"\n").unwrap();

        assert!(matches!(
            VersionInfo::load(&path),
            Err(VersionError::ParseError { .. })
        ));
    }

    #[test]
    fn missing_file_is_read_error() {
        let temp = TempDir::new().unwrap();
        let result = VersionInfo::resolve(Some(&temp.path().join("nope.toml")));
        assert!(matches!(result, Err(VersionError::ReadError { .. })));
    }
}
