//! registry
//!
//! The command registry: a declarative table mapping command names to
//! handlers, parameter specs, and help text.
//!
//! # Declaration Format
//!
//! A JSON array of records, kept in load order:
//!
//! ```json
//! [
//!   { "cmd": "add", "func": "add(a, b)", "para": ["a", "b"], "info": "Add two numbers" },
//!   { "cmd": "echo", "func": "echo(*text)", "para": "*argv", "info": "Print arguments" }
//! ]
//! ```
//!
//! - `func` is a handler identifier; anything after the leading identifier
//!   (such as a parenthesized parameter list) is ignored.
//! - `para` is absent, a string (`"name"`, `"[name]"`, `"*argv"`), or a list
//!   of strings where `[name]` entries are optional.
//!
//! # Invariants
//!
//! - Command names are unique.
//! - The registry is read-only after construction.
//! - Handler identifiers are bound to [`Builtin`] variants at load time.
//!   Identifiers with no matching built-in are kept as [`Binding::Unbound`]
//!   so the failure surfaces per invocation instead of at startup.
//!
//! A missing or malformed table is fatal: without a registry there are no
//! commands.

pub mod params;

pub use params::{Param, ParamSpec, ParseError, RawParams};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::builtins::Builtin;
use crate::core::errors::{codes, ShellError};

/// Table compiled into the binary.
pub const EMBEDDED_COMMANDS: &str = include_str!("commands.json");

/// Errors from loading the declaration table.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("command table '{0}' not found")]
    NotFound(PathBuf),

    #[error("failed to read command table '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse command table '{origin}': {message}")]
    ParseError { origin: String, message: String },

    #[error("command '{0}' is declared more than once")]
    DuplicateCommand(String),

    #[error("record {index} has an empty command name")]
    EmptyCommandName { index: usize },

    #[error("command '{cmd}' has an invalid handler identifier '{func}'")]
    InvalidHandler { cmd: String, func: String },
}

impl RegistryError {
    /// Convert to the system-band error shown at startup.
    pub fn to_shell_error(&self) -> ShellError {
        ShellError::new(codes::INITIALIZATION_FAILED, "failed to load command table")
            .with_details(self.to_string())
    }
}

/// How a command's handler identifier was bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Builtin(Builtin),
    /// The identifier names no known handler.
    Unbound(String),
}

/// One registered command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: String,
    pub handler_name: String,
    pub binding: Binding,
    pub params: ParamSpec,
    pub help: String,
}

impl CommandSpec {
    /// `name` followed by the synthesized parameter usage.
    pub fn usage(&self) -> String {
        let params = self.params.usage();
        if params.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, params)
        }
    }
}

#[derive(Debug, Deserialize)]
struct CommandDecl {
    cmd: String,
    func: String,
    #[serde(default)]
    para: Option<RawParams>,
    #[serde(default)]
    info: String,
}

/// Extract the leading identifier of a `func` field: `copy_func(a, b)` -> `copy_func`.
fn handler_identifier(func: &str) -> &str {
    let func = func.trim_start();
    let end = func
        .char_indices()
        .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
        .map(|(i, _)| i)
        .unwrap_or(func.len());
    &func[..end]
}

/// The loaded command table.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    commands: Vec<CommandSpec>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// Load the table compiled into the binary.
    pub fn embedded() -> Result<Self, RegistryError> {
        Self::from_json_str(EMBEDDED_COMMANDS, "<embedded>")
    }

    /// Load a table from a JSON file.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        if !path.exists() {
            return Err(RegistryError::NotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path).map_err(|e| RegistryError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_json_str(&contents, &path.display().to_string())
    }

    /// Load from `path` if given, else the embedded table.
    pub fn resolve(path: Option<&Path>) -> Result<Self, RegistryError> {
        match path {
            Some(p) => Self::load(p),
            None => Self::embedded(),
        }
    }

    /// Parse a table from JSON text. `origin` names the source in errors.
    pub fn from_json_str(json: &str, origin: &str) -> Result<Self, RegistryError> {
        let decls: Vec<CommandDecl> =
            serde_json::from_str(json).map_err(|e| RegistryError::ParseError {
                origin: origin.to_string(),
                message: e.to_string(),
            })?;

        let mut registry = Registry::default();

        for (i, decl) in decls.into_iter().enumerate() {
            let name = decl.cmd.trim().to_string();
            if name.is_empty() {
                return Err(RegistryError::EmptyCommandName { index: i });
            }
            if registry.index.contains_key(&name) {
                return Err(RegistryError::DuplicateCommand(name));
            }

            let handler_name = handler_identifier(&decl.func).to_string();
            if handler_name.is_empty() {
                return Err(RegistryError::InvalidHandler {
                    cmd: name,
                    func: decl.func,
                });
            }

            let binding = match Builtin::from_name(&handler_name) {
                Some(builtin) => Binding::Builtin(builtin),
                None => {
                    tracing::warn!(
                        command = %name,
                        handler = %handler_name,
                        "no handler matches the declared identifier"
                    );
                    Binding::Unbound(handler_name.clone())
                }
            };

            registry.index.insert(name.clone(), registry.commands.len());
            registry.commands.push(CommandSpec {
                name,
                handler_name,
                binding,
                params: ParamSpec::from_decl(decl.para.as_ref()),
                help: decl.info,
            });
        }

        tracing::debug!(origin, commands = registry.commands.len(), "loaded command table");
        Ok(registry)
    }

    pub fn lookup(&self, name: &str) -> Option<&CommandSpec> {
        self.index.get(name).map(|&i| &self.commands[i])
    }

    /// All commands in load order.
    pub fn all(&self) -> &[CommandSpec] {
        &self.commands
    }

    /// Command names in load order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|c| c.name.as_str())
    }

    /// Commands whose handler identifier matched no built-in.
    pub fn unbound(&self) -> Vec<&CommandSpec> {
        self.commands
            .iter()
            .filter(|c| matches!(c.binding, Binding::Unbound(_)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
