//! core
//!
//! Shared foundations for the shell.
//!
//! # Modules
//!
//! - [`errors`] - Error codes, bands, and the structured `ShellError`
//! - [`reporter`] - Session error reporter (formatting + history)
//! - [`config`] - Configuration schema and loading
//! - [`version`] - Name/version metadata

pub mod config;
pub mod errors;
pub mod reporter;
pub mod version;
