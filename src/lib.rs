//! pcshell - an interactive command shell
//!
//! pc reads a line, resolves its first word to a declared built-in or an
//! external executable on PATH, runs it with shell-quoted arguments, and
//! reports every failure as a structured, numbered error without ending the
//! session.
//!
//! # Architecture
//!
//! - [`cli`] - Process arguments, logging setup, read loops
//! - [`engine`] - The dispatcher, PATH resolution, process launch, suggestions
//! - [`registry`] - Declarative command table and argument parsing
//! - [`builtins`] - Built-in command handlers
//! - [`core`] - Error taxonomy and reporter, configuration, version metadata
//! - [`ui`] - User-visible output
//!
//! # Correctness Invariants
//!
//! 1. No input line can end the session except `exit` or end of input
//! 2. Every failure produces exactly one `[code] KIND: message (details)` line
//! 3. A missing or malformed command table is the only fatal startup error

pub mod builtins;
pub mod cli;
pub mod core;
pub mod engine;
pub mod registry;
pub mod ui;
