//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! All user-visible output goes through this module so formatting and the
//! quiet flag are handled in one place. Diagnostics go to `tracing` instead.

pub mod output;

pub use output::{Console, Verbosity};
