//! core::reporter
//!
//! Error reporter: the single place failures are formatted and recorded.
//!
//! # Lifetime
//!
//! One `Reporter` is constructed at startup and owned by the dispatcher
//! ([`crate::engine::Shell`]). Components that can fail receive it by
//! reference. It is not a global; a server hosting several sessions would
//! construct one per session.
//!
//! # Invariants
//!
//! - History is append-only. Records are never mutated after creation.
//! - [`Reporter::clear`] empties history but never resets the cumulative count.
//! - [`Reporter::report`] never fails.
//!
//! # Example
//!
//! ```
//! use pcshell::core::errors::codes;
//! use pcshell::core::reporter::Reporter;
//!
//! let mut reporter = Reporter::new();
//! let record = reporter.report(codes::COMMAND_NOT_FOUND, "unknown command: foo", None);
//! assert_eq!(record.to_string(), "[200] COMMAND: unknown command: foo");
//!
//! reporter.clear();
//! assert!(reporter.history().is_empty());
//! assert_eq!(reporter.count(), 1);
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::errors::{format_line, ErrorCode, ErrorKind, ShellError};

/// One reported error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ErrorRecord {
    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_line(self.code, &self.message, self.details.as_deref()))
    }
}

/// Collects error records for a session.
#[derive(Debug, Default)]
pub struct Reporter {
    history: Vec<ErrorRecord>,
    count: u64,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error and return the record.
    ///
    /// The record's `Display` is the formatted `[code] KIND: message (details)` line.
    pub fn report(&mut self, code: ErrorCode, message: &str, details: Option<&str>) -> ErrorRecord {
        let record = ErrorRecord {
            code,
            message: message.to_string(),
            details: details.filter(|d| !d.is_empty()).map(str::to_string),
            timestamp: Utc::now(),
        };

        tracing::debug!(
            code = code.value(),
            kind = code.kind().label(),
            error = message,
            "error reported"
        );

        self.count += 1;
        self.history.push(record.clone());
        record
    }

    /// Record a structured error.
    pub fn report_error(&mut self, err: &ShellError) -> ErrorRecord {
        self.report(err.code, &err.message, err.details.as_deref())
    }

    /// Snapshot of the history, oldest first.
    pub fn history(&self) -> Vec<ErrorRecord> {
        self.history.clone()
    }

    /// Cumulative number of reports, including cleared ones.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}
