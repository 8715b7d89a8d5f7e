//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Every user-visible line from the dispatcher and the built-ins goes through
//! a [`Console`]. Output respects the quiet flag for informational notices;
//! error lines are always shown. A console can capture into a buffer instead
//! of stdout, which is how tests observe the shell.
//!
//! Write failures on the terminal are ignored: output is best-effort and a
//! closed stdout must not take the session down.

use std::fmt::Display;
use std::io::{self, Write};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

#[derive(Debug)]
enum Sink {
    Stdout,
    Buffer(Vec<u8>),
}

/// Destination for user-visible output.
#[derive(Debug)]
pub struct Console {
    sink: Sink,
    verbosity: Verbosity,
}

impl Console {
    /// Console writing to stdout.
    pub fn stdout(verbosity: Verbosity) -> Self {
        Self {
            sink: Sink::Stdout,
            verbosity,
        }
    }

    /// Console capturing into memory.
    pub fn buffer(verbosity: Verbosity) -> Self {
        Self {
            sink: Sink::Buffer(Vec::new()),
            verbosity,
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Write text as-is, no newline.
    pub fn raw(&mut self, text: &str) {
        match &mut self.sink {
            Sink::Stdout => {
                let mut out = io::stdout().lock();
                let _ = out.write_all(text.as_bytes());
                let _ = out.flush();
            }
            Sink::Buffer(buf) => buf.extend_from_slice(text.as_bytes()),
        }
    }

    /// Print a line of command output.
    pub fn line(&mut self, message: impl Display) {
        self.raw(&format!("{}\n", message));
    }

    /// Print an informational notice (respects quiet mode).
    pub fn info(&mut self, message: impl Display) {
        if self.verbosity != Verbosity::Quiet {
            self.line(format!("INFO: {}", message));
        }
    }

    /// Print a formatted error line (always shown).
    pub fn error(&mut self, message: impl Display) {
        self.line(message);
    }

    /// Drain captured output. Always empty for a stdout console.
    pub fn take_output(&mut self) -> String {
        match &mut self.sink {
            Sink::Stdout => String::new(),
            Sink::Buffer(buf) => String::from_utf8_lossy(&std::mem::take(buf)).into_owned(),
        }
    }
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}
