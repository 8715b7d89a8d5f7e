//! core::errors
//!
//! Error taxonomy: numeric codes, the band each code falls in, and the
//! structured error every failure path in the shell is converted into.
//!
//! # Bands
//!
//! The code space `0..=1024` is split into contiguous bands:
//!
//! | Range     | Kind        |
//! |-----------|-------------|
//! | 0-99      | SYSTEM      |
//! | 100-199   | FILE_SYSTEM |
//! | 200-299   | COMMAND     |
//! | 300-399   | ARGUMENT    |
//! | 400-499   | CONFIG      |
//! | 500-599   | PERMISSION  |
//! | 600-699   | NETWORK     |
//! | 700-799   | MEMORY      |
//! | 800-899   | PLUGIN      |
//! | 900-999   | USER        |
//! | 1000-1024 | UNKNOWN (reserved) |
//!
//! # Example
//!
//! ```
//! use pcshell::core::errors::{codes, ErrorKind, ShellError};
//!
//! let err = ShellError::new(codes::FILE_NOT_FOUND, "cannot open 'a.txt'")
//!     .with_details("no such file or directory");
//! assert_eq!(err.kind(), ErrorKind::FileSystem);
//! assert_eq!(
//!     err.to_string(),
//!     "[100] FILE_SYSTEM: cannot open 'a.txt' (no such file or directory)"
//! );
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A numeric error code.
///
/// Codes are plain integers so callers can assert on the band without
/// matching on message text. Use [`ErrorCode::new`] for values that come
/// from outside the [`codes`] table; a value built directly past
/// [`ErrorCode::MAX`] still classifies, as [`ErrorKind::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    /// Highest code in the reserved band.
    pub const MAX: u16 = 1024;

    /// Checked constructor: `None` above [`ErrorCode::MAX`].
    pub const fn new(value: u16) -> Option<Self> {
        if value <= Self::MAX {
            Some(Self(value))
        } else {
            None
        }
    }

    /// The band this code belongs to.
    pub fn kind(self) -> ErrorKind {
        ErrorKind::of(self)
    }

    /// Raw numeric value.
    pub fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error class derived from the code band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    System,
    FileSystem,
    Command,
    Argument,
    Config,
    Permission,
    Network,
    Memory,
    Plugin,
    User,
    /// Reserved band (1000 and above).
    Unknown,
}

impl ErrorKind {
    /// Classify a code into its band.
    pub fn of(code: ErrorCode) -> Self {
        match code.0 {
            0..=99 => ErrorKind::System,
            100..=199 => ErrorKind::FileSystem,
            200..=299 => ErrorKind::Command,
            300..=399 => ErrorKind::Argument,
            400..=499 => ErrorKind::Config,
            500..=599 => ErrorKind::Permission,
            600..=699 => ErrorKind::Network,
            700..=799 => ErrorKind::Memory,
            800..=899 => ErrorKind::Plugin,
            900..=999 => ErrorKind::User,
            _ => ErrorKind::Unknown,
        }
    }

    /// Label used in formatted error lines.
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::System => "SYSTEM",
            ErrorKind::FileSystem => "FILE_SYSTEM",
            ErrorKind::Command => "COMMAND",
            ErrorKind::Argument => "ARGUMENT",
            ErrorKind::Config => "CONFIG",
            ErrorKind::Permission => "PERMISSION",
            ErrorKind::Network => "NETWORK",
            ErrorKind::Memory => "MEMORY",
            ErrorKind::Plugin => "PLUGIN",
            ErrorKind::User => "USER",
            ErrorKind::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Format an error line: `[code] KIND: message (details)`.
///
/// The parenthesized part is omitted when `details` is `None` or empty.
pub fn format_line(code: ErrorCode, message: &str, details: Option<&str>) -> String {
    match details {
        Some(d) if !d.is_empty() => format!("[{}] {}: {} ({})", code, code.kind(), message, d),
        _ => format!("[{}] {}: {}", code, code.kind(), message),
    }
}

/// A structured shell error.
///
/// Handlers return this (wrapped in `anyhow::Error`) when they want a
/// specific code to reach the user. Anything else a handler returns is
/// treated as an unstructured failure by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl ShellError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Attach a details string.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_line(self.code, &self.message, self.details.as_deref()))
    }
}

impl std::error::Error for ShellError {}

/// Named error codes, grouped by band.
pub mod codes {
    use super::ErrorCode;

    // System (0-99)
    pub const SUCCESS: ErrorCode = ErrorCode(0);
    pub const UNKNOWN_ERROR: ErrorCode = ErrorCode(1);
    pub const INITIALIZATION_FAILED: ErrorCode = ErrorCode(2);
    pub const SHUTDOWN_FAILED: ErrorCode = ErrorCode(3);
    pub const RESOURCE_NOT_FOUND: ErrorCode = ErrorCode(4);
    pub const OPERATION_TIMEOUT: ErrorCode = ErrorCode(5);
    pub const SYSTEM_BUSY: ErrorCode = ErrorCode(6);
    pub const VERSION_MISMATCH: ErrorCode = ErrorCode(7);
    pub const DEPENDENCY_MISSING: ErrorCode = ErrorCode(8);
    pub const ENVIRONMENT_ERROR: ErrorCode = ErrorCode(9);

    // File system (100-199)
    pub const FILE_NOT_FOUND: ErrorCode = ErrorCode(100);
    pub const DIRECTORY_NOT_FOUND: ErrorCode = ErrorCode(101);
    pub const FILE_ACCESS_DENIED: ErrorCode = ErrorCode(102);
    pub const DIRECTORY_ACCESS_DENIED: ErrorCode = ErrorCode(103);
    pub const FILE_READ_ERROR: ErrorCode = ErrorCode(104);
    pub const FILE_WRITE_ERROR: ErrorCode = ErrorCode(105);
    pub const FILE_CREATE_ERROR: ErrorCode = ErrorCode(106);
    pub const FILE_DELETE_ERROR: ErrorCode = ErrorCode(107);
    pub const FILE_COPY_ERROR: ErrorCode = ErrorCode(108);
    pub const FILE_MOVE_ERROR: ErrorCode = ErrorCode(109);
    pub const DIRECTORY_CREATE_ERROR: ErrorCode = ErrorCode(110);
    pub const DIRECTORY_DELETE_ERROR: ErrorCode = ErrorCode(111);
    pub const PATH_TOO_LONG: ErrorCode = ErrorCode(112);
    pub const INVALID_PATH: ErrorCode = ErrorCode(113);
    pub const DISK_FULL: ErrorCode = ErrorCode(114);
    pub const FILE_CORRUPTED: ErrorCode = ErrorCode(115);
    pub const FILE_LOCKED: ErrorCode = ErrorCode(116);
    pub const FILE_EXISTS: ErrorCode = ErrorCode(117);
    pub const DIRECTORY_EXISTS: ErrorCode = ErrorCode(118);
    pub const FILE_NOT_DIRECTORY: ErrorCode = ErrorCode(119);
    pub const DIRECTORY_NOT_FILE: ErrorCode = ErrorCode(120);

    // Command (200-299)
    pub const COMMAND_NOT_FOUND: ErrorCode = ErrorCode(200);
    pub const COMMAND_EXECUTION_FAILED: ErrorCode = ErrorCode(201);
    pub const COMMAND_SYNTAX_ERROR: ErrorCode = ErrorCode(202);
    pub const COMMAND_PERMISSION_DENIED: ErrorCode = ErrorCode(203);
    pub const COMMAND_TIMEOUT: ErrorCode = ErrorCode(204);
    pub const COMMAND_INTERRUPTED: ErrorCode = ErrorCode(205);
    pub const COMMAND_NOT_IMPLEMENTED: ErrorCode = ErrorCode(206);
    pub const COMMAND_DEPRECATED: ErrorCode = ErrorCode(207);
    pub const COMMAND_CONFLICT: ErrorCode = ErrorCode(208);
    pub const COMMAND_CYCLIC_DEPENDENCY: ErrorCode = ErrorCode(209);
    pub const INVALID_COMMAND: ErrorCode = ErrorCode(210);
    pub const COMMAND_USAGE_ERROR: ErrorCode = ErrorCode(211);

    // Argument (300-399)
    pub const MISSING_ARGUMENT: ErrorCode = ErrorCode(300);
    pub const TOO_MANY_ARGUMENTS: ErrorCode = ErrorCode(301);
    pub const INVALID_ARGUMENT_TYPE: ErrorCode = ErrorCode(302);
    pub const INVALID_ARGUMENT_FORMAT: ErrorCode = ErrorCode(303);
    pub const ARGUMENT_OUT_OF_RANGE: ErrorCode = ErrorCode(304);
    pub const REQUIRED_ARGUMENT_MISSING: ErrorCode = ErrorCode(305);
    pub const OPTIONAL_ARGUMENT_ERROR: ErrorCode = ErrorCode(306);
    pub const FLAG_CONFLICT: ErrorCode = ErrorCode(307);
    pub const UNKNOWN_OPTION: ErrorCode = ErrorCode(308);
    pub const INVALID_OPTION_VALUE: ErrorCode = ErrorCode(309);
    pub const PARAMETER_VALIDATION_FAILED: ErrorCode = ErrorCode(310);

    // Config (400-499)
    pub const CONFIG_FILE_NOT_FOUND: ErrorCode = ErrorCode(400);
    pub const CONFIG_FILE_INVALID: ErrorCode = ErrorCode(401);
    pub const CONFIG_PARSE_ERROR: ErrorCode = ErrorCode(402);
    pub const CONFIG_VALUE_INVALID: ErrorCode = ErrorCode(403);
    pub const CONFIG_MISSING_REQUIRED: ErrorCode = ErrorCode(404);
    pub const CONFIG_TYPE_MISMATCH: ErrorCode = ErrorCode(405);
    pub const CONFIG_DEPRECATED: ErrorCode = ErrorCode(406);
    pub const CONFIG_CONFLICT: ErrorCode = ErrorCode(407);
    pub const CONFIG_PERMISSION_DENIED: ErrorCode = ErrorCode(408);
    pub const CONFIG_BACKUP_FAILED: ErrorCode = ErrorCode(409);
    pub const CONFIG_RESTORE_FAILED: ErrorCode = ErrorCode(410);

    // Permission (500-599)
    pub const PERMISSION_DENIED: ErrorCode = ErrorCode(500);
    pub const INSUFFICIENT_PRIVILEGES: ErrorCode = ErrorCode(501);
    pub const ACCESS_FORBIDDEN: ErrorCode = ErrorCode(502);
    pub const AUTHENTICATION_FAILED: ErrorCode = ErrorCode(503);
    pub const AUTHORIZATION_FAILED: ErrorCode = ErrorCode(504);
    pub const SESSION_EXPIRED: ErrorCode = ErrorCode(505);
    pub const TOKEN_INVALID: ErrorCode = ErrorCode(506);
    pub const PASSWORD_INCORRECT: ErrorCode = ErrorCode(507);
    pub const ACCOUNT_LOCKED: ErrorCode = ErrorCode(508);
    pub const ACCOUNT_DISABLED: ErrorCode = ErrorCode(509);

    // Network (600-699)
    pub const NETWORK_CONNECTION_FAILED: ErrorCode = ErrorCode(600);
    pub const NETWORK_TIMEOUT: ErrorCode = ErrorCode(601);
    pub const NETWORK_DISCONNECTED: ErrorCode = ErrorCode(602);
    pub const HOST_NOT_FOUND: ErrorCode = ErrorCode(603);
    pub const PORT_UNAVAILABLE: ErrorCode = ErrorCode(604);
    pub const PROTOCOL_ERROR: ErrorCode = ErrorCode(605);
    pub const NETWORK_PERMISSION_DENIED: ErrorCode = ErrorCode(606);
    pub const CONNECTION_REFUSED: ErrorCode = ErrorCode(607);
    pub const CONNECTION_RESET: ErrorCode = ErrorCode(608);
    pub const NETWORK_UNREACHABLE: ErrorCode = ErrorCode(609);

    // Memory (700-799)
    pub const OUT_OF_MEMORY: ErrorCode = ErrorCode(700);
    pub const MEMORY_ALLOCATION_FAILED: ErrorCode = ErrorCode(701);
    pub const MEMORY_LEAK_DETECTED: ErrorCode = ErrorCode(702);
    pub const MEMORY_CORRUPTION: ErrorCode = ErrorCode(703);
    pub const MEMORY_ACCESS_VIOLATION: ErrorCode = ErrorCode(704);
    pub const STACK_OVERFLOW: ErrorCode = ErrorCode(705);
    pub const HEAP_CORRUPTION: ErrorCode = ErrorCode(706);

    // Plugin (800-899)
    pub const PLUGIN_LOAD_FAILED: ErrorCode = ErrorCode(800);
    pub const PLUGIN_INIT_FAILED: ErrorCode = ErrorCode(801);
    pub const PLUGIN_NOT_FOUND: ErrorCode = ErrorCode(802);
    pub const PLUGIN_VERSION_MISMATCH: ErrorCode = ErrorCode(803);
    pub const PLUGIN_DEPENDENCY_MISSING: ErrorCode = ErrorCode(804);
    pub const PLUGIN_CONFLICT: ErrorCode = ErrorCode(805);
    pub const PLUGIN_PERMISSION_DENIED: ErrorCode = ErrorCode(806);
    pub const PLUGIN_EXECUTION_FAILED: ErrorCode = ErrorCode(807);
    pub const PLUGIN_UNLOAD_FAILED: ErrorCode = ErrorCode(808);

    // User (900-999)
    pub const USER_CANCELLED: ErrorCode = ErrorCode(900);
    pub const USER_INPUT_INVALID: ErrorCode = ErrorCode(901);
    pub const USER_CONFIRMATION_FAILED: ErrorCode = ErrorCode(902);
    pub const USER_TIMEOUT: ErrorCode = ErrorCode(903);
    pub const OPERATION_ABORTED: ErrorCode = ErrorCode(904);
    pub const INVALID_USER_INPUT: ErrorCode = ErrorCode(905);
    pub const USER_NOT_FOUND: ErrorCode = ErrorCode(906);
    pub const USER_ALREADY_EXISTS: ErrorCode = ErrorCode(907);
}
