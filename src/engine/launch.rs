//! engine::launch
//!
//! Child-process launching for resolved external executables.
//!
//! The child inherits the shell's stdin, stdout and stderr so interactive
//! programs work, runs in the shell's working directory, and is waited on
//! synchronously. No timeout is imposed. Ctrl-C reaches the child with its
//! default disposition even while the shell itself ignores it.

use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus};

use thiserror::Error;

use super::interrupt::{self, InterruptGuard};
use super::resolve::{ExecutableKind, ResolvedExecutable};
use crate::core::errors::{codes, ShellError};

/// Why a child process could not be started.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("permission denied running '{name}': {source}")]
    PermissionDenied { name: String, source: io::Error },

    #[error("'{name}' could not be found: {source}")]
    NotFound { name: String, source: io::Error },

    #[error("failed to run '{name}': {source}")]
    Failed { name: String, source: io::Error },
}

impl LaunchError {
    fn from_io(name: &str, err: io::Error) -> Self {
        let name = name.to_string();
        match err.kind() {
            io::ErrorKind::PermissionDenied => LaunchError::PermissionDenied { name, source: err },
            io::ErrorKind::NotFound => LaunchError::NotFound { name, source: err },
            _ => LaunchError::Failed { name, source: err },
        }
    }

    /// Map to the error shown to the user.
    pub fn to_shell_error(&self) -> ShellError {
        match self {
            LaunchError::PermissionDenied { name, source } => {
                ShellError::new(codes::PERMISSION_DENIED, format!("permission denied: {}", name))
                    .with_details(source.to_string())
            }
            LaunchError::NotFound { name, source } => {
                ShellError::new(codes::FILE_NOT_FOUND, format!("file not found: {}", name))
                    .with_details(source.to_string())
            }
            LaunchError::Failed { name, source } => ShellError::new(
                codes::COMMAND_EXECUTION_FAILED,
                format!("failed to run '{}'", name),
            )
            .with_details(source.to_string()),
        }
    }
}

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReport {
    Success,
    Code(i32),
    /// Terminated by a signal (Unix only).
    Signal(i32),
}

impl From<ExitStatus> for ExitReport {
    fn from(status: ExitStatus) -> Self {
        if status.success() {
            return ExitReport::Success;
        }
        if let Some(code) = status.code() {
            return ExitReport::Code(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitReport::Signal(signal);
            }
        }
        ExitReport::Code(-1)
    }
}

/// Build the process command for `exe`.
///
/// Scripts run as `<interpreter> <script> <args...>`.
pub fn command_for(exe: &ResolvedExecutable, args: &[String], cwd: &Path) -> Command {
    let mut cmd = match (exe.kind, &exe.interpreter) {
        (ExecutableKind::InterpretedScript, Some(interpreter)) => {
            let mut cmd = Command::new(interpreter);
            cmd.arg(&exe.path);
            cmd
        }
        _ => Command::new(&exe.path),
    };
    cmd.args(args).current_dir(cwd);
    interrupt::restore_default_in_child(&mut cmd);
    cmd
}

/// Run `exe` to completion.
///
/// `name` is what the user typed and appears in errors.
pub fn launch(
    name: &str,
    exe: &ResolvedExecutable,
    args: &[String],
    cwd: &Path,
) -> Result<ExitReport, LaunchError> {
    tracing::debug!(name, path = %exe.path.display(), kind = ?exe.kind, "launching");

    let _guard = InterruptGuard::ignore();
    let status = command_for(exe, args, cwd)
        .status()
        .map_err(|e| LaunchError::from_io(name, e))?;

    Ok(ExitReport::from(status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn script(interpreter: &str) -> ResolvedExecutable {
        ResolvedExecutable {
            path: PathBuf::from("/tmp/hello.py"),
            kind: ExecutableKind::InterpretedScript,
            interpreter: Some(PathBuf::from(interpreter)),
        }
    }

    #[test]
    fn script_runs_through_interpreter() {
        let cmd = command_for(&script("python3"), &["a".to_string()], Path::new("/tmp"));
        assert_eq!(cmd.get_program(), "python3");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, vec!["/tmp/hello.py", "a"]);
        assert_eq!(cmd.get_current_dir(), Some(Path::new("/tmp")));
    }

    #[test]
    fn native_binary_runs_directly() {
        let exe = ResolvedExecutable {
            path: PathBuf::from("/usr/bin/tool"),
            kind: ExecutableKind::NativeBinary,
            interpreter: None,
        };
        let cmd = command_for(&exe, &[], Path::new("/"));
        assert_eq!(cmd.get_program(), "/usr/bin/tool");
        assert_eq!(cmd.get_args().count(), 0);
    }

    #[test]
    fn io_errors_map_to_bands() {
        let perm = LaunchError::from_io("x", io::Error::from(io::ErrorKind::PermissionDenied));
        assert_eq!(perm.to_shell_error().code, codes::PERMISSION_DENIED);

        let gone = LaunchError::from_io("x", io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(gone.to_shell_error().code, codes::FILE_NOT_FOUND);

        let other = LaunchError::from_io("x", io::Error::new(io::ErrorKind::Other, "boom"));
        assert_eq!(other.to_shell_error().code, codes::COMMAND_EXECUTION_FAILED);
    }

    #[test]
    fn missing_interpreter_is_not_found() {
        let exe = script("pcshell-no-such-interpreter");
        let err = launch("hello", &exe, &[], Path::new(".")).unwrap_err();
        assert!(matches!(err, LaunchError::NotFound { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn exit_codes_are_reported() {
        let exe = ResolvedExecutable {
            path: PathBuf::from("sh"),
            kind: ExecutableKind::NativeBinary,
            interpreter: None,
        };
        let args = vec!["-c".to_string(), "exit 3".to_string()];
        assert_eq!(launch("sh", &exe, &args, Path::new(".")).unwrap(), ExitReport::Code(3));

        let args = vec!["-c".to_string(), "true".to_string()];
        assert_eq!(launch("sh", &exe, &args, Path::new(".")).unwrap(), ExitReport::Success);
    }

    #[cfg(unix)]
    #[test]
    fn interrupt_stops_the_child_but_not_the_shell() {
        let exe = ResolvedExecutable {
            path: PathBuf::from("sh"),
            kind: ExecutableKind::NativeBinary,
            interpreter: None,
        };

        // The child signals its parent (this process) and then itself.
        let args = vec![
            "-c".to_string(),
            "kill -INT $PPID; kill -INT $$; sleep 1".to_string(),
        ];
        assert_eq!(
            launch("sh", &exe, &args, Path::new(".")).unwrap(),
            ExitReport::Signal(libc::SIGINT)
        );
    }
}
