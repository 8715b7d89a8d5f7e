//! engine
//!
//! The dispatcher: turns one input line into a built-in call or an external
//! process, and turns every failure into a reported error.
//!
//! # Dispatch
//!
//! ```text
//! line -> [empty? done]
//!      -> registry hit  -> parse args -> run handler
//!      -> registry miss -> resolve on PATH -> parse args -> launch
//!                                          -> unknown command + suggestions
//! ```
//!
//! # Invariants
//!
//! - [`Shell::execute`] never returns an error and never panics on user
//!   input. Parse failures, handler errors, handler panics, and launch
//!   failures all become exactly one formatted error line plus a history
//!   entry.
//! - Ctrl-C while a line runs stops the child process, never the shell.
//! - An explicit path (`./x`) is never looked up on PATH.
//! - A bare name is never run from the working directory unless PATH also
//!   finds it there.
//!
//! # Example
//!
//! ```
//! use pcshell::engine::{Outcome, Shell, ShellOptions};
//! use pcshell::registry::Registry;
//! use pcshell::ui::{Console, Verbosity};
//!
//! let registry = Registry::embedded().unwrap();
//! let console = Console::buffer(Verbosity::Normal);
//! let mut shell = Shell::new(registry, console, ShellOptions::default());
//!
//! assert_eq!(shell.execute("echo \"hello world\""), Outcome::Continue);
//! assert_eq!(shell.take_output(), "hello world\n");
//! ```

pub mod interrupt;
pub mod launch;
pub mod resolve;
pub mod suggest;

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::builtins::HandlerContext;
use crate::core::config::schema::{default_scripts, DEFAULT_PATH_CACHE_TTL_SECS};
use crate::core::errors::{codes, ShellError};
use crate::core::reporter::Reporter;
use crate::registry::params::tokenize;
use crate::registry::{Binding, CommandSpec, Registry};
use crate::ui::output::format_list;
use crate::ui::Console;

use interrupt::InterruptGuard;
use launch::ExitReport;
use resolve::{is_explicit_path, Resolution, Resolver};
use suggest::{suggest, PathIndex, MAX_SUGGESTIONS};

/// Result of executing one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    /// The `exit` built-in ran.
    Exit,
}

/// Mutable per-session state visible to handlers.
#[derive(Debug, Clone)]
pub struct Session {
    /// Working directory for path arguments and child processes.
    pub cwd: PathBuf,
    /// Values set with the `config` built-in.
    pub vars: BTreeMap<String, String>,
    pub version_file: Option<PathBuf>,
    exit_requested: bool,
}

impl Session {
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            vars: BTreeMap::new(),
            version_file: None,
            exit_requested: false,
        }
    }

    /// Resolve a user-typed path: `~` expands to home, relative paths
    /// anchor at [`Session::cwd`].
    pub fn resolve_path(&self, raw: &str) -> PathBuf {
        if raw == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        } else if let Some(rest) = raw.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        self.cwd.join(raw)
    }

    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }
}

/// Construction options for a [`Shell`].
#[derive(Debug, Clone)]
pub struct ShellOptions {
    /// Initial working directory. Defaults to the process working directory.
    pub cwd: Option<PathBuf>,
    /// Script extension to interpreter command.
    pub scripts: BTreeMap<String, String>,
    pub path_cache_ttl: Duration,
    pub version_file: Option<PathBuf>,
    /// PATH value to use instead of the environment.
    pub path: Option<OsString>,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            cwd: None,
            scripts: default_scripts(),
            path_cache_ttl: Duration::from_secs(DEFAULT_PATH_CACHE_TTL_SECS),
            version_file: None,
            path: None,
        }
    }
}

/// The command dispatcher and the state it owns.
pub struct Shell {
    registry: Registry,
    reporter: Reporter,
    console: Console,
    session: Session,
    resolver: Resolver,
    path_index: PathIndex,
}

impl Shell {
    pub fn new(registry: Registry, console: Console, options: ShellOptions) -> Self {
        let cwd = options
            .cwd
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));

        let mut session = Session::new(cwd);
        session.version_file = options.version_file;

        let script_extensions = options.scripts.keys().map(|e| e.to_ascii_lowercase()).collect();
        let mut resolver = Resolver::new(options.scripts);
        if let Some(path) = options.path {
            resolver = resolver.with_path(path);
        }

        Self {
            registry,
            reporter: Reporter::new(),
            console,
            session,
            resolver,
            path_index: PathIndex::new(options.path_cache_ttl, script_extensions),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn console(&mut self) -> &mut Console {
        &mut self.console
    }

    pub fn cwd(&self) -> &Path {
        &self.session.cwd
    }

    /// Drain captured console output (buffer consoles only).
    pub fn take_output(&mut self) -> String {
        self.console.take_output()
    }

    /// Execute one input line.
    pub fn execute(&mut self, line: &str) -> Outcome {
        let line = line.trim();
        if line.is_empty() {
            return Outcome::Continue;
        }

        let (name, rest) = match line.find(char::is_whitespace) {
            Some(i) => (&line[..i], &line[i..]),
            None => (line, ""),
        };

        let _guard = InterruptGuard::ignore();
        match self.registry.lookup(name).cloned() {
            Some(spec) => self.run_builtin(&spec, rest),
            None => self.run_external(name, rest),
        }

        if self.session.exit_requested() {
            Outcome::Exit
        } else {
            Outcome::Continue
        }
    }

    /// Record `err` in the history and print its formatted line.
    pub fn report(&mut self, err: &ShellError) {
        let record = self.reporter.report_error(err);
        self.console.error(record);
    }

    fn run_builtin(&mut self, spec: &CommandSpec, rest: &str) {
        let builtin = match &spec.binding {
            Binding::Builtin(b) => *b,
            Binding::Unbound(handler) => {
                self.report(
                    &ShellError::new(
                        codes::COMMAND_NOT_IMPLEMENTED,
                        format!("handler '{}' is not implemented", handler),
                    )
                    .with_details(format!("command '{}' cannot run", spec.name)),
                );
                return;
            }
        };

        let args = match spec.params.parse(rest) {
            Ok(args) => args,
            Err(e) => {
                self.report(
                    &ShellError::new(codes::INVALID_ARGUMENT_FORMAT, "argument parse error")
                        .with_details(e.to_string()),
                );
                self.console.info(format!("usage: {}", spec.usage()));
                return;
            }
        };

        tracing::debug!(command = %spec.name, args = args.len(), "dispatching built-in");

        let result = {
            let mut ctx = HandlerContext {
                registry: &self.registry,
                reporter: &mut self.reporter,
                console: &mut self.console,
                session: &mut self.session,
            };
            panic::catch_unwind(AssertUnwindSafe(|| builtin.run(&mut ctx, &args)))
        };

        match result {
            Ok(Ok(())) => {}
            Ok(Err(err)) => match err.downcast_ref::<ShellError>() {
                Some(structured) => {
                    let structured = structured.clone();
                    self.report(&structured);
                }
                None => {
                    tracing::warn!(command = %spec.name, error = %format!("{:#}", err), "unstructured handler failure");
                    self.report(
                        &ShellError::new(codes::COMMAND_EXECUTION_FAILED, "command execution failed")
                            .with_details(format!("'{}': {:#}", spec.name, err)),
                    );
                }
            },
            Err(payload) => {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "handler panicked".to_string());
                tracing::warn!(command = %spec.name, reason = %reason, "handler panicked");
                self.report(
                    &ShellError::new(codes::COMMAND_EXECUTION_FAILED, "command execution failed")
                        .with_details(format!("'{}': {}", spec.name, reason)),
                );
            }
        }
    }

    fn run_external(&mut self, name: &str, rest: &str) {
        match self.resolver.resolve(name, &self.session.cwd) {
            Resolution::Found(exe) => {
                let args = match tokenize(rest) {
                    Ok(args) => args,
                    Err(e) => {
                        self.report(
                            &ShellError::new(codes::INVALID_ARGUMENT_FORMAT, "argument parse error")
                                .with_details(e.to_string()),
                        );
                        return;
                    }
                };
                match launch::launch(name, &exe, &args, &self.session.cwd) {
                    Ok(ExitReport::Success) => {}
                    Ok(ExitReport::Code(code)) => {
                        self.console.info(format!("'{}' exited with code {}", name, code));
                    }
                    Ok(ExitReport::Signal(signal)) => {
                        self.console
                            .info(format!("'{}' terminated by signal {}", name, signal));
                    }
                    Err(e) => self.report(&e.to_shell_error()),
                }
            }
            Resolution::NotExecutable(path) => {
                self.report(
                    &ShellError::new(codes::PERMISSION_DENIED, format!("cannot run '{}'", name))
                        .with_details(format!("{} is not executable", path.display())),
                );
            }
            Resolution::NotFound if is_explicit_path(name) => {
                self.report(&ShellError::new(
                    codes::FILE_NOT_FOUND,
                    format!("file not found: {}", name),
                ));
            }
            Resolution::NotFound => self.unknown_command(name, false),
            Resolution::ExistsButNotOnPath(_) => self.unknown_command(name, true),
        }
    }

    fn unknown_command(&mut self, name: &str, exists_here: bool) {
        self.report(
            &ShellError::new(codes::COMMAND_NOT_FOUND, format!("unknown command: {}", name))
                .with_details("use 'help' to list available commands"),
        );

        let path_names: Vec<String> = match self.resolver.path_value() {
            Some(value) => self.path_index.names(&value, &self.session.cwd).to_vec(),
            None => Vec::new(),
        };
        let pool = self
            .registry
            .names()
            .chain(path_names.iter().map(String::as_str));
        let suggestions = suggest(name, pool);

        if !suggestions.is_empty() {
            let names: Vec<&str> = suggestions
                .iter()
                .take(MAX_SUGGESTIONS)
                .map(|s| s.name.as_str())
                .collect();
            self.console.line("did you mean:");
            self.console.line(format_list(&names, "    "));
        }

        if exists_here {
            self.console.info(format!(
                "'{}' exists in the current directory but is not on PATH; run it as ./{}",
                name, name
            ));
        }
    }
}
