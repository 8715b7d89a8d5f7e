//! cli
//!
//! Command-line interface layer for pc.
//!
//! # Responsibilities
//!
//! - Parse process arguments and global flags
//! - Initialize logging and load configuration (a broken or missing file
//!   is reported and replaced by defaults)
//! - Load the command registry (the one fatal startup step)
//! - Hand input lines to the [`crate::engine`] dispatcher
//!
//! # Architecture
//!
//! The CLI layer is thin. Everything a line does happens inside
//! [`Shell::execute`]; this module only decides where lines come from: a
//! single `-c` line, an interactive editor, or piped stdin.

pub mod args;
pub mod repl;

pub use args::{Cli, Shell as CompletionShell};

use std::io::IsTerminal;

use anyhow::{anyhow, Context, Result};
use clap::CommandFactory;
use clap_complete::{generate, shells};
use tracing_subscriber::EnvFilter;

use crate::core::config::Config;
use crate::core::version::VersionInfo;
use crate::engine::{Shell, ShellOptions};
use crate::registry::Registry;
use crate::ui::{Console, Verbosity};

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "PCSHELL_LOG";

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    if let Some(shell) = cli.completions {
        print_completions(shell);
        return Ok(());
    }

    init_logging(cli.debug);

    let (config, config_error) = match Config::load(cli.config.as_deref()) {
        Ok(config) => (config, None),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring configuration");
            (Config::default(), Some(e))
        }
    };
    if let Some(path) = config.loaded_from() {
        tracing::debug!(path = %path.display(), "loaded configuration");
    }

    let commands = cli.commands.as_deref().or_else(|| config.commands());
    let registry = Registry::resolve(commands).map_err(|e| anyhow!(e.to_shell_error()))?;

    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);
    let options = ShellOptions {
        cwd: Some(std::env::current_dir().context("failed to read current directory")?),
        scripts: config.scripts(),
        path_cache_ttl: config.path_cache_ttl(),
        version_file: config.version_file().map(|p| p.to_path_buf()),
        path: None,
    };
    let mut shell = Shell::new(registry, Console::stdout(verbosity), options);
    if let Some(e) = config_error {
        shell.report(&e.to_shell_error());
    }

    if let Some(line) = cli.command {
        shell.execute(&line);
        return Ok(());
    }

    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        if verbosity != Verbosity::Quiet {
            print_banner(&mut shell, &config);
        }
        let history = if config.history() {
            config.history_path()
        } else {
            None
        };
        repl::run_interactive(&mut shell, history.as_deref())
    } else {
        repl::run_lines(&mut shell, stdin.lock())
    }
}

/// Filter order: `PCSHELL_LOG`, then `--debug`, then warnings only.
fn init_logging(debug: bool) {
    let fallback = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn print_banner(shell: &mut Shell, config: &Config) {
    let info = VersionInfo::resolve(config.version_file()).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "falling back to built-in version information");
        VersionInfo::current()
    });
    let console = shell.console();
    console.line(format!("{} {}", info.name, info.version));
    console.line("type 'help' to list commands, 'exit' to quit");
}

/// Generate shell completion scripts.
fn print_completions(shell: CompletionShell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    let mut out = std::io::stdout();

    match shell {
        CompletionShell::Bash => generate(shells::Bash, &mut cmd, &name, &mut out),
        CompletionShell::Zsh => generate(shells::Zsh, &mut cmd, &name, &mut out),
        CompletionShell::Fish => generate(shells::Fish, &mut cmd, &name, &mut out),
        CompletionShell::PowerShell => generate(shells::PowerShell, &mut cmd, &name, &mut out),
    }
}
