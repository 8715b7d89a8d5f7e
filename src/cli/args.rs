//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Flags
//!
//! - `--config <path>`: Configuration file to load
//! - `--commands <path>`: Command declaration table (overrides config)
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: No banner, no informational notices
//! - `-c <line>`: Execute one line and exit
//! - `--completions <shell>`: Print a completion script and exit

use clap::Parser;
use std::path::PathBuf;

/// pc - an interactive command shell
#[derive(Parser, Debug)]
#[command(name = "pc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (default: search standard locations)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Command declaration table to load instead of the built-in one
    #[arg(long, value_name = "PATH")]
    pub commands: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long)]
    pub quiet: bool,

    /// Execute a single line and exit
    #[arg(short = 'c', long = "command", value_name = "LINE")]
    pub command: Option<String>,

    /// Print a shell completion script and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_single_line_mode() {
        let cli = Cli::try_parse_from(["pc", "-q", "-c", "echo hi"]).unwrap();
        assert!(cli.quiet);
        assert_eq!(cli.command.as_deref(), Some("echo hi"));
    }

    #[test]
    fn parses_completions() {
        let cli = Cli::try_parse_from(["pc", "--completions", "zsh"]).unwrap();
        assert_eq!(cli.completions, Some(Shell::Zsh));
    }
}
