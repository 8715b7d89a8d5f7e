//! cli::repl
//!
//! Read loops feeding lines to the dispatcher.
//!
//! - [`run_interactive`]: line editor with history; Ctrl-C abandons the
//!   current line only, Ctrl-D ends the session.
//! - [`run_lines`]: plain line reader for piped input, no prompt.

use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::engine::{Outcome, Shell};

fn prompt(shell: &Shell) -> String {
    format!("{}> ", shell.cwd().display())
}

/// Run the interactive loop until EOF or `exit`.
pub fn run_interactive(shell: &mut Shell, history: Option<&Path>) -> Result<()> {
    let mut rl = DefaultEditor::new().context("failed to initialize line editor")?;

    if let Some(path) = history {
        if path.exists() {
            if let Err(e) = rl.load_history(path) {
                tracing::warn!(path = %path.display(), error = %e, "could not load history");
            }
        }
    }

    loop {
        match rl.readline(&prompt(shell)) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }
                if shell.execute(&line) == Outcome::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                shell.console().line("^C");
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                save_history(&mut rl, history);
                return Err(e).context("failed to read input");
            }
        }
    }

    save_history(&mut rl, history);
    Ok(())
}

fn save_history(rl: &mut DefaultEditor, history: Option<&Path>) {
    let Some(path) = history else { return };

    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::warn!(path = %parent.display(), error = %e, "could not create history directory");
            return;
        }
    }
    if let Err(e) = rl.save_history(path) {
        tracing::warn!(path = %path.display(), error = %e, "could not save history");
    }
}

/// Execute each line of `input` until EOF or `exit`.
pub fn run_lines<R: BufRead>(shell: &mut Shell, input: R) -> Result<()> {
    for line in input.lines() {
        let line = line.context("failed to read input")?;
        if shell.execute(&line) == Outcome::Exit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ShellOptions;
    use crate::registry::Registry;
    use crate::ui::{Console, Verbosity};
    use std::ffi::OsString;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn shell(dir: &Path) -> Shell {
        let options = ShellOptions {
            cwd: Some(dir.to_path_buf()),
            path: Some(OsString::new()),
            ..ShellOptions::default()
        };
        Shell::new(
            Registry::embedded().unwrap(),
            Console::buffer(Verbosity::Normal),
            options,
        )
    }

    #[test]
    fn lines_run_until_exit() {
        let dir = TempDir::new().unwrap();
        let mut shell = shell(dir.path());
        let input = Cursor::new("echo one\n\nexit\necho never\n");

        run_lines(&mut shell, input).unwrap();
        assert_eq!(shell.take_output(), "one\nexiting...\n");
    }

    #[test]
    fn errors_do_not_stop_the_loop() {
        let dir = TempDir::new().unwrap();
        let mut shell = shell(dir.path());
        let input = Cursor::new("nosuchcmd\necho after\n");

        run_lines(&mut shell, input).unwrap();
        let out = shell.take_output();
        assert!(out.starts_with("[200] COMMAND: unknown command: nosuchcmd"));
        assert!(out.ends_with("after\n"));
    }

    #[test]
    fn prompt_shows_cwd() {
        let dir = TempDir::new().unwrap();
        let shell = shell(dir.path());
        assert_eq!(prompt(&shell), format!("{}> ", dir.path().display()));
    }
}
