//! builtins
//!
//! The static handler table.
//!
//! Every handler identifier a declaration table may name is a [`Builtin`]
//! variant. Binding happens once, when the registry loads, so dispatch is a
//! `match` on the variant and never a by-name lookup.
//!
//! # Handler Contract
//!
//! ```text
//! fn(&mut HandlerContext, &[String]) -> anyhow::Result<()>
//! ```
//!
//! Tokens arrive exactly as the argument parser produced them. A handler
//! that needs numbers or flags parses its own tokens. To surface a specific
//! error code, return a [`ShellError`] (it converts into `anyhow::Error`);
//! any other error is reported by the dispatcher as an execution failure.
//!
//! [`ShellError`]: crate::core::errors::ShellError

mod basic;
mod fs;

use crate::core::reporter::Reporter;
use crate::engine::Session;
use crate::registry::Registry;
use crate::ui::Console;

/// Signature shared by every built-in.
pub type HandlerFn = fn(&mut HandlerContext<'_>, &[String]) -> anyhow::Result<()>;

/// What a handler can see and touch while it runs.
pub struct HandlerContext<'a> {
    pub registry: &'a Registry,
    pub reporter: &'a mut Reporter,
    pub console: &'a mut Console,
    pub session: &'a mut Session,
}

/// Built-in command handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Help,
    Echo,
    Add,
    Config,
    Version,
    Clear,
    Exit,
    Ls,
    Cd,
    Pwd,
    Copy,
    Grep,
    Test,
    Errors,
}

impl Builtin {
    pub const ALL: [Builtin; 14] = [
        Builtin::Help,
        Builtin::Echo,
        Builtin::Add,
        Builtin::Config,
        Builtin::Version,
        Builtin::Clear,
        Builtin::Exit,
        Builtin::Ls,
        Builtin::Cd,
        Builtin::Pwd,
        Builtin::Copy,
        Builtin::Grep,
        Builtin::Test,
        Builtin::Errors,
    ];

    /// Bind a handler identifier from a declaration table.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|b| b.name() == name)
    }

    /// The handler identifier this variant binds to.
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Help => "help",
            Builtin::Echo => "echo",
            Builtin::Add => "add",
            Builtin::Config => "config",
            Builtin::Version => "version",
            Builtin::Clear => "clear",
            Builtin::Exit => "exit",
            Builtin::Ls => "ls",
            Builtin::Cd => "cd",
            Builtin::Pwd => "pwd",
            Builtin::Copy => "copy_func",
            Builtin::Grep => "grep",
            Builtin::Test => "test_func",
            Builtin::Errors => "errors",
        }
    }

    pub fn handler(self) -> HandlerFn {
        match self {
            Builtin::Help => basic::help,
            Builtin::Echo => basic::echo,
            Builtin::Add => basic::add,
            Builtin::Config => basic::config,
            Builtin::Version => basic::version,
            Builtin::Clear => basic::clear,
            Builtin::Exit => basic::exit,
            Builtin::Ls => fs::ls,
            Builtin::Cd => fs::cd,
            Builtin::Pwd => fs::pwd,
            Builtin::Copy => fs::copy,
            Builtin::Grep => fs::grep,
            Builtin::Test => basic::test,
            Builtin::Errors => basic::errors,
        }
    }

    /// Run the handler.
    pub fn run(self, ctx: &mut HandlerContext<'_>, args: &[String]) -> anyhow::Result<()> {
        (self.handler())(ctx, args)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for builtin in Builtin::ALL {
            assert_eq!(Builtin::from_name(builtin.name()), Some(builtin));
        }
    }

    #[test]
    fn unknown_name_is_unbound() {
        assert_eq!(Builtin::from_name("copy"), None);
        assert_eq!(Builtin::from_name(""), None);
    }
}
