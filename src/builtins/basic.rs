//! builtins::basic
//!
//! Session and informational built-ins: help, echo, add, config, version,
//! clear, exit, test, errors.

use anyhow::Result;

use super::HandlerContext;
use crate::core::errors::{codes, ShellError};
use crate::core::version::VersionInfo;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

fn too_many(command: &str, max: usize, got: usize) -> ShellError {
    ShellError::new(codes::TOO_MANY_ARGUMENTS, format!("too many arguments for '{}'", command))
        .with_details(format!("expected at most {}, got {}", max, got))
}

pub(super) fn help(ctx: &mut HandlerContext<'_>, _args: &[String]) -> Result<()> {
    ctx.console.line("available commands:");
    for spec in ctx.registry.all() {
        ctx.console.line(format!("  {} - {}", spec.usage(), spec.help));
    }
    Ok(())
}

pub(super) fn echo(ctx: &mut HandlerContext<'_>, args: &[String]) -> Result<()> {
    ctx.console.line(args.join(" "));
    Ok(())
}

pub(super) fn add(ctx: &mut HandlerContext<'_>, args: &[String]) -> Result<()> {
    let (a_raw, b_raw) = match args {
        [a, b] => (a, b),
        [] | [_] => {
            return Err(ShellError::new(codes::MISSING_ARGUMENT, "add needs two numbers").into())
        }
        _ => return Err(too_many("add", 2, args.len()).into()),
    };

    let parse = |token: &str| -> Result<f64, ShellError> {
        token.parse::<f64>().map_err(|_| {
            ShellError::new(codes::INVALID_ARGUMENT_TYPE, "argument type error")
                .with_details(format!("'{}' is not a number", token))
        })
    };

    let a = parse(a_raw)?;
    let b = parse(b_raw)?;
    ctx.console.line(format!("{} + {} = {}", a_raw, b_raw, a + b));
    Ok(())
}

pub(super) fn config(ctx: &mut HandlerContext<'_>, args: &[String]) -> Result<()> {
    match args {
        [key] => {
            let value = ctx.session.vars.get(key).map(String::as_str).unwrap_or("(unset)");
            ctx.console.line(format!("{} = {}", key, value));
        }
        [key, value] => {
            ctx.session.vars.insert(key.clone(), value.clone());
            ctx.console.line(format!("{} = {}", key, value));
        }
        [] => return Err(ShellError::new(codes::MISSING_ARGUMENT, "config needs a key").into()),
        _ => return Err(too_many("config", 2, args.len()).into()),
    }
    Ok(())
}

pub(super) fn version(ctx: &mut HandlerContext<'_>, _args: &[String]) -> Result<()> {
    let info = VersionInfo::resolve(ctx.session.version_file.as_deref()).map_err(|e| {
        ShellError::new(codes::INITIALIZATION_FAILED, "failed to read version information")
            .with_details(e.to_string())
    })?;

    ctx.console.line(format!("version: {}", info.version));
    ctx.console.line(format!("name: {}", info.name));
    Ok(())
}

pub(super) fn clear(ctx: &mut HandlerContext<'_>, _args: &[String]) -> Result<()> {
    ctx.console.raw(CLEAR_SCREEN);
    Ok(())
}

pub(super) fn exit(ctx: &mut HandlerContext<'_>, _args: &[String]) -> Result<()> {
    ctx.console.line("exiting...");
    ctx.session.request_exit();
    Ok(())
}

/// Tokens bind to slots by position only; a second token always fills
/// `optional1`.
pub(super) fn test(ctx: &mut HandlerContext<'_>, args: &[String]) -> Result<()> {
    const SLOTS: [&str; 3] = ["required1", "optional1", "required2"];

    if args.len() > SLOTS.len() {
        return Err(too_many("test", SLOTS.len(), args.len()).into());
    }

    for (slot, value) in SLOTS.iter().zip(args) {
        ctx.console.line(format!("{}: {}", slot, value));
    }
    Ok(())
}

pub(super) fn errors(ctx: &mut HandlerContext<'_>, args: &[String]) -> Result<()> {
    match args {
        [] => {
            let history = ctx.reporter.history();
            if history.is_empty() {
                ctx.console.line("no errors recorded");
            }
            for record in history {
                ctx.console.line(format!(
                    "{} {}",
                    record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    record
                ));
            }
        }
        [action] if action == "clear" => {
            ctx.reporter.clear();
            ctx.console.line(format!(
                "error history cleared ({} reported in total)",
                ctx.reporter.count()
            ));
        }
        [action] => {
            return Err(ShellError::new(
                codes::INVALID_OPTION_VALUE,
                format!("unknown action '{}'", action),
            )
            .with_details("use 'errors' or 'errors clear'")
            .into());
        }
        _ => return Err(too_many("errors", 1, args.len()).into()),
    }
    Ok(())
}
