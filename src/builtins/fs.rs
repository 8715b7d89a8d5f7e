//! builtins::fs
//!
//! Filesystem built-ins: ls, cd, pwd, copy, grep.
//!
//! Relative paths are resolved against the shell's working directory
//! ([`Session::cwd`]), never the process working directory.
//!
//! [`Session::cwd`]: crate::engine::Session::cwd

use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

use anyhow::Result;
use chrono::{DateTime, Local};

use super::HandlerContext;
use crate::core::errors::{codes, ShellError};

const TERMINAL_WIDTH: usize = 80;

const LS_USAGE: &str = "\
usage: ls [options]... [path]...
list directory contents

options:
  -l            use a long listing format
  -a            show entries starting with '.'
  -r            reverse the sort order
  -t            sort by modification time, newest first
  -S            sort by file size, largest first
  --help        show this help";

#[derive(Debug, Default, Clone, Copy)]
struct LsFlags {
    long: bool,
    all: bool,
    reverse: bool,
    by_time: bool,
    by_size: bool,
}

#[derive(Debug)]
struct Entry {
    name: String,
    is_dir: bool,
    size: u64,
    modified: Option<SystemTime>,
    /// Permission bits, `None` if metadata could not be read.
    mode: Option<u32>,
}

impl Entry {
    fn display_name(&self) -> String {
        if self.is_dir {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }
}

#[cfg(unix)]
fn mode_of(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode()
}

#[cfg(not(unix))]
fn mode_of(metadata: &fs::Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o666
    }
}

fn permission_string(mode: u32) -> String {
    const BITS: [(u32, char); 9] = [
        (0o400, 'r'),
        (0o200, 'w'),
        (0o100, 'x'),
        (0o040, 'r'),
        (0o020, 'w'),
        (0o010, 'x'),
        (0o004, 'r'),
        (0o002, 'w'),
        (0o001, 'x'),
    ];
    BITS.iter()
        .map(|&(bit, c)| if mode & bit != 0 { c } else { '-' })
        .collect()
}

fn human_size(size: u64) -> String {
    const KB: f64 = 1024.0;
    let s = size as f64;
    if s < KB {
        size.to_string()
    } else if s < KB * KB {
        format!("{:.1}K", s / KB)
    } else if s < KB * KB * KB {
        format!("{:.1}M", s / (KB * KB))
    } else {
        format!("{:.1}G", s / (KB * KB * KB))
    }
}

fn parse_ls_args(args: &[String]) -> Result<Option<(LsFlags, Vec<String>)>, ShellError> {
    let mut flags = LsFlags::default();
    let mut paths = Vec::new();

    for arg in args {
        if arg == "--help" {
            return Ok(None);
        } else if arg.starts_with("--") {
            return Err(ShellError::new(
                codes::UNKNOWN_OPTION,
                format!("unrecognized option '{}'", arg),
            )
            .with_details("use 'ls --help' for usage"));
        } else if arg.len() > 1 && arg.starts_with('-') {
            for c in arg.chars().skip(1) {
                match c {
                    'l' => flags.long = true,
                    'a' => flags.all = true,
                    'r' => flags.reverse = true,
                    't' => flags.by_time = true,
                    'S' => flags.by_size = true,
                    other => {
                        return Err(ShellError::new(
                            codes::INVALID_OPTION_VALUE,
                            format!("invalid option -- '{}'", other),
                        )
                        .with_details("use 'ls --help' for usage"))
                    }
                }
            }
        } else {
            paths.push(arg.clone());
        }
    }

    if paths.is_empty() {
        paths.push(".".to_string());
    }
    Ok(Some((flags, paths)))
}

fn read_entries(dir: &Path, shown_as: &str, flags: LsFlags) -> Result<Vec<Entry>, ShellError> {
    let read = fs::read_dir(dir).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => {
            ShellError::new(codes::DIRECTORY_NOT_FOUND, format!("cannot access '{}'", shown_as))
                .with_details("no such file or directory")
        }
        io::ErrorKind::PermissionDenied => ShellError::new(
            codes::DIRECTORY_ACCESS_DENIED,
            format!("cannot open directory '{}'", shown_as),
        )
        .with_details("permission denied"),
        _ => ShellError::new(codes::FILE_ACCESS_DENIED, format!("cannot access '{}'", shown_as))
            .with_details(e.to_string()),
    })?;

    let mut entries = Vec::new();
    for dirent in read.filter_map(|r| r.ok()) {
        let name = dirent.file_name().to_string_lossy().into_owned();
        if !flags.all && name.starts_with('.') {
            continue;
        }

        let path = dirent.path();
        let entry = match fs::metadata(&path) {
            Ok(meta) => Entry {
                name,
                is_dir: meta.is_dir(),
                size: meta.len(),
                modified: meta.modified().ok(),
                mode: Some(mode_of(&meta)),
            },
            Err(_) => Entry {
                name,
                is_dir: path.is_dir(),
                size: 0,
                modified: None,
                mode: None,
            },
        };
        entries.push(entry);
    }

    sort_entries(&mut entries, flags);
    Ok(entries)
}

fn sort_entries(entries: &mut [Entry], flags: LsFlags) {
    if flags.by_time {
        entries.sort_by(|a, b| b.modified.cmp(&a.modified));
    } else if flags.by_size {
        entries.sort_by(|a, b| b.size.cmp(&a.size));
    } else {
        entries.sort_by(|a, b| {
            (!a.is_dir, a.name.to_lowercase()).cmp(&(!b.is_dir, b.name.to_lowercase()))
        });
    }
    if flags.reverse {
        entries.reverse();
    }
}

fn render_long(ctx: &mut HandlerContext<'_>, entries: &[Entry]) {
    ctx.console.line(format!("total: {}", entries.len()));

    for entry in entries {
        let name = entry.display_name();
        match entry.mode {
            Some(mode) => {
                let kind = if entry.is_dir { 'd' } else { '-' };
                let time = entry
                    .modified
                    .map(|t| DateTime::<Local>::from(t).format("%b %d %H:%M").to_string())
                    .unwrap_or_else(|| "?".to_string());
                ctx.console.line(format!(
                    "{}{} {:>8} {:>12} {}",
                    kind,
                    permission_string(mode),
                    human_size(entry.size),
                    time,
                    name
                ));
            }
            None => {
                ctx.reporter.report(
                    codes::FILE_READ_ERROR,
                    &format!("cannot read file information: {}", name),
                    Some("permission denied or file system error"),
                );
                ctx.console
                    .line(format!("{} {:>8} {:>12} {}", "?".repeat(10), "?", "?", name));
            }
        }
    }
}

/// Directories first, then files, packed into rows of equal-width columns.
fn render_grid(ctx: &mut HandlerContext<'_>, entries: &[Entry]) {
    let names: Vec<String> = entries
        .iter()
        .filter(|e| e.is_dir)
        .chain(entries.iter().filter(|e| !e.is_dir))
        .map(Entry::display_name)
        .collect();

    let Some(max_len) = names.iter().map(|n| n.chars().count()).max() else {
        return;
    };
    let width = max_len + 2;
    let cols = (TERMINAL_WIDTH / width).max(1);

    for row in names.chunks(cols) {
        let line: String = row.iter().map(|n| format!("{:<width$}", n, width = width)).collect();
        ctx.console.line(line.trim_end());
    }
}

pub(super) fn ls(ctx: &mut HandlerContext<'_>, args: &[String]) -> Result<()> {
    let Some((flags, paths)) = parse_ls_args(args)? else {
        ctx.console.line(LS_USAGE);
        return Ok(());
    };

    let several = paths.len() > 1;
    for (i, shown_as) in paths.iter().enumerate() {
        if several {
            if i > 0 {
                ctx.console.line("");
            }
            ctx.console.line(format!("{}:", shown_as));
        }

        let dir = ctx.session.resolve_path(shown_as);
        let entries = read_entries(&dir, shown_as, flags)?;
        if flags.long {
            render_long(ctx, &entries);
        } else {
            render_grid(ctx, &entries);
        }
    }
    Ok(())
}

pub(super) fn cd(ctx: &mut HandlerContext<'_>, args: &[String]) -> Result<()> {
    let target = match args {
        [] => dirs::home_dir().ok_or_else(|| {
            ShellError::new(codes::ENVIRONMENT_ERROR, "cannot determine home directory")
        })?,
        [path] => ctx.session.resolve_path(path),
        _ => {
            return Err(ShellError::new(codes::TOO_MANY_ARGUMENTS, "cd takes one path")
                .with_details(format!("got {} arguments", args.len()))
                .into())
        }
    };
    let shown_as = args.first().map(String::as_str).unwrap_or("~");

    let meta = fs::metadata(&target).map_err(|e| match e.kind() {
        io::ErrorKind::PermissionDenied => ShellError::new(
            codes::DIRECTORY_ACCESS_DENIED,
            format!("cannot enter '{}'", shown_as),
        )
        .with_details("permission denied"),
        _ => ShellError::new(
            codes::DIRECTORY_NOT_FOUND,
            format!("no such directory: {}", shown_as),
        ),
    })?;

    if !meta.is_dir() {
        return Err(ShellError::new(
            codes::FILE_NOT_DIRECTORY,
            format!("not a directory: {}", shown_as),
        )
        .into());
    }

    let canonical = target.canonicalize().map_err(|e| {
        ShellError::new(codes::DIRECTORY_ACCESS_DENIED, format!("cannot enter '{}'", shown_as))
            .with_details(e.to_string())
    })?;

    tracing::debug!(cwd = %canonical.display(), "changed directory");
    ctx.session.cwd = canonical;
    Ok(())
}

pub(super) fn pwd(ctx: &mut HandlerContext<'_>, _args: &[String]) -> Result<()> {
    let cwd = ctx.session.cwd.display().to_string();
    ctx.console.line(cwd);
    Ok(())
}

/// Both slots are syntactically optional; each missing one is its own error.
pub(super) fn copy(ctx: &mut HandlerContext<'_>, args: &[String]) -> Result<()> {
    let (source, destination) = match args {
        [] => {
            return Err(ShellError::new(
                codes::MISSING_ARGUMENT,
                "source and destination required",
            )
            .with_details("usage: copy <source> <destination>")
            .into())
        }
        [_] => {
            return Err(ShellError::new(codes::MISSING_ARGUMENT, "destination required")
                .with_details("usage: copy <source> <destination>")
                .into())
        }
        [s, d] => (s, d),
        _ => {
            return Err(ShellError::new(codes::TOO_MANY_ARGUMENTS, "copy takes two paths")
                .with_details(format!("got {} arguments", args.len()))
                .into())
        }
    };

    let src = ctx.session.resolve_path(source);
    let mut dest = ctx.session.resolve_path(destination);

    if src.is_dir() {
        return Err(ShellError::new(
            codes::FILE_COPY_ERROR,
            format!("cannot copy '{}'", source),
        )
        .with_details("source is a directory")
        .into());
    }
    if dest.is_dir() {
        if let Some(file_name) = src.file_name() {
            dest = dest.join(file_name);
        }
    }

    let bytes = fs::copy(&src, &dest).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound if !src.exists() => {
            ShellError::new(codes::FILE_NOT_FOUND, format!("file not found: {}", source))
        }
        io::ErrorKind::PermissionDenied => ShellError::new(
            codes::FILE_ACCESS_DENIED,
            format!("cannot copy '{}' to '{}'", source, destination),
        )
        .with_details("permission denied"),
        _ => ShellError::new(
            codes::FILE_COPY_ERROR,
            format!("cannot copy '{}' to '{}'", source, destination),
        )
        .with_details(e.to_string()),
    })?;

    ctx.console
        .line(format!("copied {} -> {} ({} bytes)", source, dest.display(), bytes));
    Ok(())
}

pub(super) fn grep(ctx: &mut HandlerContext<'_>, args: &[String]) -> Result<()> {
    let Some((pattern, files)) = args.split_first().filter(|(_, f)| !f.is_empty()) else {
        return Err(ShellError::new(codes::MISSING_ARGUMENT, "grep needs a pattern and a file")
            .into());
    };

    let prefix = files.len() > 1;
    for file in files {
        let path = ctx.session.resolve_path(file);
        let contents = fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                ShellError::new(codes::FILE_NOT_FOUND, format!("file not found: {}", file))
            }
            _ => ShellError::new(codes::FILE_READ_ERROR, format!("cannot read '{}'", file))
                .with_details(e.to_string()),
        })?;

        for line in contents.lines().filter(|l| l.contains(pattern.as_str())) {
            if prefix {
                ctx.console.line(format!("{}:{}", file, line));
            } else {
                ctx.console.line(line);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{code_of, Harness};
    use super::super::Builtin;
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Harness) {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("Beta")).unwrap();
        fs::create_dir(dir.path().join("alpha")).unwrap();
        fs::write(dir.path().join("zeta.txt"), "one\ntwo words\n").unwrap();
        fs::write(dir.path().join("Gamma.txt"), "two\n").unwrap();
        fs::write(dir.path().join(".hidden"), "").unwrap();
        let h = Harness::new(dir.path());
        (dir, h)
    }

    #[test]
    fn permission_string_formats_bits() {
        assert_eq!(permission_string(0o755), "rwxr-xr-x");
        assert_eq!(permission_string(0o640), "rw-r-----");
    }

    #[test]
    fn human_size_units() {
        assert_eq!(human_size(512), "512");
        assert_eq!(human_size(2048), "2.0K");
        assert_eq!(human_size(3 * 1024 * 1024), "3.0M");
    }

    #[test]
    fn ls_lists_dirs_first_case_insensitive() {
        let (_dir, mut h) = setup();
        h.run(Builtin::Ls, &[]).unwrap();
        let out = h.output();
        let names: Vec<_> = out.split_whitespace().collect();
        assert_eq!(names, vec!["alpha/", "Beta/", "Gamma.txt", "zeta.txt"]);
    }

    #[test]
    fn ls_all_shows_hidden() {
        let (_dir, mut h) = setup();
        h.run(Builtin::Ls, &["-a"]).unwrap();
        assert!(h.output().contains(".hidden"));
    }

    #[test]
    fn ls_combined_long_flags() {
        let (_dir, mut h) = setup();
        h.run(Builtin::Ls, &["-lr"]).unwrap();
        let out = h.output();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "total: 4");
        assert!(lines[1].ends_with("zeta.txt"));
        assert!(lines[4].starts_with('d') && lines[4].ends_with("alpha/"));
    }

    #[test]
    fn ls_option_errors() {
        let (_dir, mut h) = setup();
        let err = h.run(Builtin::Ls, &["--bogus"]).unwrap_err();
        assert_eq!(code_of(&err), Some(codes::UNKNOWN_OPTION.value()));

        let err = h.run(Builtin::Ls, &["-lq"]).unwrap_err();
        assert_eq!(code_of(&err), Some(codes::INVALID_OPTION_VALUE.value()));
    }

    #[test]
    fn ls_missing_directory() {
        let (_dir, mut h) = setup();
        let err = h.run(Builtin::Ls, &["nope"]).unwrap_err();
        assert_eq!(code_of(&err), Some(codes::DIRECTORY_NOT_FOUND.value()));
    }

    #[test]
    fn ls_help_prints_usage() {
        let (_dir, mut h) = setup();
        h.run(Builtin::Ls, &["--help"]).unwrap();
        assert!(h.output().starts_with("usage: ls"));
    }

    #[test]
    fn cd_and_pwd() {
        let (dir, mut h) = setup();
        h.run(Builtin::Cd, &["alpha"]).unwrap();
        h.run(Builtin::Pwd, &[]).unwrap();
        let expected = dir.path().join("alpha").canonicalize().unwrap();
        assert_eq!(h.output().trim_end(), expected.display().to_string());
    }

    #[test]
    fn cd_errors() {
        let (_dir, mut h) = setup();
        let err = h.run(Builtin::Cd, &["missing"]).unwrap_err();
        assert_eq!(code_of(&err), Some(codes::DIRECTORY_NOT_FOUND.value()));

        let err = h.run(Builtin::Cd, &["zeta.txt"]).unwrap_err();
        assert_eq!(code_of(&err), Some(codes::FILE_NOT_DIRECTORY.value()));
    }

    #[test]
    fn copy_missing_slots() {
        let (_dir, mut h) = setup();
        let err = h.run(Builtin::Copy, &[]).unwrap_err();
        assert_eq!(code_of(&err), Some(codes::MISSING_ARGUMENT.value()));
        let err = h.run(Builtin::Copy, &["zeta.txt"]).unwrap_err();
        assert_eq!(code_of(&err), Some(codes::MISSING_ARGUMENT.value()));
    }

    #[test]
    fn copy_into_directory() {
        let (dir, mut h) = setup();
        h.run(Builtin::Copy, &["zeta.txt", "alpha"]).unwrap();
        let copied = fs::read_to_string(dir.path().join("alpha").join("zeta.txt")).unwrap();
        assert_eq!(copied, "one\ntwo words\n");
        assert!(h.output().starts_with("copied zeta.txt -> "));
    }

    #[test]
    fn copy_missing_source() {
        let (_dir, mut h) = setup();
        let err = h.run(Builtin::Copy, &["ghost.txt", "out.txt"]).unwrap_err();
        assert_eq!(code_of(&err), Some(codes::FILE_NOT_FOUND.value()));
    }

    #[test]
    fn grep_single_and_multiple_files() {
        let (_dir, mut h) = setup();
        h.run(Builtin::Grep, &["two words", "zeta.txt"]).unwrap();
        assert_eq!(h.output(), "two words\n");

        h.run(Builtin::Grep, &["two", "zeta.txt", "Gamma.txt"]).unwrap();
        assert_eq!(h.output(), "zeta.txt:two words\nGamma.txt:two\n");
    }

    #[test]
    fn grep_missing_file() {
        let (_dir, mut h) = setup();
        let err = h.run(Builtin::Grep, &["x", "nope.txt"]).unwrap_err();
        assert_eq!(code_of(&err), Some(codes::FILE_NOT_FOUND.value()));
    }
}
