//! engine::resolve
//!
//! External executable resolution for names not found in the registry.
//!
//! # Rules
//!
//! 1. An explicit path (`./x`, `.\x`, `../x`, `..\x`, or absolute) is looked
//!    up only at that location. It never falls through to PATH.
//! 2. Otherwise each PATH directory is searched in order, probing the bare
//!    name and then the name with each recognized extension. The first
//!    directory with a runnable match wins.
//! 3. If PATH has no match but a file with the name exists in the working
//!    directory, the outcome is [`Resolution::ExistsButNotOnPath`] so the caller can
//!    suggest the `./name` form.
//!
//! # Runnable Files
//!
//! - Files whose extension is in the script table are
//!   [`ExecutableKind::InterpretedScript`] and are launched through the
//!   configured interpreter. They need no execute permission.
//! - On Unix any other file needs an execute bit.
//! - On Windows any other file needs an extension listed in `PATHEXT`.
//!
//! Relative PATH entries are resolved against the shell's working directory;
//! empty PATH entries are skipped.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

/// What kind of file was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutableKind {
    NativeBinary,
    InterpretedScript,
}

/// A located executable, ready to launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedExecutable {
    pub path: PathBuf,
    pub kind: ExecutableKind,
    /// Interpreter command for scripts.
    pub interpreter: Option<PathBuf>,
}

/// Outcome of resolving a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(ResolvedExecutable),
    NotFound,
    /// Not on PATH, but a file with this name is in the working directory.
    ExistsButNotOnPath(PathBuf),
    /// An explicit path names a file that cannot be run.
    NotExecutable(PathBuf),
}

enum Probe {
    Runnable(ResolvedExecutable),
    NotRunnable(PathBuf),
    Missing,
}

/// Whether `name` is written as a path rather than a bare command name.
pub fn is_explicit_path(name: &str) -> bool {
    name.starts_with("./")
        || name.starts_with(".\\")
        || name.starts_with("../")
        || name.starts_with("..\\")
        || Path::new(name).is_absolute()
}

/// Extensions that mark native executables on this platform.
#[cfg(windows)]
pub(crate) fn native_extensions() -> Vec<String> {
    let pathext = std::env::var("PATHEXT").unwrap_or_else(|_| ".COM;.EXE;.BAT;.CMD".to_string());
    pathext
        .split(';')
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Extensions that mark native executables on this platform.
#[cfg(not(windows))]
pub(crate) fn native_extensions() -> Vec<String> {
    Vec::new()
}

/// Whether a regular file can be executed directly.
#[cfg(unix)]
pub(crate) fn is_native_executable(_path: &Path, metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.is_file() && metadata.permissions().mode() & 0o111 != 0
}

/// Whether a regular file can be executed directly.
#[cfg(not(unix))]
pub(crate) fn is_native_executable(path: &Path, metadata: &fs::Metadata) -> bool {
    metadata.is_file()
        && extension_of(path)
            .map(|ext| native_extensions().contains(&ext))
            .unwrap_or(false)
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase)
}

fn with_extension_appended(base: &Path, ext: &str) -> PathBuf {
    let mut s = base.as_os_str().to_owned();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

/// Locates external executables.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    /// Script extension (lowercase, no dot) to interpreter command.
    scripts: BTreeMap<String, String>,
    /// PATH value to use instead of the process environment.
    path_override: Option<OsString>,
}

impl Resolver {
    pub fn new(scripts: BTreeMap<String, String>) -> Self {
        let scripts = scripts
            .into_iter()
            .map(|(ext, interp)| (ext.to_ascii_lowercase(), interp))
            .collect();
        Self {
            scripts,
            path_override: None,
        }
    }

    /// Use a fixed PATH value instead of reading the environment.
    pub fn with_path(mut self, path: impl Into<OsString>) -> Self {
        self.path_override = Some(path.into());
        self
    }

    /// The PATH value in effect.
    pub fn path_value(&self) -> Option<OsString> {
        self.path_override
            .clone()
            .or_else(|| std::env::var_os("PATH"))
    }

    /// PATH directories in search order.
    pub fn search_dirs(&self, cwd: &Path) -> Vec<PathBuf> {
        match self.path_value() {
            Some(value) => search_dirs(&value, cwd),
            None => Vec::new(),
        }
    }

    pub fn is_script_extension(&self, ext: &str) -> bool {
        self.scripts.contains_key(&ext.to_ascii_lowercase())
    }

    /// Resolve `name` relative to the shell working directory `cwd`.
    pub fn resolve(&self, name: &str, cwd: &Path) -> Resolution {
        if is_explicit_path(name) {
            let target = cwd.join(name);
            return match self.probe(&target) {
                Probe::Runnable(exe) => Resolution::Found(exe),
                Probe::NotRunnable(path) => Resolution::NotExecutable(path),
                Probe::Missing => Resolution::NotFound,
            };
        }

        for dir in self.search_dirs(cwd) {
            if let Probe::Runnable(exe) = self.probe(&dir.join(name)) {
                tracing::debug!(name, path = %exe.path.display(), "resolved on PATH");
                return Resolution::Found(exe);
            }
        }

        match self.probe(&cwd.join(name)) {
            Probe::Runnable(exe) => Resolution::ExistsButNotOnPath(exe.path),
            Probe::NotRunnable(path) if path.is_file() => Resolution::ExistsButNotOnPath(path),
            Probe::NotRunnable(_) | Probe::Missing => Resolution::NotFound,
        }
    }

    /// Probe `base`, then `base.<ext>` for each recognized extension.
    fn probe(&self, base: &Path) -> Probe {
        let mut first_unrunnable = None;

        let candidates = std::iter::once(base.to_path_buf()).chain(
            native_extensions()
                .into_iter()
                .chain(self.scripts.keys().cloned())
                .map(|ext| with_extension_appended(base, &ext)),
        );

        for candidate in candidates {
            match self.classify(&candidate) {
                Probe::Runnable(exe) => return Probe::Runnable(exe),
                Probe::NotRunnable(path) => {
                    first_unrunnable.get_or_insert(path);
                }
                Probe::Missing => {}
            }
        }

        match first_unrunnable {
            Some(path) => Probe::NotRunnable(path),
            None => Probe::Missing,
        }
    }

    fn classify(&self, path: &Path) -> Probe {
        let metadata = match fs::metadata(path) {
            Ok(m) => m,
            Err(_) => return Probe::Missing,
        };

        if !metadata.is_file() {
            return Probe::NotRunnable(path.to_path_buf());
        }

        if let Some(interpreter) = extension_of(path).and_then(|ext| self.scripts.get(&ext)) {
            return Probe::Runnable(ResolvedExecutable {
                path: path.to_path_buf(),
                kind: ExecutableKind::InterpretedScript,
                interpreter: Some(PathBuf::from(interpreter)),
            });
        }

        if is_native_executable(path, &metadata) {
            Probe::Runnable(ResolvedExecutable {
                path: path.to_path_buf(),
                kind: ExecutableKind::NativeBinary,
                interpreter: None,
            })
        } else {
            Probe::NotRunnable(path.to_path_buf())
        }
    }
}

/// Split a PATH value into directories, skipping empty entries and
/// anchoring relative entries at `cwd`.
pub fn search_dirs(value: &OsStr, cwd: &Path) -> Vec<PathBuf> {
    std::env::split_paths(value)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| if dir.is_relative() { cwd.join(dir) } else { dir })
        .collect()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn write_file(path: &Path, mode: u32) {
        fs::write(path, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
    }

    fn resolver() -> Resolver {
        Resolver::new(BTreeMap::from([("py".to_string(), "python3".to_string())]))
    }

    fn join_paths(dirs: &[&Path]) -> OsString {
        std::env::join_paths(dirs).unwrap()
    }

    #[test]
    fn explicit_path_detection() {
        assert!(is_explicit_path("./tool"));
        assert!(is_explicit_path(".\\tool"));
        assert!(is_explicit_path("../tool"));
        assert!(is_explicit_path("/usr/bin/env"));
        assert!(!is_explicit_path("tool"));
        assert!(!is_explicit_path(".hidden"));
    }

    #[test]
    fn first_path_directory_wins() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        let cwd = TempDir::new().unwrap();
        write_file(&a.path().join("tool"), 0o755);
        write_file(&b.path().join("tool"), 0o755);

        let resolver = resolver().with_path(join_paths(&[a.path(), b.path()]));
        match resolver.resolve("tool", cwd.path()) {
            Resolution::Found(exe) => {
                assert_eq!(exe.path, a.path().join("tool"));
                assert_eq!(exe.kind, ExecutableKind::NativeBinary);
                assert!(exe.interpreter.is_none());
            }
            other => panic!("unexpected resolution: {:?}", other),
        }
    }

    #[test]
    fn non_executable_file_on_path_is_skipped() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        let cwd = TempDir::new().unwrap();
        write_file(&a.path().join("tool"), 0o644);
        write_file(&b.path().join("tool"), 0o755);

        let resolver = resolver().with_path(join_paths(&[a.path(), b.path()]));
        assert_eq!(
            resolver.resolve("tool", cwd.path()),
            Resolution::Found(ResolvedExecutable {
                path: b.path().join("tool"),
                kind: ExecutableKind::NativeBinary,
                interpreter: None,
            })
        );
    }

    #[test]
    fn script_extension_is_probed_and_interpreted() {
        let dir = TempDir::new().unwrap();
        let cwd = TempDir::new().unwrap();
        write_file(&dir.path().join("hello.py"), 0o644);

        let resolver = resolver().with_path(join_paths(&[dir.path()]));
        match resolver.resolve("hello", cwd.path()) {
            Resolution::Found(exe) => {
                assert_eq!(exe.path, dir.path().join("hello.py"));
                assert_eq!(exe.kind, ExecutableKind::InterpretedScript);
                assert_eq!(exe.interpreter, Some(PathBuf::from("python3")));
            }
            other => panic!("unexpected resolution: {:?}", other),
        }
    }

    #[test]
    fn bare_name_in_cwd_is_not_run() {
        let path_dir = TempDir::new().unwrap();
        let cwd = TempDir::new().unwrap();
        write_file(&cwd.path().join("local"), 0o755);

        let resolver = resolver().with_path(join_paths(&[path_dir.path()]));
        assert_eq!(
            resolver.resolve("local", cwd.path()),
            Resolution::ExistsButNotOnPath(cwd.path().join("local"))
        );
    }

    #[test]
    fn explicit_path_never_searches_path() {
        let path_dir = TempDir::new().unwrap();
        let cwd = TempDir::new().unwrap();
        write_file(&path_dir.path().join("tool"), 0o755);

        let resolver = resolver().with_path(join_paths(&[path_dir.path()]));
        assert_eq!(resolver.resolve("./tool", cwd.path()), Resolution::NotFound);
    }

    #[test]
    fn explicit_path_finds_local_file() {
        let cwd = TempDir::new().unwrap();
        write_file(&cwd.path().join("tool"), 0o755);

        let resolver = resolver().with_path(OsString::new());
        match resolver.resolve("./tool", cwd.path()) {
            Resolution::Found(exe) => assert_eq!(exe.kind, ExecutableKind::NativeBinary),
            other => panic!("unexpected resolution: {:?}", other),
        }
    }

    #[test]
    fn explicit_path_without_exec_bit_is_not_executable() {
        let cwd = TempDir::new().unwrap();
        write_file(&cwd.path().join("data"), 0o644);

        let resolver = resolver().with_path(OsString::new());
        assert_eq!(
            resolver.resolve("./data", cwd.path()),
            Resolution::NotExecutable(cwd.path().join("./data"))
        );
    }

    #[test]
    fn directory_in_cwd_is_not_found() {
        let cwd = TempDir::new().unwrap();
        fs::create_dir(cwd.path().join("src")).unwrap();

        let resolver = resolver().with_path(OsString::new());
        assert_eq!(resolver.resolve("src", cwd.path()), Resolution::NotFound);
    }

    #[test]
    fn missing_everywhere_is_not_found() {
        let cwd = TempDir::new().unwrap();
        let resolver = resolver().with_path(OsString::new());
        assert_eq!(resolver.resolve("nosuchcmd", cwd.path()), Resolution::NotFound);
    }

    #[test]
    fn empty_path_entries_are_skipped() {
        let cwd = TempDir::new().unwrap();
        let dirs = search_dirs(OsStr::new("::/usr/bin"), cwd.path());
        assert_eq!(dirs, vec![PathBuf::from("/usr/bin")]);
    }

    #[test]
    fn relative_path_entries_anchor_at_cwd() {
        let cwd = TempDir::new().unwrap();
        let dirs = search_dirs(OsStr::new("bin"), cwd.path());
        assert_eq!(dirs, vec![cwd.path().join("bin")]);
    }
}
