//! engine::suggest
//!
//! "Did you mean" suggestions for unresolvable command names.
//!
//! # Candidate Pool
//!
//! Registered command names in load order, followed by the base names of
//! executables found on PATH in directory order. Duplicates keep their first
//! position. PATH names shorter than [`MIN_NAME_LEN`] and dot files are
//! never collected.
//!
//! # Ranking
//!
//! Case-insensitive Levenshtein distance. Candidates further than
//! [`MAX_DISTANCE`] are dropped; the rest are sorted by distance with ties
//! kept in pool order, and at most [`MAX_SUGGESTIONS`] are returned.
//!
//! # PATH Index
//!
//! Scanning every PATH directory on each typo is expensive, so the scan is
//! cached in a [`PathIndex`]. The cache is rebuilt when the SHA-256
//! fingerprint of the PATH value changes or when its TTL has elapsed. A PATH
//! with relative entries also changes fingerprint when the working directory
//! does.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};

use super::resolve::{is_native_executable, native_extensions, search_dirs};
use crate::core::config::schema::DEFAULT_PATH_CACHE_TTL_SECS;

/// Largest edit distance still offered as a suggestion.
pub const MAX_DISTANCE: usize = 2;

/// Most suggestions shown for one failed lookup.
pub const MAX_SUGGESTIONS: usize = 3;

/// PATH executables with shorter names are ignored.
pub const MIN_NAME_LEN: usize = 3;

/// A ranked near-match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub name: String,
    pub distance: usize,
}

/// Rank `candidates` against `input`.
pub fn suggest<'a, I>(input: &str, candidates: I) -> Vec<Suggestion>
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = input.to_lowercase();
    let mut seen = HashSet::new();

    let mut matches: Vec<Suggestion> = candidates
        .into_iter()
        .filter(|name| seen.insert(*name))
        .filter_map(|name| {
            let distance = strsim::levenshtein(&needle, &name.to_lowercase());
            (distance <= MAX_DISTANCE).then(|| Suggestion {
                name: name.to_string(),
                distance,
            })
        })
        .collect();

    // sort_by_key is stable, so equal distances keep pool order
    matches.sort_by_key(|s| s.distance);
    matches.truncate(MAX_SUGGESTIONS);
    matches
}

/// SHA-256 (hex) of a PATH value.
///
/// Relative entries resolve against `cwd`, so when PATH has any the working
/// directory is hashed too.
pub fn fingerprint(path_value: &OsStr, cwd: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path_value.to_string_lossy().as_bytes());
    let has_relative = std::env::split_paths(path_value)
        .any(|dir| !dir.as_os_str().is_empty() && dir.is_relative());
    if has_relative {
        hasher.update([0u8]);
        hasher.update(cwd.to_string_lossy().as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Cached executable names discovered on PATH.
#[derive(Debug, Clone)]
pub struct PathIndex {
    names: Vec<String>,
    fingerprint: Option<String>,
    scanned_at: Option<Instant>,
    ttl: Duration,
    script_extensions: Vec<String>,
}

impl Default for PathIndex {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_PATH_CACHE_TTL_SECS), Vec::new())
    }
}

impl PathIndex {
    /// `script_extensions` are lowercase extensions (no dot) that count as
    /// runnable without an execute bit.
    pub fn new(ttl: Duration, script_extensions: Vec<String>) -> Self {
        Self {
            names: Vec::new(),
            fingerprint: None,
            scanned_at: None,
            ttl,
            script_extensions,
        }
    }

    /// Executable names for `path_value`, rescanning if stale.
    pub fn names(&mut self, path_value: &OsStr, cwd: &Path) -> &[String] {
        self.names_at(path_value, cwd, Instant::now())
    }

    /// Same as [`PathIndex::names`] with an explicit clock.
    pub fn names_at(&mut self, path_value: &OsStr, cwd: &Path, now: Instant) -> &[String] {
        let fp = fingerprint(path_value, cwd);
        if self.is_stale(&fp, now) {
            self.names = self.scan(path_value, cwd);
            self.fingerprint = Some(fp);
            self.scanned_at = Some(now);
            tracing::debug!(executables = self.names.len(), "rebuilt PATH index");
        }
        &self.names
    }

    /// Whether a cached scan cannot be reused for `fingerprint` at `now`.
    pub fn is_stale(&self, fingerprint: &str, now: Instant) -> bool {
        match (&self.fingerprint, self.scanned_at) {
            (Some(cached), Some(at)) => {
                cached != fingerprint || now.saturating_duration_since(at) > self.ttl
            }
            _ => true,
        }
    }

    /// Drop the cached scan.
    pub fn invalidate(&mut self) {
        self.names.clear();
        self.fingerprint = None;
        self.scanned_at = None;
    }

    fn scan(&self, path_value: &OsStr, cwd: &Path) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        let native = native_extensions();

        for dir in search_dirs(path_value, cwd) {
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::trace!(dir = %dir.display(), error = %e, "skipping PATH entry");
                    continue;
                }
            };

            let mut dir_names: Vec<String> = entries
                .filter_map(Result::ok)
                .filter_map(|entry| self.executable_name(&entry.path(), &native))
                .collect();
            // read_dir order is unspecified; sort for a stable pool
            dir_names.sort();

            for name in dir_names {
                if seen.insert(name.clone()) {
                    names.push(name);
                }
            }
        }

        names
    }

    fn executable_name(&self, path: &Path, native: &[String]) -> Option<String> {
        let file_name = path.file_name()?.to_str()?;
        if file_name.starts_with('.') {
            return None;
        }

        let metadata = fs::metadata(path).ok()?;
        if !metadata.is_file() {
            return None;
        }

        let ext = path
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase);
        let is_script = ext
            .as_ref()
            .map(|e| self.script_extensions.contains(e))
            .unwrap_or(false);
        if !is_script && !is_native_executable(path, &metadata) {
            return None;
        }

        let known_ext = ext
            .as_ref()
            .map(|e| is_script || native.contains(e))
            .unwrap_or(false);
        let base = if known_ext {
            path.file_stem()?.to_str()?
        } else {
            file_name
        };

        (base.chars().count() >= MIN_NAME_LEN).then(|| base.to_string())
    }
}
