//! Sources of configuration text for the parser.
//!
//! The parser never touches the filesystem directly: it reads the
//! main file and every `include` target through a [`ConfigLoader`].
//! [`FsLoader`] reads from disk, [`MemoryLoader`] serves a fixed map
//! of path to text.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

/// Reads configuration files and expands include patterns.
pub trait ConfigLoader {
    /// Read the whole file at `path`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error that prevented reading.
    fn read(&self, path: &str) -> io::Result<String>;

    /// Expand a glob pattern into the sorted list of matching paths.
    /// No matches is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid pattern or unreadable
    /// directory.
    fn glob(&self, pattern: &str) -> io::Result<Vec<String>>;
}

/// True if `pattern` contains glob metacharacters.
#[must_use]
pub fn has_magic(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Resolve an include argument against the including file's path.
#[must_use]
pub fn resolve_include(including_file: &str, target: &str) -> String {
    let target_path = Path::new(target);
    if target_path.is_absolute() {
        return target.to_string();
    }
    Path::new(including_file)
        .parent()
        .map_or_else(|| target_path.to_path_buf(), |dir| dir.join(target_path))
        .to_string_lossy()
        .into_owned()
}

/// Loads files from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl ConfigLoader for FsLoader {
    fn read(&self, path: &str) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn glob(&self, pattern: &str) -> io::Result<Vec<String>> {
        let entries = glob::glob(pattern)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(glob::GlobError::into_error)?;
            paths.push(path.to_string_lossy().into_owned());
        }
        paths.sort();
        Ok(paths)
    }
}

/// Serves files from an in-memory map.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: BTreeMap<String, String>,
}

impl MemoryLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file.
    #[must_use]
    pub fn with(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.files.insert(path.into(), text.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryLoader {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut loader = Self::new();
        for (path, text) in iter {
            loader.insert(path, text);
        }
        loader
    }
}

impl ConfigLoader for MemoryLoader {
    fn read(&self, path: &str) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "No such file or directory"))
    }

    fn glob(&self, pattern: &str) -> io::Result<Vec<String>> {
        let pattern = glob::Pattern::new(pattern)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        // `*` stops at `/`, as it does on disk
        let options = glob::MatchOptions {
            require_literal_separator: true,
            ..glob::MatchOptions::new()
        };
        Ok(self
            .files
            .keys()
            .filter(|path| pattern.matches_with(path, options))
            .cloned()
            .collect())
    }
}
