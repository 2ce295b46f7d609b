//! Input resolution for header files.
//!
//! Include entries are either plain paths or glob patterns. Entries keep the
//! order they are given in; a pattern expands to its matches in sorted order.
//! A file named twice is scanned once, at its first position.

use crate::error::{CliResult, InputError};
use schemac::SourceFile;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolves include entries to input units.
#[derive(Debug, Default)]
pub struct InputResolver {
    /// Directory relative entries are resolved against; empty for the
    /// working directory.
    base: PathBuf,
}

impl InputResolver {
    /// Create a resolver for the working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative entries against `base`.
    pub fn with_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.base = base.into();
        self
    }

    /// Expand `entries` into an ordered list of existing files.
    pub fn resolve(&self, entries: &[String]) -> CliResult<Vec<PathBuf>> {
        if entries.is_empty() {
            return Err(InputError::NoInputs.into());
        }

        let mut seen = HashSet::new();
        let mut paths = Vec::new();

        for entry in entries {
            let expanded = if is_pattern(entry) {
                self.expand(entry)?
            } else {
                let path = self.base.join(entry);
                if !path.is_file() {
                    return Err(InputError::NotFound { path }.into());
                }
                vec![path]
            };

            for path in expanded {
                if seen.insert(path.clone()) {
                    paths.push(path);
                }
            }
        }

        debug!(count = paths.len(), "resolved inputs");
        Ok(paths)
    }

    /// Read every path into an input unit, in order.
    pub fn load(&self, paths: &[PathBuf]) -> CliResult<Vec<SourceFile>> {
        paths.iter().map(|path| read_source(path)).collect()
    }

    fn expand(&self, pattern: &str) -> CliResult<Vec<PathBuf>> {
        let full = self.base.join(pattern);
        let full = full.to_string_lossy();

        let matches =
            glob::glob(&full).map_err(|e| InputError::invalid_pattern(pattern, e.to_string()))?;

        let mut paths = Vec::new();
        for entry in matches {
            let path = entry.map_err(|e| InputError::Read {
                path: e.path().to_path_buf(),
                source: e.into_error(),
            })?;
            if path.is_file() {
                paths.push(path);
            }
        }

        if paths.is_empty() {
            return Err(InputError::NoMatch {
                pattern: pattern.to_string(),
            }
            .into());
        }

        paths.sort();
        Ok(paths)
    }
}

/// Read one header into an input unit.
pub fn read_source(path: &Path) -> CliResult<SourceFile> {
    let content = std::fs::read_to_string(path).map_err(|e| InputError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(SourceFile::new(path, content))
}

fn is_pattern(entry: &str) -> bool {
    entry.contains(['*', '?', '['])
}
