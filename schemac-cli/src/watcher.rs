//! File watcher for `generate --watch`.
//!
//! The directories holding the inputs are watched (editors often replace a
//! file instead of writing it in place); only events for the inputs
//! themselves are forwarded. Each event triggers a full re-run.

use crate::error::{CliResult, WatchError};
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebouncedEvent, Debouncer};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;
use tracing::{debug, trace};

/// Event types for input changes.
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// An input was written or replaced.
    Modified(PathBuf),
    /// An input disappeared.
    Deleted(PathBuf),
    /// An error occurred.
    Error(String),
}

/// Watches a fixed set of input headers.
pub struct FileWatcher {
    /// Inputs, canonicalized where possible.
    inputs: HashSet<PathBuf>,
    /// Debounce duration in milliseconds.
    debounce_ms: u64,
}

impl FileWatcher {
    /// Create a watcher for the given inputs.
    pub fn new<P: AsRef<Path>>(inputs: impl IntoIterator<Item = P>) -> Self {
        Self {
            inputs: inputs
                .into_iter()
                .map(|p| canonical(p.as_ref()))
                .collect(),
            debounce_ms: 500,
        }
    }

    /// Set the debounce duration in milliseconds.
    pub fn with_debounce(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Directories that need a watch, in sorted order.
    pub fn directories(&self) -> Vec<PathBuf> {
        let dirs: BTreeSet<_> = self
            .inputs
            .iter()
            .map(|p| match p.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            })
            .collect();
        dirs.into_iter().collect()
    }

    /// Whether `path` is one of the watched inputs.
    pub fn is_input(&self, path: &Path) -> bool {
        self.inputs.contains(&canonical(path))
    }

    /// Start watching.
    ///
    /// Returns the debouncer, which must be kept alive, and a receiver that
    /// yields events for the inputs.
    pub fn watch(&self) -> CliResult<(Debouncer<RecommendedWatcher>, Receiver<WatchEvent>)> {
        let (tx, rx) = channel::<WatchEvent>();
        let inputs = self.inputs.clone();

        let mut debouncer = new_debouncer(
            Duration::from_millis(self.debounce_ms),
            move |result: Result<Vec<DebouncedEvent>, notify::Error>| match result {
                Ok(events) => {
                    for event in events {
                        let path = event.path;
                        if !inputs.contains(&canonical(&path)) {
                            trace!(path = %path.display(), "ignoring change");
                            continue;
                        }

                        let watch_event = if path.exists() {
                            WatchEvent::Modified(path)
                        } else {
                            WatchEvent::Deleted(path)
                        };

                        let _ = tx.send(watch_event);
                    }
                }
                Err(e) => {
                    let _ = tx.send(WatchEvent::Error(e.to_string()));
                }
            },
        )
        .map_err(|e| WatchError::Init(e.to_string()))?;

        for dir in self.directories() {
            debug!(dir = %dir.display(), "watching");
            debouncer
                .watcher()
                .watch(&dir, RecursiveMode::NonRecursive)
                .map_err(|e| WatchError::Init(e.to_string()))?;
        }

        Ok((debouncer, rx))
    }
}

impl WatchEvent {
    /// Get the path associated with this event.
    pub fn path(&self) -> Option<&Path> {
        match self {
            WatchEvent::Modified(p) | WatchEvent::Deleted(p) => Some(p),
            WatchEvent::Error(_) => None,
        }
    }

    /// Check if this is an error event.
    pub fn is_error(&self) -> bool {
        matches!(self, WatchEvent::Error(_))
    }

    /// Get the error message if this is an error event.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            WatchEvent::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Canonical form of `path`, or `path` itself when it no longer exists.
fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
