//! File writer for generated output.
//!
//! File output is staged next to the destination as `<file>.bak` and then
//! renamed over it, so a reader never sees a half-written header. Without a
//! destination the text goes to stdout.

use crate::error::{CliResult, WriteError};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Result of a write operation.
#[derive(Debug)]
pub enum WriteResult {
    /// File was written successfully.
    Written {
        /// Path to the written file.
        path: PathBuf,
        /// Number of bytes written.
        bytes: usize,
    },
    /// Content went to stdout.
    Stdout {
        /// Number of bytes written.
        bytes: usize,
    },
    /// Dry run - content was not written.
    DryRun {
        /// Content that would have been written.
        content: String,
        /// Destination, or `None` for stdout.
        path: Option<PathBuf>,
    },
}

/// Output that is ready to be put in place.
///
/// A file is already written to its staging path; dropping the value
/// without [`commit`](Staged::commit) removes the staging file again.
#[must_use]
#[derive(Debug)]
pub enum Staged {
    File {
        path: PathBuf,
        bytes: usize,
        staging: StagingFile,
    },
    Stdout(String),
    DryRun {
        content: String,
        path: Option<PathBuf>,
    },
}

impl Staged {
    /// Move the staged output to its destination.
    pub fn commit(self) -> CliResult<WriteResult> {
        match self {
            Staged::File {
                path,
                bytes,
                mut staging,
            } => {
                std::fs::rename(&staging.path, &path).map_err(|e| WriteError::Replace {
                    path: path.clone(),
                    source: e,
                })?;
                staging.keep();
                Ok(WriteResult::Written { path, bytes })
            }
            Staged::Stdout(content) => {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(content.as_bytes())
                    .and_then(|()| stdout.flush())
                    .map_err(WriteError::Stdout)?;
                Ok(WriteResult::Stdout {
                    bytes: content.len(),
                })
            }
            Staged::DryRun { content, path } => Ok(WriteResult::DryRun { content, path }),
        }
    }
}

/// A staging file that is removed on drop unless kept.
#[derive(Debug)]
pub struct StagingFile {
    path: PathBuf,
    armed: bool,
}

impl StagingFile {
    fn keep(&mut self) {
        self.armed = false;
    }
}

impl Drop for StagingFile {
    fn drop(&mut self) {
        if self.armed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// File writer with dry-run support.
#[derive(Debug)]
pub struct FileWriter {
    /// Whether to run in dry-run mode.
    dry_run: bool,
}

impl FileWriter {
    /// Create a new file writer.
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Write `content` to `path`, or to stdout when `path` is `None`.
    ///
    /// In dry-run mode, returns the content without writing.
    pub fn write(&self, path: Option<&Path>, content: &str) -> CliResult<WriteResult> {
        self.stage(path, content)?.commit()
    }

    /// Prepare `content` for `path` without touching the destination.
    ///
    /// Stage every output of a run before committing any of them, so a
    /// failure part way leaves all destinations as they were.
    pub fn stage(&self, path: Option<&Path>, content: &str) -> CliResult<Staged> {
        if self.dry_run {
            return Ok(Staged::DryRun {
                content: content.to_string(),
                path: path.map(Path::to_path_buf),
            });
        }

        let Some(path) = path else {
            return Ok(Staged::Stdout(content.to_string()));
        };

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| WriteError::CreateDir {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let staging = staging_path(path);
        std::fs::write(&staging, content).map_err(|e| WriteError::WriteFile {
            path: staging.clone(),
            source: e,
        })?;

        Ok(Staged::File {
            path: path.to_path_buf(),
            bytes: content.len(),
            staging: StagingFile {
                path: staging,
                armed: true,
            },
        })
    }

    /// Check if running in dry-run mode.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

/// Staging path used while replacing `path`.
pub fn staging_path(path: &Path) -> PathBuf {
    let mut staged = OsString::from(path.as_os_str());
    staged.push(".bak");
    PathBuf::from(staged)
}

impl WriteResult {
    /// Get the destination of this result; `None` for stdout.
    pub fn path(&self) -> Option<&Path> {
        match self {
            WriteResult::Written { path, .. } => Some(path),
            WriteResult::Stdout { .. } => None,
            WriteResult::DryRun { path, .. } => path.as_deref(),
        }
    }

    /// Check if the write happened (not dry-run).
    pub fn was_written(&self) -> bool {
        !matches!(self, WriteResult::DryRun { .. })
    }

    /// Get the number of bytes written (0 for dry-run).
    pub fn bytes(&self) -> usize {
        match self {
            WriteResult::Written { bytes, .. } | WriteResult::Stdout { bytes } => *bytes,
            WriteResult::DryRun { .. } => 0,
        }
    }
}
