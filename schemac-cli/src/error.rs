//! Error types for the CLI.
//!
//! Compiler errors from the `schemac` library pass through unchanged so the
//! report keeps its `path(line) [found '...']` shape; everything the CLI adds
//! (configuration, inputs, output files, watching) has its own sub-enum.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Main error type for CLI operations.
#[derive(Debug, Error)]
pub enum CliError {
    /// Scan or generation failure reported by the compiler.
    #[error(transparent)]
    Compile(#[from] schemac::CompileError),

    /// Error loading configuration.
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    /// Error resolving or reading input headers.
    #[error("Failed to read inputs: {0}")]
    Input(#[from] InputError),

    /// Error writing output files.
    #[error("Failed to write output: {0}")]
    Write(#[from] WriteError),

    /// Error during file watching.
    #[error("Watch error: {0}")]
    Watch(#[from] WatchError),

    /// Error encoding or decoding the schema interchange.
    #[error("Schema interchange error: {0}")]
    Interchange(#[from] InterchangeError),

    /// Generated output is out of date.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Failure requested with `--error`.
    #[error("Forced failure requested")]
    Forced,

    /// Generic IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Validation(_) => 2,
            _ => 1,
        }
    }
}

/// Error loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file given explicitly but missing.
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Config file already present and `--force` not given.
    #[error("Configuration file already exists: {path} (use --force to overwrite)")]
    AlreadyExists { path: PathBuf },

    /// Invalid TOML syntax.
    #[error("Invalid TOML in {path}: {message}")]
    InvalidToml { path: PathBuf, message: String },

    /// IO error reading config.
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Create a not found error.
    pub fn not_found(path: PathBuf) -> Self {
        Self::NotFound { path }
    }

    /// Create an invalid TOML error.
    pub fn invalid_toml(path: PathBuf, message: impl Into<String>) -> Self {
        Self::InvalidToml {
            path,
            message: message.into(),
        }
    }
}

/// Error resolving or reading input headers.
#[derive(Debug, Error)]
pub enum InputError {
    /// Neither the command line nor the config names an input.
    #[error("No input files given (use --include or [input] include)")]
    NoInputs,

    /// Input file does not exist.
    #[error("Input file not found: {path}")]
    NotFound { path: PathBuf },

    /// Glob pattern matched nothing.
    #[error("Pattern '{pattern}' matched no files")]
    NoMatch { pattern: String },

    /// Invalid glob pattern.
    #[error("Invalid input pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// IO error reading an input.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl InputError {
    /// Create an invalid pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}

/// Error writing output files.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Failed to create directory.
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write file.
    #[error("Failed to write file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to move the staged file over the destination.
    #[error("Failed to replace {path}: {source}")]
    Replace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write to stdout.
    #[error("Failed to write to stdout: {0}")]
    Stdout(#[source] std::io::Error),
}

/// Error during file watching.
#[derive(Debug, Error)]
pub enum WatchError {
    /// Failed to initialize watcher.
    #[error("Failed to initialize file watcher: {0}")]
    Init(String),

    /// Error from notify crate.
    #[error("Watch notification error: {0}")]
    Notify(String),
}

/// Error encoding or decoding the schema interchange.
#[derive(Debug, Error)]
pub enum InterchangeError {
    /// JSON encoding or decoding failed.
    #[error("Invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error reading an interchange file.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
