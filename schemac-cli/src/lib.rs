//! # schemac-cli
//!
//! CLI library for the `schemac` schema compiler.
//!
//! This crate provides everything around the compiler core used by the
//! `schemac` binary: configuration, input resolution, output writing, schema
//! interchange, and watch mode.
//!
//! ## Architecture
//!
//! - [`config`] - Configuration management and TOML parsing
//! - [`inputs`] - Input file and glob resolution
//! - [`pipeline`] - One generate run from configuration to written output
//! - [`writer`] - Atomic file output, stdout, and dry-run support
//! - [`interchange`] - Schema JSON interchange
//! - [`watcher`] - File system watching for `--watch`
//! - [`error`] - Error types and handling

pub mod config;
pub mod error;
pub mod inputs;
pub mod interchange;
pub mod pipeline;
pub mod watcher;
pub mod writer;

// Re-export main types for convenience
pub use config::{Config, ConfigManager};
pub use error::{CliError, CliResult};
pub use inputs::InputResolver;
pub use pipeline::{Pipeline, RunReport};
pub use watcher::FileWatcher;
pub use writer::FileWriter;
