//! Configuration management for the CLI.
//!
//! This module handles loading configuration from `schemac.toml` files
//! and merging with command-line arguments.

use crate::error::{CliResult, ConfigError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = "schemac.toml";

/// Main configuration structure.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input configuration.
    pub input: InputConfig,

    /// Output configuration.
    pub output: OutputConfig,
}

/// Input configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Header files or glob patterns, scanned in this order.
    pub include: Vec<String>,
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Generated header; stdout when unset.
    pub file: Option<PathBuf>,

    /// Schema interchange file.
    pub json: Option<PathBuf>,

    /// Whether to record the invocation in the provenance banner.
    pub banner: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file: None,
            json: None,
            banner: true,
        }
    }
}

impl Config {
    /// The invocation that reproduces this configuration.
    ///
    /// Only inputs and the output path take part, so the banner stays the
    /// same no matter which config file or flags produced them.
    pub fn command_line(&self) -> String {
        let mut command = String::from("schemac generate --include");
        for include in &self.input.include {
            command.push(' ');
            command.push_str(include);
        }
        if let Some(file) = &self.output.file {
            command.push_str(" --output ");
            command.push_str(&file.display().to_string());
        }
        command
    }
}

/// Configuration manager for loading and merging configs.
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from a file path.
    ///
    /// Without a path, `schemac.toml` in the working directory is used when
    /// present and defaults otherwise. An explicit path must exist.
    pub fn load(path: Option<&Path>) -> CliResult<Config> {
        let config_path = match path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::not_found(path.to_path_buf()).into());
            }
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(CONFIG_FILENAME);
                if !default.exists() {
                    return Ok(Config::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        Self::parse(&config_path, &content)
    }

    /// Parse configuration text; `path` is only used for error reports.
    pub fn parse(path: &Path, content: &str) -> CliResult<Config> {
        let config: Config = toml::from_str(content)
            .map_err(|e| ConfigError::invalid_toml(path.to_path_buf(), e.to_string()))?;
        Ok(config)
    }

    /// Merge CLI arguments into configuration.
    ///
    /// CLI arguments take precedence over config file values. Includes given
    /// on the command line replace the configured list rather than extend it.
    pub fn merge_cli_args(mut config: Config, args: &CliArgs) -> Config {
        if !args.include.is_empty() {
            config.input.include = args.include.clone();
        }

        if let Some(ref file) = args.output {
            config.output.file = Some(file.clone());
        }

        if let Some(ref json) = args.json {
            config.output.json = Some(json.clone());
        }

        if let Some(banner) = args.banner {
            config.output.banner = banner;
        }

        config
    }

    /// Write the commented default configuration to `path`.
    pub fn init(path: &Path, force: bool) -> CliResult<()> {
        if path.exists() && !force {
            return Err(ConfigError::AlreadyExists {
                path: path.to_path_buf(),
            }
            .into());
        }
        std::fs::write(path, Self::default_config_content())?;
        Ok(())
    }

    /// Generate default configuration file content with comments.
    pub fn default_config_content() -> &'static str {
        r#"# schemac configuration file

[input]
# Headers to scan, in order. Glob patterns expand in sorted order.
include = ["include/*.h"]

[output]
# Generated header. Omit to write to stdout.
file = "generated/serializer.h"

# Schema interchange (pretty JSON). Omit to skip.
# json = "generated/schema.json"

# Record the generating command in the banner at the top of the output
banner = true
"#
    }
}

/// CLI arguments that can override configuration.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Input files or patterns.
    pub include: Vec<String>,

    /// Output file override.
    pub output: Option<PathBuf>,

    /// Interchange file override.
    pub json: Option<PathBuf>,

    /// Banner override.
    pub banner: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.input.include.is_empty());
        assert_eq!(config.output.file, None);
        assert_eq!(config.output.json, None);
        assert!(config.output.banner);
    }

    #[test]
    fn test_merge_cli_args_replaces_includes() {
        let mut config = Config::default();
        config.input.include = vec!["a.h".into(), "b.h".into()];
        let args = CliArgs {
            include: vec!["c.h".into()],
            output: Some(PathBuf::from("out.h")),
            ..Default::default()
        };

        let merged = ConfigManager::merge_cli_args(config, &args);
        assert_eq!(merged.input.include, vec!["c.h".to_string()]);
        assert_eq!(merged.output.file, Some(PathBuf::from("out.h")));
    }

    #[test]
    fn test_merge_cli_args_preserves_unset() {
        let mut config = Config::default();
        config.input.include = vec!["a.h".into()];
        config.output.banner = false;

        let merged = ConfigManager::merge_cli_args(config.clone(), &CliArgs::default());
        assert_eq!(merged, config);
    }

    #[test]
    fn test_parse_toml_config() {
        let toml = r#"
[input]
include = ["engine/*.h", "game.h"]

[output]
file = "generated/serializer.h"
json = "generated/schema.json"
banner = false
"#;

        let config = ConfigManager::parse(Path::new("schemac.toml"), toml).unwrap();
        assert_eq!(config.input.include, vec!["engine/*.h", "game.h"]);
        assert_eq!(
            config.output.file,
            Some(PathBuf::from("generated/serializer.h"))
        );
        assert_eq!(
            config.output.json,
            Some(PathBuf::from("generated/schema.json"))
        );
        assert!(!config.output.banner);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config =
            ConfigManager::parse(Path::new("schemac.toml"), "[input]\ninclude = [\"a.h\"]\n")
                .unwrap();
        assert_eq!(config.input.include, vec!["a.h"]);
        assert!(config.output.banner);
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let err = ConfigManager::parse(Path::new("bad.toml"), "[input\n").unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_default_content_parses() {
        let config =
            ConfigManager::parse(Path::new("schemac.toml"), ConfigManager::default_config_content())
                .unwrap();
        assert_eq!(config.input.include, vec!["include/*.h"]);
        assert_eq!(
            config.output.file,
            Some(PathBuf::from("generated/serializer.h"))
        );
        assert_eq!(config.output.json, None);
    }

    #[test]
    fn test_explicit_missing_config_fails() {
        let temp = TempDir::new().unwrap();
        let err = ConfigManager::load(Some(temp.path().join("missing.toml").as_path())).unwrap_err();
        assert!(matches!(err, CliError::Config(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);

        ConfigManager::init(&path, false).unwrap();
        let err = ConfigManager::init(&path, false).unwrap_err();
        assert!(matches!(
            err,
            CliError::Config(ConfigError::AlreadyExists { .. })
        ));

        ConfigManager::init(&path, true).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            ConfigManager::default_config_content()
        );
    }

    #[test]
    fn test_command_line() {
        let mut config = Config::default();
        config.input.include = vec!["a.h".into(), "src/*.h".into()];
        assert_eq!(config.command_line(), "schemac generate --include a.h src/*.h");

        config.output.file = Some(PathBuf::from("out/gen.h"));
        assert_eq!(
            config.command_line(),
            "schemac generate --include a.h src/*.h --output out/gen.h"
        );
    }
}
