//! One generate run, from resolved configuration to written output.

use crate::config::Config;
use crate::error::{CliError, CliResult};
use crate::inputs::InputResolver;
use crate::interchange;
use crate::writer::{FileWriter, Staged, WriteResult};
use schemac::{Compilation, GenerateOptions};
use std::path::{Path, PathBuf};
use tracing::info;

/// Summary of a completed run.
#[derive(Debug)]
pub struct RunReport {
    /// Inputs in scan order.
    pub inputs: Vec<PathBuf>,
    /// Number of enums in the schema.
    pub enums: usize,
    /// Number of structs in the schema.
    pub structs: usize,
    /// Where the generated header went.
    pub output: WriteResult,
    /// Where the interchange went, when requested.
    pub json: Option<WriteResult>,
}

/// A generate run for one configuration.
///
/// Every call starts from scratch: inputs are re-resolved, re-read and
/// re-scanned, so a watch loop can call [`Pipeline::run`] repeatedly.
#[derive(Debug)]
pub struct Pipeline {
    config: Config,
    resolver: InputResolver,
}

impl Pipeline {
    /// Create a pipeline resolving inputs against the working directory.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            resolver: InputResolver::new(),
        }
    }

    /// Resolve relative inputs against `base`.
    pub fn with_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.resolver = self.resolver.with_base(base);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Generator options derived from the configuration.
    pub fn options(&self) -> GenerateOptions {
        if self.config.output.banner {
            GenerateOptions::new().with_command(self.config.command_line())
        } else {
            GenerateOptions::new()
        }
    }

    /// Resolve the configured inputs.
    pub fn inputs(&self) -> CliResult<Vec<PathBuf>> {
        self.resolver.resolve(&self.config.input.include)
    }

    /// Scan and generate in memory.
    pub fn compile(&self) -> CliResult<(Vec<PathBuf>, Compilation)> {
        let inputs = self.inputs()?;
        let sources = self.resolver.load(&inputs)?;
        let compilation = schemac::compile(&sources, &self.options())?;
        Ok((inputs, compilation))
    }

    /// Compile, then write the header and the optional interchange.
    ///
    /// Nothing is written unless compilation succeeds, and both files are
    /// staged before either replaces its destination.
    pub fn run(&self, writer: &FileWriter) -> CliResult<RunReport> {
        let (inputs, compilation) = self.compile()?;

        let json = match &self.config.output.json {
            Some(path) => Some((path, interchange::to_json(&compilation.schema)?)),
            None => None,
        };

        let output = writer.stage(self.config.output.file.as_deref(), &compilation.output)?;
        let json = json
            .map(|(path, text)| writer.stage(Some(path.as_path()), &text))
            .transpose()?;

        let output = output.commit()?;
        let json = json.map(Staged::commit).transpose()?;

        info!(
            inputs = inputs.len(),
            bytes = compilation.output.len(),
            "generate finished"
        );

        Ok(RunReport {
            inputs,
            enums: compilation.schema.enums.len(),
            structs: compilation.schema.structs.len(),
            output,
            json,
        })
    }

    /// Compare `path` against freshly generated output.
    ///
    /// Returns `Validation` when the file is missing or differs.
    pub fn check(&self, path: &Path) -> CliResult<()> {
        if !path.exists() {
            return Err(CliError::Validation(format!(
                "Generated file not found: {}",
                path.display()
            )));
        }

        let existing = std::fs::read_to_string(path)?;
        let (_, compilation) = self.compile()?;

        if existing == compilation.output {
            Ok(())
        } else {
            Err(CliError::Validation(format!(
                "{} is out of date",
                path.display()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("camera.h"),
            "struct Camera { int x; int y; };\n",
        )
        .unwrap();

        let mut config = Config::default();
        config.input.include = vec!["camera.h".into()];
        config.output.file = Some(dir.path().join("gen/serializer.h"));
        (dir, config)
    }

    #[test]
    fn test_options_follow_banner_setting() {
        let (_dir, mut config) = project();
        let with = Pipeline::new(config.clone()).options();
        assert!(with.command.unwrap().starts_with("schemac generate --include camera.h"));

        config.output.banner = false;
        assert_eq!(Pipeline::new(config).options().command, None);
    }

    #[test]
    fn test_run_writes_header_and_json() {
        let (dir, mut config) = project();
        config.output.json = Some(dir.path().join("gen/schema.json"));

        let report = Pipeline::new(config)
            .with_base(dir.path())
            .run(&FileWriter::new(false))
            .unwrap();

        assert_eq!(report.structs, 1);
        assert!(report.output.was_written());
        assert!(report.json.is_some());

        let header = fs::read_to_string(dir.path().join("gen/serializer.h")).unwrap();
        assert!(header.contains("inline bool rose::equals(const Camera &lhs"));

        let schema = interchange::read(&dir.path().join("gen/schema.json")).unwrap();
        assert_eq!(schema.structs[0].name, "Camera");
    }

    #[test]
    fn test_failed_compile_writes_nothing() {
        let (dir, config) = project();
        fs::write(dir.path().join("camera.h"), "struct Camera { char name[8]; };").unwrap();

        let err = Pipeline::new(config)
            .with_base(dir.path())
            .run(&FileWriter::new(false))
            .unwrap_err();

        assert!(matches!(err, CliError::Compile(_)));
        assert!(!dir.path().join("gen").exists());
    }

    #[test]
    fn test_failed_json_write_keeps_previous_header() {
        let (dir, mut config) = project();
        let header = dir.path().join("gen/serializer.h");
        fs::create_dir_all(header.parent().unwrap()).unwrap();
        fs::write(&header, "// previous run\n").unwrap();

        // A directory in the way of the interchange's staging file.
        let json = dir.path().join("gen/schema.json");
        fs::create_dir_all(crate::writer::staging_path(&json)).unwrap();
        config.output.json = Some(json);

        let err = Pipeline::new(config)
            .with_base(dir.path())
            .run(&FileWriter::new(false))
            .unwrap_err();

        assert!(matches!(err, CliError::Write(_)));
        assert_eq!(fs::read_to_string(&header).unwrap(), "// previous run\n");
        assert!(!crate::writer::staging_path(&header).exists());
    }

    #[test]
    fn test_check_detects_stale_output() {
        let (dir, config) = project();
        let pipeline = Pipeline::new(config).with_base(dir.path());
        let out = dir.path().join("gen/serializer.h");

        assert!(matches!(
            pipeline.check(&out),
            Err(CliError::Validation(_))
        ));

        pipeline.run(&FileWriter::new(false)).unwrap();
        pipeline.check(&out).unwrap();

        fs::write(
            dir.path().join("camera.h"),
            "struct Camera { int x; int y; int z; };\n",
        )
        .unwrap();
        assert!(matches!(
            pipeline.check(&out),
            Err(CliError::Validation(_))
        ));
    }
}
