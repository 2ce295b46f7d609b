//! The context object for one compiler run.

use crate::derive::{self, GenerateOptions};
use crate::error::{CompileError, GenerateError, ScanResult};
use crate::scanner;
use crate::schema::Schema;
use crate::source::SourceFile;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Inputs and schema for a single run.
///
/// Inputs are scanned in the order they are given; the schema keeps that
/// order. A session is built fresh for every run and nothing outlives it.
#[derive(Debug, Default)]
pub struct Session {
    inputs: Vec<PathBuf>,
    schema: Schema,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan one input unit into the session's schema.
    pub fn scan(&mut self, source: &SourceFile) -> ScanResult<()> {
        scanner::scan(&mut self.schema, source)?;
        self.inputs.push(source.path.clone());
        debug!(
            path = %source.path.display(),
            enums = self.schema.enums.len(),
            structs = self.schema.structs.len(),
            functions = self.schema.functions.len(),
            "scanned input"
        );
        Ok(())
    }

    /// Scan several units, stopping at the first error.
    pub fn scan_all<'s>(
        &mut self,
        sources: impl IntoIterator<Item = &'s SourceFile>,
    ) -> ScanResult<()> {
        for source in sources {
            self.scan(source)?;
        }
        Ok(())
    }

    /// Paths scanned so far, in order.
    pub fn inputs(&self) -> impl Iterator<Item = &Path> {
        self.inputs.iter().map(PathBuf::as_path)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Run the derivation engine over everything scanned.
    pub fn generate(&self, options: &GenerateOptions) -> Result<String, GenerateError> {
        derive::generate(&self.schema, options)
    }

    pub fn into_schema(self) -> Schema {
        self.schema
    }
}

/// The result of a full scan-and-generate run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compilation {
    pub schema: Schema,
    pub output: String,
}

/// Scan every source in order and generate the output unit.
pub fn compile<'s>(
    sources: impl IntoIterator<Item = &'s SourceFile>,
    options: &GenerateOptions,
) -> Result<Compilation, CompileError> {
    let mut session = Session::new();
    session.scan_all(sources)?;
    let output = session.generate(options)?;

    Ok(Compilation {
        schema: session.into_schema(),
        output,
    })
}
