//! Error types for scanning and code generation.
//!
//! Every error in this crate is fatal for the run that produced it: the
//! scanner stops at the first malformed construct and the derivation engine
//! refuses to emit anything for an inconsistent schema. Callers propagate the
//! first error to the process boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for scanning operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// A position in an input unit, reported with every fatal error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Path of the input unit.
    pub path: PathBuf,

    /// Line number (1-indexed).
    pub line: usize,
}

impl SourceLocation {
    pub fn new(path: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.path.display(), self.line)
    }
}

/// A malformed construct found while scanning an input unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {location} [found '{found}']")]
pub struct ScanError {
    /// What went wrong.
    pub kind: ScanErrorKind,

    /// Where it went wrong.
    pub location: SourceLocation,

    /// The next whitespace-delimited token at the error position.
    pub found: String,
}

/// Broad class of a [`ScanErrorKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Grammar,
    Annotation,
}

/// The specific reason a scan failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanErrorKind {
    #[error("expected {0}")]
    Expected(&'static str),

    #[error("unexpected '}}'")]
    UnbalancedBrace,

    #[error("unknown preprocessor directive '#{0}'")]
    UnknownDirective(String),

    #[error("unterminated '#{0}' block, no '#endif' found")]
    UnterminatedConditional(String),

    #[error("unterminated imposter comment, expected '*/'")]
    UnterminatedImposter,

    #[error("unterminated {0}")]
    Unterminated(&'static str),

    #[error("unexpected end of input inside {0}")]
    UnexpectedEof(&'static str),

    #[error("expected 'class' or 'struct' after 'enum'")]
    PlainEnum,

    #[error("enum '{0}' declares no values")]
    EmptyEnum(String),

    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    #[error("constructor/destructor name mismatch: '{found}' in struct '{owner}'")]
    ConstructorNameMismatch { found: String, owner: String },

    #[error("invalid array length '{0}'")]
    InvalidArrayLength(String),

    #[error("unknown annotation '@{0}'")]
    UnknownAnnotation(String),

    #[error("duplicate annotation '@{second}' after '@{first}'")]
    DuplicateAnnotation { first: String, second: String },

    #[error("annotation '@{annotation}' can't be applied to {target}")]
    MisplacedAnnotation {
        annotation: &'static str,
        target: &'static str,
    },

    #[error("expected '/*' after '@Imposter'")]
    ImposterWithoutComment,

    #[error("member '{0}' must have either annotation @String or @Data")]
    MissingTextAnnotation(String),

    #[error("annotations @String and @Data can't be combined")]
    ConflictingTextAnnotation,
}

impl ScanErrorKind {
    /// Whether this is a grammar or an annotation error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownAnnotation(_)
            | Self::DuplicateAnnotation { .. }
            | Self::MisplacedAnnotation { .. }
            | Self::ImposterWithoutComment
            | Self::MissingTextAnnotation(_)
            | Self::ConflictingTextAnnotation => ErrorCategory::Annotation,
            _ => ErrorCategory::Grammar,
        }
    }
}

/// A schema that can't be turned into code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// Only one of `operator==` / `operator!=` is user defined.
    #[error("{type_name} must overload either all or none of the '==' and '!=' operators ('{defined}' declared at {location})")]
    AsymmetricEquality {
        type_name: String,
        defined: String,
        location: SourceLocation,
    },

    /// A fixed character array reached generation without @String or @Data.
    ///
    /// The scanner rejects this, so it only happens for schemas built or
    /// loaded by other means.
    #[error("member '{type_name}::{member}' must have either annotation @String or @Data")]
    UnannotatedCharArray { type_name: String, member: String },
}

/// Any failure of a full scan-and-generate run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Generate(#[from] GenerateError),
}
