//! # schemac
//!
//! Schema compiler for annotated C++ headers.
//!
//! A header declares plain `struct`s and `enum class`es; schemac scans them
//! into a [`Schema`] and derives, for every type, stringification, equality,
//! content hashing, encode/decode against the `rose` serializer interfaces,
//! and a run-time type descriptor.
//!
//! ## Architecture
//!
//! - [`source`] - input units and the character cursor
//! - [`scanner`] - the declaration scanner producing the schema
//! - [`schema`] - the schema model
//! - [`overload`] - detection of user-written operators
//! - [`hash`] - string hashing and structural identity hashing
//! - [`derive`] - the derivation engine
//! - [`session`] - the per-run context tying them together
//! - [`error`] - error types
//!
//! ## Annotations
//!
//! A line comment starting with `//@` tags the declaration or member below it:
//!
//! ```text
//! //@Flag                 bitwise operators for an enum class
//! //@Imposter             the next /* ... */ block is skipped
//! //@Ignore               member left out of every derived operation
//! //@String / //@Data     char arrays: null-terminated text or a blob
//! ```
//!
//! ## Example
//!
//! ```rust
//! use schemac::{compile, GenerateOptions, SourceFile};
//!
//! let header = SourceFile::new("camera.h", "struct Camera { int x; int y; int z; };");
//! let compilation = compile([&header], &GenerateOptions::new()).unwrap();
//!
//! assert_eq!(compilation.schema.structs[0].name, "Camera");
//! assert!(compilation.output.contains("inline bool rose::equals(const Camera &lhs"));
//! ```

pub mod derive;
pub mod error;
pub mod hash;
pub mod overload;
pub mod scanner;
pub mod schema;
pub mod session;
pub mod source;

// Re-export main types for convenience
pub use derive::{generate, GenerateOptions, Generator};
pub use error::{CompileError, GenerateError, ScanError, ScanErrorKind, SourceLocation};
pub use hash::{hash_str, IdentityHash};
pub use overload::Overloads;
pub use scanner::scan;
pub use schema::{
    EnumType, EnumValue, FreeFunction, GlobalAnnotation, Member, MemberAnnotation, MemberKind,
    Schema, StructType, ValueKind,
};
pub use session::{compile, Compilation, Session};
pub use source::SourceFile;
