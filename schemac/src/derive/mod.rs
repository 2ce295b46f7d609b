//! Derivation engine.
//!
//! Walks a completed [`Schema`] once and emits one text unit with, in order:
//!
//! 1. the prelude and provenance banner
//! 2. enum declarations (and flag operators)
//! 3. struct declarations
//! 4. the shared helper block
//! 5. enum bodies
//! 6. struct bodies
//!
//! Declaring everything before defining anything lets a struct body refer to
//! any other generated type regardless of declaration order.

mod enums;
mod helpers;
mod structs;
mod writer;

pub use helpers::HELPER_GUARD;
pub use structs::StructPlan;
pub use writer::CodeWriter;

use crate::error::GenerateError;
use crate::schema::Schema;
use tracing::{debug, info};

/// Headers every generated unit includes.
const INCLUDES: [&str; 7] = [
    "<cstring>",
    "<new>",
    "<vector>",
    "<rose/hash.h>",
    "<rose/typetraits.h>",
    "<rose/serializer.h>",
    "<rose/world.h>",
];

/// Options that affect the generated text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Invocation recorded in the provenance banner.
    pub command: Option<String>,
}

impl GenerateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `command` in the banner.
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }
}

/// Emits derived operations for a schema.
pub struct Generator<'a> {
    schema: &'a Schema,
    options: &'a GenerateOptions,
}

impl<'a> Generator<'a> {
    pub fn new(schema: &'a Schema, options: &'a GenerateOptions) -> Self {
        Self { schema, options }
    }

    /// Produce the complete generated unit.
    ///
    /// Every struct is checked before anything is written, so an error
    /// never leaves partial output behind.
    pub fn generate(&self) -> Result<String, GenerateError> {
        let plans = self
            .schema
            .structs
            .iter()
            .map(|ty| StructPlan::new(self.schema, ty))
            .collect::<Result<Vec<_>, _>>()?;

        for plan in &plans {
            debug!(
                name = %plan.ty.qualified_name,
                equality = !plan.overloads.has_equality(),
                serialize = !plan.overloads.has_serialize,
                deserialize = !plan.overloads.has_deserialize,
                "deriving struct"
            );
        }

        let mut w = CodeWriter::new();
        self.write_prelude(&mut w);

        for e in &self.schema.enums {
            enums::declare(&mut w, e);
        }
        for plan in &plans {
            structs::declare(&mut w, plan);
        }

        helpers::write(&mut w);

        for e in &self.schema.enums {
            enums::define(&mut w, e);
        }
        for plan in &plans {
            structs::define(&mut w, plan);
        }

        info!(
            enums = self.schema.enums.len(),
            structs = plans.len(),
            "generated derived operations"
        );

        Ok(w.finish())
    }

    fn write_prelude(&self, w: &mut CodeWriter) {
        w.line("#pragma once");
        w.blank();
        for include in INCLUDES {
            w.line(format!("#include {include}"));
        }
        w.blank();

        w.rule();
        w.line("//  AUTOGEN");
        if let Some(command) = &self.options.command {
            w.line("//  command:");
            w.line(format!("//    {command}"));
        }
        w.rule();
        w.blank();
    }
}

/// Generate the derived operations for `schema`.
pub fn generate(schema: &Schema, options: &GenerateOptions) -> Result<String, GenerateError> {
    Generator::new(schema, options).generate()
}
