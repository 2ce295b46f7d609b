//! Detection of operations the user already wrote by hand.

use crate::error::GenerateError;
use crate::schema::{FreeFunction, Schema};

/// Which derived operations a type already has user definitions for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overloads {
    pub has_equals: bool,
    pub has_not_equals: bool,
    pub has_serialize: bool,
    pub has_deserialize: bool,
}

impl Overloads {
    /// Look through the schema's free functions for overloads on `type_name`.
    ///
    /// `operator==` / `operator!=` count when both parameters are the type;
    /// `serialize` / `deserialize` when the first one is. Defining only one
    /// of the two comparison operators is an error.
    pub fn detect(schema: &Schema, type_name: &str) -> Result<Self, GenerateError> {
        let mut overloads = Self::default();
        let mut equality_origin: Option<&FreeFunction> = None;

        for function in schema.functions.iter().filter(|f| f.arity() == 2) {
            let first = function.parameter_type(0) == Some(type_name);
            let both = first && function.parameter_type(1) == Some(type_name);

            match function.name.as_str() {
                "operator==" if both => {
                    overloads.has_equals = true;
                    equality_origin = Some(function);
                }
                "operator!=" if both => {
                    overloads.has_not_equals = true;
                    equality_origin = Some(function);
                }
                "serialize" if first => overloads.has_serialize = true,
                "deserialize" if first => overloads.has_deserialize = true,
                _ => {}
            }
        }

        if overloads.has_equals != overloads.has_not_equals {
            if let Some(function) = equality_origin {
                return Err(GenerateError::AsymmetricEquality {
                    type_name: type_name.to_string(),
                    defined: function.name.clone(),
                    location: function.origin.clone(),
                });
            }
        }

        Ok(overloads)
    }

    /// Both comparison operators are user defined.
    pub fn has_equality(&self) -> bool {
        self.has_equals && self.has_not_equals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan;
    use crate::source::SourceFile;

    fn schema(src: &str) -> Schema {
        let mut schema = Schema::new();
        scan(&mut schema, &SourceFile::new("ops.h", src)).unwrap();
        schema
    }

    #[test]
    fn test_no_overloads() {
        let schema = schema("struct Camera { int x; };");
        let overloads = Overloads::detect(&schema, "Camera").unwrap();
        assert_eq!(overloads, Overloads::default());
        assert!(!overloads.has_equality());
    }

    #[test]
    fn test_full_overload_set() {
        let schema = schema(
            "bool operator==(const Camera & lhs, const Camera & rhs);\n\
             bool operator!=(const Camera & lhs, const Camera & rhs);\n\
             void serialize(Camera & o, ISerializer & s);\n\
             void deserialize(Camera & o, IDeserializer & s);\n",
        );

        let overloads = Overloads::detect(&schema, "Camera").unwrap();
        assert!(overloads.has_equality());
        assert!(overloads.has_serialize);
        assert!(overloads.has_deserialize);

        // Overloads for one type say nothing about another.
        assert_eq!(
            Overloads::detect(&schema, "Transform").unwrap(),
            Overloads::default()
        );
    }

    #[test]
    fn test_mismatched_parameters_do_not_count() {
        let schema = schema(
            "bool operator==(const Camera & lhs, const Other & rhs);\n\
             void serialize(Other & o, Camera & s);\n\
             void serialize(Camera & o);\n",
        );

        assert_eq!(
            Overloads::detect(&schema, "Camera").unwrap(),
            Overloads::default()
        );
    }

    #[test]
    fn test_asymmetric_equality_is_an_error() {
        let schema = schema("\n\nbool operator==(const Camera & lhs, const Camera & rhs);\n");

        let err = Overloads::detect(&schema, "Camera").unwrap_err();
        match err {
            GenerateError::AsymmetricEquality {
                type_name,
                defined,
                location,
            } => {
                assert_eq!(type_name, "Camera");
                assert_eq!(defined, "operator==");
                assert_eq!(location.line, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
