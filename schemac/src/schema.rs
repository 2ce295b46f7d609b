//! The schema model: everything the scanner discovers in one run.
//!
//! Pure data. The [`Schema`] owns every entity by value; nothing is shared
//! and nothing refers back to anything else.

use crate::error::SourceLocation;
use crate::hash::IdentityHash;
use serde::{Deserialize, Serialize};

/// Annotation that may precede an enum or struct declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GlobalAnnotation {
    #[default]
    None,
    /// The following block comment stands in for a type defined elsewhere.
    Imposter,
    /// Bitwise operators are generated for the enum.
    Flag,
}

impl GlobalAnnotation {
    /// Look up a tag as written after `//@`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Imposter" => Some(Self::Imposter),
            "Flag" => Some(Self::Flag),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Imposter => "Imposter",
            Self::Flag => "Flag",
        }
    }
}

/// Annotation that may precede a struct member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberAnnotation {
    #[default]
    None,
    /// Excluded from every derived operation.
    Ignore,
    /// `char[N]` holding null-terminated text.
    String,
    /// `char[N]` holding an opaque blob.
    Data,
}

impl MemberAnnotation {
    /// Look up a tag as written after `//@`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Ignore" => Some(Self::Ignore),
            "String" => Some(Self::String),
            "Data" => Some(Self::Data),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Ignore => "Ignore",
            Self::String => "String",
            Self::Data => "Data",
        }
    }

    /// Whether this is one of the two character-array annotations.
    pub fn is_text(self) -> bool {
        matches!(self, Self::String | Self::Data)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    AutoIncrement,
    Explicit,
}

/// One enumerator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumValue {
    pub name: String,

    /// Literal text after `=`; empty for auto-incremented values.
    pub value: String,

    pub kind: ValueKind,
}

impl EnumValue {
    pub fn auto(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            kind: ValueKind::AutoIncrement,
        }
    }

    pub fn explicit(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            kind: ValueKind::Explicit,
        }
    }
}

/// An `enum class` / `enum struct` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumType {
    /// Name prefixed with the enclosing namespaces (`a::b::Name`).
    pub qualified_name: String,

    pub name: String,

    /// Underlying integer type text; `int` unless given.
    pub underlying_type: String,

    pub has_custom_underlying_type: bool,

    /// Enumerators in declaration order; never empty.
    pub values: Vec<EnumValue>,

    pub annotation: GlobalAnnotation,

    /// Name of the first enumerator.
    pub default_value: String,
}

impl EnumType {
    /// Build an enum from its parsed parts.
    ///
    /// The first value is forced to [`ValueKind::Explicit`] so numbering is
    /// anchored; without a literal it becomes `0`. Returns `None` when there
    /// are no values.
    pub fn new(
        qualified_name: impl Into<String>,
        name: impl Into<String>,
        underlying_type: Option<String>,
        mut values: Vec<EnumValue>,
        annotation: GlobalAnnotation,
    ) -> Option<Self> {
        let first = values.first_mut()?;
        if first.kind == ValueKind::AutoIncrement {
            first.kind = ValueKind::Explicit;
            first.value = "0".to_string();
        }
        let default_value = first.name.clone();

        Some(Self {
            qualified_name: qualified_name.into(),
            name: name.into(),
            has_custom_underlying_type: underlying_type.is_some(),
            underlying_type: underlying_type.unwrap_or_else(|| "int".to_string()),
            values,
            annotation,
            default_value,
        })
    }

    pub fn is_flag(&self) -> bool {
        self.annotation == GlobalAnnotation::Flag
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberKind {
    Field,
    Function,
    Constructor,
    Destructor,
}

/// A struct member as declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    pub kind: MemberKind,

    /// Declared type text.
    #[serde(rename = "type")]
    pub ty: String,

    pub name: String,

    /// 1 for scalars, N for `T name[N]`.
    pub count: i32,

    /// Text after `=`, if any.
    pub default_value: String,

    pub annotation: MemberAnnotation,
}

impl Member {
    pub fn field(ty: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: MemberKind::Field,
            ty: ty.into(),
            name: name.into(),
            count: 1,
            default_value: String::new(),
            annotation: MemberAnnotation::None,
        }
    }

    pub fn is_field(&self) -> bool {
        self.kind == MemberKind::Field
    }

    pub fn is_array(&self) -> bool {
        self.count > 1
    }

    /// `char name[N]` with `N > 1`.
    pub fn is_char_array(&self) -> bool {
        self.is_array() && self.ty == "char"
    }
}

/// A `struct` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructType {
    pub qualified_name: String,
    pub name: String,
    pub annotation: GlobalAnnotation,

    /// Members in declaration order, `Ignore` members excluded.
    pub members: Vec<Member>,
}

impl StructType {
    pub fn new(qualified_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            name: name.into(),
            annotation: GlobalAnnotation::None,
            members: Vec::new(),
        }
    }

    /// The data members that take part in derivation.
    pub fn fields(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| m.is_field())
    }

    /// A copy with every non-field member removed.
    pub fn without_functions(&self) -> Self {
        Self {
            members: self.fields().cloned().collect(),
            ..self.clone()
        }
    }

    /// Structural identity over the field shape only.
    ///
    /// Stable when constructors, destructors or inline functions change;
    /// changes with any edit to a field or to field order.
    pub fn type_identity(&self) -> u64 {
        self.without_functions().identity_hash()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamModifier {
    #[default]
    None,
    Reference,
    Pointer,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub modifier: ParamModifier,
    pub is_const: bool,
}

/// A free function signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FreeFunction {
    /// Function name, `operator==` style for operators.
    pub name: String,

    pub return_type: String,

    pub parameters: Vec<Parameter>,

    /// Where the signature was declared.
    pub origin: SourceLocation,
}

impl FreeFunction {
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Type text of the parameter at `index`, if present.
    pub fn parameter_type(&self, index: usize) -> Option<&str> {
        self.parameters.get(index).map(|p| p.ty.as_str())
    }
}

/// Everything found in one run's inputs, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub enums: Vec<EnumType>,
    pub functions: Vec<FreeFunction>,
    pub structs: Vec<StructType>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.enums.is_empty() && self.functions.is_empty() && self.structs.is_empty()
    }

    pub fn find_struct(&self, qualified_name: &str) -> Option<&StructType> {
        self.structs
            .iter()
            .find(|s| s.qualified_name == qualified_name)
    }

    pub fn find_enum(&self, qualified_name: &str) -> Option<&EnumType> {
        self.enums.iter().find(|e| e.qualified_name == qualified_name)
    }
}

/// The namespaces open at the current scan position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespacePath(Vec<String>);

impl NamespacePath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.0.push(segment.into());
    }

    /// Close the innermost namespace; `None` when none is open.
    pub fn pop(&mut self) -> Option<String> {
        self.0.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// `a::b::name` for the open namespaces `a`, `b`.
    pub fn qualify(&self, name: &str) -> String {
        let mut qualified = String::new();
        for segment in &self.0 {
            qualified.push_str(segment);
            qualified.push_str("::");
        }
        qualified.push_str(name);
        qualified
    }
}
