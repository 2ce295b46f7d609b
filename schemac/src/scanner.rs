//! Declaration scanner.
//!
//! [`scan`] drains one input unit into a [`Schema`]. The loop classifies the
//! next declaration into a [`DeclarationKind`] and hands a copy of the cursor
//! to the routine for that kind, which returns the parsed entity together
//! with the position after it. The input is read once, front to back; the
//! first malformed construct ends the scan with a [`ScanError`].

use crate::error::{ScanError, ScanErrorKind, ScanResult};
use crate::schema::{
    EnumType, EnumValue, FreeFunction, GlobalAnnotation, Member, MemberAnnotation, MemberKind,
    NamespacePath, ParamModifier, Parameter, Schema, StructType,
};
use crate::source::{is_identifier_char, Cursor, SourceFile};
use std::path::Path;
use tracing::{debug, trace};

/// Every operator spelling a free function may overload.
pub const OVERLOADABLE_OPERATORS: [&str; 34] = [
    "operator!",
    "operator!=",
    "operator%",
    "operator%=",
    "operator&",
    "operator&&",
    "operator&=",
    "operator*",
    "operator*=",
    "operator+",
    "operator++",
    "operator+=",
    "operator,",
    "operator-",
    "operator--",
    "operator-=",
    "operator->",
    "operator->*",
    "operator<",
    "operator<<",
    "operator<<=",
    "operator<=",
    "operator=",
    "operator==",
    "operator>",
    "operator>=",
    "operator>>",
    "operator>>=",
    "operator|",
    "operator|=",
    "operator||",
    "operator~",
    "operator/",
    "operator/=",
];

/// The kinds of top-level construct the scanner dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Preprocessor,
    Namespace,
    NamespaceClose,
    Enum,
    Struct,
    Function,
}

impl DeclarationKind {
    /// Decide what starts at `cursor` without consuming anything.
    pub fn classify(cursor: Cursor<'_>) -> Self {
        let mut ahead = cursor;
        if ahead.test("#") {
            Self::Preprocessor
        } else if ahead.eat_keyword("namespace") {
            Self::Namespace
        } else if ahead.test("}") {
            Self::NamespaceClose
        } else if ahead.eat_keyword("enum") {
            Self::Enum
        } else if ahead.eat_keyword("struct") {
            Self::Struct
        } else {
            Self::Function
        }
    }

    /// Phrase used when an annotation lands on this kind.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Preprocessor => "a preprocessor directive",
            Self::Namespace => "a namespace",
            Self::NamespaceClose => "a closing brace",
            Self::Enum => "a plain enum",
            Self::Struct => "a struct",
            Self::Function => "a free function",
        }
    }
}

/// Scan one input unit, appending everything it declares to `schema`.
pub fn scan(schema: &mut Schema, source: &SourceFile) -> ScanResult<()> {
    debug!(path = %source.path.display(), "scanning");

    let mut cursor = source.cursor();
    let mut namespaces = NamespacePath::new();

    loop {
        cursor.skip_comments()?;

        let (annotation, next) = scan_global_annotation(cursor)?;
        cursor = next;

        if annotation == GlobalAnnotation::Imposter {
            cursor = skip_imposter(cursor)?;
            continue;
        }

        if cursor.is_eof() {
            if annotation != GlobalAnnotation::None {
                return Err(misplaced(cursor, annotation.tag(), "the end of input"));
            }
            break;
        }

        let kind = DeclarationKind::classify(cursor);
        if annotation == GlobalAnnotation::Flag && kind != DeclarationKind::Enum {
            return Err(misplaced(cursor, annotation.tag(), kind.describe()));
        }

        match kind {
            DeclarationKind::Preprocessor => {
                cursor = scan_directive(cursor)?;
            }
            DeclarationKind::Namespace => {
                let (name, next) = scan_namespace(cursor)?;
                trace!(namespace = %name, "entering namespace");
                namespaces.push(name);
                cursor = next;
            }
            DeclarationKind::NamespaceClose => {
                let at = cursor;
                cursor.eat("}");
                if namespaces.pop().is_none() {
                    return Err(at.error(ScanErrorKind::UnbalancedBrace));
                }
            }
            DeclarationKind::Enum => {
                let (enum_type, next) = scan_enum(cursor, &namespaces, annotation)?;
                debug!(
                    name = %enum_type.qualified_name,
                    values = enum_type.values.len(),
                    "found enum"
                );
                schema.enums.push(enum_type);
                cursor = next;
            }
            DeclarationKind::Struct => {
                let (struct_type, next) = scan_struct(cursor, &namespaces)?;
                if let Some(struct_type) = struct_type {
                    debug!(
                        name = %struct_type.qualified_name,
                        members = struct_type.members.len(),
                        "found struct"
                    );
                    schema.structs.push(struct_type);
                }
                cursor = next;
            }
            DeclarationKind::Function => {
                let (function, next) = scan_function(cursor)?;
                debug!(
                    name = %function.name,
                    parameters = function.parameters.len(),
                    "found function"
                );
                schema.functions.push(function);
                cursor = next;
            }
        }
    }

    if !namespaces.is_empty() {
        trace!(open = namespaces.depth(), "input ended inside a namespace");
    }

    Ok(())
}

fn misplaced(at: Cursor<'_>, annotation: &'static str, target: &'static str) -> ScanError {
    at.error(ScanErrorKind::MisplacedAnnotation { annotation, target })
}

/// Read at most one global annotation, plus the comments that follow it.
fn scan_global_annotation(mut cursor: Cursor<'_>) -> ScanResult<(GlobalAnnotation, Cursor<'_>)> {
    let Some(token) = cursor.take_annotation() else {
        return Ok((GlobalAnnotation::None, cursor));
    };

    let annotation = match GlobalAnnotation::from_tag(token.name) {
        Some(annotation) => annotation,
        None => {
            return Err(match MemberAnnotation::from_tag(token.name) {
                Some(member) => misplaced(token.at, member.tag(), "a declaration"),
                None => token
                    .at
                    .error(ScanErrorKind::UnknownAnnotation(token.name.to_string())),
            });
        }
    };

    // The imposter block must follow directly.
    if annotation == GlobalAnnotation::Imposter {
        return Ok((annotation, cursor));
    }

    cursor.skip_comments()?;
    if let Some(second) = cursor.take_annotation() {
        return Err(second.at.error(ScanErrorKind::DuplicateAnnotation {
            first: token.name.to_string(),
            second: second.name.to_string(),
        }));
    }

    Ok((annotation, cursor))
}

/// Skip the `/* ... */` block that follows an `Imposter` annotation.
fn skip_imposter(mut cursor: Cursor<'_>) -> ScanResult<Cursor<'_>> {
    if !cursor.eat("/*") {
        return Err(cursor.error(ScanErrorKind::ImposterWithoutComment));
    }
    let start = cursor;
    if !cursor.skip_past("*/") {
        return Err(start.error(ScanErrorKind::UnterminatedImposter));
    }
    trace!(line = start.line(), "skipped imposter block");
    Ok(cursor)
}

/// `#include`, `#pragma` and `#define` lines, and `#if` blocks up to the
/// next `#endif`. Conditionals do not nest.
pub fn scan_directive(mut cursor: Cursor<'_>) -> ScanResult<Cursor<'_>> {
    let start = cursor;
    cursor.eat("#");
    let directive = cursor.read_token("");

    match directive {
        "include" | "pragma" | "define" => {
            cursor.skip_line();
        }
        "if" | "ifdef" | "ifndef" => {
            cursor.skip_line();
            loop {
                if cursor.test("#endif") {
                    cursor.skip_line();
                    break;
                }
                if cursor.is_eof() {
                    return Err(start.error(ScanErrorKind::UnterminatedConditional(
                        directive.to_string(),
                    )));
                }
                cursor.skip_line();
            }
        }
        _ => {
            return Err(start.error(ScanErrorKind::UnknownDirective(directive.to_string())));
        }
    }

    trace!(directive, line = start.line(), "skipped directive");
    Ok(cursor)
}

/// `namespace NAME [{]`.
pub fn scan_namespace(mut cursor: Cursor<'_>) -> ScanResult<(String, Cursor<'_>)> {
    cursor.eat_keyword("namespace");
    let name = cursor.read_token("{");
    if name.is_empty() {
        return Err(cursor.error(ScanErrorKind::Expected("namespace name")));
    }
    cursor.eat("{");
    Ok((name.to_string(), cursor))
}

/// `enum class|struct NAME [: TYPE] { A [= literal], ... };`
pub fn scan_enum<'a>(
    mut cursor: Cursor<'a>,
    namespaces: &NamespacePath,
    annotation: GlobalAnnotation,
) -> ScanResult<(EnumType, Cursor<'a>)> {
    cursor.eat_keyword("enum");
    if !cursor.eat_keyword("class") && !cursor.eat_keyword("struct") {
        return Err(cursor.error(ScanErrorKind::PlainEnum));
    }

    let name_at = cursor;
    let name = cursor.read_token("{:");
    if name.is_empty() {
        return Err(cursor.error(ScanErrorKind::Expected("enum name")));
    }

    let underlying_type = if cursor.eat(":") {
        let ty = cursor.read_until_any("{");
        if ty.is_empty() {
            return Err(cursor.error(ScanErrorKind::Expected("underlying type")));
        }
        Some(ty.to_string())
    } else {
        None
    };

    if !cursor.eat("{") {
        return Err(cursor.error(ScanErrorKind::Expected("'{'")));
    }

    let mut values = Vec::new();
    loop {
        cursor.skip_comments()?;
        if cursor.is_eof() {
            return Err(name_at.error(ScanErrorKind::UnexpectedEof("enum body")));
        }
        if cursor.eat("}") {
            if !cursor.eat(";") {
                return Err(cursor.error(ScanErrorKind::Expected("';'")));
            }
            break;
        }

        let value_name = cursor.read_token(",=}");
        if value_name.is_empty() {
            return Err(cursor.error(ScanErrorKind::Expected("enumerator name")));
        }

        let value = if cursor.eat("=") {
            let literal = cursor.read_value(",}");
            if literal.is_empty() {
                return Err(cursor.error(ScanErrorKind::Expected("enumerator value")));
            }
            EnumValue::explicit(value_name, literal)
        } else {
            EnumValue::auto(value_name)
        };
        values.push(value);

        cursor.skip_comments()?;
        if !cursor.eat(",") && !cursor.test("}") {
            return Err(cursor.error(ScanErrorKind::Expected("',' or '}'")));
        }
    }

    let enum_type = EnumType::new(
        namespaces.qualify(name),
        name,
        underlying_type,
        values,
        annotation,
    )
    .ok_or_else(|| name_at.error(ScanErrorKind::EmptyEnum(name.to_string())))?;

    Ok((enum_type, cursor))
}

/// `struct NAME { members };`, or a forward declaration `struct NAME;`
/// which yields no entry.
pub fn scan_struct<'a>(
    mut cursor: Cursor<'a>,
    namespaces: &NamespacePath,
) -> ScanResult<(Option<StructType>, Cursor<'a>)> {
    cursor.eat_keyword("struct");

    let name_at = cursor;
    let name = cursor.read_token("{;");
    if name.is_empty() {
        return Err(cursor.error(ScanErrorKind::Expected("struct name")));
    }

    if cursor.eat(";") {
        trace!(name, "skipped forward declaration");
        return Ok((None, cursor));
    }
    if !cursor.eat("{") {
        return Err(cursor.error(ScanErrorKind::Expected("'{' or ';'")));
    }

    let mut struct_type = StructType::new(namespaces.qualify(name), name);
    loop {
        cursor.skip_comments()?;
        if cursor.is_eof() {
            return Err(name_at.error(ScanErrorKind::UnexpectedEof("struct body")));
        }
        if cursor.eat("}") {
            if !cursor.eat(";") {
                return Err(cursor.error(ScanErrorKind::Expected("';'")));
            }
            break;
        }

        let (annotation, next) = scan_member_annotation(cursor)?;
        cursor = next;
        if annotation != MemberAnnotation::None && (cursor.is_eof() || cursor.test("}")) {
            return Err(misplaced(cursor, annotation.tag(), "the end of a struct body"));
        }

        let (members, next) = scan_member_declaration(cursor, name, annotation)?;
        struct_type.members.extend(members);
        cursor = next;
    }

    Ok((Some(struct_type), cursor))
}

/// Read the annotation lines in front of one member.
fn scan_member_annotation(mut cursor: Cursor<'_>) -> ScanResult<(MemberAnnotation, Cursor<'_>)> {
    let mut annotation = MemberAnnotation::None;

    while let Some(token) = cursor.take_annotation() {
        let parsed = match MemberAnnotation::from_tag(token.name) {
            Some(parsed) => parsed,
            None => {
                return Err(match GlobalAnnotation::from_tag(token.name) {
                    Some(global) => misplaced(token.at, global.tag(), "a struct member"),
                    None => token
                        .at
                        .error(ScanErrorKind::UnknownAnnotation(token.name.to_string())),
                });
            }
        };

        if annotation != MemberAnnotation::None {
            let kind = if annotation.is_text() && parsed.is_text() && annotation != parsed {
                ScanErrorKind::ConflictingTextAnnotation
            } else {
                ScanErrorKind::DuplicateAnnotation {
                    first: annotation.tag().to_string(),
                    second: parsed.tag().to_string(),
                }
            };
            return Err(token.at.error(kind));
        }

        annotation = parsed;
        cursor.skip_comments()?;
    }

    Ok((annotation, cursor))
}

/// One member declaration line: `TYPE NAME[N] [= value] [, NAME ...];` or a
/// callable `TYPE NAME(...)`, `NAME(...)`, `~NAME(...)`.
fn scan_member_declaration<'a>(
    mut cursor: Cursor<'a>,
    owner: &str,
    annotation: MemberAnnotation,
) -> ScanResult<(Vec<Member>, Cursor<'a>)> {
    let ty = cursor.read_token("(");
    if ty.is_empty() {
        return Err(cursor.error(ScanErrorKind::Expected("member type")));
    }

    let mut members = Vec::new();
    loop {
        let name_at = cursor;
        let mut name = cursor.read_token("([;,=").to_string();

        if is_operator_name(&name) {
            name.push_str(cursor.read_token("("));
            if !is_overloadable_operator(&name) {
                return Err(name_at.error(ScanErrorKind::UnknownOperator(name)));
            }
            if cursor.peek_non_ws() != Some('(') {
                return Err(cursor.error(ScanErrorKind::Expected("'('")));
            }
        }

        if cursor.peek_non_ws() == Some('(') {
            let kind = callable_kind(name_at, ty, &name, owner)?;
            if annotation.is_text() {
                return Err(misplaced(name_at, annotation.tag(), "a member function"));
            }
            cursor = skip_member_signature(cursor)?;
            members.push(Member {
                kind,
                ..Member::field(ty, name)
            });
            break;
        }

        if name.is_empty() {
            return Err(cursor.error(ScanErrorKind::Expected("member name")));
        }

        let mut member = Member {
            annotation,
            ..Member::field(ty, name)
        };

        if cursor.eat("[") {
            let length_at = cursor;
            let length = cursor.read_until_any("]");
            member.count = match length.parse::<i32>() {
                Ok(count) if count > 0 => count,
                _ => {
                    return Err(
                        length_at.error(ScanErrorKind::InvalidArrayLength(length.to_string()))
                    )
                }
            };
            if !cursor.eat("]") {
                return Err(cursor.error(ScanErrorKind::Expected("']'")));
            }
        }

        let chained = cursor.eat(",");
        if !chained {
            if cursor.eat("=") {
                member.default_value = cursor.read_until_any(";").to_string();
            }
            if !cursor.eat(";") {
                return Err(cursor.error(ScanErrorKind::Expected("';'")));
            }
        }

        check_text_annotation(name_at, owner, &member)?;
        if member.annotation != MemberAnnotation::Ignore {
            members.push(member);
        }

        if !chained {
            break;
        }
    }

    Ok((members, cursor))
}

fn callable_kind(at: Cursor<'_>, ty: &str, name: &str, owner: &str) -> ScanResult<MemberKind> {
    if !name.is_empty() {
        return Ok(MemberKind::Function);
    }

    let (kind, found) = match ty.strip_prefix('~') {
        Some(rest) => (MemberKind::Destructor, rest),
        None => (MemberKind::Constructor, ty),
    };
    if found != owner {
        return Err(at.error(ScanErrorKind::ConstructorNameMismatch {
            found: ty.to_string(),
            owner: owner.to_string(),
        }));
    }
    Ok(kind)
}

/// `char NAME[N]` needs exactly one of `String`/`Data`; nothing else takes either.
fn check_text_annotation(at: Cursor<'_>, owner: &str, member: &Member) -> ScanResult<()> {
    match (member.is_char_array(), member.annotation) {
        (true, MemberAnnotation::None) => Err(at.error(ScanErrorKind::MissingTextAnnotation(
            format!("{owner}::{}", member.name),
        ))),
        (false, annotation) if annotation.is_text() => Err(misplaced(
            at,
            annotation.tag(),
            "a member that is not a char array",
        )),
        _ => Ok(()),
    }
}

/// Skip a member function from its `(` through `;`, `= ...;` or its body.
fn skip_member_signature(mut cursor: Cursor<'_>) -> ScanResult<Cursor<'_>> {
    let start = cursor;
    cursor.eat("(");

    let mut depth = 1usize;
    while depth > 0 {
        match cursor.bump() {
            Some('(') => depth += 1,
            Some(')') => depth -= 1,
            Some(_) => {}
            None => return Err(start.error(ScanErrorKind::UnexpectedEof("parameter list"))),
        }
    }

    match cursor.skip_until_any(";{=") {
        Some(';') => {
            cursor.bump();
        }
        Some('=') => {
            if cursor.skip_until_any(";").is_none() {
                return Err(start.error(ScanErrorKind::UnexpectedEof("member function")));
            }
            cursor.bump();
        }
        Some(_) => {
            cursor = skip_body(cursor)?;
            cursor.eat(";");
        }
        None => return Err(start.error(ScanErrorKind::UnexpectedEof("member function"))),
    }

    Ok(cursor)
}

/// Skip a `{ ... }` body by brace depth. Braces inside literals and
/// comments are counted too.
pub fn skip_body(mut cursor: Cursor<'_>) -> ScanResult<Cursor<'_>> {
    let start = cursor;
    if !cursor.eat("{") {
        return Err(cursor.error(ScanErrorKind::Expected("'{'")));
    }

    let mut depth = 1usize;
    while depth > 0 {
        match cursor.skip_until_any("{}") {
            Some('{') => depth += 1,
            Some(_) => depth -= 1,
            None => return Err(start.error(ScanErrorKind::Unterminated("function body"))),
        }
        cursor.bump();
    }

    Ok(cursor)
}

/// `operator` alone or followed by the start of an operator symbol.
fn is_operator_name(name: &str) -> bool {
    name.strip_prefix("operator")
        .is_some_and(|rest| !rest.starts_with(is_identifier_char))
}

pub fn is_overloadable_operator(name: &str) -> bool {
    OVERLOADABLE_OPERATORS.contains(&name)
}

/// `[inline] RET NAME(params) ;|{body}`.
pub fn scan_function(mut cursor: Cursor<'_>) -> ScanResult<(FreeFunction, Cursor<'_>)> {
    cursor.skip_ws();
    let origin = cursor.location();

    cursor.eat_keyword("inline");
    let return_type = cursor.read_identifier();

    let name_at = cursor;
    let mut name = cursor.read_identifier().to_string();
    if name == "operator" {
        name.push_str(cursor.read_token("("));
        if !is_overloadable_operator(&name) {
            return Err(name_at.error(ScanErrorKind::UnknownOperator(name)));
        }
    }

    if !cursor.eat("(") {
        return Err(cursor.error(ScanErrorKind::Expected("'('")));
    }
    if name.is_empty() {
        return Err(name_at.error(ScanErrorKind::Expected("function name")));
    }

    let list = cursor.read_while(|c| c != ')');
    if !cursor.eat(")") {
        return Err(cursor.error(ScanErrorKind::Expected("')'")));
    }
    let parameters = list
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(parse_parameter)
        .collect();

    if !cursor.eat(";") {
        if !cursor.test("{") {
            return Err(cursor.error(ScanErrorKind::Expected("';' or '{'")));
        }
        cursor = skip_body(cursor)?;
    }

    let return_type = if return_type.is_empty() {
        "void"
    } else {
        return_type
    };

    Ok((
        FreeFunction {
            name,
            return_type: return_type.to_string(),
            parameters,
            origin,
        },
        cursor,
    ))
}

/// `[const] TYPE [&|*] NAME`.
pub fn parse_parameter(text: &str) -> Parameter {
    let mut cursor = Cursor::new(Path::new(""), text);

    let is_const = cursor.eat_keyword("const");
    let ty = cursor.read_token("*&").to_string();
    let modifier = if cursor.eat("&") {
        ParamModifier::Reference
    } else if cursor.eat("*") {
        ParamModifier::Pointer
    } else {
        ParamModifier::None
    };
    let name = cursor.read_token("").to_string();

    Parameter {
        name,
        ty,
        modifier,
        is_const,
    }
}
