//! Emission for enum types: flag operators, stringify, encode, decode, hash.

use super::writer::CodeWriter;
use crate::schema::EnumType;

/// Smallest buffer the generated decoder reads enumerator names into.
const MIN_NAME_BUFFER: usize = 64;

/// Forward declarations, plus the flag operators for `Flag` enums.
pub fn declare(w: &mut CodeWriter, e: &EnumType) {
    let name = &e.qualified_name;
    let ty = &e.underlying_type;

    w.section(format!("predef enum {name}"));

    if e.is_flag() {
        w.blank();
        for op in ["|", "&", "^"] {
            w.line(format!(
                "inline rose::BoolConvertible<{name}> operator{op}(const {name} &lhs, const {name} &rhs) \
                 {{ return {{ static_cast<{name}>(static_cast<{ty}>(lhs) {op} static_cast<{ty}>(rhs)) }}; }}"
            ));
        }
        for op in ["|", "&", "^"] {
            w.line(format!(
                "inline {name} operator{op}=({name} &lhs, {name} rhs) {{ return lhs = lhs {op} rhs; }}"
            ));
        }
    }

    w.line("namespace rose {");
    w.line(format!("inline const char * to_string(const {name} &e);"));
    w.line(format!("inline void serialize({name} &o, ISerializer &s);"));
    w.line(format!("inline void deserialize({name} &o, IDeserializer &s);"));
    w.line(format!("inline RHash hash(const {name} &o);"));
    w.line("} // namespace rose");
    w.blank();
}

/// Bodies of the four enum operations.
pub fn define(w: &mut CodeWriter, e: &EnumType) {
    let name = &e.qualified_name;

    w.section(format!("impl enum {name}"));

    w.line(format!("inline const char * rose::to_string(const {name} &e) {{"));
    w.line("  switch (e) {");
    for value in &e.values {
        let v = &value.name;
        w.line(format!("    case {name}::{v}: return \"{v}\";"));
    }
    w.line("    default: return \"<UNKNOWN>\";");
    w.line("  }");
    w.line("}");
    w.blank();

    w.line(format!("inline void rose::serialize({name} &o, ISerializer &s) {{"));
    w.line("  switch (o) {");
    for value in &e.values {
        let v = &value.name;
        w.lines([
            format!("    case {name}::{v}: {{"),
            format!("      char str[] = \"{v}\";"),
            "      serialize(str, s);".to_string(),
            "      break;".to_string(),
            "    }".to_string(),
        ]);
    }
    w.line("    default: /* unknown */ break;");
    w.line("  }");
    w.line("}");
    w.blank();

    w.line(format!("inline void rose::deserialize({name} &o, IDeserializer &s) {{"));
    w.line(format!("  char str[{}];", name_buffer_len(e)));
    w.line("  deserialize(str, s);");
    w.line("  RHash h = rose::hash(str);");
    w.line("  switch (h) {");
    for value in &e.values {
        let v = &value.name;
        w.line(format!("    case rose::hash(\"{v}\"): o = {name}::{v}; break;"));
    }
    w.line("    default: /* unknown value */ break;");
    w.line("  }");
    w.line("}");
    w.blank();

    w.line(format!("inline RHash rose::hash(const {name} &o) {{"));
    w.line("  return static_cast<RHash>(o);");
    w.line("}");
    w.blank();
}

/// Room for the longest enumerator name and its terminator.
fn name_buffer_len(e: &EnumType) -> usize {
    let longest = e.values.iter().map(|v| v.name.len()).max().unwrap_or(0);
    (longest + 1).max(MIN_NAME_BUFFER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EnumValue, GlobalAnnotation};

    fn direction(annotation: GlobalAnnotation) -> EnumType {
        EnumType::new(
            "rose::ecs::Direction",
            "Direction",
            Some("uint8_t".into()),
            vec![EnumValue::auto("up"), EnumValue::auto("down")],
            annotation,
        )
        .unwrap()
    }

    #[test]
    fn test_plain_enum_has_no_operators() {
        let mut w = CodeWriter::new();
        declare(&mut w, &direction(GlobalAnnotation::None));
        let text = w.finish();

        assert!(!text.contains("operator|"));
        assert!(text.contains("inline RHash hash(const rose::ecs::Direction &o);"));
    }

    #[test]
    fn test_flag_enum_operators_use_underlying_type() {
        let mut w = CodeWriter::new();
        declare(&mut w, &direction(GlobalAnnotation::Flag));
        let text = w.finish();

        assert!(text.contains(
            "rose::BoolConvertible<rose::ecs::Direction> operator&(const rose::ecs::Direction &lhs"
        ));
        assert!(text.contains("static_cast<uint8_t>(lhs) ^ static_cast<uint8_t>(rhs)"));
        assert!(text.contains(
            "inline rose::ecs::Direction operator|=(rose::ecs::Direction &lhs, rose::ecs::Direction rhs)"
        ));
    }

    #[test]
    fn test_bodies_cover_every_value() {
        let mut w = CodeWriter::new();
        define(&mut w, &direction(GlobalAnnotation::None));
        let text = w.finish();

        for v in ["up", "down"] {
            assert!(text.contains(&format!("case rose::ecs::Direction::{v}: return \"{v}\";")));
            assert!(text.contains(&format!("char str[] = \"{v}\";")));
            assert!(text.contains(&format!(
                "case rose::hash(\"{v}\"): o = rose::ecs::Direction::{v}; break;"
            )));
        }
        assert!(text.contains("default: return \"<UNKNOWN>\";"));
        assert!(text.contains("char str[64];"));
    }

    #[test]
    fn test_long_names_widen_decode_buffer() {
        let long = "X".repeat(80);
        let e = EnumType::new("E", "E", None, vec![EnumValue::auto(long)], GlobalAnnotation::None)
            .unwrap();
        assert_eq!(name_buffer_len(&e), 81);
    }
}
