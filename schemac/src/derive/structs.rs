//! Emission for struct types: equality, encode, decode, hash and the type
//! descriptor.

use super::writer::CodeWriter;
use crate::error::GenerateError;
use crate::overload::Overloads;
use crate::schema::{Member, MemberAnnotation, Schema, StructType};

/// A struct together with what the user already defined for it.
#[derive(Debug, Clone, Copy)]
pub struct StructPlan<'a> {
    pub ty: &'a StructType,
    pub overloads: Overloads,
}

impl<'a> StructPlan<'a> {
    pub fn new(schema: &Schema, ty: &'a StructType) -> Result<Self, GenerateError> {
        if let Some(member) = ty
            .fields()
            .find(|m| m.is_char_array() && !m.annotation.is_text())
        {
            return Err(GenerateError::UnannotatedCharArray {
                type_name: ty.qualified_name.clone(),
                member: member.name.clone(),
            });
        }

        Ok(Self {
            ty,
            overloads: Overloads::detect(schema, &ty.qualified_name)?,
        })
    }
}

pub fn declare(w: &mut CodeWriter, plan: &StructPlan<'_>) {
    let name = &plan.ty.qualified_name;

    w.section(format!("predef struct {name}"));
    w.line("namespace rose {");

    if !plan.overloads.has_equality() {
        w.line(format!("inline bool equals(const {name} &lhs, const {name} &rhs);"));
        w.line(format!(
            "inline bool operator==(const {name} &lhs, const {name} &rhs) {{ return equals(lhs, rhs); }}"
        ));
        w.line(format!(
            "inline bool operator!=(const {name} &lhs, const {name} &rhs) {{ return !equals(lhs, rhs); }}"
        ));
    }
    if !plan.overloads.has_serialize {
        w.line(format!("inline void serialize({name} &o, ISerializer &s);"));
    }
    if !plan.overloads.has_deserialize {
        w.line(format!("inline void deserialize({name} &o, IDeserializer &s);"));
    }
    w.line(format!("inline RHash hash(const {name} &o);"));
    w.blank();

    w.line("template <>");
    w.line(format!("struct type_id<{name}>;"));
    w.line("template <>");
    w.line(format!(
        "inline const reflection::TypeInfo & reflection::get_type_info<{name}>();"
    ));
    w.line("} // namespace rose");
    w.blank();
}

pub fn define(w: &mut CodeWriter, plan: &StructPlan<'_>) {
    let ty = plan.ty;

    w.section(format!("impl struct {}", ty.qualified_name));

    if !plan.overloads.has_equality() {
        write_equals(w, ty);
    }
    if !plan.overloads.has_serialize {
        write_serialize(w, ty);
    }
    if !plan.overloads.has_deserialize {
        write_deserialize(w, ty);
    }
    write_hash(w, ty);
    write_type_info(w, ty);
}

fn write_equals(w: &mut CodeWriter, ty: &StructType) {
    let name = &ty.qualified_name;

    w.line(format!(
        "inline bool rose::equals(const {name} &lhs, const {name} &rhs) {{"
    ));

    let terms: Vec<String> = ty
        .fields()
        .map(|m| format!("rose::schemac_equals(lhs.{0}, rhs.{0})", m.name))
        .collect();

    if terms.is_empty() {
        w.line("  return true;");
    } else {
        w.line("  return");
        let last = terms.len() - 1;
        for (i, term) in terms.iter().enumerate() {
            let tail = if i == last { ";" } else { " &&" };
            w.line(format!("    {term}{tail}"));
        }
    }

    w.line("}");
    w.blank();
}

/// The encode call for one member.
fn encode_call(member: &Member) -> String {
    let field = &member.name;
    if member.is_char_array() && member.annotation == MemberAnnotation::String {
        format!("serialize(o.{field}, s, std::strlen(o.{field}));")
    } else {
        format!("serialize(o.{field}, s);")
    }
}

fn write_serialize(w: &mut CodeWriter, ty: &StructType) {
    let name = &ty.qualified_name;

    w.line(format!("inline void rose::serialize({name} &o, ISerializer &s) {{"));
    w.line(format!(
        "  if (s.node_begin(\"{name}\", rose::hash(\"{name}\"), &o)) {{"
    ));
    for member in ty.fields() {
        w.line(format!("    s.key(\"{}\");", member.name));
        w.line(format!("    {}", encode_call(member)));
    }
    w.line("    s.node_end();");
    w.line("  }");
    w.line("  s.end();");
    w.line("}");
    w.blank();
}

fn write_deserialize(w: &mut CodeWriter, ty: &StructType) {
    let name = &ty.qualified_name;

    w.line(format!(
        "inline void rose::deserialize({name} &o, IDeserializer &s) {{"
    ));
    w.line("  while (s.next_key()) {");
    w.line("    switch (s.hash_key()) {");
    for member in ty.fields() {
        let field = &member.name;
        w.line(format!("      case rose::hash(\"{field}\"):"));
        w.line(format!("        deserialize(o.{field}, s);"));
        w.line("        break;");
    }
    w.line("      default: s.skip_key(); break;");
    w.line("    }");
    w.line("  }");
    w.line("}");
    w.blank();
}

fn write_hash(w: &mut CodeWriter, ty: &StructType) {
    w.line(format!(
        "inline RHash rose::hash(const {} &o) {{",
        ty.qualified_name
    ));
    w.line("  RHash h = 0;");
    for (i, member) in ty.fields().enumerate() {
        if i != 0 {
            w.line("  h = rose::xor64(h);");
        }
        w.line(format!("  h ^= rose::schemac_hash(o.{});", member.name));
    }
    w.line("  return h;");
    w.line("}");
    w.blank();
}

fn write_type_info(w: &mut CodeWriter, ty: &StructType) {
    let name = &ty.qualified_name;
    let short = &ty.name;
    let identity = ty.type_identity();

    w.line("template <>");
    w.line(format!("struct rose::type_id<{name}> {{"));
    w.line(format!("  inline static RHash VALUE = {identity}ULL;"));
    w.line("};");
    w.blank();

    w.line("template <>");
    w.line(format!(
        "inline const rose::reflection::TypeInfo & rose::reflection::get_type_info<{name}>() {{"
    ));
    w.lines([
        "  static rose::reflection::TypeInfo info = {".to_string(),
        format!("    /*            unique_id */ rose::hash(\"{name}\"),"),
        format!("    /*          member_hash */ {identity}ULL,"),
        format!("    /*     memory_footprint */ sizeof({name}),"),
        format!("    /*     memory_alignment */ alignof({name}),"),
        format!("    /*                 name */ \"{name}\","),
        format!("    /* fp_default_construct */ +[](void * ptr) {{ new (ptr) {name}(); }},"),
        format!(
            "    /*  fp_default_destruct */ +[](void * ptr) {{ std::launder(reinterpret_cast<{name}*>(ptr))->~{short}(); }},"
        ),
        format!(
            "    /*         fp_serialize */ +[](void * ptr, ISerializer & s) {{ ::rose::serialize(*std::launder(reinterpret_cast<{name}*>(ptr)), s); }},"
        ),
        format!(
            "    /*       fp_deserialize */ +[](void * ptr, IDeserializer & d) {{ ::rose::deserialize(*std::launder(reinterpret_cast<{name}*>(ptr)), d); }}"
        ),
        "  };".to_string(),
        "  return info;".to_string(),
        "}".to_string(),
    ]);
    w.blank();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan;
    use crate::source::SourceFile;

    fn schema(src: &str) -> Schema {
        let mut schema = Schema::new();
        scan(&mut schema, &SourceFile::new("structs.h", src)).unwrap();
        schema
    }

    fn define_first(schema: &Schema) -> String {
        let plan = StructPlan::new(schema, &schema.structs[0]).unwrap();
        let mut w = CodeWriter::new();
        define(&mut w, &plan);
        w.finish()
    }

    #[test]
    fn test_camera_bodies() {
        let schema = schema("struct Camera { int x; int y; int z; };");
        let text = define_first(&schema);

        assert!(text.contains(
            "  return\n\
             \x20   rose::schemac_equals(lhs.x, rhs.x) &&\n\
             \x20   rose::schemac_equals(lhs.y, rhs.y) &&\n\
             \x20   rose::schemac_equals(lhs.z, rhs.z);\n"
        ));
        for field in ["x", "y", "z"] {
            assert!(text.contains(&format!("    s.key(\"{field}\");\n    serialize(o.{field}, s);")));
            assert!(text.contains(&format!("      case rose::hash(\"{field}\"):")));
        }
        assert_eq!(text.matches("h = rose::xor64(h);").count(), 2);
        assert!(text.contains(&format!(
            "inline static RHash VALUE = {}ULL;",
            schema.structs[0].type_identity()
        )));
        assert!(text.contains("alignof(Camera)"));
        assert!(text.contains("->~Camera();"));
    }

    #[test]
    fn test_decode_skips_unknown_keys() {
        let schema = schema("struct Camera { int x; int y; };");
        let text = define_first(&schema);

        let start = text
            .find("inline void rose::deserialize(Camera &o, IDeserializer &s) {")
            .unwrap();
        let end = start + text[start..].find("\n}\n").unwrap() + 3;
        assert_eq!(
            &text[start..end],
            "inline void rose::deserialize(Camera &o, IDeserializer &s) {\n\
             \x20 while (s.next_key()) {\n\
             \x20   switch (s.hash_key()) {\n\
             \x20     case rose::hash(\"x\"):\n\
             \x20       deserialize(o.x, s);\n\
             \x20       break;\n\
             \x20     case rose::hash(\"y\"):\n\
             \x20       deserialize(o.y, s);\n\
             \x20       break;\n\
             \x20     default: s.skip_key(); break;\n\
             \x20   }\n\
             \x20 }\n\
             }\n"
        );
    }

    #[test]
    fn test_string_and_data_arrays() {
        let schema = schema(
            "struct Named {\n  //@String\n  char name[64];\n  //@Data\n  char blob[16];\n};",
        );
        let text = define_first(&schema);

        assert!(text.contains("serialize(o.name, s, std::strlen(o.name));"));
        assert!(text.contains("serialize(o.blob, s);"));
    }

    #[test]
    fn test_functions_and_ignored_fields_are_left_out() {
        let schema = schema(
            "struct T {\n  int a;\n  //@Ignore\n  int cache;\n  int get() { return a; }\n  T() {}\n};",
        );
        let text = define_first(&schema);

        assert!(!text.contains("cache"));
        assert!(!text.contains("lhs.get"));
        assert!(text.contains("rose::schemac_equals(lhs.a, rhs.a);"));
        assert!(!text.contains("xor64"));
    }

    #[test]
    fn test_empty_struct() {
        let schema = schema("struct Empty {};");
        let text = define_first(&schema);

        assert!(text.contains("{\n  return true;\n}"));
        assert!(text.contains("  RHash h = 0;\n  return h;"));
    }

    #[test]
    fn test_user_overloads_suppress_generation() {
        let schema = schema(
            "struct Camera { int x; };\n\
             bool operator==(const Camera & lhs, const Camera & rhs);\n\
             bool operator!=(const Camera & lhs, const Camera & rhs);\n\
             void serialize(Camera & o, ISerializer & s);\n",
        );
        let plan = StructPlan::new(&schema, &schema.structs[0]).unwrap();

        let mut w = CodeWriter::new();
        declare(&mut w, &plan);
        define(&mut w, &plan);
        let text = w.finish();

        assert!(!text.contains("equals("));
        assert!(!text.contains("rose::serialize(Camera &o"));
        assert!(text.contains("inline void rose::deserialize(Camera &o, IDeserializer &s)"));
        assert!(text.contains("inline RHash rose::hash(const Camera &o)"));
    }

    #[test]
    fn test_unannotated_char_array_is_rejected() {
        let mut schema = Schema::new();
        let mut ty = StructType::new("S", "S");
        ty.members.push(Member {
            count: 8,
            ..Member::field("char", "name")
        });
        schema.structs.push(ty);

        let err = StructPlan::new(&schema, &schema.structs[0]).unwrap_err();
        assert_eq!(
            err,
            GenerateError::UnannotatedCharArray {
                type_name: "S".into(),
                member: "name".into()
            }
        );
    }
}
