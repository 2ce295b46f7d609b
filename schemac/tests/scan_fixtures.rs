//! Integration tests running whole fixture headers through the compiler.

use std::fs;
use std::path::PathBuf;

use schemac::{
    compile, CompileError, GenerateError, GenerateOptions, GlobalAnnotation, MemberAnnotation,
    MemberKind, ScanErrorKind, Session, SourceFile,
};

/// Get the path to test fixtures.
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load(name: &str) -> SourceFile {
    let path = fixtures_path().join(name);
    let content = fs::read_to_string(&path).unwrap();
    SourceFile::new(path, content)
}

// =============================================================================
// Scanning
// =============================================================================

#[test]
fn test_scene_schema() {
    let mut session = Session::new();
    session.scan(&load("scene.h")).unwrap();
    let schema = session.schema();

    let enums: Vec<_> = schema.enums.iter().map(|e| e.qualified_name.as_str()).collect();
    assert_eq!(enums, ["enum_test", "enum_test2", "rose::ecs::Direction"]);

    let structs: Vec<_> = schema
        .structs
        .iter()
        .map(|s| s.qualified_name.as_str())
        .collect();
    assert_eq!(structs, ["Camera", "Transform", "Scene", "rose::ecs::Button"]);

    let functions: Vec<_> = schema.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        functions,
        ["serialize_camera", "compare", "operator==", "operator!="]
    );
}

#[test]
fn test_scene_enum_details() {
    let mut session = Session::new();
    session.scan(&load("scene.h")).unwrap();
    let schema = session.schema();

    let first = &schema.enums[0];
    assert_eq!(first.underlying_type, "long long");
    assert_eq!(first.values.len(), 6);

    let second = &schema.enums[1];
    assert_eq!(second.underlying_type, "int");
    assert_eq!(second.values[0].value, "0");
    assert_eq!(second.values[3].value, "1<<4");
    assert_eq!(second.values[4].value, "42");

    let direction = schema.find_enum("rose::ecs::Direction").unwrap();
    assert_eq!(direction.annotation, GlobalAnnotation::Flag);
    assert_eq!(direction.default_value, "NONE");
}

#[test]
fn test_scene_struct_details() {
    let mut session = Session::new();
    session.scan(&load("scene.h")).unwrap();
    let schema = session.schema();

    let transform = schema.find_struct("Transform").unwrap();
    let fields: Vec<_> = transform.fields().map(|m| m.name.as_str()).collect();
    assert_eq!(fields, ["name", "camera", "position"]);
    assert_eq!(transform.members[0].annotation, MemberAnnotation::String);
    assert_eq!(transform.members[0].default_value, "\"Hello\"");

    let kinds: Vec<_> = transform
        .members
        .iter()
        .filter(|m| !m.is_field())
        .map(|m| m.kind)
        .collect();
    assert_eq!(
        kinds,
        [
            MemberKind::Function,
            MemberKind::Constructor,
            MemberKind::Destructor
        ]
    );

    let scene = schema.find_struct("Scene").unwrap();
    assert_eq!(scene.members[0].count, 16);

    assert!(schema.find_struct("NotScanned").is_none());
    assert!(schema.find_struct("vector3").is_none());
}

#[test]
fn test_function_origins_point_into_the_fixture() {
    let source = load("scene.h");
    let mut session = Session::new();
    session.scan(&source).unwrap();

    for function in &session.schema().functions {
        assert_eq!(function.origin.path, source.path);
        let line = source.content.lines().nth(function.origin.line - 1).unwrap();
        assert!(
            line.contains(function.name.trim_start_matches("operator")),
            "{} not on line {}",
            function.name,
            function.origin.line
        );
    }
}

// =============================================================================
// Generation
// =============================================================================

#[test]
fn test_scene_generation() {
    let source = load("scene.h");
    let output = compile([&source], &GenerateOptions::new()).unwrap().output;

    // Transform brings its own comparison operators.
    assert!(!output.contains("inline bool rose::equals(const Transform &lhs"));
    assert!(output.contains("inline bool rose::equals(const Camera &lhs"));
    assert!(output.contains("inline void rose::serialize(Transform &o, ISerializer &s)"));

    // `serialize_camera` is not an overload of `serialize`.
    assert!(output.contains("inline void rose::serialize(Camera &o, ISerializer &s)"));

    assert!(output.contains("serialize(o.name, s, std::strlen(o.name));"));
    assert!(!output.contains("interpolated_position"));
    assert!(output.contains("operator|(const rose::ecs::Direction &lhs"));
    assert!(output.contains("->~Button();"));
}

#[test]
fn test_type_identity_matches_between_runs() {
    let first = compile([&load("scene.h")], &GenerateOptions::new()).unwrap();
    let second = compile([&load("scene.h")], &GenerateOptions::new()).unwrap();

    assert_eq!(first.output, second.output);
    for (a, b) in first.schema.structs.iter().zip(&second.schema.structs) {
        assert_eq!(a.type_identity(), b.type_identity());
    }
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_unannotated_char_array_fails() {
    let err = compile([&load("broken_annotation.h")], &GenerateOptions::new()).unwrap_err();
    match err {
        CompileError::Scan(err) => {
            assert_eq!(
                err.kind,
                ScanErrorKind::MissingTextAnnotation("Broken::label".into())
            );
            assert_eq!(err.location.line, 3);
            assert!(err.to_string().contains("broken_annotation.h(3)"));
        }
        other => panic!("expected scan error, got {other:?}"),
    }
}

#[test]
fn test_asymmetric_equality_fails() {
    let err = compile([&load("asymmetric.h")], &GenerateOptions::new()).unwrap_err();
    match err {
        CompileError::Generate(GenerateError::AsymmetricEquality {
            type_name,
            location,
            ..
        }) => {
            assert_eq!(type_name, "Vec2");
            assert_eq!(location.line, 6);
        }
        other => panic!("expected generate error, got {other:?}"),
    }
}

#[test]
fn test_schema_round_trips_through_json() {
    let compilation = compile([&load("scene.h")], &GenerateOptions::new()).unwrap();

    let json = serde_json::to_string_pretty(&compilation.schema).unwrap();
    assert!(json.contains("\"type\": \"char\""));

    let back: schemac::Schema = serde_json::from_str(&json).unwrap();
    assert_eq!(back, compilation.schema);
}
