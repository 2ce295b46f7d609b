//! Property-based tests for schemac-cli.
//!
//! Properties tested:
//! - CLI arguments override exactly the settings they name
//! - Plain input entries resolve in the order given, first occurrence wins
//! - Scan order follows input order across units

use proptest::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use schemac_cli::{
    config::{CliArgs, Config, ConfigManager},
    inputs::InputResolver,
    pipeline::Pipeline,
};

// =============================================================================
// Generators for property tests
// =============================================================================

fn arb_include() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,8}\\.h", 0..4)
}

fn arb_path() -> impl Strategy<Value = Option<PathBuf>> {
    prop::option::of("[a-z]{1,8}/[a-z]{1,8}\\.(h|json)".prop_map(PathBuf::from))
}

fn arb_config() -> impl Strategy<Value = Config> {
    (arb_include(), arb_path(), arb_path(), any::<bool>()).prop_map(
        |(include, file, json, banner)| {
            let mut config = Config::default();
            config.input.include = include;
            config.output.file = file;
            config.output.json = json;
            config.output.banner = banner;
            config
        },
    )
}

// =============================================================================
// Config merging
// =============================================================================

proptest! {
    #[test]
    fn prop_cli_args_take_precedence(
        config in arb_config(),
        include in arb_include(),
        output in arb_path(),
        json in arb_path(),
        banner in prop::option::of(any::<bool>()),
    ) {
        let args = CliArgs {
            include: include.clone(),
            output: output.clone(),
            json: json.clone(),
            banner,
        };
        let merged = ConfigManager::merge_cli_args(config.clone(), &args);

        let expected_include = if include.is_empty() { config.input.include } else { include };
        prop_assert_eq!(merged.input.include, expected_include);
        prop_assert_eq!(merged.output.file, output.or(config.output.file));
        prop_assert_eq!(merged.output.json, json.or(config.output.json));
        prop_assert_eq!(merged.output.banner, banner.unwrap_or(config.output.banner));
    }
}

// =============================================================================
// Input order
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_plain_entries_keep_order(picks in prop::collection::vec(0usize..6, 1..12)) {
        let dir = TempDir::new().unwrap();
        let names: Vec<String> = (0..6).map(|i| format!("unit{i}.h")).collect();
        for (i, name) in names.iter().enumerate() {
            fs::write(dir.path().join(name), format!("struct S{i} {{ int v; }};\n")).unwrap();
        }

        let entries: Vec<String> = picks.iter().map(|&i| names[i].clone()).collect();
        let resolved = InputResolver::new()
            .with_base(dir.path())
            .resolve(&entries)
            .unwrap();

        let mut expected = Vec::new();
        for entry in &entries {
            let path = dir.path().join(entry);
            if !expected.contains(&path) {
                expected.push(path);
            }
        }
        prop_assert_eq!(&resolved, &expected);

        // The schema lists structs in the same order.
        let mut config = Config::default();
        config.input.include = entries;
        let (_, compilation) = Pipeline::new(config)
            .with_base(dir.path())
            .compile()
            .unwrap();

        let structs: Vec<String> = compilation
            .schema
            .structs
            .iter()
            .map(|s| s.name.clone())
            .collect();
        let expected_structs: Vec<String> = expected
            .iter()
            .map(|p| {
                let stem = p.file_stem().unwrap().to_string_lossy();
                format!("S{}", stem.trim_start_matches("unit"))
            })
            .collect();
        prop_assert_eq!(structs, expected_structs);
    }
}
