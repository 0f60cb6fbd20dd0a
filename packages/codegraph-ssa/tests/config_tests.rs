//! Configuration: presets, YAML v1 files, and their effect on a build

mod common;

use std::io::Write;

use codegraph_ssa::config::{BuildConfig, ConfigError, Preset};
use codegraph_ssa::DiagnosticTag;
use common::*;
use tempfile::NamedTempFile;

fn yaml_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_yaml_file_applies_overrides() {
    let file = yaml_file(&fixture_yaml_config("strict", 8));
    let config = BuildConfig::from_yaml(file.path()).unwrap();

    assert_eq!(config.preset_kind(), Preset::Strict);
    assert_eq!(config.options().max_inheritance_depth, 8);
    assert_eq!(config.options().max_errors, 5);
    assert!(config.options().strict_mode);
}

#[test]
fn test_yaml_file_roundtrip() {
    let config = BuildConfig::preset(Preset::Lenient)
        .max_inheritance_depth(12)
        .fold_constants(false)
        .build()
        .unwrap();
    let file = yaml_file(&config.to_yaml().unwrap());

    let loaded = BuildConfig::from_yaml(file.path()).unwrap();
    assert_eq!(loaded.preset_kind(), Preset::Lenient);
    assert_eq!(loaded.options(), config.options());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = BuildConfig::from_yaml(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_out_of_range_depth_in_file_is_rejected() {
    let file = yaml_file(&fixture_yaml_config("balanced", 0));
    let err = BuildConfig::from_yaml(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::DepthOutOfRange { value: 0 }));
}

#[test]
fn test_depth_limit_from_file_reaches_blueprints() {
    let file = yaml_file(&fixture_yaml_config("balanced", 2));
    let config = BuildConfig::from_yaml(file.path()).unwrap();

    let unit = build_source_with(&fixture_class_chain(5), &config);
    assert_has_diagnostic(&unit, DiagnosticTag::InheritanceTooDeep);

    let unit = build_source_with(&fixture_class_chain(3), &config);
    assert_no_errors(&unit);
}

#[test]
fn test_folding_can_be_switched_off() {
    let config = BuildConfig::preset(Preset::Custom)
        .fold_constants(false)
        .build()
        .unwrap();
    let unit = build_source_with("export const x = 6 * 7;\n", &config);
    assert_renders(&unit, exported(&unit, "x"), "mul(6, 7)");
}

#[test]
fn test_strict_preset_stops_after_first_error() {
    let config = BuildConfig::preset(Preset::Strict).build().unwrap();
    let unit = build_source_with("const a;\nconst b;\nconst c;\n", &config);

    assert!(unit.is_stopped());
    assert_eq!(unit.errors().count(), 1);
    assert_has_diagnostic(&unit, DiagnosticTag::StopRequested);
}

#[test]
fn test_lenient_preset_never_stops() {
    let config = BuildConfig::preset(Preset::Lenient).build().unwrap();
    let unit = build_source_with("const a;\nconst b;\nconst c;\n", &config);

    assert!(!unit.is_stopped());
    assert_eq!(unit.errors().count(), 3);
}
