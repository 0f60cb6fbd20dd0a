//! Custom assertions for test verification
//!
//! This module provides domain-specific assertions for codegraph-ssa testing.

use codegraph_ssa::{DiagnosticTag, SsaUnit, ValueId};
use pretty_assertions::assert_eq;

/// Assert that the unit reported no error diagnostics
pub fn assert_no_errors(unit: &SsaUnit) {
    let errors: Vec<String> = unit.errors().map(|d| d.to_string()).collect();
    assert!(errors.is_empty(), "Expected no errors, got: {:#?}", errors);
}

/// Assert that some diagnostic carries `tag`
pub fn assert_has_diagnostic(unit: &SsaUnit, tag: DiagnosticTag) {
    assert!(
        unit.diagnostics().iter().any(|d| d.tag == tag),
        "Expected a {:?} diagnostic, got: {:#?}",
        tag,
        unit.diagnostics()
    );
}

/// Assert the stable text form of a value
pub fn assert_renders(unit: &SsaUnit, value: ValueId, expected: &str) {
    assert_eq!(unit.render(value), expected);
}

/// Exported value by name, failing the test when absent
pub fn exported(unit: &SsaUnit, name: &str) -> ValueId {
    match unit.read_exported_value(name) {
        Some(value) => value,
        None => panic!("`{}` is not exported; exports: {:?}", name, unit.exports().values.keys().collect::<Vec<_>>()),
    }
}

/// Names of a blueprint's direct parents
pub fn parent_names(unit: &SsaUnit, name: &str) -> Vec<String> {
    let Some(bp) = unit.get_blueprint(name) else {
        panic!("no blueprint `{}`", name);
    };
    bp.parents
        .iter()
        .filter_map(|&p| unit.blueprints().get(p).map(|b| b.name.clone()))
        .collect()
}
