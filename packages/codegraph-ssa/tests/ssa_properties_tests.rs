//! SSA construction properties
//!
//! Trees are built directly so each test pins one shape of control flow.

mod common;

use codegraph_ssa::features::ssa::domain::UndefinedKind;
use codegraph_ssa::features::syntax::domain::ast::Expr;
use codegraph_ssa::{DiagnosticTag, ValueKind};
use common::*;

#[test]
fn test_if_else_merges_into_phi() {
    let unit = build(vec![
        let_("a", num(0)),
        if_else(
            Expr::ident("c"),
            vec![assign("a", num(1))],
            Some(vec![assign("a", num(2))]),
        ),
        export_let("r", Expr::ident("a")),
    ]);

    assert_no_errors(&unit);
    assert_renders(&unit, exported(&unit, "r"), "phi(a)[1,2]");
}

#[test]
fn test_same_value_on_every_edge_needs_no_phi() {
    let unit = build(vec![
        let_("a", num(1)),
        if_else(Expr::ident("c"), vec![assign("a", num(1))], None),
        export_let("r", Expr::ident("a")),
    ]);

    let r = exported(&unit, "r");
    assert_renders(&unit, r, "1");
    assert!(matches!(unit.value(r).map(|v| &v.kind), Some(ValueKind::Const(_))));
}

#[test]
fn test_untouched_variable_passes_through_branches() {
    let unit = build(vec![
        let_("a", num(3)),
        let_("b", num(0)),
        if_else(
            Expr::ident("c"),
            vec![assign("b", num(1))],
            Some(vec![assign("b", num(2))]),
        ),
        export_let("ra", Expr::ident("a")),
        export_let("rb", Expr::ident("b")),
    ]);

    assert_renders(&unit, exported(&unit, "ra"), "3");
    assert_renders(&unit, exported(&unit, "rb"), "phi(b)[1,2]");
}

#[test]
fn test_else_if_chain_has_one_operand_per_arm() {
    let unit = build(vec![
        let_("a", num(0)),
        if_chain("a", &[1, 2, 3]),
        export_let("r", Expr::ident("a")),
    ]);

    let text = unit.render(exported(&unit, "r"));
    for value in ["1", "2", "3"] {
        assert!(text.contains(value), "{} is missing {}", text, value);
    }
    assert!(text.starts_with("phi(a)"), "{}", text);
}

#[test]
fn test_loop_counter_is_header_phi() {
    let unit = build(vec![for_let(
        "i",
        0,
        10,
        vec![call_stmt("use", vec![Expr::ident("i")])],
    )]);

    let calls = unit.calls_to("use");
    assert_eq!(calls.len(), 1);
    let text = unit.render(calls[0][0]);
    assert!(text.starts_with("phi(i)[0,"), "{}", text);
    assert!(text.contains("add(i, 1)"), "{}", text);
}

#[test]
fn test_loop_header_has_preheader_and_latch() {
    let unit = build(vec![for_let("i", 0, 3, vec![])]);
    let main = unit.main_function().unwrap();
    let headers: Vec<_> = main
        .blocks
        .iter()
        .filter(|&&b| unit.predecessors(b).len() == 2)
        .collect();
    assert!(!headers.is_empty());
}

#[test]
fn test_loop_without_writes_reads_preheader_value() {
    let unit = build(vec![
        let_("k", num(7)),
        for_let("i", 0, 3, vec![call_stmt("use", vec![Expr::ident("k")])]),
    ]);

    let calls = unit.calls_to("use");
    assert_renders(&unit, calls[0][0], "7");
}

#[test]
fn test_read_before_any_write_is_named_undefined() {
    let unit = build(vec![export_let("r", Expr::ident("ghost"))]);

    let r = exported(&unit, "r");
    assert_renders(&unit, r, "Undefined-ghost");
    assert!(matches!(
        unit.value(r).map(|v| &v.kind),
        Some(ValueKind::Undefined(UndefinedKind::Default))
    ));
}

#[test]
fn test_assignment_result_reaches_member_call() {
    // let x = 1; let y = (x = 42); console.log(x, y);
    let unit = build(vec![
        let_("x", num(1)),
        let_("y", assign_expr("x", num(42))),
        call_stmt("console.log", vec![Expr::ident("x"), Expr::ident("y")]),
    ]);

    let calls = unit.calls_to("console.log");
    assert_eq!(calls.len(), 1);
    let rendered: Vec<String> = calls[0].iter().map(|&arg| unit.render(arg)).collect();
    assert_eq!(rendered, vec!["42".to_string(), "42".to_string()]);
}

#[test]
fn test_destructuring_default_applies_only_when_missing() {
    let unit = build(vec![
        let_object_default("a", num(1), object(vec![])),
        let_object_default("b", num(5), object(vec![("b", num(0))])),
        export_let("ra", Expr::ident("a")),
        export_let("rb", Expr::ident("b")),
    ]);

    assert_renders(&unit, exported(&unit, "ra"), "1");
    assert_renders(&unit, exported(&unit, "rb"), "0");
}

#[test]
fn test_assignment_expression_yields_assigned_value() {
    let unit = build(vec![
        let_("a", num(0)),
        export_let("r", assign_expr("a", num(9))),
        export_let("after", Expr::ident("a")),
    ]);

    assert_renders(&unit, exported(&unit, "r"), "9");
    assert_renders(&unit, exported(&unit, "after"), "9");
}

#[test]
fn test_inheritance_stays_acyclic() {
    let unit = build(vec![
        class_decl("A", Some("B"), &["a"]),
        class_decl("B", Some("A"), &["b"]),
    ]);

    assert_has_diagnostic(&unit, DiagnosticTag::CircularInheritance);
    let a = unit.get_blueprint("A").unwrap();
    let b = unit.get_blueprint("B").unwrap();
    let (linked, rejected) = match (a.parents.is_empty(), b.parents.is_empty()) {
        (false, true) => (a, b),
        (true, false) => (b, a),
        other => panic!("expected exactly one link, got {:?}", other),
    };

    // The rejected side keeps only its own members
    assert_eq!(rejected.normal_methods.len(), 1);
    assert_eq!(linked.normal_methods.len(), 2);
}

#[test]
fn test_forward_parent_reference() {
    let unit = build(vec![
        class_decl("Child", Some("Base"), &["own"]),
        class_decl("Base", None, &["inherited"]),
    ]);

    assert_no_errors(&unit);
    assert_eq!(parent_names(&unit, "Child"), vec!["Base".to_string()]);
    let child = unit.get_blueprint("Child").unwrap();
    assert!(child.normal_methods.contains_key("own"));
    assert!(child.normal_methods.contains_key("inherited"));
    assert_eq!(unit.blueprints().len(), 2);
}

#[test]
fn test_unknown_parent_becomes_skeleton() {
    let unit = build(vec![class_decl("Child", Some("Elsewhere"), &["m"])]);

    assert_eq!(parent_names(&unit, "Child"), vec!["Elsewhere".to_string()]);
    assert!(unit.get_blueprint("Elsewhere").is_some());
}
