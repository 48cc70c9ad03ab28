//! Sum injections, variant literals, and list forms, including the
//! ambiguity rules and their ambiguous-as-bottom escape hatch.

use lumen_syntax::{Decl, Expr, FunDecl, Param, Pattern, Program, TypeExpr};
use lumen_typeck::error::ErrorKind;
use lumen_typeck::TypeckResult;

fn check(program: &Program) -> TypeckResult {
    lumen_typeck::check(program)
}

fn program_with(flags: &[&str], return_ty: TypeExpr, body: Expr) -> Program {
    let mut extensions = vec!["sum-types", "variants", "lists"];
    extensions.extend_from_slice(flags);
    Program::new(
        extensions,
        vec![Decl::Fun(FunDecl::new(
            "main",
            vec![Param::new("x", TypeExpr::Nat)],
            return_ty,
            body,
        ))],
    )
}

fn assert_ok(program: &Program) {
    let result = check(program);
    assert!(result.is_ok(), "expected no diagnostics, got {:?}", result.diagnostics);
}

fn first_kind(program: &Program) -> ErrorKind {
    check(program).first().expect("expected a diagnostic").kind
}

// ── Sums ────────────────────────────────────────────────────────────────

#[test]
fn injections_check_against_a_sum_type() {
    let sum = TypeExpr::sum(TypeExpr::Nat, TypeExpr::Bool);
    assert_ok(&program_with(&[], sum.clone(), Expr::inl(Expr::var("x"))));
    assert_ok(&program_with(&[], sum, Expr::inr(Expr::bool(true))));
}

#[test]
fn injection_payload_is_checked_against_the_side() {
    let sum = TypeExpr::sum(TypeExpr::Nat, TypeExpr::Bool);
    assert_eq!(
        first_kind(&program_with(&[], sum, Expr::inl(Expr::bool(true)))),
        ErrorKind::UnexpectedTypeForExpression
    );
}

#[test]
fn injection_without_an_expected_type_is_ambiguous() {
    let body = Expr::let_(Pattern::var("s"), Expr::inl(Expr::var("x")), Expr::int(0));
    assert_eq!(
        first_kind(&program_with(&[], TypeExpr::Nat, body)),
        ErrorKind::AmbiguousSumType
    );
}

#[test]
fn ambiguous_injection_becomes_bottom_under_the_flag() {
    let body = Expr::let_(Pattern::var("s"), Expr::inl(Expr::var("x")), Expr::int(0));
    assert_ok(&program_with(
        &["ambiguous-type-as-bottom", "bottom-type"],
        TypeExpr::Nat,
        body,
    ));
}

#[test]
fn injection_against_a_non_sum() {
    assert_eq!(
        first_kind(&program_with(&[], TypeExpr::Nat, Expr::inl(Expr::var("x")))),
        ErrorKind::UnexpectedInjection
    );
}

// ── Variants ────────────────────────────────────────────────────────────

fn option_nat() -> TypeExpr {
    TypeExpr::variant(vec![("some", Some(TypeExpr::Nat)), ("none", None)])
}

#[test]
fn variant_literal_with_a_known_label() {
    assert_ok(&program_with(
        &["nullary-variant-labels"],
        option_nat(),
        Expr::variant("some", Some(Expr::var("x"))),
    ));
    assert_ok(&program_with(
        &["nullary-variant-labels"],
        option_nat(),
        Expr::variant("none", None),
    ));
}

#[test]
fn variant_label_must_exist_in_the_expected_type() {
    assert_eq!(
        first_kind(&program_with(
            &[],
            option_nat(),
            Expr::variant("many", Some(Expr::var("x"))),
        )),
        ErrorKind::UnexpectedVariantLabel
    );
}

#[test]
fn variant_payload_is_checked() {
    assert_eq!(
        first_kind(&program_with(
            &[],
            option_nat(),
            Expr::variant("some", Some(Expr::bool(true))),
        )),
        ErrorKind::UnexpectedTypeForExpression
    );
}

#[test]
fn variant_without_an_expected_type_is_ambiguous() {
    let body = Expr::let_(
        Pattern::var("v"),
        Expr::variant("some", Some(Expr::var("x"))),
        Expr::int(0),
    );
    assert_eq!(
        first_kind(&program_with(&[], TypeExpr::Nat, body)),
        ErrorKind::AmbiguousVariantType
    );
}

#[test]
fn variant_against_a_non_variant() {
    assert_eq!(
        first_kind(&program_with(
            &[],
            TypeExpr::Nat,
            Expr::variant("some", Some(Expr::var("x"))),
        )),
        ErrorKind::UnexpectedVariant
    );
}

#[test]
fn duplicate_labels_in_a_variant_type_annotation() {
    let bad = TypeExpr::variant(vec![("a", Some(TypeExpr::Nat)), ("a", Some(TypeExpr::Bool))]);
    assert_eq!(
        first_kind(&program_with(&[], bad, Expr::variant("a", Some(Expr::var("x"))))),
        ErrorKind::DuplicateVariantTypeFields
    );
}

// ── Lists ───────────────────────────────────────────────────────────────

#[test]
fn list_literal_against_a_list_type() {
    assert_ok(&program_with(
        &[],
        TypeExpr::list(TypeExpr::Nat),
        Expr::list(vec![Expr::var("x"), Expr::int(2)]),
    ));
}

#[test]
fn empty_list_against_a_list_type() {
    assert_ok(&program_with(&[], TypeExpr::list(TypeExpr::Nat), Expr::list(vec![])));
}

#[test]
fn empty_list_without_an_expected_type_is_ambiguous() {
    let body = Expr::let_(Pattern::var("l"), Expr::list(vec![]), Expr::int(0));
    assert_eq!(
        first_kind(&program_with(&[], TypeExpr::Nat, body)),
        ErrorKind::AmbiguousList
    );
}

#[test]
fn ambiguous_empty_list_becomes_list_of_bottom_under_the_flag() {
    let body = Expr::let_(Pattern::var("l"), Expr::list(vec![]), Expr::int(0));
    assert_ok(&program_with(
        &["ambiguous-type-as-bottom", "bottom-type"],
        TypeExpr::Nat,
        body,
    ));
}

#[test]
fn list_elements_must_agree() {
    let body = Expr::let_(
        Pattern::var("l"),
        Expr::list(vec![Expr::var("x"), Expr::bool(true)]),
        Expr::int(0),
    );
    assert_eq!(
        first_kind(&program_with(&[], TypeExpr::Nat, body)),
        ErrorKind::UnexpectedTypeForExpression
    );
}

#[test]
fn list_against_an_atomic_expectation() {
    assert_eq!(
        first_kind(&program_with(&[], TypeExpr::Nat, Expr::list(vec![Expr::var("x")]))),
        ErrorKind::UnexpectedList
    );
}

#[test]
fn cons_builds_a_list_of_the_head_type() {
    assert_ok(&program_with(
        &[],
        TypeExpr::list(TypeExpr::Nat),
        Expr::cons(Expr::var("x"), Expr::list(vec![])),
    ));
}

#[test]
fn cons_head_must_fit_the_expected_element() {
    assert_eq!(
        first_kind(&program_with(
            &[],
            TypeExpr::list(TypeExpr::Nat),
            Expr::cons(Expr::bool(true), Expr::list(vec![])),
        )),
        ErrorKind::UnexpectedTypeForExpression
    );
}

#[test]
fn head_tail_and_isempty() {
    let xs = Expr::list(vec![Expr::var("x")]);
    assert_ok(&program_with(&[], TypeExpr::Nat, Expr::head(xs.clone())));
    assert_ok(&program_with(&[], TypeExpr::list(TypeExpr::Nat), Expr::tail(xs.clone())));
    assert_ok(&program_with(&[], TypeExpr::Bool, Expr::is_empty(xs)));
}

#[test]
fn list_operations_on_a_non_list() {
    assert_eq!(
        first_kind(&program_with(&[], TypeExpr::Nat, Expr::head(Expr::var("x")))),
        ErrorKind::NotAList
    );
    assert_eq!(
        first_kind(&program_with(&[], TypeExpr::Bool, Expr::is_empty(Expr::var("x")))),
        ErrorKind::NotAList
    );
}
