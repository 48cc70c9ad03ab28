//! Universal types: generic function declarations, type abstraction,
//! type application, and the arity/resolution diagnostics around them.

use lumen_syntax::{Decl, Expr, FunDecl, Param, Pattern, Program, TypeExpr};
use lumen_typeck::error::ErrorKind;
use lumen_typeck::TypeckResult;

fn check(program: &Program) -> TypeckResult {
    lumen_typeck::check(program)
}

fn program_with(decls: Vec<Decl>) -> Program {
    Program::new(vec!["universal-types"], decls)
}

fn generic_identity() -> Decl {
    Decl::Fun(
        FunDecl::new(
            "id",
            vec![Param::new("y", TypeExpr::name("X"))],
            TypeExpr::name("X"),
            Expr::var("y"),
        )
        .with_type_params(vec!["X"]),
    )
}

fn main_decl(body: Expr) -> Decl {
    Decl::Fun(FunDecl::new(
        "main",
        vec![Param::new("x", TypeExpr::Nat)],
        TypeExpr::Nat,
        body,
    ))
}

fn assert_ok(program: &Program) {
    let result = check(program);
    assert!(result.is_ok(), "expected no diagnostics, got {:?}", result.diagnostics);
}

fn first_kind(program: &Program) -> ErrorKind {
    check(program).first().expect("expected a diagnostic").kind
}

#[test]
fn generic_function_instantiated_at_nat() {
    let body = Expr::apply(
        Expr::type_apply(Expr::var("id"), vec![TypeExpr::Nat]),
        Expr::var("x"),
    );
    assert_ok(&program_with(vec![generic_identity(), main_decl(body)]));
}

#[test]
fn instantiation_at_two_different_types() {
    let body = Expr::if_(
        Expr::apply(
            Expr::type_apply(Expr::var("id"), vec![TypeExpr::Bool]),
            Expr::bool(true),
        ),
        Expr::apply(
            Expr::type_apply(Expr::var("id"), vec![TypeExpr::Nat]),
            Expr::var("x"),
        ),
        Expr::int(0),
    );
    assert_ok(&program_with(vec![generic_identity(), main_decl(body)]));
}

#[test]
fn wrong_number_of_type_arguments() {
    let body = Expr::apply(
        Expr::type_apply(Expr::var("id"), vec![TypeExpr::Nat, TypeExpr::Bool]),
        Expr::var("x"),
    );
    assert_eq!(
        first_kind(&program_with(vec![generic_identity(), main_decl(body)])),
        ErrorKind::IncorrectNumberOfTypeArguments
    );
}

#[test]
fn type_application_of_a_non_generic_function() {
    let plain = Decl::Fun(FunDecl::new(
        "inc",
        vec![Param::new("y", TypeExpr::Nat)],
        TypeExpr::Nat,
        Expr::succ(Expr::var("y")),
    ));
    let body = Expr::apply(
        Expr::type_apply(Expr::var("inc"), vec![TypeExpr::Nat]),
        Expr::var("x"),
    );
    assert_eq!(
        first_kind(&program_with(vec![plain, main_decl(body)])),
        ErrorKind::NotAGenericFunction
    );
}

#[test]
fn unknown_type_name_in_a_signature() {
    let bad = Decl::Fun(FunDecl::new(
        "bad",
        vec![Param::new("y", TypeExpr::name("Y"))],
        TypeExpr::Nat,
        Expr::int(0),
    ));
    assert_eq!(
        first_kind(&program_with(vec![bad, main_decl(Expr::var("x"))])),
        ErrorKind::UndefinedTypeVariable
    );
}

#[test]
fn type_abstraction_synthesizes_a_forall() {
    // let f = generic [X] => fn(y : X) => y in f [Nat] (x)
    let type_abs = Expr::type_abstraction(
        vec!["X"],
        Expr::lambda("y", TypeExpr::name("X"), Expr::var("y")),
    );
    let body = Expr::let_(
        Pattern::var("f"),
        type_abs,
        Expr::apply(
            Expr::type_apply(Expr::var("f"), vec![TypeExpr::Nat]),
            Expr::var("x"),
        ),
    );
    assert_ok(&program_with(vec![main_decl(body)]));
}

#[test]
fn generic_body_must_stay_parametric() {
    // id's body cannot pretend X is Nat.
    let leaky = Decl::Fun(
        FunDecl::new(
            "leaky",
            vec![Param::new("y", TypeExpr::name("X"))],
            TypeExpr::name("X"),
            Expr::succ(Expr::var("y")),
        )
        .with_type_params(vec!["X"]),
    );
    assert_eq!(
        first_kind(&program_with(vec![leaky, main_decl(Expr::var("x"))])),
        ErrorKind::UnexpectedTypeForExpression
    );
}
