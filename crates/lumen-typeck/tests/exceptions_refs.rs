//! References, panics, throws, and the try forms, including the ambient
//! exception type requirement.

use lumen_syntax::{Decl, Expr, ExceptionTypeDecl, FunDecl, Param, Pattern, Program, TypeExpr};
use lumen_typeck::error::ErrorKind;
use lumen_typeck::TypeckResult;

fn check(program: &Program) -> TypeckResult {
    lumen_typeck::check(program)
}

fn main_decl(return_ty: TypeExpr, body: Expr) -> Decl {
    Decl::Fun(FunDecl::new(
        "main",
        vec![Param::new("x", TypeExpr::Nat)],
        return_ty,
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

// ── References ──────────────────────────────────────────────────────────

#[test]
fn allocate_assign_and_dereference() {
    let body = Expr::let_(
        Pattern::var("r"),
        Expr::new_ref(Expr::var("x")),
        Expr::seq(
            Expr::assign(Expr::var("r"), Expr::int(0)),
            Expr::deref(Expr::var("r")),
        ),
    );
    let program = Program::new(
        vec!["references", "sequencing"],
        vec![main_decl(TypeExpr::Nat, body)],
    );
    assert_ok(&program);
}

#[test]
fn assignment_requires_the_referent_type() {
    let body = Expr::let_(
        Pattern::var("r"),
        Expr::new_ref(Expr::var("x")),
        Expr::seq(
            Expr::assign(Expr::var("r"), Expr::bool(true)),
            Expr::deref(Expr::var("r")),
        ),
    );
    let program = Program::new(
        vec!["references", "sequencing"],
        vec![main_decl(TypeExpr::Nat, body)],
    );
    assert_eq!(first_kind(&program), ErrorKind::UnexpectedTypeForExpression);
}

#[test]
fn dereferencing_a_non_reference() {
    let program = Program::new(
        vec!["references"],
        vec![main_decl(TypeExpr::Nat, Expr::deref(Expr::var("x")))],
    );
    assert_eq!(first_kind(&program), ErrorKind::NotAReference);
}

#[test]
fn assigning_through_a_non_reference() {
    let program = Program::new(
        vec!["references"],
        vec![main_decl(TypeExpr::Unit, Expr::assign(Expr::var("x"), Expr::int(0)))],
    );
    assert_eq!(first_kind(&program), ErrorKind::NotAReference);
}

#[test]
fn reference_against_an_atomic_expectation() {
    let program = Program::new(
        vec!["references"],
        vec![main_decl(TypeExpr::Nat, Expr::new_ref(Expr::var("x")))],
    );
    assert_eq!(first_kind(&program), ErrorKind::UnexpectedReference);
}

#[test]
fn memory_address_needs_an_expected_reference_type() {
    let ok = Program::new(
        vec!["references"],
        vec![main_decl(TypeExpr::reference(TypeExpr::Nat), Expr::memory_address("0x10"))],
    );
    assert_ok(&ok);

    let wrong = Program::new(
        vec!["references"],
        vec![main_decl(TypeExpr::Nat, Expr::memory_address("0x10"))],
    );
    assert_eq!(first_kind(&wrong), ErrorKind::UnexpectedMemoryAddress);

    let ambiguous = Program::new(
        vec!["references"],
        vec![main_decl(
            TypeExpr::Nat,
            Expr::let_(Pattern::var("m"), Expr::memory_address("0x10"), Expr::int(0)),
        )],
    );
    assert_eq!(first_kind(&ambiguous), ErrorKind::AmbiguousReferenceType);
}

// ── Panic ───────────────────────────────────────────────────────────────

#[test]
fn panic_takes_the_expected_type() {
    let body = Expr::if_(Expr::is_zero(Expr::var("x")), Expr::panic(), Expr::var("x"));
    let program = Program::new(vec!["panic"], vec![main_decl(TypeExpr::Nat, body)]);
    assert_ok(&program);
}

#[test]
fn bare_panic_is_ambiguous() {
    let body = Expr::let_(Pattern::var("p"), Expr::panic(), Expr::int(0));
    let program = Program::new(vec!["panic"], vec![main_decl(TypeExpr::Nat, body)]);
    assert_eq!(first_kind(&program), ErrorKind::AmbiguousPanicType);
}

// ── Exceptions ──────────────────────────────────────────────────────────

#[test]
fn throw_requires_a_declared_exception_type() {
    let program = Program::new(
        vec!["exceptions"],
        vec![main_decl(TypeExpr::Nat, Expr::throw(Expr::var("x")))],
    );
    assert_eq!(first_kind(&program), ErrorKind::ExceptionTypeNotDeclared);
}

#[test]
fn throw_payload_is_checked_against_the_ambient_type() {
    let ok = Program::new(
        vec!["exceptions", "exception-type-declaration"],
        vec![
            Decl::ExceptionType(ExceptionTypeDecl::new(TypeExpr::Nat)),
            main_decl(TypeExpr::Nat, Expr::throw(Expr::var("x"))),
        ],
    );
    assert_ok(&ok);

    let bad = Program::new(
        vec!["exceptions", "exception-type-declaration"],
        vec![
            Decl::ExceptionType(ExceptionTypeDecl::new(TypeExpr::Bool)),
            main_decl(TypeExpr::Nat, Expr::throw(Expr::var("x"))),
        ],
    );
    assert_eq!(first_kind(&bad), ErrorKind::UnexpectedTypeForExpression);
}

#[test]
fn try_catch_binds_the_handler_pattern() {
    let body = Expr::try_catch(
        Expr::throw(Expr::int(1)),
        Pattern::var("e"),
        Expr::var("e"),
    );
    let program = Program::new(
        vec!["exceptions", "exception-type-declaration"],
        vec![
            Decl::ExceptionType(ExceptionTypeDecl::new(TypeExpr::Nat)),
            main_decl(TypeExpr::Nat, body),
        ],
    );
    assert_ok(&program);
}

#[test]
fn try_catch_branches_must_agree() {
    let body = Expr::try_catch(
        Expr::throw(Expr::int(1)),
        Pattern::var("e"),
        Expr::bool(true),
    );
    let program = Program::new(
        vec!["exceptions", "exception-type-declaration"],
        vec![
            Decl::ExceptionType(ExceptionTypeDecl::new(TypeExpr::Nat)),
            main_decl(TypeExpr::Nat, body),
        ],
    );
    assert_eq!(first_kind(&program), ErrorKind::UnexpectedTypeForExpression);
}

#[test]
fn try_with_requires_a_declared_exception_type() {
    let body = Expr::try_with(Expr::var("x"), Expr::int(0));
    let program = Program::new(vec!["exceptions"], vec![main_decl(TypeExpr::Nat, body)]);
    assert_eq!(first_kind(&program), ErrorKind::ExceptionTypeNotDeclared);
}

#[test]
fn try_with_falls_back_at_the_same_type() {
    let body = Expr::try_with(Expr::throw(Expr::int(1)), Expr::var("x"));
    let program = Program::new(
        vec!["exceptions", "exception-type-declaration"],
        vec![
            Decl::ExceptionType(ExceptionTypeDecl::new(TypeExpr::Nat)),
            main_decl(TypeExpr::Nat, body),
        ],
    );
    assert_ok(&program);
}

#[test]
fn try_cast_as_checks_both_branches() {
    let body = Expr::try_cast_as(
        Expr::var("x"),
        TypeExpr::Nat,
        Pattern::var("n"),
        Expr::var("n"),
        Expr::int(0),
    );
    let program = Program::new(
        vec!["try-cast-as"],
        vec![main_decl(TypeExpr::Nat, body)],
    );
    assert_ok(&program);
}

#[test]
fn cast_takes_the_target_type() {
    let body = Expr::cast(Expr::var("x"), TypeExpr::Nat);
    let program = Program::new(vec!["type-cast"], vec![main_decl(TypeExpr::Nat, body)]);
    assert_ok(&program);
}
