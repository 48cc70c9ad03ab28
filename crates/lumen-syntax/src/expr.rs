//! Expressions of the parsed tree.
//!
//! One tagged variant per expression shape the checker dispatches on.
//! Constructor helpers build nodes with an empty span; a host parser sets
//! real spans through [`Expr::with_span`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pat::Pattern;
use crate::span::Span;
use crate::types::TypeExpr;

/// A labeled field inside a record literal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldBinding {
    pub label: String,
    pub expr: Expr,
}

/// One arm of a match expression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchArm {
    pub pattern: Pattern,
    pub body: Expr,
}

/// An expression node: a shape plus the span it came from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    #[serde(default)]
    pub span: Span,
}

/// The shape of an expression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprKind {
    True,
    False,
    Int(u64),
    Unit,
    Var(String),
    IsZero(Box<Expr>),
    Succ(Box<Expr>),
    Pred(Box<Expr>),
    If { cond: Box<Expr>, then_branch: Box<Expr>, else_branch: Box<Expr> },
    Abstraction { param: String, param_ty: TypeExpr, body: Box<Expr> },
    TypeAbstraction { params: Vec<String>, body: Box<Expr> },
    Apply { callee: Box<Expr>, arg: Box<Expr> },
    TypeApply { callee: Box<Expr>, args: Vec<TypeExpr> },
    Seq { first: Box<Expr>, second: Box<Expr> },
    Ascribe { expr: Box<Expr>, ty: TypeExpr },
    Let { pattern: Pattern, value: Box<Expr>, body: Box<Expr> },
    Tuple(Vec<Expr>),
    /// One-based tuple projection: `e.1`.
    TupleProj { expr: Box<Expr>, index: u64 },
    Record(Vec<FieldBinding>),
    FieldProj { expr: Box<Expr>, label: String },
    Match { scrutinee: Box<Expr>, arms: Vec<MatchArm> },
    Inl(Box<Expr>),
    Inr(Box<Expr>),
    Variant { label: String, payload: Option<Box<Expr>> },
    List(Vec<Expr>),
    Cons { head: Box<Expr>, tail: Box<Expr> },
    Head(Box<Expr>),
    Tail(Box<Expr>),
    IsEmpty(Box<Expr>),
    NewRef(Box<Expr>),
    Deref(Box<Expr>),
    Assign { target: Box<Expr>, value: Box<Expr> },
    /// A literal memory address such as `<0x04>`; only meaningful when a
    /// reference type is expected.
    MemoryAddress(String),
    NatRec { bound: Box<Expr>, initial: Box<Expr>, step: Box<Expr> },
    Fix(Box<Expr>),
    Panic,
    Throw(Box<Expr>),
    TryWith { body: Box<Expr>, fallback: Box<Expr> },
    TryCatch { body: Box<Expr>, pattern: Pattern, handler: Box<Expr> },
    TryCastAs {
        body: Box<Expr>,
        ty: TypeExpr,
        pattern: Pattern,
        arm: Box<Expr>,
        fallback: Box<Expr>,
    },
    Cast { expr: Box<Expr>, ty: TypeExpr },
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Expr { kind, span: Span::default() }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    // ── Constructor helpers ─────────────────────────────────────────────

    pub fn bool(value: bool) -> Self {
        Expr::new(if value { ExprKind::True } else { ExprKind::False })
    }

    pub fn int(value: u64) -> Self {
        Expr::new(ExprKind::Int(value))
    }

    pub fn unit() -> Self {
        Expr::new(ExprKind::Unit)
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::new(ExprKind::Var(name.into()))
    }

    pub fn is_zero(expr: Expr) -> Self {
        Expr::new(ExprKind::IsZero(Box::new(expr)))
    }

    pub fn succ(expr: Expr) -> Self {
        Expr::new(ExprKind::Succ(Box::new(expr)))
    }

    pub fn pred(expr: Expr) -> Self {
        Expr::new(ExprKind::Pred(Box::new(expr)))
    }

    pub fn if_(cond: Expr, then_branch: Expr, else_branch: Expr) -> Self {
        Expr::new(ExprKind::If {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    pub fn lambda(param: impl Into<String>, param_ty: TypeExpr, body: Expr) -> Self {
        Expr::new(ExprKind::Abstraction {
            param: param.into(),
            param_ty,
            body: Box::new(body),
        })
    }

    pub fn type_abstraction(params: Vec<&str>, body: Expr) -> Self {
        Expr::new(ExprKind::TypeAbstraction {
            params: params.into_iter().map(str::to_string).collect(),
            body: Box::new(body),
        })
    }

    pub fn apply(callee: Expr, arg: Expr) -> Self {
        Expr::new(ExprKind::Apply { callee: Box::new(callee), arg: Box::new(arg) })
    }

    pub fn type_apply(callee: Expr, args: Vec<TypeExpr>) -> Self {
        Expr::new(ExprKind::TypeApply { callee: Box::new(callee), args })
    }

    pub fn seq(first: Expr, second: Expr) -> Self {
        Expr::new(ExprKind::Seq { first: Box::new(first), second: Box::new(second) })
    }

    pub fn ascribe(expr: Expr, ty: TypeExpr) -> Self {
        Expr::new(ExprKind::Ascribe { expr: Box::new(expr), ty })
    }

    pub fn let_(pattern: Pattern, value: Expr, body: Expr) -> Self {
        Expr::new(ExprKind::Let { pattern, value: Box::new(value), body: Box::new(body) })
    }

    pub fn tuple(items: Vec<Expr>) -> Self {
        Expr::new(ExprKind::Tuple(items))
    }

    pub fn tuple_proj(expr: Expr, index: u64) -> Self {
        Expr::new(ExprKind::TupleProj { expr: Box::new(expr), index })
    }

    pub fn record(fields: Vec<(&str, Expr)>) -> Self {
        Expr::new(ExprKind::Record(
            fields
                .into_iter()
                .map(|(label, expr)| FieldBinding { label: label.to_string(), expr })
                .collect(),
        ))
    }

    pub fn field_proj(expr: Expr, label: impl Into<String>) -> Self {
        Expr::new(ExprKind::FieldProj { expr: Box::new(expr), label: label.into() })
    }

    pub fn match_(scrutinee: Expr, arms: Vec<(Pattern, Expr)>) -> Self {
        Expr::new(ExprKind::Match {
            scrutinee: Box::new(scrutinee),
            arms: arms
                .into_iter()
                .map(|(pattern, body)| MatchArm { pattern, body })
                .collect(),
        })
    }

    pub fn inl(expr: Expr) -> Self {
        Expr::new(ExprKind::Inl(Box::new(expr)))
    }

    pub fn inr(expr: Expr) -> Self {
        Expr::new(ExprKind::Inr(Box::new(expr)))
    }

    pub fn variant(label: impl Into<String>, payload: Option<Expr>) -> Self {
        Expr::new(ExprKind::Variant { label: label.into(), payload: payload.map(Box::new) })
    }

    pub fn list(items: Vec<Expr>) -> Self {
        Expr::new(ExprKind::List(items))
    }

    pub fn cons(head: Expr, tail: Expr) -> Self {
        Expr::new(ExprKind::Cons { head: Box::new(head), tail: Box::new(tail) })
    }

    pub fn head(expr: Expr) -> Self {
        Expr::new(ExprKind::Head(Box::new(expr)))
    }

    pub fn tail(expr: Expr) -> Self {
        Expr::new(ExprKind::Tail(Box::new(expr)))
    }

    pub fn is_empty(expr: Expr) -> Self {
        Expr::new(ExprKind::IsEmpty(Box::new(expr)))
    }

    pub fn new_ref(expr: Expr) -> Self {
        Expr::new(ExprKind::NewRef(Box::new(expr)))
    }

    pub fn deref(expr: Expr) -> Self {
        Expr::new(ExprKind::Deref(Box::new(expr)))
    }

    pub fn assign(target: Expr, value: Expr) -> Self {
        Expr::new(ExprKind::Assign { target: Box::new(target), value: Box::new(value) })
    }

    pub fn memory_address(address: impl Into<String>) -> Self {
        Expr::new(ExprKind::MemoryAddress(address.into()))
    }

    pub fn nat_rec(bound: Expr, initial: Expr, step: Expr) -> Self {
        Expr::new(ExprKind::NatRec {
            bound: Box::new(bound),
            initial: Box::new(initial),
            step: Box::new(step),
        })
    }

    pub fn fix(expr: Expr) -> Self {
        Expr::new(ExprKind::Fix(Box::new(expr)))
    }

    pub fn panic() -> Self {
        Expr::new(ExprKind::Panic)
    }

    pub fn throw(expr: Expr) -> Self {
        Expr::new(ExprKind::Throw(Box::new(expr)))
    }

    pub fn try_with(body: Expr, fallback: Expr) -> Self {
        Expr::new(ExprKind::TryWith { body: Box::new(body), fallback: Box::new(fallback) })
    }

    pub fn try_catch(body: Expr, pattern: Pattern, handler: Expr) -> Self {
        Expr::new(ExprKind::TryCatch {
            body: Box::new(body),
            pattern,
            handler: Box::new(handler),
        })
    }

    pub fn try_cast_as(body: Expr, ty: TypeExpr, pattern: Pattern, arm: Expr, fallback: Expr) -> Self {
        Expr::new(ExprKind::TryCastAs {
            body: Box::new(body),
            ty,
            pattern,
            arm: Box::new(arm),
            fallback: Box::new(fallback),
        })
    }

    pub fn cast(expr: Expr, ty: TypeExpr) -> Self {
        Expr::new(ExprKind::Cast { expr: Box::new(expr), ty })
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl fmt::Display for ExprKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprKind::True => write!(f, "true"),
            ExprKind::False => write!(f, "false"),
            ExprKind::Int(value) => write!(f, "{}", value),
            ExprKind::Unit => write!(f, "unit"),
            ExprKind::Var(name) => write!(f, "{}", name),
            ExprKind::IsZero(expr) => write!(f, "iszero({})", expr),
            ExprKind::Succ(expr) => write!(f, "succ({})", expr),
            ExprKind::Pred(expr) => write!(f, "pred({})", expr),
            ExprKind::If { cond, then_branch, else_branch } => {
                write!(f, "if {} then {} else {}", cond, then_branch, else_branch)
            }
            ExprKind::Abstraction { param, param_ty, body } => {
                write!(f, "fn({} : {}) => {}", param, param_ty, body)
            }
            ExprKind::TypeAbstraction { params, body } => {
                write!(f, "generic [{}] => {}", params.join(", "), body)
            }
            ExprKind::Apply { callee, arg } => write!(f, "{}({})", callee, arg),
            ExprKind::TypeApply { callee, args } => {
                write!(f, "{}[", callee)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, "]")
            }
            ExprKind::Seq { first, second } => write!(f, "{}; {}", first, second),
            ExprKind::Ascribe { expr, ty } => write!(f, "{} as {}", expr, ty),
            ExprKind::Let { pattern, value, body } => {
                write!(f, "let {} = {} in {}", pattern, value, body)
            }
            ExprKind::Tuple(items) => {
                write!(f, "{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "}}")
            }
            ExprKind::TupleProj { expr, index } => write!(f, "{}.{}", expr, index),
            ExprKind::Record(fields) => {
                write!(f, "{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} = {}", field.label, field.expr)?;
                }
                write!(f, "}}")
            }
            ExprKind::FieldProj { expr, label } => write!(f, "{}.{}", expr, label),
            ExprKind::Match { scrutinee, arms } => {
                write!(f, "match {} {{", scrutinee)?;
                for (i, arm) in arms.iter().enumerate() {
                    if i > 0 {
                        write!(f, " |")?;
                    }
                    write!(f, " {} => {}", arm.pattern, arm.body)?;
                }
                write!(f, " }}")
            }
            ExprKind::Inl(expr) => write!(f, "inl({})", expr),
            ExprKind::Inr(expr) => write!(f, "inr({})", expr),
            ExprKind::Variant { label, payload } => match payload {
                Some(payload) => write!(f, "<|{} = {}|>", label, payload),
                None => write!(f, "<|{}|>", label),
            },
            ExprKind::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            ExprKind::Cons { head, tail } => write!(f, "cons({}, {})", head, tail),
            ExprKind::Head(expr) => write!(f, "head({})", expr),
            ExprKind::Tail(expr) => write!(f, "tail({})", expr),
            ExprKind::IsEmpty(expr) => write!(f, "isempty({})", expr),
            ExprKind::NewRef(expr) => write!(f, "new({})", expr),
            ExprKind::Deref(expr) => write!(f, "*{}", expr),
            ExprKind::Assign { target, value } => write!(f, "{} := {}", target, value),
            ExprKind::MemoryAddress(address) => write!(f, "<{}>", address),
            ExprKind::NatRec { bound, initial, step } => {
                write!(f, "Nat::rec({}, {}, {})", bound, initial, step)
            }
            ExprKind::Fix(expr) => write!(f, "fix({})", expr),
            ExprKind::Panic => write!(f, "panic!"),
            ExprKind::Throw(expr) => write!(f, "throw({})", expr),
            ExprKind::TryWith { body, fallback } => {
                write!(f, "try {{ {} }} with {{ {} }}", body, fallback)
            }
            ExprKind::TryCatch { body, pattern, handler } => {
                write!(f, "try {{ {} }} catch {{ {} => {} }}", body, pattern, handler)
            }
            ExprKind::TryCastAs { body, ty, pattern, arm, fallback } => write!(
                f,
                "try {{ {} }} cast as {} {{ {} => {} }} with {{ {} }}",
                body, ty, pattern, arm, fallback
            ),
            ExprKind::Cast { expr, ty } => write!(f, "{} cast as {}", expr, ty),
        }
    }
}
