//! Top-level program structure: declarations and extension pragmas.

use serde::{Deserialize, Serialize};

use crate::expr::Expr;
use crate::span::Span;
use crate::types::TypeExpr;

/// A whole parsed program: the extension pragmas the source enabled,
/// followed by its top-level declarations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub extensions: Vec<String>,
    pub decls: Vec<Decl>,
}

impl Program {
    pub fn new(extensions: Vec<&str>, decls: Vec<Decl>) -> Self {
        Program {
            extensions: extensions.into_iter().map(str::to_string).collect(),
            decls,
        }
    }
}

/// A top-level (or nested) declaration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decl {
    Fun(FunDecl),
    ExceptionType(ExceptionTypeDecl),
}

/// A function declaration.
///
/// `type_params` is empty for an ordinary function; a non-empty list makes
/// this a generic function whose signature is universally quantified.
/// The base language is unary: typing uses exactly one parameter, and the
/// parameter list exists so that the driver can check `main`'s arity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunDecl {
    pub name: String,
    #[serde(default)]
    pub type_params: Vec<String>,
    pub params: Vec<Param>,
    pub return_ty: TypeExpr,
    /// Nested function declarations visible inside `body`.
    #[serde(default)]
    pub decls: Vec<Decl>,
    pub body: Expr,
    #[serde(default)]
    pub span: Span,
}

impl FunDecl {
    pub fn new(name: impl Into<String>, params: Vec<Param>, return_ty: TypeExpr, body: Expr) -> Self {
        FunDecl {
            name: name.into(),
            type_params: Vec::new(),
            params,
            return_ty,
            decls: Vec::new(),
            body,
            span: Span::default(),
        }
    }

    pub fn with_type_params(mut self, params: Vec<&str>) -> Self {
        self.type_params = params.into_iter().map(str::to_string).collect();
        self
    }

    pub fn with_nested(mut self, decls: Vec<Decl>) -> Self {
        self.decls = decls;
        self
    }
}

/// A function parameter with its declared type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: TypeExpr,
    #[serde(default)]
    pub span: Span,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Param { name: name.into(), ty, span: Span::default() }
    }
}

/// A declaration of the program's single ambient exception type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExceptionTypeDecl {
    pub ty: TypeExpr,
    #[serde(default)]
    pub span: Span,
}

impl ExceptionTypeDecl {
    pub fn new(ty: TypeExpr) -> Self {
        ExceptionTypeDecl { ty, span: Span::default() }
    }
}
