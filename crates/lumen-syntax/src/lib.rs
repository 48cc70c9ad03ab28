//! Parsed-tree data model for the Lumen type checker.
//!
//! This crate defines the tree the checker consumes: programs,
//! declarations, expressions, patterns, and type expressions, each a plain
//! tagged variant with a source span. Parsing concrete source text is a
//! host concern; trees arrive either constructed in Rust or deserialized
//! from JSON (every node derives serde traits).
//!
//! Pretty-printers (`Display` impls) reproduce a readable source form and
//! are what diagnostics use to quote offending nodes.

pub mod expr;
pub mod pat;
pub mod program;
pub mod span;
pub mod types;

pub use expr::{Expr, ExprKind, FieldBinding, MatchArm};
pub use pat::{Pattern, PatternField};
pub use program::{Decl, ExceptionTypeDecl, FunDecl, Param, Program};
pub use span::Span;
pub use types::{TypeExpr, TypeField, VariantField};
