//! Lumen type checker: bidirectional typing with optional extensions.
//!
//! This crate implements the typing engine for the Lumen language. It
//! consumes an already-parsed tree (`lumen-syntax`), decides whether the
//! program is well-typed under its enabled extensions, and produces
//! structured diagnostics. Supported extensions include sums, variants,
//! tuples, records, lists, references, exceptions, structural subtyping,
//! universal types, and Hindley-Milner-style type reconstruction.
//!
//! # Architecture
//!
//! - [`ty`]: the type algebra (equality, subtyping, substitution, occurs)
//! - [`context`]: the lexically nested type context
//! - [`translate`]: tree type nodes to algebra values
//! - [`patterns`]: pattern well-formedness and exhaustiveness
//! - [`unify`]: constraint store and unification solver
//! - [`infer`]: the bidirectional typer and two-pass driver
//! - [`error`]: the closed diagnostic enumeration and sink
//! - [`extensions`]: the read-only extension flag set
//!
//! Checking is single-threaded and strictly recursive over the tree; all
//! long-lived state (diagnostic sink, constraint store, type-variable
//! counter) is owned by the driver.

pub mod context;
pub mod error;
pub mod extensions;
pub mod infer;
pub mod patterns;
pub mod translate;
pub mod ty;
pub mod unify;

use lumen_syntax::Program;

use crate::error::Diagnostic;
use crate::extensions::ExtensionSet;
use crate::infer::Checker;

/// The result of type checking a Lumen program.
///
/// The diagnostic list is empty exactly when the program is well-typed
/// under its flag set. The first diagnostic in program order is the
/// canonical one for a one-shot CLI; all of them are available here.
#[derive(Debug)]
pub struct TypeckResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl TypeckResult {
    /// Whether the program type-checked cleanly.
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// The canonical (first) diagnostic, if any.
    pub fn first(&self) -> Option<&Diagnostic> {
        self.diagnostics.first()
    }
}

/// Type-check a parsed Lumen program.
///
/// This is the main entry point. The program's own extension pragmas
/// decide the flag set; unknown names are accepted and ignored.
pub fn check(program: &Program) -> TypeckResult {
    let extensions = ExtensionSet::from_names(program.extensions.iter().cloned());
    check_with_extensions(program, extensions)
}

/// Type-check with an explicit flag set, overriding the program's pragmas.
/// Useful for hosts that manage extensions out of band.
pub fn check_with_extensions(program: &Program, extensions: ExtensionSet) -> TypeckResult {
    let checker = Checker::new(extensions);
    TypeckResult { diagnostics: checker.check_program(program) }
}
