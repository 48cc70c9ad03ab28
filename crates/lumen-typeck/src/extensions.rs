//! The extension flag set.
//!
//! Programs opt into language extensions by name. The set is read-only
//! once built, and unknown names are accepted without failure so that
//! newer front ends keep working against this checker. Only a handful of
//! flags change the typing rules themselves; the predicates below name
//! them.

use rustc_hash::FxHashSet;

/// Extension names this checker knows about. Registration is not limited
/// to this list.
pub const KNOWN_EXTENSIONS: &[&str] = &[
    "predecessor",
    "natural-literals",
    "nested-function-declarations",
    "nullary-functions",
    "multiparameter-functions",
    "unit-type",
    "unit-types",
    "sequencing",
    "type-ascriptions",
    "let-bindings",
    "let-many-bindings",
    "pairs",
    "tuples",
    "records",
    "structural-patterns",
    "pattern-ascriptions",
    "let-patterns",
    "sum-types",
    "variants",
    "nullary-variant-labels",
    "fixpoint-combinator",
    "letrec-bindings",
    "letrec-many-bindings",
    "lists",
    "references",
    "panic",
    "exceptions",
    "exception-type-declaration",
    "open-variant-exceptions",
    "structural-subtyping",
    "top-type",
    "bottom-type",
    "ambiguous-type-as-bottom",
    "type-cast",
    "try-cast-as",
    "type-cast-patterns",
    "universal-types",
    "type-reconstruction",
];

/// A read-only set of enabled extension flags.
#[derive(Debug, Default, Clone)]
pub struct ExtensionSet {
    names: FxHashSet<String>,
}

impl ExtensionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the set from the names a program's pragmas enabled. Names
    /// outside [`KNOWN_EXTENSIONS`] are kept too; they just change nothing.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ExtensionSet { names: names.into_iter().map(Into::into).collect() }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Equality checks become structural subtyping checks.
    pub fn structural_subtyping(&self) -> bool {
        self.contains("structural-subtyping")
    }

    /// Ambiguous-type errors become `Bottom` syntheses.
    pub fn ambiguous_as_bottom(&self) -> bool {
        self.contains("ambiguous-type-as-bottom")
    }

    /// Equality checks become emitted constraints, solved after the body
    /// pass.
    pub fn type_reconstruction(&self) -> bool {
        self.contains("type-reconstruction")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn behavior_flags() {
        let set = ExtensionSet::from_names(["structural-subtyping", "lists"]);
        assert!(set.structural_subtyping());
        assert!(!set.ambiguous_as_bottom());
        assert!(!set.type_reconstruction());
        assert!(set.contains("lists"));
    }

    #[test]
    fn unknown_names_are_accepted() {
        let set = ExtensionSet::from_names(["some-future-extension"]);
        assert!(set.contains("some-future-extension"));
        assert!(!set.structural_subtyping());
    }
}
