//! The type context: a persistent, lexically nested scope chain.
//!
//! Each node maps term identifiers to types, function identifiers to their
//! (possibly `Forall`-wrapped) function types, in-scope universal type
//! parameters to `Generic` values, and optionally carries the program's
//! single ambient exception type. Lookup walks from the innermost scope
//! outward; a child holds a back pointer only and never mutates its parent.

use rustc_hash::FxHashMap;

use crate::ty::Ty;

pub struct TypeContext<'a> {
    parent: Option<&'a TypeContext<'a>>,
    variables: FxHashMap<String, Ty>,
    functions: FxHashMap<String, Ty>,
    generics: FxHashMap<String, Ty>,
    exception: Option<Ty>,
}

impl<'a> TypeContext<'a> {
    /// The root context, created once per program.
    pub fn root() -> TypeContext<'static> {
        TypeContext {
            parent: None,
            variables: FxHashMap::default(),
            functions: FxHashMap::default(),
            generics: FxHashMap::default(),
            exception: None,
        }
    }

    /// A fresh child scope borrowing this one.
    pub fn child(&self) -> TypeContext<'_> {
        TypeContext {
            parent: Some(self),
            variables: FxHashMap::default(),
            functions: FxHashMap::default(),
            generics: FxHashMap::default(),
            exception: None,
        }
    }

    /// Bind a term identifier in this scope.
    ///
    /// # Panics
    ///
    /// Panics on a duplicate binding in the same scope — that is a checker
    /// bug, not a user error.
    pub fn bind_var(&mut self, name: impl Into<String>, ty: Ty) {
        let name = name.into();
        if let Some(existing) = self.variables.insert(name.clone(), ty) {
            panic!("variable {} already bound in this scope with type {}", name, existing);
        }
    }

    pub fn lookup_var(&self, name: &str) -> Option<&Ty> {
        match self.variables.get(name) {
            Some(ty) => Some(ty),
            None => self.parent.and_then(|p| p.lookup_var(name)),
        }
    }

    /// Whether `name` is bound as a term in this scope itself (parents are
    /// not consulted).
    pub fn bound_in_scope(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Bind a function identifier in this scope.
    ///
    /// # Panics
    ///
    /// Panics on a duplicate binding in the same scope.
    pub fn bind_fun(&mut self, name: impl Into<String>, ty: Ty) {
        let name = name.into();
        if let Some(existing) = self.functions.insert(name.clone(), ty) {
            panic!("function {} already bound in this scope with type {}", name, existing);
        }
    }

    pub fn lookup_fun(&self, name: &str) -> Option<&Ty> {
        match self.functions.get(name) {
            Some(ty) => Some(ty),
            None => self.parent.and_then(|p| p.lookup_fun(name)),
        }
    }

    /// Bring a universal type parameter into scope.
    pub fn bind_generic(&mut self, name: impl Into<String>) {
        let name = name.into();
        let ty = Ty::Generic(name.clone());
        self.generics.insert(name, ty);
    }

    pub fn lookup_generic(&self, name: &str) -> Option<&Ty> {
        match self.generics.get(name) {
            Some(ty) => Some(ty),
            None => self.parent.and_then(|p| p.lookup_generic(name)),
        }
    }

    /// Install the program's ambient exception type.
    pub fn set_exception(&mut self, ty: Ty) {
        self.exception = Some(ty);
    }

    pub fn exception(&self) -> Option<&Ty> {
        match &self.exception {
            Some(ty) => Some(ty),
            None => self.parent.and_then(|p| p.exception()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_parents() {
        let mut root = TypeContext::root();
        root.bind_var("x", Ty::Nat);

        let child = root.child();
        assert_eq!(child.lookup_var("x"), Some(&Ty::Nat));
        assert_eq!(child.lookup_var("y"), None);
    }

    #[test]
    fn inner_binding_shadows_outer() {
        let mut root = TypeContext::root();
        root.bind_var("x", Ty::Nat);

        let mut inner = root.child();
        inner.bind_var("x", Ty::Bool);
        assert_eq!(inner.lookup_var("x"), Some(&Ty::Bool));
        assert_eq!(root.lookup_var("x"), Some(&Ty::Nat));
    }

    #[test]
    #[should_panic(expected = "already bound in this scope")]
    fn duplicate_binding_in_one_scope_is_a_bug() {
        let mut root = TypeContext::root();
        root.bind_var("x", Ty::Nat);
        root.bind_var("x", Ty::Bool);
    }

    #[test]
    fn functions_and_variables_are_separate_namespaces() {
        let mut root = TypeContext::root();
        root.bind_fun("f", Ty::fun(Ty::Nat, Ty::Nat));
        assert!(root.lookup_var("f").is_none());
        assert_eq!(root.lookup_fun("f"), Some(&Ty::fun(Ty::Nat, Ty::Nat)));
    }

    #[test]
    fn exception_type_is_visible_from_children() {
        let mut root = TypeContext::root();
        root.set_exception(Ty::Nat);
        let child = root.child();
        let grandchild = child.child();
        assert_eq!(grandchild.exception(), Some(&Ty::Nat));
    }

    #[test]
    fn generics_resolve_to_their_name() {
        let mut root = TypeContext::root();
        root.bind_generic("X");
        assert_eq!(root.lookup_generic("X"), Some(&Ty::generic("X")));
        assert_eq!(root.lookup_generic("Y"), None);
    }
}
