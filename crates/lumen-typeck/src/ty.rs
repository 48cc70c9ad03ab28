//! The type algebra.
//!
//! Defines the closed `Ty` variant the whole checker computes with, plus
//! the operations every type supports: structural equality (insensitive to
//! record/variant field order), flag-gated structural subtyping,
//! capture-avoiding substitution of universal type parameters, occurs
//! queries for the reconstruction phase, and canonical rendering for
//! diagnostics.

use std::fmt;

use rustc_hash::FxHashMap;

/// An inference unknown, identified by an index minted by [`crate::unify::VarSupply`].
///
/// Type variables only exist while the `type-reconstruction` extension is
/// active; indices are globally fresh within one program check.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TyVar(pub u32);

/// A Lumen type.
///
/// Record and variant fields keep their declared order — rendering and
/// error messages preserve it — but equality and subtyping compare fields
/// by label, not by position.
#[derive(Clone, Debug)]
pub enum Ty {
    Bool,
    Nat,
    Unit,
    /// `(param) -> (ret)`; parameter is contravariant under subtyping.
    Fun(Box<Ty>, Box<Ty>),
    Tuple(Vec<Ty>),
    Record(Vec<(String, Ty)>),
    Sum(Box<Ty>, Box<Ty>),
    Variant(Vec<(String, Ty)>),
    List(Box<Ty>),
    Ref(Box<Ty>),
    /// Supertype of everything under the subtyping extension.
    Top,
    /// Subtype of everything under the subtyping extension; also the type
    /// of `panic`/`throw` when the ambiguous-as-bottom flag is set.
    Bottom,
    /// A universal type parameter in scope.
    Generic(String),
    /// A prenex universal type: `Forall` never nests inside another `Forall`.
    Forall(Vec<String>, Box<Ty>),
    /// An inference unknown (reconstruction only).
    Var(TyVar),
    /// Marker for tree shapes the translator does not recognize. Only ever
    /// flows into positions the typer rejects immediately.
    Unknown,
}

impl Ty {
    // ── Constructor helpers ─────────────────────────────────────────────

    pub fn fun(param: Ty, ret: Ty) -> Ty {
        Ty::Fun(Box::new(param), Box::new(ret))
    }

    pub fn sum(left: Ty, right: Ty) -> Ty {
        Ty::Sum(Box::new(left), Box::new(right))
    }

    pub fn list(elem: Ty) -> Ty {
        Ty::List(Box::new(elem))
    }

    pub fn reference(inner: Ty) -> Ty {
        Ty::Ref(Box::new(inner))
    }

    pub fn record(fields: Vec<(&str, Ty)>) -> Ty {
        Ty::Record(fields.into_iter().map(|(l, t)| (l.to_string(), t)).collect())
    }

    pub fn variant(fields: Vec<(&str, Ty)>) -> Ty {
        Ty::Variant(fields.into_iter().map(|(l, t)| (l.to_string(), t)).collect())
    }

    pub fn generic(name: impl Into<String>) -> Ty {
        Ty::Generic(name.into())
    }

    pub fn forall(params: Vec<&str>, body: Ty) -> Ty {
        Ty::Forall(params.into_iter().map(str::to_string).collect(), Box::new(body))
    }

    /// The inference variable inside this type, if it is one.
    pub fn as_var(&self) -> Option<TyVar> {
        match self {
            Ty::Var(v) => Some(*v),
            _ => None,
        }
    }

    // ── Subtyping ───────────────────────────────────────────────────────

    /// Structural subtyping query.
    ///
    /// With the flag off this degenerates to equality. With it on:
    /// `Bottom <= T`, `T <= Top`, functions are contravariant in the
    /// parameter and covariant in the result, records subtype by width and
    /// depth (more fields <= fewer), variants dually (fewer labels <= more),
    /// tuples pointwise at equal arity, lists and references by depth.
    /// Reference misuse is caught at assignment sites, which check the
    /// right-hand side against the referent type independently.
    pub fn is_subtype_of(&self, other: &Ty, subtyping_enabled: bool) -> bool {
        if self == other {
            return true;
        }
        if !subtyping_enabled {
            return false;
        }
        if matches!(other, Ty::Top) {
            return true;
        }
        if matches!(self, Ty::Bottom) {
            return true;
        }
        match (self, other) {
            (Ty::Fun(p1, r1), Ty::Fun(p2, r2)) => {
                p2.is_subtype_of(p1, true) && r1.is_subtype_of(r2, true)
            }
            (Ty::Tuple(a), Ty::Tuple(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|(x, y)| x.is_subtype_of(y, true))
            }
            (Ty::Record(a), Ty::Record(b)) => {
                // Width and depth: every field of the supertype must be
                // present (by label) and covariantly related.
                a.len() >= b.len()
                    && b.iter().all(|(label, want)| {
                        field_type(a, label)
                            .map(|have| have.is_subtype_of(want, true))
                            .unwrap_or(false)
                    })
            }
            (Ty::Variant(a), Ty::Variant(b)) => {
                // Dual direction: every label of the subtype must appear in
                // the supertype with a covariantly related payload.
                a.len() <= b.len()
                    && a.iter().all(|(label, have)| {
                        field_type(b, label)
                            .map(|want| have.is_subtype_of(want, true))
                            .unwrap_or(false)
                    })
            }
            (Ty::Sum(l1, r1), Ty::Sum(l2, r2)) => {
                l1.is_subtype_of(l2, true) && r1.is_subtype_of(r2, true)
            }
            (Ty::List(a), Ty::List(b)) => a.is_subtype_of(b, true),
            (Ty::Ref(a), Ty::Ref(b)) => a.is_subtype_of(b, true),
            _ => false,
        }
    }

    // ── Substitution ────────────────────────────────────────────────────

    /// Replace universal type parameters according to `subst`.
    ///
    /// Capture-avoiding by construction: a `Forall` removes its bound
    /// names from the substitution before recursing into its body.
    pub fn substitute(&self, subst: &FxHashMap<String, Ty>) -> Ty {
        if subst.is_empty() {
            return self.clone();
        }
        match self {
            Ty::Generic(name) => subst.get(name).cloned().unwrap_or_else(|| self.clone()),
            Ty::Forall(params, body) => {
                let mut narrowed = subst.clone();
                for param in params {
                    narrowed.remove(param);
                }
                Ty::Forall(params.clone(), Box::new(body.substitute(&narrowed)))
            }
            Ty::Fun(param, ret) => Ty::fun(param.substitute(subst), ret.substitute(subst)),
            Ty::Tuple(items) => Ty::Tuple(items.iter().map(|t| t.substitute(subst)).collect()),
            Ty::Record(fields) => Ty::Record(
                fields.iter().map(|(l, t)| (l.clone(), t.substitute(subst))).collect(),
            ),
            Ty::Sum(left, right) => Ty::sum(left.substitute(subst), right.substitute(subst)),
            Ty::Variant(fields) => Ty::Variant(
                fields.iter().map(|(l, t)| (l.clone(), t.substitute(subst))).collect(),
            ),
            Ty::List(elem) => Ty::list(elem.substitute(subst)),
            Ty::Ref(inner) => Ty::reference(inner.substitute(subst)),
            _ => self.clone(),
        }
    }

    /// Universal type parameters occurring free in this type, in order of
    /// first appearance. Used after generic instantiation to detect
    /// parameters that no binding resolves.
    pub fn free_generics(&self) -> Vec<String> {
        let mut bound = Vec::new();
        let mut out = Vec::new();
        self.collect_free_generics(&mut bound, &mut out);
        out
    }

    fn collect_free_generics(&self, bound: &mut Vec<String>, out: &mut Vec<String>) {
        match self {
            Ty::Generic(name) => {
                if !bound.iter().any(|b| b == name) && !out.iter().any(|o| o == name) {
                    out.push(name.clone());
                }
            }
            Ty::Forall(params, body) => {
                let depth = bound.len();
                bound.extend(params.iter().cloned());
                body.collect_free_generics(bound, out);
                bound.truncate(depth);
            }
            Ty::Fun(param, ret) => {
                param.collect_free_generics(bound, out);
                ret.collect_free_generics(bound, out);
            }
            Ty::Tuple(items) => {
                for item in items {
                    item.collect_free_generics(bound, out);
                }
            }
            Ty::Record(fields) | Ty::Variant(fields) => {
                for (_, ty) in fields {
                    ty.collect_free_generics(bound, out);
                }
            }
            Ty::Sum(left, right) => {
                left.collect_free_generics(bound, out);
                right.collect_free_generics(bound, out);
            }
            Ty::List(elem) => elem.collect_free_generics(bound, out),
            Ty::Ref(inner) => inner.collect_free_generics(bound, out),
            _ => {}
        }
    }

    // ── Reconstruction support ──────────────────────────────────────────

    /// Occurs check: does `var` occur anywhere within this type?
    pub fn occurs(&self, var: TyVar) -> bool {
        match self {
            Ty::Var(v) => *v == var,
            Ty::Fun(param, ret) => param.occurs(var) || ret.occurs(var),
            Ty::Tuple(items) => items.iter().any(|t| t.occurs(var)),
            Ty::Record(fields) | Ty::Variant(fields) => {
                fields.iter().any(|(_, t)| t.occurs(var))
            }
            Ty::Sum(left, right) => left.occurs(var) || right.occurs(var),
            Ty::List(elem) => elem.occurs(var),
            Ty::Ref(inner) => inner.occurs(var),
            Ty::Forall(_, body) => body.occurs(var),
            _ => false,
        }
    }

    /// Replace every occurrence of `var` with `to`. The solver's eager
    /// substitution step.
    pub fn replace_var(&self, var: TyVar, to: &Ty) -> Ty {
        match self {
            Ty::Var(v) if *v == var => to.clone(),
            Ty::Fun(param, ret) => {
                Ty::fun(param.replace_var(var, to), ret.replace_var(var, to))
            }
            Ty::Tuple(items) => {
                Ty::Tuple(items.iter().map(|t| t.replace_var(var, to)).collect())
            }
            Ty::Record(fields) => Ty::Record(
                fields.iter().map(|(l, t)| (l.clone(), t.replace_var(var, to))).collect(),
            ),
            Ty::Variant(fields) => Ty::Variant(
                fields.iter().map(|(l, t)| (l.clone(), t.replace_var(var, to))).collect(),
            ),
            Ty::Sum(left, right) => {
                Ty::sum(left.replace_var(var, to), right.replace_var(var, to))
            }
            Ty::List(elem) => Ty::list(elem.replace_var(var, to)),
            Ty::Ref(inner) => Ty::reference(inner.replace_var(var, to)),
            Ty::Forall(params, body) => {
                Ty::Forall(params.clone(), Box::new(body.replace_var(var, to)))
            }
            _ => self.clone(),
        }
    }
}

/// Look up a field by label in a declared-order field list.
pub fn field_type<'a>(fields: &'a [(String, Ty)], label: &str) -> Option<&'a Ty> {
    fields.iter().find(|(l, _)| l == label).map(|(_, t)| t)
}

/// The first label appearing more than once in a field list, if any.
pub fn duplicate_label(fields: &[(String, Ty)]) -> Option<&str> {
    for (i, (label, _)) in fields.iter().enumerate() {
        if fields[..i].iter().any(|(l, _)| l == label) {
            return Some(label);
        }
    }
    None
}

// ── Equality ────────────────────────────────────────────────────────────

/// Field lists compare by label: same label set and pairwise-equal types.
fn fields_eq(a: &[(String, Ty)], b: &[(String, Ty)]) -> bool {
    a.len() == b.len()
        && a.iter().all(|(label, ty)| field_type(b, label).map(|t| t == ty).unwrap_or(false))
}

impl PartialEq for Ty {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Ty::Bool, Ty::Bool)
            | (Ty::Nat, Ty::Nat)
            | (Ty::Unit, Ty::Unit)
            | (Ty::Top, Ty::Top)
            | (Ty::Bottom, Ty::Bottom)
            | (Ty::Unknown, Ty::Unknown) => true,
            (Ty::Fun(p1, r1), Ty::Fun(p2, r2)) => p1 == p2 && r1 == r2,
            (Ty::Tuple(a), Ty::Tuple(b)) => a == b,
            (Ty::Record(a), Ty::Record(b)) => fields_eq(a, b),
            (Ty::Sum(l1, r1), Ty::Sum(l2, r2)) => l1 == l2 && r1 == r2,
            (Ty::Variant(a), Ty::Variant(b)) => fields_eq(a, b),
            (Ty::List(a), Ty::List(b)) => a == b,
            (Ty::Ref(a), Ty::Ref(b)) => a == b,
            (Ty::Generic(a), Ty::Generic(b)) => a == b,
            (Ty::Forall(p1, b1), Ty::Forall(p2, b2)) => p1 == p2 && b1 == b2,
            (Ty::Var(a), Ty::Var(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Ty {}

// ── Rendering ───────────────────────────────────────────────────────────

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Bool => write!(f, "Bool"),
            Ty::Nat => write!(f, "Nat"),
            Ty::Unit => write!(f, "Unit"),
            Ty::Fun(param, ret) => write!(f, "({}) -> ({})", param, ret),
            Ty::Tuple(items) => {
                write!(f, "{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "}}")
            }
            Ty::Record(fields) => {
                write!(f, "{{")?;
                for (i, (label, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} : {}", label, ty)?;
                }
                write!(f, "}}")
            }
            Ty::Sum(left, right) => write!(f, "({} + {})", left, right),
            Ty::Variant(fields) => {
                write!(f, "<|")?;
                for (i, (label, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} : {}", label, ty)?;
                }
                write!(f, "|>")
            }
            Ty::List(elem) => write!(f, "List[{}]", elem),
            Ty::Ref(inner) => write!(f, "&{}", inner),
            Ty::Top => write!(f, "Top"),
            Ty::Bottom => write!(f, "Bottom"),
            Ty::Generic(name) => write!(f, "{}", name),
            Ty::Forall(params, body) => write!(f, "[{}]{}", params.join(", "), body),
            Ty::Var(v) => write!(f, "?{}", v.0),
            Ty::Unknown => write!(f, "Unknown"),
        }
    }
}
