//! Constraint store and unification solver for type reconstruction.
//!
//! While the `type-reconstruction` extension is active, the typer replaces
//! equality checks with constraints `(lhs = rhs)` appended to a single
//! store owned by the driver. After the body pass the store is solved by a
//! syntactic Robinson-style algorithm extended with the structural type
//! constructors and an occurs check.
//!
//! The solver consumes constraints in insertion order and substitutes a
//! solved variable eagerly through everything still queued. No union-find:
//! constraint counts are bounded by program size, and the eager strategy
//! keeps the identity of the first failure tied to insertion order, which
//! the diagnostics contract wants.

use std::collections::VecDeque;

use crate::error::NodeRef;
use crate::ty::{field_type, Ty, TyVar};

/// Mints fresh inference variables. Owned by the driver; never a global.
#[derive(Debug, Default)]
pub struct VarSupply {
    next: u32,
}

impl VarSupply {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh, globally unused type variable.
    pub fn fresh(&mut self) -> Ty {
        let var = TyVar(self.next);
        self.next += 1;
        Ty::Var(var)
    }

    /// How many variables have been minted so far.
    pub fn minted(&self) -> u32 {
        self.next
    }
}

/// An equality constraint between two types, tagged with the expression
/// that generated it.
#[derive(Clone, Debug)]
pub struct Constraint {
    pub lhs: Ty,
    pub rhs: Ty,
    pub origin: NodeRef,
}

impl Constraint {
    fn replace_var(&self, var: TyVar, to: &Ty) -> Constraint {
        Constraint {
            lhs: self.lhs.replace_var(var, to),
            rhs: self.rhs.replace_var(var, to),
            origin: self.origin.clone(),
        }
    }
}

/// The outcome of solving a constraint store.
#[derive(Clone, Debug)]
pub enum Solution {
    /// Every constraint is satisfiable.
    Satisfied,
    /// Two types cannot be made equal.
    Conflict { expected: Ty, actual: Ty, origin: NodeRef },
    /// A variable would have to contain itself (occurs check).
    Infinite { origin: NodeRef },
}

/// Append-only list of constraints, alive for one checking pass.
#[derive(Debug, Default)]
pub struct ConstraintStore {
    constraints: Vec<Constraint>,
}

impl ConstraintStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, lhs: Ty, rhs: Ty, origin: NodeRef) {
        self.constraints.push(Constraint { lhs, rhs, origin });
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Solve the accumulated constraints. The store itself is not
    /// consumed; solving works on a copy so the driver can inspect the
    /// original constraints afterwards.
    pub fn solve(&self) -> Solution {
        let mut queue: VecDeque<Constraint> = self.constraints.iter().cloned().collect();

        while let Some(constraint) = queue.pop_front() {
            let Constraint { lhs, rhs, origin } = constraint;

            // Syntactically equal: nothing to learn.
            if lhs == rhs {
                continue;
            }

            // A variable on either side binds to the other side, after the
            // occurs check, and the binding is substituted through the
            // remaining queue immediately.
            if let Some(var) = lhs.as_var() {
                if rhs.occurs(var) {
                    return Solution::Infinite { origin };
                }
                for pending in queue.iter_mut() {
                    *pending = pending.replace_var(var, &rhs);
                }
                continue;
            }
            if let Some(var) = rhs.as_var() {
                if lhs.occurs(var) {
                    return Solution::Infinite { origin };
                }
                for pending in queue.iter_mut() {
                    *pending = pending.replace_var(var, &lhs);
                }
                continue;
            }

            // Same structural constructor: decompose pointwise. Tuples must
            // agree on arity; records and variants on their exact label
            // sets — reconstruction does not invent subtyping.
            match (lhs, rhs) {
                (Ty::Fun(p1, r1), Ty::Fun(p2, r2)) => {
                    queue.push_back(Constraint { lhs: *p1, rhs: *p2, origin: origin.clone() });
                    queue.push_back(Constraint { lhs: *r1, rhs: *r2, origin });
                }
                (Ty::Tuple(a), Ty::Tuple(b)) => {
                    if a.len() != b.len() {
                        return Solution::Conflict {
                            expected: Ty::Tuple(a),
                            actual: Ty::Tuple(b),
                            origin,
                        };
                    }
                    for (x, y) in a.into_iter().zip(b.into_iter()) {
                        queue.push_back(Constraint { lhs: x, rhs: y, origin: origin.clone() });
                    }
                }
                (Ty::Record(a), Ty::Record(b)) => {
                    if !labels_match(&a, &b) {
                        return Solution::Conflict {
                            expected: Ty::Record(a),
                            actual: Ty::Record(b),
                            origin,
                        };
                    }
                    for (label, x) in &a {
                        let y = field_type(&b, label).expect("label set checked above");
                        queue.push_back(Constraint {
                            lhs: x.clone(),
                            rhs: y.clone(),
                            origin: origin.clone(),
                        });
                    }
                }
                (Ty::Variant(a), Ty::Variant(b)) => {
                    if !labels_match(&a, &b) {
                        return Solution::Conflict {
                            expected: Ty::Variant(a),
                            actual: Ty::Variant(b),
                            origin,
                        };
                    }
                    for (label, x) in &a {
                        let y = field_type(&b, label).expect("label set checked above");
                        queue.push_back(Constraint {
                            lhs: x.clone(),
                            rhs: y.clone(),
                            origin: origin.clone(),
                        });
                    }
                }
                (Ty::Sum(l1, r1), Ty::Sum(l2, r2)) => {
                    queue.push_back(Constraint { lhs: *l1, rhs: *l2, origin: origin.clone() });
                    queue.push_back(Constraint { lhs: *r1, rhs: *r2, origin });
                }
                (Ty::List(a), Ty::List(b)) => {
                    queue.push_back(Constraint { lhs: *a, rhs: *b, origin });
                }
                (Ty::Ref(a), Ty::Ref(b)) => {
                    queue.push_back(Constraint { lhs: *a, rhs: *b, origin });
                }
                (lhs, rhs) => {
                    return Solution::Conflict { expected: lhs, actual: rhs, origin };
                }
            }
        }

        Solution::Satisfied
    }
}

fn labels_match(a: &[(String, Ty)], b: &[(String, Ty)]) -> bool {
    a.len() == b.len() && a.iter().all(|(label, _)| field_type(b, label).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> NodeRef {
        NodeRef::text("test")
    }

    #[test]
    fn empty_store_is_satisfied() {
        assert!(matches!(ConstraintStore::new().solve(), Solution::Satisfied));
    }

    #[test]
    fn var_binds_to_concrete_type() {
        let mut supply = VarSupply::new();
        let a = supply.fresh();

        let mut store = ConstraintStore::new();
        store.add(a.clone(), Ty::Nat, origin());
        store.add(a, Ty::Nat, origin());
        assert!(matches!(store.solve(), Solution::Satisfied));
    }

    #[test]
    fn conflicting_bindings_fail() {
        let mut supply = VarSupply::new();
        let a = supply.fresh();

        let mut store = ConstraintStore::new();
        store.add(a.clone(), Ty::Nat, origin());
        store.add(a, Ty::Bool, origin());
        match store.solve() {
            Solution::Conflict { expected, actual, .. } => {
                assert_eq!(expected, Ty::Nat);
                assert_eq!(actual, Ty::Bool);
            }
            other => panic!("expected Conflict, got {:?}", other),
        }
    }

    #[test]
    fn occurs_check_rejects_infinite_type() {
        let mut supply = VarSupply::new();
        let a = supply.fresh();

        let mut store = ConstraintStore::new();
        store.add(a.clone(), Ty::fun(a, Ty::Nat), origin());
        assert!(matches!(store.solve(), Solution::Infinite { .. }));
    }

    #[test]
    fn functions_decompose_pointwise() {
        let mut supply = VarSupply::new();
        let a = supply.fresh();
        let b = supply.fresh();

        let mut store = ConstraintStore::new();
        store.add(
            Ty::fun(a.clone(), b.clone()),
            Ty::fun(Ty::Nat, Ty::Bool),
            origin(),
        );
        store.add(a, Ty::Nat, origin());
        store.add(b, Ty::Bool, origin());
        assert!(matches!(store.solve(), Solution::Satisfied));
    }

    #[test]
    fn records_require_exact_label_sets() {
        let mut store = ConstraintStore::new();
        store.add(
            Ty::record(vec![("a", Ty::Nat)]),
            Ty::record(vec![("a", Ty::Nat), ("b", Ty::Bool)]),
            origin(),
        );
        assert!(matches!(store.solve(), Solution::Conflict { .. }));
    }

    #[test]
    fn record_fields_match_by_label_not_position() {
        let mut store = ConstraintStore::new();
        store.add(
            Ty::record(vec![("a", Ty::Nat), ("b", Ty::Bool)]),
            Ty::record(vec![("b", Ty::Bool), ("a", Ty::Nat)]),
            origin(),
        );
        assert!(matches!(store.solve(), Solution::Satisfied));
    }

    #[test]
    fn tuple_arity_mismatch_fails() {
        let mut store = ConstraintStore::new();
        store.add(
            Ty::Tuple(vec![Ty::Nat]),
            Ty::Tuple(vec![Ty::Nat, Ty::Nat]),
            origin(),
        );
        assert!(matches!(store.solve(), Solution::Conflict { .. }));
    }

    #[test]
    fn unrelated_constraint_order_does_not_change_outcome() {
        let mut supply = VarSupply::new();
        let a = supply.fresh();
        let b = supply.fresh();

        let mut forward = ConstraintStore::new();
        forward.add(a.clone(), Ty::Nat, origin());
        forward.add(b.clone(), Ty::Bool, origin());

        let mut backward = ConstraintStore::new();
        backward.add(b, Ty::Bool, origin());
        backward.add(a, Ty::Nat, origin());

        assert!(matches!(forward.solve(), Solution::Satisfied));
        assert!(matches!(backward.solve(), Solution::Satisfied));
    }

    #[test]
    fn transitive_chains_resolve() {
        let mut supply = VarSupply::new();
        let a = supply.fresh();
        let b = supply.fresh();

        let mut store = ConstraintStore::new();
        store.add(a.clone(), b.clone(), origin());
        store.add(b, Ty::list(Ty::Nat), origin());
        store.add(a, Ty::list(Ty::Nat), origin());
        assert!(matches!(store.solve(), Solution::Satisfied));
    }

    #[test]
    fn solve_does_not_consume_the_store() {
        let mut store = ConstraintStore::new();
        store.add(Ty::Nat, Ty::Nat, origin());
        let _ = store.solve();
        assert_eq!(store.len(), 1);
        let _ = store.solve();
    }
}
