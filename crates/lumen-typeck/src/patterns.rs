//! Pattern analysis: well-formedness and exhaustiveness.
//!
//! Two disjoint questions, both answered against the scrutinee type:
//! whether each pattern can match values of that type at all, and whether
//! a pattern list collectively covers every value of the type. Ascriptions
//! are stripped before any shape is examined.

use lumen_syntax::Pattern;

use crate::ty::{field_type, Ty};

// ── Well-formedness ─────────────────────────────────────────────────────

/// The patterns in `patterns` that cannot match values of type `ty`.
pub fn find_ill_typed<'a>(patterns: &[&'a Pattern], ty: &Ty) -> Vec<&'a Pattern> {
    patterns
        .iter()
        .copied()
        .filter(|pattern| !is_compatible(pattern, ty))
        .collect()
}

/// Pattern-vs-type compatibility.
///
/// A variable matches every type. Literal patterns need the matching
/// atomic type. Structural patterns need the matching constructor — with
/// the right arity for tuples, the exact label set for records, and a
/// known label for variants — and compatible sub-patterns.
pub fn is_compatible(pattern: &Pattern, ty: &Ty) -> bool {
    let pattern = pattern.skip_ascriptions();
    if matches!(pattern, Pattern::Var { .. }) {
        return true;
    }
    // An unresolved scrutinee constrains nothing yet.
    if matches!(ty, Ty::Var(_)) {
        return true;
    }
    match (pattern, ty) {
        (Pattern::True | Pattern::False, Ty::Bool) => true,
        (Pattern::Int { .. }, Ty::Nat) => true,
        (Pattern::Succ { inner }, Ty::Nat) => is_compatible(inner, &Ty::Nat),
        (Pattern::Unit, Ty::Unit) => true,
        (Pattern::Inl { inner }, Ty::Sum(left, _)) => is_compatible(inner, left),
        (Pattern::Inr { inner }, Ty::Sum(_, right)) => is_compatible(inner, right),
        (Pattern::Tuple { items }, Ty::Tuple(elems)) => {
            items.len() == elems.len()
                && items.iter().zip(elems.iter()).all(|(p, t)| is_compatible(p, t))
        }
        (Pattern::Record { fields }, Ty::Record(tys)) => {
            fields.len() == tys.len()
                && fields.iter().all(|field| {
                    field_type(tys, &field.label)
                        .map(|t| is_compatible(&field.pattern, t))
                        .unwrap_or(false)
                })
        }
        (Pattern::Variant { label, payload }, Ty::Variant(tys)) => {
            match field_type(tys, label) {
                Some(t) => payload
                    .as_deref()
                    .map(|p| is_compatible(p, t))
                    .unwrap_or(true),
                None => false,
            }
        }
        (Pattern::List { items }, Ty::List(elem)) => {
            items.iter().all(|p| is_compatible(p, elem))
        }
        (Pattern::Cons { head, tail }, Ty::List(elem)) => {
            is_compatible(head, elem) && is_compatible(tail, ty)
        }
        _ => false,
    }
}

// ── Exhaustiveness ──────────────────────────────────────────────────────

/// Whether the pattern list covers every value of type `ty`.
pub fn covers(patterns: &[&Pattern], ty: &Ty) -> bool {
    let stripped: Vec<&Pattern> = patterns.iter().map(|p| p.skip_ascriptions()).collect();
    covers_stripped(&stripped, ty)
}

fn covers_stripped(patterns: &[&Pattern], ty: &Ty) -> bool {
    match ty {
        Ty::Bool => covers_bool(patterns),
        Ty::Nat => covers_nat(patterns),
        Ty::Unit => covers_unit(patterns),
        Ty::Fun(_, _) => has_var(patterns),
        Ty::Tuple(_) => covers_tuple(patterns),
        Ty::Record(_) => covers_record(patterns),
        Ty::Sum(_, _) => covers_sum(patterns),
        Ty::Variant(fields) => covers_variant(patterns, fields),
        Ty::List(_) => covers_list(patterns),
        Ty::Ref(_) => true,
        // The pattern grammar has no dedicated Top/Bottom pattern, so only
        // a variable covers these.
        Ty::Top | Ty::Bottom => has_var(patterns),
        // An unresolved scrutinee: the shape of the first concrete pattern
        // decides which table applies.
        Ty::Var(_) => covers_unresolved(patterns),
        _ => has_var(patterns),
    }
}

fn has_var(patterns: &[&Pattern]) -> bool {
    patterns.iter().any(|p| matches!(p, Pattern::Var { .. }))
}

fn covers_bool(patterns: &[&Pattern]) -> bool {
    let mut has_true = false;
    let mut has_false = false;
    for pattern in patterns {
        match pattern {
            Pattern::Var { .. } => return true,
            Pattern::True => has_true = true,
            Pattern::False => has_false = true,
            _ => {}
        }
    }
    has_true && has_false
}

fn covers_nat(patterns: &[&Pattern]) -> bool {
    let mut has_literal = false;
    let mut has_succ_of_var = false;
    for pattern in patterns {
        match pattern {
            Pattern::Var { .. } => return true,
            Pattern::Int { .. } => has_literal = true,
            Pattern::Succ { inner } if inner.is_var() => has_succ_of_var = true,
            _ => {}
        }
    }
    has_literal && has_succ_of_var
}

fn covers_unit(patterns: &[&Pattern]) -> bool {
    patterns
        .iter()
        .any(|p| matches!(p, Pattern::Var { .. } | Pattern::Unit))
}

fn covers_tuple(patterns: &[&Pattern]) -> bool {
    patterns.iter().any(|p| match p {
        Pattern::Var { .. } => true,
        Pattern::Tuple { items } => items.iter().all(|item| item.is_var()),
        _ => false,
    })
}

fn covers_record(patterns: &[&Pattern]) -> bool {
    patterns.iter().any(|p| match p {
        Pattern::Var { .. } => true,
        Pattern::Record { fields } => fields.iter().all(|field| field.pattern.is_var()),
        _ => false,
    })
}

fn covers_sum(patterns: &[&Pattern]) -> bool {
    let mut has_inl = false;
    let mut has_inr = false;
    for pattern in patterns {
        match pattern {
            Pattern::Var { .. } => return true,
            Pattern::Inl { .. } => has_inl = true,
            Pattern::Inr { .. } => has_inr = true,
            _ => {}
        }
    }
    has_inl && has_inr
}

fn covers_variant(patterns: &[&Pattern], fields: &[(String, Ty)]) -> bool {
    let mut matched: Vec<&str> = Vec::new();
    for pattern in patterns {
        match pattern {
            Pattern::Var { .. } => return true,
            Pattern::Variant { label, .. } => matched.push(label),
            _ => {}
        }
    }
    fields.iter().all(|(label, _)| matched.iter().any(|m| m == label))
}

fn covers_list(patterns: &[&Pattern]) -> bool {
    patterns.iter().any(|p| match p {
        Pattern::Var { .. } => true,
        Pattern::List { items } => items.iter().all(|item| item.is_var()),
        _ => false,
    })
}

fn covers_unresolved(patterns: &[&Pattern]) -> bool {
    for pattern in patterns {
        match pattern {
            Pattern::Var { .. } => return true,
            Pattern::True | Pattern::False => return covers_bool(patterns),
            Pattern::Int { .. } | Pattern::Succ { .. } => return covers_nat(patterns),
            Pattern::Unit => return covers_unit(patterns),
            Pattern::Tuple { .. } => return covers_tuple(patterns),
            Pattern::Record { .. } => return covers_record(patterns),
            Pattern::Inl { .. } | Pattern::Inr { .. } => return covers_sum(patterns),
            // The variant's label set is unknowable here; binding reports
            // the ambiguity.
            Pattern::Variant { .. } => return true,
            Pattern::List { .. } | Pattern::Cons { .. } => return covers_list(patterns),
            Pattern::Asc { .. } => unreachable!("ascriptions are stripped before analysis"),
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(patterns: &[Pattern]) -> Vec<&Pattern> {
        patterns.iter().collect()
    }

    #[test]
    fn variables_are_compatible_with_everything() {
        let var = Pattern::var("x");
        for ty in [Ty::Bool, Ty::fun(Ty::Nat, Ty::Nat), Ty::Top, Ty::reference(Ty::Nat)] {
            assert!(is_compatible(&var, &ty));
        }
    }

    #[test]
    fn literals_need_the_matching_atom() {
        assert!(is_compatible(&Pattern::True, &Ty::Bool));
        assert!(!is_compatible(&Pattern::True, &Ty::Nat));
        assert!(is_compatible(&Pattern::int(3), &Ty::Nat));
        assert!(!is_compatible(&Pattern::int(3), &Ty::Bool));
        assert!(is_compatible(&Pattern::Unit, &Ty::Unit));
    }

    #[test]
    fn tuple_patterns_need_matching_arity() {
        let two = Ty::Tuple(vec![Ty::Nat, Ty::Bool]);
        assert!(is_compatible(
            &Pattern::tuple(vec![Pattern::var("a"), Pattern::var("b")]),
            &two
        ));
        assert!(!is_compatible(&Pattern::tuple(vec![Pattern::var("a")]), &two));
    }

    #[test]
    fn record_patterns_need_the_exact_label_set() {
        let ty = Ty::record(vec![("a", Ty::Nat), ("b", Ty::Bool)]);
        assert!(is_compatible(
            &Pattern::record(vec![("a", Pattern::var("x")), ("b", Pattern::var("y"))]),
            &ty
        ));
        assert!(!is_compatible(&Pattern::record(vec![("a", Pattern::var("x"))]), &ty));
        assert!(!is_compatible(
            &Pattern::record(vec![("a", Pattern::var("x")), ("c", Pattern::var("y"))]),
            &ty
        ));
    }

    #[test]
    fn variant_pattern_label_must_be_known() {
        let ty = Ty::variant(vec![("some", Ty::Nat), ("none", Ty::Unit)]);
        assert!(is_compatible(&Pattern::variant("some", Some(Pattern::var("n"))), &ty));
        assert!(!is_compatible(&Pattern::variant("other", None), &ty));
    }

    #[test]
    fn sub_patterns_are_checked_too() {
        let ty = Ty::sum(Ty::Nat, Ty::Bool);
        assert!(is_compatible(&Pattern::inl(Pattern::int(0)), &ty));
        assert!(!is_compatible(&Pattern::inl(Pattern::True), &ty));
    }

    #[test]
    fn ascriptions_are_stripped() {
        use lumen_syntax::TypeExpr;
        let p = Pattern::asc(Pattern::True, TypeExpr::Bool);
        assert!(is_compatible(&p, &Ty::Bool));
        assert!(covers(&[&Pattern::asc(Pattern::var("x"), TypeExpr::Bool)], &Ty::Bool));
    }

    #[test]
    fn bool_coverage() {
        assert!(covers(&refs(&[Pattern::True, Pattern::False]), &Ty::Bool));
        assert!(covers(&refs(&[Pattern::var("b")]), &Ty::Bool));
        assert!(!covers(&refs(&[Pattern::True]), &Ty::Bool));
    }

    #[test]
    fn nat_coverage_needs_literal_and_succ_of_var() {
        assert!(covers(
            &refs(&[Pattern::int(0), Pattern::succ(Pattern::var("n"))]),
            &Ty::Nat
        ));
        assert!(!covers(&refs(&[Pattern::int(0)]), &Ty::Nat));
        // succ of a non-variable does not close off the naturals.
        assert!(!covers(
            &refs(&[Pattern::int(0), Pattern::succ(Pattern::int(1))]),
            &Ty::Nat
        ));
    }

    #[test]
    fn sum_coverage() {
        let ty = Ty::sum(Ty::Nat, Ty::Bool);
        assert!(covers(
            &refs(&[Pattern::inl(Pattern::var("a")), Pattern::inr(Pattern::var("b"))]),
            &ty
        ));
        assert!(!covers(&refs(&[Pattern::inl(Pattern::var("a"))]), &ty));
    }

    #[test]
    fn variant_coverage_needs_all_labels() {
        let ty = Ty::variant(vec![("a", Ty::Nat), ("b", Ty::Unit)]);
        assert!(covers(
            &refs(&[
                Pattern::variant("a", Some(Pattern::var("x"))),
                Pattern::variant("b", None),
            ]),
            &ty
        ));
        assert!(!covers(&refs(&[Pattern::variant("a", Some(Pattern::var("x")))]), &ty));
    }

    #[test]
    fn structure_of_variables_covers_tuples_and_records() {
        let tuple = Ty::Tuple(vec![Ty::Nat, Ty::Bool]);
        assert!(covers(
            &refs(&[Pattern::tuple(vec![Pattern::var("a"), Pattern::var("b")])]),
            &tuple
        ));
        assert!(!covers(
            &refs(&[Pattern::tuple(vec![Pattern::var("a"), Pattern::True])]),
            &tuple
        ));

        let record = Ty::record(vec![("x", Ty::Nat)]);
        assert!(covers(&refs(&[Pattern::record(vec![("x", Pattern::var("v"))])]), &record));
    }

    #[test]
    fn references_are_always_covered() {
        assert!(covers(&[], &Ty::reference(Ty::Nat)));
    }

    #[test]
    fn unresolved_scrutinee_dispatches_on_first_concrete_shape() {
        let tv = Ty::Var(crate::ty::TyVar(0));
        assert!(covers(&refs(&[Pattern::True, Pattern::False]), &tv));
        assert!(!covers(&refs(&[Pattern::True]), &tv));
        assert!(covers(&refs(&[Pattern::var("x")]), &tv));
        assert!(covers(&[], &tv));
    }
}
