//! Translation from tree type nodes to the type algebra.
//!
//! Total by construction: every syntactic type maps to exactly one algebra
//! value. `auto` spots mint a fresh inference variable from the driver's
//! supply; a user-written type name becomes `Generic` (whether it resolves
//! is the typer's question, not the translator's). A nullary variant label
//! carries `Unit`.

use lumen_syntax::TypeExpr;

use crate::ty::Ty;
use crate::unify::VarSupply;

pub fn translate(node: &TypeExpr, vars: &mut VarSupply) -> Ty {
    match node {
        TypeExpr::Bool => Ty::Bool,
        TypeExpr::Nat => Ty::Nat,
        TypeExpr::Unit => Ty::Unit,
        TypeExpr::Fun { param, ret } => {
            Ty::fun(translate(param, vars), translate(ret, vars))
        }
        TypeExpr::Tuple { items } => {
            Ty::Tuple(items.iter().map(|item| translate(item, vars)).collect())
        }
        TypeExpr::Record { fields } => Ty::Record(
            fields
                .iter()
                .map(|field| (field.label.clone(), translate(&field.ty, vars)))
                .collect(),
        ),
        TypeExpr::Sum { left, right } => {
            Ty::sum(translate(left, vars), translate(right, vars))
        }
        TypeExpr::Variant { fields } => Ty::Variant(
            fields
                .iter()
                .map(|field| {
                    let ty = match &field.ty {
                        Some(ty) => translate(ty, vars),
                        None => Ty::Unit,
                    };
                    (field.label.clone(), ty)
                })
                .collect(),
        ),
        TypeExpr::List { elem } => Ty::list(translate(elem, vars)),
        TypeExpr::Ref { inner } => Ty::reference(translate(inner, vars)),
        TypeExpr::Top => Ty::Top,
        TypeExpr::Bottom => Ty::Bottom,
        TypeExpr::Auto => vars.fresh(),
        TypeExpr::Name { name } => Ty::Generic(name.clone()),
        TypeExpr::Forall { params, body } => {
            // Keep the prenex invariant even for nested user-written
            // quantifiers: adjacent Foralls collapse into one.
            match translate(body, vars) {
                Ty::Forall(inner_params, inner_body) => {
                    let mut all = params.clone();
                    all.extend(inner_params);
                    Ty::Forall(all, inner_body)
                }
                body => Ty::Forall(params.clone(), Box::new(body)),
            }
        }
    }
}
