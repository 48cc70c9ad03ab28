//! Type expressions as they appear in the parsed tree.
//!
//! These are the *syntactic* types written by the user (or minted by the
//! host parser); the checker translates them into its own type algebra.
//! The enum is deliberately total: every shape a parser can produce has a
//! constructor here, including `Auto` for inferred spots.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A labeled field inside a record type node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeField {
    pub label: String,
    pub ty: TypeExpr,
}

/// A labeled field inside a variant type node.
///
/// The payload type is optional: a nullary variant label (under the
/// `nullary-variant-labels` extension) carries no type and reads as `Unit`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariantField {
    pub label: String,
    pub ty: Option<TypeExpr>,
}

/// A type node of the parsed tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeExpr {
    Bool,
    Nat,
    Unit,
    Fun { param: Box<TypeExpr>, ret: Box<TypeExpr> },
    Tuple { items: Vec<TypeExpr> },
    Record { fields: Vec<TypeField> },
    Sum { left: Box<TypeExpr>, right: Box<TypeExpr> },
    Variant { fields: Vec<VariantField> },
    List { elem: Box<TypeExpr> },
    Ref { inner: Box<TypeExpr> },
    Top,
    Bottom,
    /// An inferred spot: the checker mints a fresh type variable here.
    Auto,
    /// A user-written type name, i.e. a universal type parameter in scope.
    Name { name: String },
    Forall { params: Vec<String>, body: Box<TypeExpr> },
}

impl TypeExpr {
    pub fn fun(param: TypeExpr, ret: TypeExpr) -> Self {
        TypeExpr::Fun { param: Box::new(param), ret: Box::new(ret) }
    }

    pub fn sum(left: TypeExpr, right: TypeExpr) -> Self {
        TypeExpr::Sum { left: Box::new(left), right: Box::new(right) }
    }

    pub fn tuple(items: Vec<TypeExpr>) -> Self {
        TypeExpr::Tuple { items }
    }

    pub fn list(elem: TypeExpr) -> Self {
        TypeExpr::List { elem: Box::new(elem) }
    }

    pub fn reference(inner: TypeExpr) -> Self {
        TypeExpr::Ref { inner: Box::new(inner) }
    }

    pub fn name(name: impl Into<String>) -> Self {
        TypeExpr::Name { name: name.into() }
    }

    pub fn record(fields: Vec<(&str, TypeExpr)>) -> Self {
        TypeExpr::Record {
            fields: fields
                .into_iter()
                .map(|(label, ty)| TypeField { label: label.to_string(), ty })
                .collect(),
        }
    }

    pub fn variant(fields: Vec<(&str, Option<TypeExpr>)>) -> Self {
        TypeExpr::Variant {
            fields: fields
                .into_iter()
                .map(|(label, ty)| VariantField { label: label.to_string(), ty })
                .collect(),
        }
    }

    pub fn forall(params: Vec<&str>, body: TypeExpr) -> Self {
        TypeExpr::Forall {
            params: params.into_iter().map(str::to_string).collect(),
            body: Box::new(body),
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Bool => write!(f, "Bool"),
            TypeExpr::Nat => write!(f, "Nat"),
            TypeExpr::Unit => write!(f, "Unit"),
            TypeExpr::Fun { param, ret } => write!(f, "({}) -> ({})", param, ret),
            TypeExpr::Tuple { items } => {
                write!(f, "{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "}}")
            }
            TypeExpr::Record { fields } => {
                write!(f, "{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} : {}", field.label, field.ty)?;
                }
                write!(f, "}}")
            }
            TypeExpr::Sum { left, right } => write!(f, "({} + {})", left, right),
            TypeExpr::Variant { fields } => {
                write!(f, "<|")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match &field.ty {
                        Some(ty) => write!(f, "{} : {}", field.label, ty)?,
                        None => write!(f, "{}", field.label)?,
                    }
                }
                write!(f, "|>")
            }
            TypeExpr::List { elem } => write!(f, "List[{}]", elem),
            TypeExpr::Ref { inner } => write!(f, "&{}", inner),
            TypeExpr::Top => write!(f, "Top"),
            TypeExpr::Bottom => write!(f, "Bottom"),
            TypeExpr::Auto => write!(f, "auto"),
            TypeExpr::Name { name } => write!(f, "{}", name),
            TypeExpr::Forall { params, body } => {
                write!(f, "[{}]{}", params.join(", "), body)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        assert_eq!(TypeExpr::fun(TypeExpr::Nat, TypeExpr::Bool).to_string(), "(Nat) -> (Bool)");
        assert_eq!(
            TypeExpr::record(vec![("a", TypeExpr::Nat), ("b", TypeExpr::Unit)]).to_string(),
            "{a : Nat, b : Unit}"
        );
        assert_eq!(
            TypeExpr::variant(vec![("some", Some(TypeExpr::Nat)), ("none", None)]).to_string(),
            "<|some : Nat, none|>"
        );
        assert_eq!(TypeExpr::list(TypeExpr::Nat).to_string(), "List[Nat]");
        assert_eq!(
            TypeExpr::forall(vec!["X"], TypeExpr::fun(TypeExpr::name("X"), TypeExpr::name("X")))
                .to_string(),
            "[X](X) -> (X)"
        );
    }
}
