//! Match patterns of the parsed tree.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::TypeExpr;

/// A labeled sub-pattern inside a record pattern.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatternField {
    pub label: String,
    pub pattern: Pattern,
}

/// A pattern in a match arm, a catch handler, or a let binding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    /// Binds the whole scrutinee to a name; matches anything.
    Var { name: String },
    True,
    False,
    Int { value: u64 },
    Unit,
    Succ { inner: Box<Pattern> },
    Inl { inner: Box<Pattern> },
    Inr { inner: Box<Pattern> },
    Tuple { items: Vec<Pattern> },
    Record { fields: Vec<PatternField> },
    Variant { label: String, payload: Option<Box<Pattern>> },
    List { items: Vec<Pattern> },
    Cons { head: Box<Pattern>, tail: Box<Pattern> },
    /// A pattern with a type ascription: `p as T`.
    Asc { inner: Box<Pattern>, ty: TypeExpr },
}

impl Pattern {
    pub fn var(name: impl Into<String>) -> Self {
        Pattern::Var { name: name.into() }
    }

    pub fn int(value: u64) -> Self {
        Pattern::Int { value }
    }

    pub fn succ(inner: Pattern) -> Self {
        Pattern::Succ { inner: Box::new(inner) }
    }

    pub fn inl(inner: Pattern) -> Self {
        Pattern::Inl { inner: Box::new(inner) }
    }

    pub fn inr(inner: Pattern) -> Self {
        Pattern::Inr { inner: Box::new(inner) }
    }

    pub fn tuple(items: Vec<Pattern>) -> Self {
        Pattern::Tuple { items }
    }

    pub fn record(fields: Vec<(&str, Pattern)>) -> Self {
        Pattern::Record {
            fields: fields
                .into_iter()
                .map(|(label, pattern)| PatternField { label: label.to_string(), pattern })
                .collect(),
        }
    }

    pub fn variant(label: impl Into<String>, payload: Option<Pattern>) -> Self {
        Pattern::Variant { label: label.into(), payload: payload.map(Box::new) }
    }

    pub fn list(items: Vec<Pattern>) -> Self {
        Pattern::List { items }
    }

    pub fn cons(head: Pattern, tail: Pattern) -> Self {
        Pattern::Cons { head: Box::new(head), tail: Box::new(tail) }
    }

    pub fn asc(inner: Pattern, ty: TypeExpr) -> Self {
        Pattern::Asc { inner: Box::new(inner), ty }
    }

    /// Strip type ascriptions, yielding the underlying pattern shape.
    ///
    /// Pattern analysis never cares about ascriptions; every consumer
    /// calls this first.
    pub fn skip_ascriptions(&self) -> &Pattern {
        let mut pattern = self;
        while let Pattern::Asc { inner, .. } = pattern {
            pattern = inner;
        }
        pattern
    }

    /// Whether this pattern (after stripping ascriptions) is a bare variable.
    pub fn is_var(&self) -> bool {
        matches!(self.skip_ascriptions(), Pattern::Var { .. })
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Var { name } => write!(f, "{}", name),
            Pattern::True => write!(f, "true"),
            Pattern::False => write!(f, "false"),
            Pattern::Int { value } => write!(f, "{}", value),
            Pattern::Unit => write!(f, "unit"),
            Pattern::Succ { inner } => write!(f, "succ({})", inner),
            Pattern::Inl { inner } => write!(f, "inl({})", inner),
            Pattern::Inr { inner } => write!(f, "inr({})", inner),
            Pattern::Tuple { items } => {
                write!(f, "{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "}}")
            }
            Pattern::Record { fields } => {
                write!(f, "{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} = {}", field.label, field.pattern)?;
                }
                write!(f, "}}")
            }
            Pattern::Variant { label, payload } => match payload {
                Some(payload) => write!(f, "<|{} = {}|>", label, payload),
                None => write!(f, "<|{}|>", label),
            },
            Pattern::List { items } => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Pattern::Cons { head, tail } => write!(f, "cons({}, {})", head, tail),
            Pattern::Asc { inner, ty } => write!(f, "{} as {}", inner, ty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_ascriptions_reaches_the_shape() {
        let p = Pattern::asc(Pattern::asc(Pattern::var("x"), TypeExpr::Nat), TypeExpr::Nat);
        assert_eq!(p.skip_ascriptions(), &Pattern::var("x"));
        assert!(p.is_var());
    }

    #[test]
    fn display_forms() {
        assert_eq!(Pattern::succ(Pattern::var("n")).to_string(), "succ(n)");
        assert_eq!(
            Pattern::record(vec![("a", Pattern::var("x")), ("b", Pattern::int(0))]).to_string(),
            "{a = x, b = 0}"
        );
        assert_eq!(Pattern::variant("none", None).to_string(), "<|none|>");
        assert_eq!(
            Pattern::cons(Pattern::var("h"), Pattern::var("t")).to_string(),
            "cons(h, t)"
        );
    }
}
