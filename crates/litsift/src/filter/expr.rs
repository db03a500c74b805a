//! Expression tree and its evaluation.

use std::fmt;

use super::field::{self, FieldSelector};
use super::pattern::{self, Pattern};
use crate::models::Record;

/// A parsed filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Bare word (plain or wildcard) searched in every free-text field.
    Term(Pattern),
    /// Quoted phrase searched in every free-text field.
    Phrase(String),
    /// `field:term` or `field:"phrase"`.
    FieldTerm {
        /// Field the term is restricted to.
        field: FieldSelector,
        /// What to look for.
        pattern: Pattern,
    },
    /// Both sides must match.
    And(Box<Expr>, Box<Expr>),
    /// Either side must match.
    Or(Box<Expr>, Box<Expr>),
    /// Inner expression must not match.
    Not(Box<Expr>),
}

impl Expr {
    #[must_use]
    pub fn and(lhs: Self, rhs: Self) -> Self {
        Self::And(Box::new(lhs), Box::new(rhs))
    }

    #[must_use]
    pub fn or(lhs: Self, rhs: Self) -> Self {
        Self::Or(Box::new(lhs), Box::new(rhs))
    }

    #[must_use]
    pub fn negate(inner: Self) -> Self {
        Self::Not(Box::new(inner))
    }

    /// Evaluate against one record. `And`/`Or` short-circuit.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::Term(pattern) => matches_free_text(pattern, record),
            Self::Phrase(text) => field::free_text_fields()
                .any(|spec| pattern::contains_folded(&spec.text(record), text)),
            Self::FieldTerm { field, pattern } => match field {
                FieldSelector::Named(spec) => pattern.matches(&spec.text(record)),
                FieldSelector::Any => matches_free_text(pattern, record),
                FieldSelector::Unknown(_) => false,
            },
            Self::And(lhs, rhs) => lhs.matches(record) && rhs.matches(record),
            Self::Or(lhs, rhs) => lhs.matches(record) || rhs.matches(record),
            Self::Not(inner) => !inner.matches(record),
        }
    }

    /// Names of `field:term` fields that are not in the field table.
    pub(crate) fn collect_unknown_fields(&self, out: &mut Vec<String>) {
        match self {
            Self::FieldTerm { field: FieldSelector::Unknown(name), .. } => {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
            Self::And(lhs, rhs) | Self::Or(lhs, rhs) => {
                lhs.collect_unknown_fields(out);
                rhs.collect_unknown_fields(out);
            }
            Self::Not(inner) => inner.collect_unknown_fields(out),
            Self::Term(_) | Self::Phrase(_) | Self::FieldTerm { .. } => {}
        }
    }
}

fn matches_free_text(pattern: &Pattern, record: &Record) -> bool {
    field::free_text_fields().any(|spec| pattern.matches(&spec.text(record)))
}

/// Fully parenthesised form, e.g. `(graph AND (NOT title:"deep learning"))`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Term(pattern) => write!(f, "{pattern}"),
            Self::Phrase(text) => write!(f, "{}", Pattern::Phrase(text.clone())),
            Self::FieldTerm { field, pattern } => write!(f, "{field}:{pattern}"),
            Self::And(lhs, rhs) => write!(f, "({lhs} AND {rhs})"),
            Self::Or(lhs, rhs) => write!(f, "({lhs} OR {rhs})"),
            Self::Not(inner) => write!(f, "(NOT {inner})"),
        }
    }
}
