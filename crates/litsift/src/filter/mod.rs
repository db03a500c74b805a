//! Boolean/wildcard filter language over [`Record`]s.
//!
//! ```text
//! graph neural                  implicit AND
//! title:"deep learning" NOT survey
//! (netw* OR graph) AND year:201?
//! authors:hinton OR author:lecun
//! ```
//!
//! Terms match case-insensitive substrings, quoted phrases keep their inner
//! whitespace, `*`/`?` globs match whole words. `NOT` binds tighter than
//! `AND`, which binds tighter than `OR`. Unknown `field:` names parse but
//! never match.

mod expr;
pub mod field;
mod lexer;
mod parser;
mod pattern;

use std::fmt;
use std::str::FromStr;

pub use expr::Expr;
pub use field::{FIELDS, FieldSelector, FieldSpec};
pub use pattern::{Glob, Pattern};

use crate::error::QueryError;
use crate::models::Record;

/// A parsed filter query.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    source: String,
    expr: Option<Expr>,
    unknown_fields: Vec<String>,
}

impl Query {
    /// Parse query text.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] with the byte offset of the first problem.
    pub fn parse(text: &str) -> Result<Self, QueryError> {
        let expr = parser::parse(text)?;
        let mut unknown_fields = Vec::new();
        if let Some(expr) = &expr {
            expr.collect_unknown_fields(&mut unknown_fields);
        }
        if !unknown_fields.is_empty() {
            tracing::debug!(fields = ?unknown_fields, "Filter names unknown fields");
        }
        Ok(Self { source: text.trim().to_string(), expr, unknown_fields })
    }

    /// Whether the query was blank. A blank query matches everything.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.expr.is_none()
    }

    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        self.expr.as_ref().is_none_or(|expr| expr.matches(record))
    }

    #[must_use]
    pub const fn expr(&self) -> Option<&Expr> {
        self.expr.as_ref()
    }

    /// `field:` names that are not in the field table.
    #[must_use]
    pub fn unknown_fields(&self) -> &[String] {
        &self.unknown_fields
    }

    /// The query text as entered, trimmed.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl FromStr for Query {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Normalized, fully parenthesised form.
impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.expr {
            Some(expr) => write!(f, "{expr}"),
            None => Ok(()),
        }
    }
}

/// Parse `query` and test it against one record.
///
/// # Errors
///
/// Returns [`QueryError`] when the query does not parse.
pub fn matches(query: &str, record: &Record) -> Result<bool, QueryError> {
    Ok(Query::parse(query)?.matches(record))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Record {
        Record {
            paper_id: "abc123".into(),
            title: "Graph Neural Networks for Deep Learning".into(),
            authors: vec!["Ada Lovelace".into(), "Alan Turing".into()],
            year: Some(2019),
            venue: "NeurIPS".into(),
            citation_count: 420,
            r#abstract: Some("We study message passing.".into()),
            url: "https://www.semanticscholar.org/paper/abc123".into(),
            ..Record::default()
        }
    }

    #[test]
    fn test_blank_query_matches_all() {
        let query = Query::parse("   ").unwrap();
        assert!(query.is_empty());
        assert!(query.matches(&record()));
        assert!(query.matches(&Record::default()));
        assert_eq!(query.to_string(), "");
    }

    #[test]
    fn test_free_text_and_fields() {
        let r = record();
        assert!(matches("graph", &r).unwrap());
        assert!(matches("LOVELACE", &r).unwrap());
        assert!(matches("venue:neurips year:2019", &r).unwrap());
        assert!(matches("message passing", &r).unwrap());
        assert!(!matches("venue:icml", &r).unwrap());
        assert!(matches("any:turing", &r).unwrap());
    }

    #[test]
    fn test_free_text_skips_url_and_id() {
        let r = record();
        assert!(!matches("semanticscholar", &r).unwrap());
        assert!(matches("url:semanticscholar", &r).unwrap());
        assert!(matches("id:abc123", &r).unwrap());
    }

    #[test]
    fn test_free_text_does_not_span_fields() {
        // "NeurIPS" is the venue, "2019" is the year.
        assert!(!matches(r#""neurips 2019""#, &record()).unwrap());
    }

    #[test]
    fn test_unknown_field_never_matches_and_is_reported() {
        let query = Query::parse("colour:red OR graph").unwrap();
        assert_eq!(query.unknown_fields(), ["colour"]);
        assert!(query.matches(&record()));
        assert!(!matches("colour:red", &record()).unwrap());
        assert!(matches("NOT colour:red", &record()).unwrap());
    }

    #[test]
    fn test_phrase_versus_words() {
        let r = record();
        assert!(matches(r#"title:"deep learning""#, &r).unwrap());
        assert!(!matches(r#"title:"learning deep""#, &r).unwrap());
        assert!(matches("title:learning title:deep", &r).unwrap());
    }

    #[test]
    fn test_parse_error_propagates() {
        let err = matches("(graph", &record()).unwrap_err();
        assert_eq!(err.kind, crate::error::QueryErrorKind::UnclosedParen);
    }

    #[test]
    fn test_from_str_and_source() {
        let query: Query = "  graph   OR  tree ".parse().unwrap();
        assert_eq!(query.source(), "graph   OR  tree");
        assert_eq!(query.to_string(), "(graph OR tree)");
    }
}
