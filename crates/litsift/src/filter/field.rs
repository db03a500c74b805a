//! Filterable fields: a fixed table from field name to accessor.

use std::borrow::Cow;
use std::fmt;

use crate::models::Record;

/// Reads one field of a record as text.
pub type Accessor = fn(&Record) -> Cow<'_, str>;

/// One entry of the field table.
pub struct FieldSpec {
    /// Canonical name used in `name:term`.
    pub name: &'static str,
    /// Alternative spellings accepted by the parser.
    pub aliases: &'static [&'static str],
    /// Whether free-text terms search this field.
    pub in_free_text: bool,
    /// Short description for `litsift fields`.
    pub description: &'static str,
    accessor: Accessor,
}

impl FieldSpec {
    /// Read the field from a record.
    #[must_use]
    pub fn text<'r>(&self, record: &'r Record) -> Cow<'r, str> {
        (self.accessor)(record)
    }

    fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.contains(&name)
    }
}

impl PartialEq for FieldSpec {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for FieldSpec {}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec").field("name", &self.name).finish()
    }
}

fn title(r: &Record) -> Cow<'_, str> {
    Cow::Borrowed(&r.title)
}

fn authors(r: &Record) -> Cow<'_, str> {
    Cow::Owned(r.author_names())
}

fn year(r: &Record) -> Cow<'_, str> {
    r.year.map_or(Cow::Borrowed(""), |y| Cow::Owned(y.to_string()))
}

fn venue(r: &Record) -> Cow<'_, str> {
    Cow::Borrowed(&r.venue)
}

fn abstract_text(r: &Record) -> Cow<'_, str> {
    Cow::Borrowed(r.r#abstract.as_deref().unwrap_or(""))
}

fn tldr(r: &Record) -> Cow<'_, str> {
    Cow::Borrowed(r.tldr.as_deref().unwrap_or(""))
}

fn citations(r: &Record) -> Cow<'_, str> {
    Cow::Owned(r.citation_count.to_string())
}

fn influential_citations(r: &Record) -> Cow<'_, str> {
    Cow::Owned(r.influential_citation_count.to_string())
}

fn publication_types(r: &Record) -> Cow<'_, str> {
    Cow::Owned(r.publication_type_names())
}

fn doi(r: &Record) -> Cow<'_, str> {
    Cow::Borrowed(r.doi().unwrap_or(""))
}

fn pdf_url(r: &Record) -> Cow<'_, str> {
    Cow::Borrowed(r.pdf_url().unwrap_or(""))
}

fn url(r: &Record) -> Cow<'_, str> {
    Cow::Borrowed(&r.url)
}

fn paper_id(r: &Record) -> Cow<'_, str> {
    Cow::Borrowed(&r.paper_id)
}

/// Every field a query can name.
pub static FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "title",
        aliases: &[],
        in_free_text: true,
        description: "Paper title",
        accessor: title,
    },
    FieldSpec {
        name: "authors",
        aliases: &["author"],
        in_free_text: true,
        description: "Author names, comma separated",
        accessor: authors,
    },
    FieldSpec {
        name: "year",
        aliases: &[],
        in_free_text: true,
        description: "Publication year",
        accessor: year,
    },
    FieldSpec {
        name: "venue",
        aliases: &[],
        in_free_text: true,
        description: "Journal or conference",
        accessor: venue,
    },
    FieldSpec {
        name: "abstract",
        aliases: &[],
        in_free_text: true,
        description: "Abstract text",
        accessor: abstract_text,
    },
    FieldSpec {
        name: "tldr",
        aliases: &["s2_tldr"],
        in_free_text: true,
        description: "Semantic Scholar TLDR summary",
        accessor: tldr,
    },
    FieldSpec {
        name: "citations",
        aliases: &[],
        in_free_text: true,
        description: "Citation count",
        accessor: citations,
    },
    FieldSpec {
        name: "influential_citations",
        aliases: &["influential"],
        in_free_text: true,
        description: "Influential citation count",
        accessor: influential_citations,
    },
    FieldSpec {
        name: "publication_types",
        aliases: &["type", "publication"],
        in_free_text: true,
        description: "Publication types (JournalArticle, Conference, ...)",
        accessor: publication_types,
    },
    FieldSpec {
        name: "doi",
        aliases: &[],
        in_free_text: true,
        description: "Digital Object Identifier",
        accessor: doi,
    },
    FieldSpec {
        name: "pdf_url",
        aliases: &["pdf"],
        in_free_text: true,
        description: "Open access PDF link",
        accessor: pdf_url,
    },
    FieldSpec {
        name: "url",
        aliases: &[],
        in_free_text: false,
        description: "Semantic Scholar page",
        accessor: url,
    },
    FieldSpec {
        name: "paper_id",
        aliases: &["id"],
        in_free_text: false,
        description: "Semantic Scholar paper ID",
        accessor: paper_id,
    },
];

/// Name that means "any free-text field".
pub const ANY_FIELD: &str = "any";

/// Look up a field by name or alias (case-insensitive).
#[must_use]
pub fn lookup(name: &str) -> Option<&'static FieldSpec> {
    let name = name.to_ascii_lowercase();
    FIELDS.iter().find(|spec| spec.answers_to(&name))
}

/// Fields searched by free-text terms.
pub fn free_text_fields() -> impl Iterator<Item = &'static FieldSpec> {
    FIELDS.iter().filter(|spec| spec.in_free_text)
}

/// The field a `name:term` refers to, resolved at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSelector {
    /// A known field.
    Named(&'static FieldSpec),
    /// `any:term`, same as a bare term.
    Any,
    /// A name outside the table; never matches.
    Unknown(String),
}

impl FieldSelector {
    /// Resolve a field name against the table.
    #[must_use]
    pub fn resolve(name: &str) -> Self {
        if name.eq_ignore_ascii_case(ANY_FIELD) {
            return Self::Any;
        }
        lookup(name).map_or_else(|| Self::Unknown(name.to_ascii_lowercase()), Self::Named)
    }
}

impl fmt::Display for FieldSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(spec) => f.write_str(spec.name),
            Self::Any => f.write_str(ANY_FIELD),
            Self::Unknown(name) => f.write_str(name),
        }
    }
}
