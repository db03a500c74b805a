//! Paper data model matching Semantic Scholar API schema.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A paper as returned by the `paper/search` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    /// Unique Semantic Scholar paper ID.
    #[serde(default)]
    pub paper_id: String,

    /// Paper title.
    #[serde(default)]
    pub title: Option<String>,

    /// Paper abstract.
    #[serde(default)]
    pub r#abstract: Option<String>,

    /// Publication year.
    #[serde(default)]
    pub year: Option<i32>,

    /// Publication venue (journal or conference).
    #[serde(default)]
    pub venue: Option<String>,

    /// Number of citations this paper has received.
    #[serde(default)]
    pub citation_count: Option<u32>,

    /// Influential citation count.
    #[serde(default)]
    pub influential_citation_count: Option<u32>,

    /// List of authors.
    #[serde(default)]
    pub authors: Vec<AuthorRef>,

    /// AI-generated TLDR summary.
    #[serde(default)]
    pub tldr: Option<Tldr>,

    /// Publication types (e.g., "JournalArticle", "Conference").
    #[serde(default)]
    pub publication_types: Option<Vec<String>>,

    /// External identifiers. Values are mostly strings; `CorpusId` is numeric.
    #[serde(default)]
    pub external_ids: Option<BTreeMap<String, serde_json::Value>>,

    /// Open access PDF information.
    #[serde(default)]
    pub open_access_pdf: Option<OpenAccessPdf>,

    /// Semantic Scholar landing page.
    #[serde(default)]
    pub url: Option<String>,

    /// Pre-rendered citations.
    #[serde(default)]
    pub citation_styles: Option<CitationStyles>,
}

/// Author entry embedded in a paper.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorRef {
    /// Author ID.
    #[serde(default)]
    pub author_id: Option<String>,

    /// Author name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Open access PDF information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAccessPdf {
    /// Direct URL to the PDF.
    #[serde(default)]
    pub url: Option<String>,

    /// Status of open access.
    #[serde(default)]
    pub status: Option<String>,
}

/// AI-generated TLDR summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tldr {
    /// Summary text.
    #[serde(default)]
    pub text: Option<String>,

    /// Model used to generate the summary.
    #[serde(default)]
    pub model: Option<String>,
}

/// Citation strings rendered by the API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CitationStyles {
    /// BibTeX entry.
    #[serde(default)]
    pub bibtex: Option<String>,
}

/// Search result page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResult {
    /// Total number of matching papers.
    #[serde(default)]
    pub total: u64,

    /// Current offset in the result set.
    #[serde(default)]
    pub offset: u32,

    /// Offset of the next page, absent on the last page.
    #[serde(default)]
    pub next: Option<u32>,

    /// List of papers in this page.
    #[serde(default)]
    pub data: Vec<Paper>,
}

impl SearchResult {
    /// Check if there are more results available.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.next.is_some()
    }
}
