//! The bibliographic record held by a result set.

use std::collections::{BTreeMap, BTreeSet};

use url::Url;

use super::Paper;

/// One bibliographic search result.
///
/// Built once from an API [`Paper`] and never modified afterwards; a
/// [`ResultSet`](crate::results::ResultSet) owns the records of one search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    /// Semantic Scholar paper ID.
    pub paper_id: String,

    /// Title, empty when the API has none.
    pub title: String,

    /// Author names in byline order.
    pub authors: Vec<String>,

    /// Publication year.
    pub year: Option<i32>,

    /// Journal or conference name, possibly empty.
    pub venue: String,

    /// Citation count.
    pub citation_count: u32,

    /// Influential citation count.
    pub influential_citation_count: u32,

    /// Semantic Scholar TLDR text.
    pub tldr: Option<String>,

    /// Abstract.
    pub r#abstract: Option<String>,

    /// Publication types such as `JournalArticle` or `Conference`.
    pub publication_types: BTreeSet<String>,

    /// External identifiers keyed by source (`DOI`, `ArXiv`, `CorpusId`, ...).
    pub external_ids: BTreeMap<String, String>,

    /// Open access PDF link.
    pub open_access_pdf: Option<Url>,

    /// Semantic Scholar landing page.
    pub url: String,

    /// BibTeX rendered by the API, when requested.
    pub citation_bibtex: Option<String>,
}

impl Record {
    /// Get the DOI if available.
    #[must_use]
    pub fn doi(&self) -> Option<&str> {
        self.external_ids.get("DOI").map(String::as_str)
    }

    /// Get the open access PDF URL if available.
    #[must_use]
    pub fn pdf_url(&self) -> Option<&str> {
        self.open_access_pdf.as_ref().map(Url::as_str)
    }

    /// Get the first author's name if available.
    #[must_use]
    pub fn first_author(&self) -> Option<&str> {
        self.authors.first().map(String::as_str)
    }

    /// Get author names as a comma-separated string.
    #[must_use]
    pub fn author_names(&self) -> String {
        self.authors.join(", ")
    }

    /// Get publication types as a comma-separated string.
    #[must_use]
    pub fn publication_type_names(&self) -> String {
        self.publication_types.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    }

    /// Get the title, falling back to "Untitled" if empty.
    #[must_use]
    pub fn title_or_default(&self) -> &str {
        if self.title.is_empty() { "Untitled" } else { &self.title }
    }
}

impl From<Paper> for Record {
    fn from(paper: Paper) -> Self {
        let authors = paper
            .authors
            .into_iter()
            .filter_map(|a| a.name)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();

        let external_ids = paper
            .external_ids
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(key, value)| match value {
                serde_json::Value::String(s) if !s.is_empty() => Some((key, s)),
                serde_json::Value::Number(n) => Some((key, n.to_string())),
                _ => None,
            })
            .collect();

        let open_access_pdf = paper.open_access_pdf.and_then(|pdf| pdf.url).and_then(|raw| {
            if raw.is_empty() {
                return None;
            }
            match Url::parse(&raw) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::debug!(paper_id = %paper.paper_id, url = %raw, error = %e, "Dropping invalid PDF URL");
                    None
                }
            }
        });

        Self {
            title: paper.title.unwrap_or_default(),
            authors,
            year: paper.year,
            venue: paper.venue.unwrap_or_default(),
            citation_count: paper.citation_count.unwrap_or(0),
            influential_citation_count: paper.influential_citation_count.unwrap_or(0),
            tldr: paper.tldr.and_then(|t| t.text).filter(|t| !t.is_empty()),
            r#abstract: paper.r#abstract.filter(|a| !a.is_empty()),
            publication_types: paper.publication_types.unwrap_or_default().into_iter().collect(),
            external_ids,
            open_access_pdf,
            url: paper.url.unwrap_or_default(),
            citation_bibtex: paper.citation_styles.and_then(|c| c.bibtex),
            paper_id: paper.paper_id,
        }
    }
}
