//! Compact JSON output.

use serde_json::{Value, json};

use crate::models::Record;
use crate::results::Counts;

/// Create a compact record representation for JSON output.
///
/// Optional fields are left out when absent.
#[must_use]
pub fn compact_record(record: &Record) -> Value {
    let mut obj = json!({
        "id": record.paper_id,
        "title": record.title_or_default(),
        "year": record.year,
        "citations": record.citation_count,
        "influentialCitations": record.influential_citation_count,
    });

    if !record.authors.is_empty() {
        obj["authors"] = json!(record.authors);
    }

    if !record.venue.is_empty() {
        obj["venue"] = json!(record.venue);
    }

    if !record.publication_types.is_empty() {
        obj["publicationTypes"] = json!(record.publication_types);
    }

    if let Some(doi) = record.doi() {
        obj["doi"] = json!(doi);
    }

    if let Some(pdf) = record.pdf_url() {
        obj["pdf"] = json!(pdf);
    }

    if let Some(tldr) = &record.tldr {
        obj["tldr"] = json!(tldr);
    }

    if !record.url.is_empty() {
        obj["url"] = json!(record.url);
    }

    if let Some(bibtex) = &record.citation_bibtex {
        obj["bibtex"] = json!(bibtex);
    }

    obj
}

/// Records plus counts, as printed by `search --json`.
#[must_use]
pub fn results_json(records: &[&Record], counts: Counts) -> Value {
    json!({
        "counts": counts,
        "papers": records.iter().map(|r| compact_record(r)).collect::<Vec<_>>(),
    })
}
