//! Markdown output formatting.

use std::borrow::Cow;

use crate::models::Record;

/// Longest abstract shown in a list before truncation, in characters.
const ABSTRACT_PREVIEW_CHARS: usize = 300;

/// Format a list of records as Markdown.
#[must_use]
pub fn format_records_markdown(records: &[&Record]) -> String {
    if records.is_empty() {
        return "No papers found.".to_string();
    }

    let mut output = format!("# Papers ({} results)\n\n", records.len());

    for (i, record) in records.iter().enumerate() {
        output.push_str(&format_record_markdown(record, i + 1, true));
        output.push_str("\n---\n\n");
    }

    output
}

/// Format a single record as Markdown.
///
/// With `truncate`, the abstract is cut to a short preview.
#[must_use]
pub fn format_record_markdown(record: &Record, index: usize, truncate: bool) -> String {
    let mut output = String::new();

    // Title
    output.push_str(&format!("## {}. {}\n\n", index, record.title_or_default()));

    // Authors
    if !record.authors.is_empty() {
        output.push_str(&format!("**Authors**: {}\n\n", record.author_names()));
    }

    // Year and citations
    let mut meta = Vec::new();
    if let Some(year) = record.year {
        meta.push(format!("**Year**: {year}"));
    }
    meta.push(format!("**Citations**: {}", record.citation_count));
    meta.push(format!("**Influential**: {}", record.influential_citation_count));

    if !record.venue.is_empty() {
        meta.push(format!("**Venue**: {}", record.venue));
    }

    output.push_str(&format!("{}\n\n", meta.join(" | ")));

    if !record.publication_types.is_empty() {
        output.push_str(&format!("**Type**: {}\n\n", record.publication_type_names()));
    }

    // Links
    let mut ids = Vec::new();
    if let Some(doi) = record.doi() {
        ids.push(format!("[DOI](https://doi.org/{doi})"));
    }
    if let Some(arxiv) = record.external_ids.get("ArXiv") {
        ids.push(format!("[arXiv](https://arxiv.org/abs/{arxiv})"));
    }
    if !record.url.is_empty() {
        ids.push(format!("[S2]({})", record.url));
    }

    if !ids.is_empty() {
        output.push_str(&format!("**Links**: {}\n\n", ids.join(" | ")));
    }

    // PDF
    if let Some(pdf_url) = record.pdf_url() {
        output.push_str(&format!("**PDF**: [Open Access]({pdf_url})\n\n"));
    }

    // TLDR
    if let Some(tldr) = &record.tldr {
        output.push_str(&format!("> **TLDR**: {tldr}\n\n"));
    }

    if let Some(abs) = &record.r#abstract {
        let shown: Cow<'_, str> = if truncate && abs.chars().count() > ABSTRACT_PREVIEW_CHARS {
            Cow::Owned(format!("{}...", abs.chars().take(ABSTRACT_PREVIEW_CHARS).collect::<String>()))
        } else {
            Cow::Borrowed(abs)
        };
        output.push_str(&format!("**Abstract**: {shown}\n"));
    }

    output
}
