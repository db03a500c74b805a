//! Plain-text rows for the terminal.

use std::fmt::Write as _;

use crate::filter::FIELDS;
use crate::models::Record;

/// Longest title shown in a row, in characters.
const TITLE_WIDTH: usize = 80;

/// One numbered row: `  3 [x] Title (2019) · Lovelace et al. · 42 cit.`
#[must_use]
pub fn format_row(number: usize, record: &Record, selected: bool) -> String {
    let mark = if selected { "[x]" } else { "[ ]" };
    let title = truncate(record.title_or_default(), TITLE_WIDTH);
    let year = record.year.map_or_else(|| "n.d.".to_string(), |y| y.to_string());

    let byline = match record.authors.len() {
        0 => "Unknown".to_string(),
        1 => record.authors[0].clone(),
        _ => format!("{} et al.", record.authors[0]),
    };

    format!("{number:>4} {mark} {title} ({year}) · {byline} · {} cit.", record.citation_count)
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(3)).collect();
        cut.push_str("...");
        cut
    }
}

/// Table of filterable fields for `fields`.
#[must_use]
pub fn format_fields() -> String {
    let mut out = String::from("Filterable fields (bare terms and any:term search those marked *):\n");
    for spec in FIELDS {
        let aliases = if spec.aliases.is_empty() {
            String::new()
        } else {
            format!(" (also {})", spec.aliases.join(", "))
        };
        let mark = if spec.in_free_text { "*" } else { " " };
        let _ = writeln!(out, "  {mark} {:<22} {}{aliases}", spec.name, spec.description);
    }
    out.trim_end().to_string()
}
