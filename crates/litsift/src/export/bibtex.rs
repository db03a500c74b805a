//! BibTeX export.
//!
//! Entries are generated from record fields rather than taken from the API's
//! pre-rendered citation, so keys are stable and unique within one file.

use std::collections::HashSet;

use crate::models::Record;

/// Render records as BibTeX, one entry per record, blank line between.
#[must_use]
pub fn to_bibtex<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut keys = KeyAllocator::default();
    let mut output = String::new();

    for record in records {
        let key = keys.allocate(&base_key(record));
        output.push_str(&format_entry(record, &key));
        output.push('\n');
    }

    output
}

/// BibTeX entry type for a record's publication types.
#[must_use]
pub fn entry_type(record: &Record) -> &'static str {
    let has = |name: &str| record.publication_types.contains(name);
    if has("JournalArticle") {
        "article"
    } else if has("Conference") {
        "inproceedings"
    } else if has("Book") {
        "book"
    } else if has("BookSection") {
        "incollection"
    } else {
        "misc"
    }
}

fn venue_field(kind: &str) -> &'static str {
    match kind {
        "article" => "journal",
        "inproceedings" | "incollection" => "booktitle",
        "book" => "publisher",
        _ => "howpublished",
    }
}

/// First-author surname plus year, e.g. `Lovelace1843`.
///
/// Falls back to `Unknown` and `nd`.
#[must_use]
pub fn base_key(record: &Record) -> String {
    let surname = record
        .first_author()
        .and_then(|name| name.split_whitespace().last())
        .map(ascii_fold)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());

    let year = record.year.map_or_else(|| "nd".to_string(), |y| y.to_string());

    format!("{surname}{year}")
}

/// Hands out `key`, `keya`, `keyb`, ... so no key repeats.
#[derive(Debug, Default)]
struct KeyAllocator {
    used: HashSet<String>,
}

impl KeyAllocator {
    fn allocate(&mut self, base: &str) -> String {
        if self.used.insert(base.to_string()) {
            return base.to_string();
        }
        let mut n = 0;
        loop {
            let candidate = format!("{base}{}", suffix(n));
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// 0 -> a, 25 -> z, 26 -> aa, ...
fn suffix(mut n: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(char::from(b'a' + (n % 26) as u8));
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.iter().rev().collect()
}

/// Strip accents from common Latin letters and drop anything else non-alphanumeric.
fn ascii_fold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            continue;
        }
        let folded = match ch {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
            'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ā' => "A",
            'æ' => "ae",
            'Æ' => "AE",
            'ç' | 'ć' | 'č' => "c",
            'Ç' | 'Ć' | 'Č' => "C",
            'ď' | 'đ' => "d",
            'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ę' | 'ě' => "e",
            'È' | 'É' | 'Ê' | 'Ë' | 'Ē' => "E",
            'ğ' => "g",
            'ì' | 'í' | 'î' | 'ï' | 'ī' | 'ı' => "i",
            'Ì' | 'Í' | 'Î' | 'Ï' | 'İ' => "I",
            'ł' => "l",
            'Ł' => "L",
            'ñ' | 'ń' | 'ň' => "n",
            'Ñ' => "N",
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
            'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => "O",
            'œ' => "oe",
            'ř' => "r",
            'ś' | 'š' | 'ş' => "s",
            'Ś' | 'Š' | 'Ş' => "S",
            'ß' => "ss",
            'ť' | 'ţ' => "t",
            'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => "u",
            'Ù' | 'Ú' | 'Û' | 'Ü' => "U",
            'ý' | 'ÿ' => "y",
            'ź' | 'ż' | 'ž' => "z",
            'Ź' | 'Ż' | 'Ž' => "Z",
            _ => "",
        };
        out.push_str(folded);
    }
    out
}

fn format_entry(record: &Record, key: &str) -> String {
    let kind = entry_type(record);
    let mut output = format!("@{kind}{{{key},\n");

    output.push_str(&format!("  title = {{{}}},\n", escape_bibtex(record.title_or_default())));

    if !record.authors.is_empty() {
        output.push_str(&format!("  author = {{{}}},\n", escape_bibtex(&record.authors.join(" and "))));
    }

    if let Some(year) = record.year {
        output.push_str(&format!("  year = {{{year}}},\n"));
    }

    if !record.venue.is_empty() {
        output.push_str(&format!("  {} = {{{}}},\n", venue_field(kind), escape_bibtex(&record.venue)));
    }

    if let Some(doi) = record.doi() {
        output.push_str(&format!("  doi = {{{}}},\n", escape_link(doi)));
    }

    if let Some(url) = record.pdf_url().or_else(|| Some(record.url.as_str()).filter(|u| !u.is_empty())) {
        output.push_str(&format!("  url = {{{}}},\n", escape_link(url)));
    }

    if let Some(abs) = &record.r#abstract {
        let abs_clean = abs.replace('\r', "").replace('\n', " ");
        output.push_str(&format!("  abstract = {{{}}},\n", escape_bibtex(&abs_clean)));
    }

    output.push_str("}\n");
    output
}

/// Escape LaTeX specials for BibTeX output.
fn escape_bibtex(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\textbackslash{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '~' => out.push_str("\\textasciitilde{}"),
            '{' | '}' | '&' | '%' | '$' | '#' | '_' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

/// DOIs and URLs stay verbatim apart from the comment and parameter characters.
fn escape_link(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '%' | '#') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
