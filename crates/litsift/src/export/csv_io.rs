//! CSV export and re-import.

use std::collections::HashSet;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::ExportResult;
use crate::models::Record;

/// Column headers, in file order.
pub const COLUMNS: &[&str] = &[
    "S2 ID",
    "Title",
    "Authors",
    "Year",
    "Venue",
    "Citations",
    "Influential Citations",
    "S2 TLDR",
    "Abstract",
    "Publication Type",
    "DOI",
    "PDF URL",
    "S2 URL",
];

/// One CSV row. Every value is the text written to the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CsvRow {
    #[serde(rename = "S2 ID")]
    pub paper_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Authors")]
    pub authors: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Venue")]
    pub venue: String,
    #[serde(rename = "Citations")]
    pub citations: String,
    #[serde(rename = "Influential Citations")]
    pub influential_citations: String,
    #[serde(rename = "S2 TLDR")]
    pub tldr: String,
    #[serde(rename = "Abstract")]
    pub r#abstract: String,
    #[serde(rename = "Publication Type")]
    pub publication_types: String,
    #[serde(rename = "DOI")]
    pub doi: String,
    #[serde(rename = "PDF URL")]
    pub pdf_url: String,
    #[serde(rename = "S2 URL")]
    pub url: String,
}

impl CsvRow {
    fn is_blank(&self) -> bool {
        [
            &self.paper_id,
            &self.title,
            &self.authors,
            &self.year,
            &self.venue,
            &self.citations,
            &self.influential_citations,
            &self.tldr,
            &self.r#abstract,
            &self.publication_types,
            &self.doi,
            &self.pdf_url,
            &self.url,
        ]
        .iter()
        .all(|value| value.is_empty())
    }
}

impl From<&Record> for CsvRow {
    fn from(record: &Record) -> Self {
        Self {
            paper_id: record.paper_id.clone(),
            title: record.title.clone(),
            authors: record.author_names(),
            year: record.year.map(|y| y.to_string()).unwrap_or_default(),
            venue: record.venue.clone(),
            citations: record.citation_count.to_string(),
            influential_citations: record.influential_citation_count.to_string(),
            tldr: record.tldr.clone().unwrap_or_default(),
            r#abstract: record.r#abstract.clone().unwrap_or_default(),
            publication_types: record.publication_type_names(),
            doi: record.doi().unwrap_or_default().to_string(),
            pdf_url: record.pdf_url().unwrap_or_default().to_string(),
            url: record.url.clone(),
        }
    }
}

/// Write records as CSV with every field quoted.
///
/// The header row is always written. Duplicate rows and rows with no values
/// are skipped. Returns the number of data rows written.
pub fn write_csv<'a, W, I>(records: I, writer: W) -> ExportResult<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a Record>,
{
    write_rows(records.into_iter().map(CsvRow::from), writer)
}

pub(crate) fn write_rows<W, I>(rows: I, writer: W) -> ExportResult<usize>
where
    W: Write,
    I: IntoIterator<Item = CsvRow>,
{
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(writer);

    wtr.write_record(COLUMNS)?;

    let mut seen = HashSet::new();
    let mut written = 0;
    for row in rows {
        if row.is_blank() || seen.contains(&row) {
            continue;
        }
        wtr.serialize(&row)?;
        seen.insert(row);
        written += 1;
    }

    wtr.flush().map_err(csv::Error::from)?;
    Ok(written)
}

/// Read rows back from a file produced by [`write_csv`].
pub fn read_csv<R: Read>(reader: R) -> ExportResult<Vec<CsvRow>> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let rows = rdr.deserialize().collect::<Result<Vec<CsvRow>, _>>()?;
    Ok(rows)
}
