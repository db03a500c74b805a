//! Export records to CSV or BibTeX files.
//!
//! Files are written through a temporary file in the target directory that
//! is renamed over the target once complete, so a failed export never leaves
//! a partial file behind.

mod bibtex;
mod csv_io;

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tempfile::NamedTempFile;

pub use bibtex::{base_key, entry_type, to_bibtex};
pub use csv_io::{COLUMNS, CsvRow, read_csv, write_csv};

use crate::error::{ExportError, ExportResult};
use crate::models::Record;

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    #[value(alias = "bib")]
    Bibtex,
}

impl ExportFormat {
    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Bibtex => "bib",
        }
    }

    /// Guess the format from a path's extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        ext.parse().ok()
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "bib" | "bibtex" => Ok(Self::Bibtex),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Csv => "CSV",
            Self::Bibtex => "BibTeX",
        })
    }
}

/// Outcome of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Final path, extension included.
    pub path: PathBuf,
    pub format: ExportFormat,
    /// Records (CSV: data rows) written.
    pub written: usize,
}

/// Decide the format and final path for an export.
///
/// An explicit format wins over the extension; with neither, CSV is used.
/// The format's extension is appended when the path does not already end
/// with it.
#[must_use]
pub fn resolve_target(path: &Path, format: Option<ExportFormat>) -> (PathBuf, ExportFormat) {
    let format = format.or_else(|| ExportFormat::from_path(path)).unwrap_or(ExportFormat::Csv);

    let has_ext = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(format.extension()));

    let path = if has_ext {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".");
        name.push(format.extension());
        PathBuf::from(name)
    };

    (path, format)
}

/// Render records in the given format.
pub fn render<'a, I>(records: I, format: ExportFormat) -> ExportResult<(Vec<u8>, usize)>
where
    I: IntoIterator<Item = &'a Record>,
{
    match format {
        ExportFormat::Csv => {
            let mut buf = Vec::new();
            let written = write_csv(records, &mut buf)?;
            Ok((buf, written))
        }
        ExportFormat::Bibtex => {
            let records: Vec<&Record> = records.into_iter().collect();
            Ok((to_bibtex(records.iter().copied()).into_bytes(), records.len()))
        }
    }
}

/// Export records to `path`.
///
/// See [`resolve_target`] for how the format and final path are chosen.
pub fn export<'a, I>(records: I, path: &Path, format: Option<ExportFormat>) -> ExportResult<ExportSummary>
where
    I: IntoIterator<Item = &'a Record>,
{
    let (path, format) = resolve_target(path, format);
    let (bytes, written) = render(records, format)?;

    write_atomic(&path, &bytes)?;

    tracing::info!(path = %path.display(), %format, written, "Export complete");
    Ok(ExportSummary { path, format, written })
}

/// Write `bytes` to a temporary file next to `path`, then rename it into place.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> ExportResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| ExportError::io(path, e))?;
    tmp.write_all(bytes).map_err(|e| ExportError::io(path, e))?;
    tmp.as_file().sync_all().map_err(|e| ExportError::io(path, e))?;
    tmp.persist(path).map_err(|e| ExportError::io(path, e.error))?;

    Ok(())
}
