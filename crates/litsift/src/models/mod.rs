//! Data models.
//!
//! API models use `#[serde(default)]` for optional fields and
//! `#[serde(rename_all = "camelCase")]` to match API naming. [`Record`] is the
//! flattened, immutable form the rest of the crate works with.

mod paper;
mod record;

pub use paper::{AuthorRef, CitationStyles, OpenAccessPdf, Paper, SearchResult, Tldr};
pub use record::Record;
