//! LitSift
//!
//! Search Semantic Scholar, sift the results with a boolean/wildcard filter
//! language, and export what is left to BibTeX or CSV.
//!
//! # Features
//!
//! - **Filter language**: free text, `field:term`, `"phrases"`, `netw*` globs,
//!   `AND`/`OR`/`NOT` with parentheses
//! - **Paged fetching**: up to 1000 results, rate-limit aware, cancellable
//! - **Atomic export**: CSV and BibTeX written via temp file and rename
//! - **Cached**: 5-minute TTL cache reduces API calls
//!
//! # Example
//!
//! ```no_run
//! use litsift::{client::{FetchPlan, fetch_all}, config::Config, filter::Query, SemanticScholarClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let client = SemanticScholarClient::new(&config)?;
//!
//!     let records = fetch_all(&client, "graph neural networks", FetchPlan::new(&config, 200), |_| {}).await?;
//!     let query: Query = r#"title:"message passing" NOT survey"#.parse()?;
//!     let kept = records.iter().filter(|r| query.matches(r)).count();
//!     println!("{kept} of {} records match", records.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod formatters;
pub mod models;
pub mod results;
pub mod session;
pub mod shell;

pub use client::{RecordSource, SemanticScholarClient};
pub use config::Config;
pub use error::{ClientError, ExportError, QueryError, SiftError};
pub use filter::Query;
pub use models::Record;
pub use results::ResultSet;
pub use session::Session;
