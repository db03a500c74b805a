//! Paged fetching of search results.
//!
//! [`pages`] yields one [`FetchStep`] per page or rate-limit wait;
//! [`fetch_all`] drains it into records and reports progress.

use std::time::Duration;

use async_stream::try_stream;
use futures::{Stream, StreamExt, pin_mut};

use super::RecordSource;
use crate::config::Config;
use crate::error::{ClientError, ClientResult};
use crate::models::Record;

/// Limits for one paged fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPlan {
    /// Stop after this many records (1..=1000).
    pub max_results: u32,
    /// Records requested per page.
    pub page_size: u32,
    /// Rate-limited attempts per page before giving up.
    pub rate_limit_retries: u32,
    /// Longest single rate-limit wait.
    pub max_rate_limit_wait: Duration,
}

impl FetchPlan {
    #[must_use]
    pub fn new(config: &Config, max_results: u32) -> Self {
        Self {
            max_results: Config::clamp_max_results(max_results),
            page_size: config.page_size.max(1),
            rate_limit_retries: config.rate_limit_retries,
            max_rate_limit_wait: config.max_rate_limit_wait,
        }
    }
}

/// One step of a paged fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchStep {
    /// A request for the page at `offset` is about to be sent.
    Requesting { offset: u32, total: usize },
    /// A page arrived.
    Page {
        /// Records of this page, already truncated to the plan's limit.
        records: Vec<Record>,
        /// Records fetched so far, this page included.
        total: usize,
    },
    /// The API asked us to slow down; the same page is retried after `wait`.
    RateLimited { wait: Duration, attempt: u32 },
}

/// Fetch progress for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// 0..=100.
    pub percent: u8,
    pub message: String,
}

impl Progress {
    fn new(fetched: usize, max_results: u32, message: String) -> Self {
        let percent = ((fetched as f64 / f64::from(max_results.max(1))) * 100.0).min(100.0) as u8;
        Self { percent, message }
    }
}

/// Stream the pages of a search.
///
/// Pages of `plan.page_size` records are requested until `plan.max_results`
/// records have arrived, a page comes back empty, or the response has no
/// `next` offset. A 429 is retried after `min(retry_after,
/// plan.max_rate_limit_wait)`, at most `plan.rate_limit_retries` times per
/// page; other errors end the stream.
pub fn pages<'a, S>(
    source: &'a S,
    query: &'a str,
    plan: FetchPlan,
) -> impl Stream<Item = ClientResult<FetchStep>> + Send + 'a
where
    S: RecordSource + ?Sized,
{
    try_stream! {
        let max = plan.max_results as usize;
        let mut offset: u32 = 0;
        let mut total = 0usize;

        while total < max {
            let limit = plan.page_size.min((max - total) as u32);

            let mut attempt = 0;
            let page = loop {
                yield FetchStep::Requesting { offset, total };
                match source.search_page(query, offset, limit).await {
                    Err(ClientError::RateLimited { retry_after }) => {
                        attempt += 1;
                        if attempt > plan.rate_limit_retries {
                            tracing::warn!(offset, attempts = attempt, "Rate limit retries exhausted");
                            Err::<(), _>(ClientError::RetriesExhausted { attempts: attempt })?;
                        }
                        let wait = retry_after.min(plan.max_rate_limit_wait);
                        tracing::info!(offset, wait_secs = wait.as_secs(), attempt, "Rate limited, waiting");
                        yield FetchStep::RateLimited { wait, attempt };
                        tokio::time::sleep(wait).await;
                    }
                    other => break other?,
                }
            };

            if page.data.is_empty() {
                tracing::debug!(offset, "Empty page, stopping");
                break;
            }

            let has_more = page.has_more();
            let returned = page.data.len();
            let records: Vec<Record> =
                page.data.into_iter().take(max - total).map(Record::from).collect();
            total += records.len();
            offset += returned as u32;

            tracing::debug!(offset, total, "Page fetched");
            yield FetchStep::Page { records, total };

            if !has_more {
                break;
            }
        }
    }
}

/// Run a whole paged fetch, calling `on_progress` before each request and
/// after each page.
pub async fn fetch_all<S, F>(
    source: &S,
    query: &str,
    plan: FetchPlan,
    mut on_progress: F,
) -> ClientResult<Vec<Record>>
where
    S: RecordSource + ?Sized,
    F: FnMut(Progress) + Send,
{
    let max = plan.max_results;
    let mut records = Vec::new();

    let steps = pages(source, query, plan);
    pin_mut!(steps);

    while let Some(step) = steps.next().await {
        match step? {
            FetchStep::Requesting { offset, total } => {
                on_progress(Progress::new(total, max, format!("Fetching results (offset: {offset})...")));
            }
            FetchStep::Page { records: page, total } => {
                records.extend(page);
                on_progress(Progress::new(total, max, format!("Processed {total} results...")));
            }
            FetchStep::RateLimited { wait, .. } => {
                on_progress(Progress::new(
                    records.len(),
                    max,
                    format!("Rate limit hit, waiting {} seconds...", wait.as_secs()),
                ));
            }
        }
    }

    tracing::info!(query, fetched = records.len(), "Search complete");
    Ok(records)
}
