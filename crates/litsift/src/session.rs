//! Owns the result set and the at-most-one in-flight fetch.
//!
//! A search runs in a spawned task that reports back over a channel. Every
//! search bumps the generation counter; events carry the generation they
//! belong to and anything from an older generation is dropped, so a
//! superseded fetch can never overwrite newer results.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::client::{FetchPlan, Progress, RecordSource, fetch_all};
use crate::config::Config;
use crate::error::{ClientError, SiftError};
use crate::models::Record;
use crate::results::ResultSet;

/// Message from a fetch task.
#[derive(Debug)]
pub enum FetchEvent {
    Progress { generation: u64, progress: Progress },
    Finished { generation: u64, records: Vec<Record> },
    Failed { generation: u64, error: ClientError },
}

impl FetchEvent {
    #[must_use]
    pub const fn generation(&self) -> u64 {
        match self {
            Self::Progress { generation, .. }
            | Self::Finished { generation, .. }
            | Self::Failed { generation, .. } => *generation,
        }
    }
}

/// What applying a [`FetchEvent`] did to the session.
#[derive(Debug)]
pub enum Update {
    Progress(Progress),
    /// The result set now holds this many records.
    Loaded(usize),
    /// The fetch failed; the result set is empty.
    Failed(ClientError),
    /// Event from a superseded fetch, ignored.
    Stale,
}

/// Front-end state: the current result set plus the running fetch.
pub struct Session {
    source: Arc<dyn RecordSource>,
    config: Config,
    results: ResultSet,
    generation: u64,
    inflight: Option<JoinHandle<()>>,
    events_tx: mpsc::UnboundedSender<FetchEvent>,
    events_rx: mpsc::UnboundedReceiver<FetchEvent>,
    last_query: Option<String>,
    last_progress: Option<Progress>,
}

impl Session {
    #[must_use]
    pub fn new(source: Arc<dyn RecordSource>, config: Config) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            source,
            config,
            results: ResultSet::new(),
            generation: 0,
            inflight: None,
            events_tx,
            events_rx,
            last_query: None,
            last_progress: None,
        }
    }

    #[must_use]
    pub const fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn results_mut(&mut self) -> &mut ResultSet {
        &mut self.results
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    #[must_use]
    pub const fn last_progress(&self) -> Option<&Progress> {
        self.last_progress.as_ref()
    }

    /// Whether a fetch is running.
    #[must_use]
    pub fn is_fetching(&self) -> bool {
        self.inflight.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Start a search, cancelling any fetch already running.
    ///
    /// The current records are dropped straight away; the active filter and
    /// sort stay. Returns the new generation.
    pub fn start_search(&mut self, query: &str, max_results: u32) -> Result<u64, SiftError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SiftError::validation("query", "Query cannot be empty"));
        }

        self.cancel();
        self.generation += 1;
        self.results.replace(Vec::new());
        self.last_query = Some(query.to_string());
        self.last_progress = None;

        let generation = self.generation;
        let plan = FetchPlan::new(&self.config, max_results);
        let source = Arc::clone(&self.source);
        let tx = self.events_tx.clone();
        let query = query.to_string();

        tracing::info!(generation, query = %query, max_results = plan.max_results, "Starting search");

        self.inflight = Some(tokio::spawn(async move {
            let progress_tx = tx.clone();
            let result = fetch_all(source.as_ref(), &query, plan, |progress| {
                let _ = progress_tx.send(FetchEvent::Progress { generation, progress });
            })
            .await;

            let event = match result {
                Ok(records) => FetchEvent::Finished { generation, records },
                Err(error) => FetchEvent::Failed { generation, error },
            };
            // The receiver only goes away with the session.
            let _ = tx.send(event);
        }));

        Ok(generation)
    }

    /// Abort the running fetch, if any. Records are left as they are.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.inflight.take() {
            if !handle.is_finished() {
                tracing::debug!(generation = self.generation, "Aborting in-flight fetch");
            }
            handle.abort();
        }
    }

    /// Cancel any fetch and discard records, filter, sort and selection.
    pub fn reset(&mut self) {
        self.cancel();
        self.generation += 1;
        self.results.clear();
        self.last_query = None;
        self.last_progress = None;
        tracing::info!("Session reset");
    }

    /// Wait for the next event from a fetch task.
    pub async fn next_event(&mut self) -> Option<FetchEvent> {
        self.events_rx.recv().await
    }

    /// Apply an event to the session.
    pub fn handle_event(&mut self, event: FetchEvent) -> Update {
        if event.generation() != self.generation {
            tracing::debug!(
                event_generation = event.generation(),
                current = self.generation,
                "Dropping stale fetch event"
            );
            return Update::Stale;
        }

        match event {
            FetchEvent::Progress { progress, .. } => {
                self.last_progress = Some(progress.clone());
                Update::Progress(progress)
            }
            FetchEvent::Finished { records, .. } => {
                self.inflight = None;
                let count = records.len();
                self.results.replace(records);
                Update::Loaded(count)
            }
            FetchEvent::Failed { error, .. } => {
                tracing::warn!(error = %error, "Search failed");
                self.inflight = None;
                self.results.replace(Vec::new());
                Update::Failed(error)
            }
        }
    }

    /// Run a search to completion, reporting progress along the way.
    pub async fn search<F>(&mut self, query: &str, max_results: u32, mut on_progress: F) -> Result<usize, SiftError>
    where
        F: FnMut(&Progress),
    {
        self.start_search(query, max_results)?;

        while let Some(event) = self.next_event().await {
            match self.handle_event(event) {
                Update::Progress(progress) => on_progress(&progress),
                Update::Loaded(count) => return Ok(count),
                Update::Failed(error) => return Err(error.into()),
                Update::Stale => {}
            }
        }

        Ok(self.results.len())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("generation", &self.generation)
            .field("fetching", &self.is_fetching())
            .field("records", &self.results.len())
            .finish_non_exhaustive()
    }
}
