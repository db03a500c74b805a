//! The result set of the current search.
//!
//! Records are held in an `Arc<[Record]>` that is swapped wholesale when a
//! fetch completes. Everything else (filter, sort, selection) is a view over
//! that slice addressed by record index.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::config::api;
use crate::error::{QueryError, SiftError};
use crate::filter::Query;
use crate::models::Record;

/// Column to sort the view by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortKey {
    Title,
    Authors,
    Year,
    Citations,
    Influential,
    Venue,
    Doi,
}

impl SortKey {
    fn compare(self, a: &Record, b: &Record) -> Ordering {
        match self {
            Self::Title => cmp_folded(&a.title, &b.title),
            Self::Authors => cmp_folded(&a.author_names(), &b.author_names()),
            Self::Year => a.year.unwrap_or(0).cmp(&b.year.unwrap_or(0)),
            Self::Citations => a.citation_count.cmp(&b.citation_count),
            Self::Influential => a.influential_citation_count.cmp(&b.influential_citation_count),
            Self::Venue => cmp_folded(&a.venue, &b.venue),
            Self::Doi => cmp_folded(a.doi().unwrap_or(""), b.doi().unwrap_or("")),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Title => "title",
            Self::Authors => "authors",
            Self::Year => "year",
            Self::Citations => "citations",
            Self::Influential => "influential",
            Self::Venue => "venue",
            Self::Doi => "doi",
        })
    }
}

fn cmp_folded(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        })
    }
}

/// `Fetched: N » Filtered: M » Selected: K`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub fetched: usize,
    pub filtered: usize,
    pub selected: usize,
}

impl fmt::Display for Counts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Fetched: {} » Filtered: {} » Selected: {}",
            self.fetched, self.filtered, self.selected
        )
    }
}

/// Records of one search plus the user's view over them.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    records: Arc<[Record]>,
    filter: Option<Query>,
    sort: Option<(SortKey, SortOrder)>,
    selected: BTreeSet<usize>,
    only_selected: bool,
}

impl ResultSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the records with those of a new fetch.
    ///
    /// The active filter and sort carry over; the selection does not.
    pub fn replace(&mut self, records: impl Into<Arc<[Record]>>) {
        self.records = records.into();
        self.selected.clear();
        self.only_selected = false;
    }

    /// Drop records, filter, sort and selection.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Parse and install a filter.
    ///
    /// A blank filter clears it. On a parse error the filter is cleared, so
    /// every record is visible, and the error is returned for display.
    pub fn apply_filter(&mut self, text: &str) -> Result<Option<&Query>, QueryError> {
        match Query::parse(text) {
            Ok(query) if query.is_empty() => {
                self.filter = None;
                Ok(None)
            }
            Ok(query) => {
                tracing::debug!(filter = %query, "Filter applied");
                Ok(Some(&*self.filter.insert(query)))
            }
            Err(e) => {
                tracing::debug!(error = %e, "Filter rejected, showing all records");
                self.filter = None;
                Err(e)
            }
        }
    }

    pub fn clear_filter(&mut self) {
        self.filter = None;
    }

    #[must_use]
    pub const fn filter(&self) -> Option<&Query> {
        self.filter.as_ref()
    }

    pub fn set_sort(&mut self, key: SortKey, order: SortOrder) {
        self.sort = Some((key, order));
    }

    /// Back to fetch order.
    pub fn clear_sort(&mut self) {
        self.sort = None;
    }

    #[must_use]
    pub const fn sort(&self) -> Option<(SortKey, SortOrder)> {
        self.sort
    }

    fn passes_filter(&self, record: &Record) -> bool {
        self.filter.as_ref().is_none_or(|q| q.matches(record))
    }

    /// Record indices passing the filter, in display order.
    fn ordered(&self, only_selected: bool) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .records
            .iter()
            .enumerate()
            .filter(|(idx, record)| {
                self.passes_filter(record) && (!only_selected || self.selected.contains(idx))
            })
            .map(|(idx, _)| idx)
            .collect();

        if let Some((key, order)) = self.sort {
            indices.sort_by(|&a, &b| {
                let ord = key.compare(&self.records[a], &self.records[b]);
                match order {
                    SortOrder::Ascending => ord,
                    SortOrder::Descending => ord.reverse(),
                }
            });
        }

        indices
    }

    /// Record indices of the current view, in display order.
    #[must_use]
    pub fn view(&self) -> Vec<usize> {
        self.ordered(self.only_selected)
    }

    /// Records of the current view, in display order.
    #[must_use]
    pub fn visible(&self) -> Vec<&Record> {
        self.view().into_iter().map(|idx| &self.records[idx]).collect()
    }

    /// Select rows of the current view by 0-based position.
    ///
    /// Returns how many rows were newly selected. Positions past the end of
    /// the view are ignored.
    pub fn select_rows(&mut self, rows: &[usize]) -> usize {
        let view = self.view();
        rows.iter()
            .filter_map(|&row| view.get(row))
            .filter(|&&idx| self.selected.insert(idx))
            .count()
    }

    /// Deselect rows of the current view by 0-based position.
    pub fn deselect_rows(&mut self, rows: &[usize]) -> usize {
        let view = self.view();
        rows.iter()
            .filter_map(|&row| view.get(row))
            .filter(|&&idx| self.selected.remove(&idx))
            .count()
    }

    /// Select every row of the current view.
    pub fn select_all_visible(&mut self) -> usize {
        let view = self.view();
        view.into_iter().filter(|&idx| self.selected.insert(idx)).count()
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
        self.only_selected = false;
    }

    #[must_use]
    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    /// Restrict the view to selected records.
    pub fn set_only_selected(&mut self, on: bool) {
        self.only_selected = on;
    }

    #[must_use]
    pub const fn only_selected(&self) -> bool {
        self.only_selected
    }

    /// Selected records passing the filter, in display order.
    #[must_use]
    pub fn selected_records(&self) -> Vec<&Record> {
        self.ordered(true).into_iter().map(|idx| &self.records[idx]).collect()
    }

    /// What an export writes: the selection when there is one, otherwise
    /// the current view.
    #[must_use]
    pub fn export_candidates(&self) -> Vec<&Record> {
        if self.selected.is_empty() { self.visible() } else { self.selected_records() }
    }

    #[must_use]
    pub fn counts(&self) -> Counts {
        Counts {
            fetched: self.records.len(),
            filtered: self.records.iter().filter(|r| self.passes_filter(r)).count(),
            selected: self.selected.len(),
        }
    }
}

/// Parse a 1-based row list such as `1,3,5-7` into 0-based positions.
///
/// Row numbers above the fetch cap are rejected; no view holds that many.
pub fn parse_rows(list: &str) -> Result<Vec<usize>, SiftError> {
    let mut rows = BTreeSet::new();

    for part in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (from, to) = match part.split_once('-') {
            Some((a, b)) => (parse_row(a)?, parse_row(b)?),
            None => {
                let row = parse_row(part)?;
                (row, row)
            }
        };
        if from > to {
            return Err(SiftError::validation("rows", format!("range '{part}' is reversed")));
        }
        rows.extend(from - 1..to);
    }

    if rows.is_empty() {
        return Err(SiftError::validation("rows", "no row numbers given"));
    }

    Ok(rows.into_iter().collect())
}

fn parse_row(text: &str) -> Result<usize, SiftError> {
    let max = api::MAX_RESULTS_CAP as usize;
    match text.trim().parse::<usize>() {
        Ok(0) => Err(SiftError::validation("rows", "row numbers start at 1")),
        Ok(n) if n > max => Err(SiftError::validation("rows", format!("row {n} is past the last row ({max})"))),
        Ok(n) => Ok(n),
        Err(_) => Err(SiftError::validation("rows", format!("'{}' is not a row number", text.trim()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(title: &str, year: i32, citations: u32) -> Record {
        Record {
            paper_id: title.to_lowercase(),
            title: title.to_string(),
            year: Some(year),
            citation_count: citations,
            ..Record::default()
        }
    }

    fn sample() -> ResultSet {
        let mut set = ResultSet::new();
        set.replace(vec![
            rec("Graph networks", 2019, 50),
            rec("attention is all you need", 2017, 9000),
            rec("Socket programming", 2001, 3),
            rec("Network science", 2016, 800),
        ]);
        set
    }

    fn titles(set: &ResultSet) -> Vec<&str> {
        set.visible().into_iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn test_filter_view_and_counts() {
        let mut set = sample();
        set.apply_filter("netw*").unwrap();
        assert_eq!(titles(&set), vec!["Graph networks", "Network science"]);
        assert_eq!(
            set.counts().to_string(),
            "Fetched: 4 » Filtered: 2 » Selected: 0"
        );
    }

    #[test]
    fn test_bad_filter_shows_everything() {
        let mut set = sample();
        set.apply_filter("graph").unwrap();
        assert!(set.apply_filter("(graph").is_err());
        assert!(set.filter().is_none());
        assert_eq!(set.visible().len(), 4);
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn test_blank_filter_clears() {
        let mut set = sample();
        set.apply_filter("graph").unwrap();
        assert!(set.apply_filter("  ").unwrap().is_none());
        assert_eq!(set.visible().len(), 4);
    }

    #[test]
    fn test_sort_numeric_and_text() {
        let mut set = sample();
        set.set_sort(SortKey::Citations, SortOrder::Descending);
        assert_eq!(titles(&set)[0], "attention is all you need");

        set.set_sort(SortKey::Title, SortOrder::Ascending);
        assert_eq!(
            titles(&set),
            vec!["attention is all you need", "Graph networks", "Network science", "Socket programming"]
        );

        set.set_sort(SortKey::Year, SortOrder::Ascending);
        assert_eq!(titles(&set)[0], "Socket programming");

        set.clear_sort();
        assert_eq!(titles(&set)[0], "Graph networks");
    }

    #[test]
    fn test_sort_is_stable() {
        let mut set = ResultSet::new();
        set.replace(vec![rec("b", 2020, 1), rec("a", 2020, 1), rec("c", 2020, 1)]);
        set.set_sort(SortKey::Year, SortOrder::Descending);
        assert_eq!(titles(&set), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_selection_follows_view_positions() {
        let mut set = sample();
        set.set_sort(SortKey::Citations, SortOrder::Descending);
        assert_eq!(set.select_rows(&[0, 1, 99]), 2);
        assert_eq!(set.select_rows(&[0]), 0);
        let selected: Vec<&str> = set.selected_records().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(selected, vec!["attention is all you need", "Network science"]);

        set.set_only_selected(true);
        assert_eq!(set.visible().len(), 2);
        assert_eq!(set.deselect_rows(&[1]), 1);
        assert_eq!(titles(&set), vec!["attention is all you need"]);
        assert_eq!(set.counts().selected, 1);
    }

    #[test]
    fn test_export_candidates() {
        let mut set = sample();
        set.apply_filter("socket").unwrap();
        assert_eq!(set.export_candidates().len(), 1);

        set.clear_filter();
        set.select_rows(&[3]);
        let picked = set.export_candidates();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].title, "Network science");
    }

    #[test]
    fn test_select_all_visible_and_replace() {
        let mut set = sample();
        set.apply_filter("netw*").unwrap();
        assert_eq!(set.select_all_visible(), 2);
        set.replace(vec![rec("Fresh", 2024, 0)]);
        assert_eq!(set.counts().selected, 0);
        assert!(set.filter().is_some());
        assert!(set.visible().is_empty());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut set = sample();
        set.apply_filter("graph").unwrap();
        set.set_sort(SortKey::Year, SortOrder::Ascending);
        set.select_rows(&[0]);
        set.clear();
        assert!(set.is_empty());
        assert!(set.filter().is_none());
        assert!(set.sort().is_none());
        assert_eq!(set.counts(), Counts::default());
    }

    #[test]
    fn test_parse_rows() {
        assert_eq!(parse_rows("1,3,5-7").unwrap(), vec![0, 2, 4, 5, 6]);
        assert_eq!(parse_rows(" 2 , 2 ").unwrap(), vec![1]);
        assert!(parse_rows("0").is_err());
        assert!(parse_rows("4-2").is_err());
        assert!(parse_rows("x").is_err());
        assert!(parse_rows("").is_err());
    }

    #[test]
    fn test_parse_rows_bounded_by_cap() {
        assert_eq!(parse_rows("1-1000").unwrap().len(), 1000);
        assert!(parse_rows("1-1001").is_err());
        assert!(parse_rows("1-4000000000").is_err());
        assert!(parse_rows("99999999999999999999").is_err());

        let err = parse_rows("5,1-3000000").unwrap_err();
        assert!(err.to_user_message().contains("3000000"));
    }
}
