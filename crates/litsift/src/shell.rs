//! Interactive line-oriented front end.
//!
//! Reads commands from stdin while fetch events arrive in the background;
//! both are multiplexed with `tokio::select!` so the prompt stays responsive
//! during a search.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::ValueEnum;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::error::SiftError;
use crate::export::{self, ExportFormat};
use crate::formatters::{format_fields, format_record_markdown, format_row};
use crate::results::{SortKey, SortOrder, parse_rows};
use crate::session::{FetchEvent, Session, Update};

const PROMPT: &str = "litsift> ";

const HELP: &str = "\
Commands:
  search <query>            fetch results from Semantic Scholar
  filter [expr]             filter the results (no expr clears the filter)
  sort <key> [asc|desc]     sort by title, authors, year, citations, influential, venue, doi
  sort off                  back to fetch order
  select <rows>|all         select rows of the current view, e.g. 1,3,5-7
  deselect <rows>|all       deselect rows
  only-selected [on|off]    show only selected rows
  show [row]                list the current view, or show one row in full
  export <path> [csv|bibtex]
                            save the selection (or the view when nothing is selected)
  status                    counts, filter and fetch state
  reset                     cancel any fetch and clear everything
  fields                    list filterable fields
  help                      this text
  quit                      leave

Filter syntax: graph neural, title:\"deep learning\", netw*, a OR b, NOT c, (a OR b) c";

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Filter(String),
    Sort(Option<(SortKey, SortOrder)>),
    Select(RowSpec),
    Deselect(RowSpec),
    OnlySelected(Option<bool>),
    Show(Option<usize>),
    Export { path: PathBuf, format: Option<ExportFormat> },
    Status,
    Reset,
    Fields,
    Help,
    Quit,
}

/// Rows named by `select`/`deselect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowSpec {
    All,
    /// 0-based positions in the current view.
    Rows(Vec<usize>),
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, SiftError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match word.to_ascii_lowercase().as_str() {
            "search" | "s" => {
                if rest.is_empty() {
                    return Err(SiftError::validation("query", "Query cannot be empty"));
                }
                Self::Search(rest.to_string())
            }
            "filter" | "f" => Self::Filter(rest.to_string()),
            "sort" => Self::Sort(parse_sort(rest)?),
            "select" => Self::Select(parse_row_spec(rest)?),
            "deselect" => Self::Deselect(parse_row_spec(rest)?),
            "only-selected" => Self::OnlySelected(match rest {
                "" => None,
                "on" => Some(true),
                "off" => Some(false),
                other => return Err(SiftError::validation("only-selected", format!("expected on or off, got '{other}'"))),
            }),
            "show" | "ls" => {
                if rest.is_empty() {
                    Self::Show(None)
                } else {
                    let rows = parse_rows(rest)?;
                    Self::Show(rows.first().copied())
                }
            }
            "export" | "save" => parse_export(rest)?,
            "status" => Self::Status,
            "reset" => Self::Reset,
            "fields" => Self::Fields,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => {
                return Err(SiftError::validation("command", format!("unknown command '{other}', try 'help'")));
            }
        };

        Ok(Some(command))
    }
}

fn parse_sort(rest: &str) -> Result<Option<(SortKey, SortOrder)>, SiftError> {
    let mut parts = rest.split_whitespace();
    let Some(key) = parts.next() else {
        return Err(SiftError::validation("sort", "expected a column name"));
    };
    if key.eq_ignore_ascii_case("off") {
        return Ok(None);
    }

    let key = SortKey::from_str(key, true)
        .map_err(|_| SiftError::validation("sort", format!("unknown column '{key}'")))?;

    let order = match parts.next().map(str::to_ascii_lowercase).as_deref() {
        None | Some("asc") => SortOrder::Ascending,
        Some("desc") => SortOrder::Descending,
        Some(other) => return Err(SiftError::validation("sort", format!("expected asc or desc, got '{other}'"))),
    };

    Ok(Some((key, order)))
}

fn parse_row_spec(rest: &str) -> Result<RowSpec, SiftError> {
    if rest.eq_ignore_ascii_case("all") {
        Ok(RowSpec::All)
    } else {
        parse_rows(rest).map(RowSpec::Rows)
    }
}

/// `export <path> [format]`; the path may contain spaces.
fn parse_export(rest: &str) -> Result<Command, SiftError> {
    let rest = rest.trim();
    let (path, format) = match rest.rsplit_once(char::is_whitespace) {
        Some((head, last)) => match last.parse::<ExportFormat>() {
            Ok(format) => (head.trim_end(), Some(format)),
            Err(_) => (rest, None),
        },
        None => (rest, None),
    };
    if path.is_empty() {
        return Err(SiftError::validation("export", "expected a file path"));
    }
    Ok(Command::Export { path: PathBuf::from(path), format })
}

/// Result of executing a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Quit,
}

/// The interactive shell.
#[derive(Debug)]
pub struct Shell {
    session: Session,
    max_results: u32,
}

impl Shell {
    #[must_use]
    pub const fn new(session: Session, max_results: u32) -> Self {
        Self { session, max_results }
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Run the read-eval loop until `quit` or end of input.
    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        stdout.write_all(b"LitSift: search, sift and export Semantic Scholar results. Type 'help'.\n").await?;
        stdout.write_all(PROMPT.as_bytes()).await?;
        stdout.flush().await?;

        tracing::info!("Shell ready");

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        tracing::info!("Stdin closed, shutting down");
                        break;
                    };
                    let text = match self.execute(&line) {
                        Ok(Reply::Quit) => break,
                        Ok(Reply::Text(text)) => text,
                        Err(e) => format!("Error: {}", e.to_user_message()),
                    };
                    if !text.is_empty() {
                        stdout.write_all(text.as_bytes()).await?;
                        stdout.write_all(b"\n").await?;
                    }
                    stdout.write_all(PROMPT.as_bytes()).await?;
                    stdout.flush().await?;
                }
                Some(event) = self.session.next_event() => {
                    if let Some(text) = self.on_event(event) {
                        stdout.write_all(format!("\n{text}\n{PROMPT}").as_bytes()).await?;
                        stdout.flush().await?;
                    }
                }
            }
        }

        self.session.cancel();
        Ok(())
    }

    /// Apply a fetch event and describe it for the user.
    pub fn on_event(&mut self, event: FetchEvent) -> Option<String> {
        match self.session.handle_event(event) {
            Update::Progress(progress) => Some(format!("[{:>3}%] {}", progress.percent, progress.message)),
            Update::Loaded(count) => Some(format!(
                "Search complete: {count} results.\n{}",
                self.session.results().counts()
            )),
            Update::Failed(error) => Some(format!(
                "Search failed: {}",
                SiftError::from(error).to_user_message()
            )),
            Update::Stale => None,
        }
    }

    /// Parse and run one line of input.
    pub fn execute(&mut self, line: &str) -> Result<Reply, SiftError> {
        let Some(command) = Command::parse(line)? else {
            return Ok(Reply::Text(String::new()));
        };
        tracing::debug!(?command, "Executing command");
        self.run_command(command)
    }

    fn run_command(&mut self, command: Command) -> Result<Reply, SiftError> {
        let text = match command {
            Command::Search(query) => {
                let was_fetching = self.session.is_fetching();
                self.session.start_search(&query, self.max_results)?;
                if was_fetching {
                    format!("Previous search cancelled. Searching for '{query}'...")
                } else {
                    format!("Searching for '{query}'...")
                }
            }
            Command::Filter(text) => self.apply_filter(&text)?,
            Command::Sort(Some((key, order))) => {
                self.session.results_mut().set_sort(key, order);
                format!("Sorted by {key} ({order}).")
            }
            Command::Sort(None) => {
                self.session.results_mut().clear_sort();
                "Sort cleared.".to_string()
            }
            Command::Select(spec) => {
                let results = self.session.results_mut();
                let n = match spec {
                    RowSpec::All => results.select_all_visible(),
                    RowSpec::Rows(rows) => results.select_rows(&rows),
                };
                format!("Selected {n} more.\n{}", results.counts())
            }
            Command::Deselect(spec) => {
                let results = self.session.results_mut();
                let n = match spec {
                    RowSpec::All => {
                        let n = results.counts().selected;
                        results.clear_selection();
                        n
                    }
                    RowSpec::Rows(rows) => results.deselect_rows(&rows),
                };
                format!("Deselected {n}.\n{}", results.counts())
            }
            Command::OnlySelected(on) => {
                let results = self.session.results_mut();
                let on = on.unwrap_or(!results.only_selected());
                results.set_only_selected(on);
                format!("Showing {} rows.", if on { "only selected" } else { "all filtered" })
            }
            Command::Show(None) => self.render_view(),
            Command::Show(Some(row)) => self.render_detail(row)?,
            Command::Export { path, format } => {
                let records = self.session.results().export_candidates();
                let summary = export::export(records, &path, format)?;
                format!(
                    "Saved {} records as {} to {}",
                    summary.written,
                    summary.format,
                    summary.path.display()
                )
            }
            Command::Status => self.render_status(),
            Command::Reset => {
                self.session.reset();
                "Cleared.".to_string()
            }
            Command::Fields => format_fields(),
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(Reply::Quit),
        };
        Ok(Reply::Text(text))
    }

    fn apply_filter(&mut self, text: &str) -> Result<String, SiftError> {
        let results = self.session.results_mut();
        match results.apply_filter(text) {
            Ok(None) => Ok(format!("Filter cleared.\n{}", results.counts())),
            Ok(Some(query)) => {
                let mut out = String::new();
                if !query.unknown_fields().is_empty() {
                    let _ = writeln!(
                        out,
                        "Warning: unknown field(s) {} never match; see 'fields'.",
                        query.unknown_fields().join(", ")
                    );
                }
                let _ = write!(out, "{}", results.counts());
                Ok(out)
            }
            Err(e) => Ok(format!(
                "{}\nFilter not applied, showing all results.\n{}",
                e.render(text),
                results.counts()
            )),
        }
    }

    fn render_view(&self) -> String {
        let results = self.session.results();
        let view = results.view();
        if view.is_empty() {
            return if self.session.is_fetching() {
                "Nothing to show yet, search in progress.".to_string()
            } else {
                "Nothing to show.".to_string()
            };
        }

        let mut out = String::new();
        for (pos, &idx) in view.iter().enumerate() {
            let _ = writeln!(out, "{}", format_row(pos + 1, &results.records()[idx], results.is_selected(idx)));
        }
        let _ = write!(out, "{}", results.counts());
        out
    }

    fn render_detail(&self, row: usize) -> Result<String, SiftError> {
        let results = self.session.results();
        let view = results.view();
        let Some(&idx) = view.get(row) else {
            return Err(SiftError::validation("row", format!("row {} is not in the current view", row + 1)));
        };
        Ok(format_record_markdown(&results.records()[idx], row + 1, false))
    }

    fn render_status(&self) -> String {
        let results = self.session.results();
        let mut out = String::new();
        let _ = writeln!(out, "{}", results.counts());
        if let Some(query) = self.session.last_query() {
            let _ = writeln!(out, "Query: {query}");
        }
        if let Some(filter) = results.filter() {
            let _ = writeln!(out, "Filter: {}", filter.source());
        }
        if let Some((key, order)) = results.sort() {
            let _ = writeln!(out, "Sort: {key} {order}");
        }
        if results.only_selected() {
            let _ = writeln!(out, "Showing only selected rows");
        }
        if self.session.is_fetching() {
            let progress = self
                .session
                .last_progress()
                .map_or_else(|| "starting".to_string(), |p| format!("{}% {}", p.percent, p.message));
            let _ = writeln!(out, "Fetching: {progress}");
        }
        out.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::client::RecordSource;
    use crate::config::Config;
    use crate::error::ClientResult;
    use crate::models::{Paper, SearchResult};

    struct TwoPapers;

    #[async_trait::async_trait]
    impl RecordSource for TwoPapers {
        async fn search_page(&self, _query: &str, _offset: u32, _limit: u32) -> ClientResult<SearchResult> {
            let paper = |id: &str, title: &str, citations| Paper {
                paper_id: id.into(),
                title: Some(title.into()),
                citation_count: Some(citations),
                ..Paper::default()
            };
            Ok(SearchResult {
                total: 2,
                offset: 0,
                next: None,
                data: vec![paper("p1", "Graph networks", 3), paper("p2", "Socket tricks", 30)],
            })
        }
    }

    async fn loaded_shell() -> Shell {
        let mut session = Session::new(Arc::new(TwoPapers), Config::for_testing("http://unused"));
        session.search("anything", 10, |_| {}).await.unwrap();
        Shell::new(session, 10)
    }

    fn text(reply: Reply) -> String {
        match reply {
            Reply::Text(text) => text,
            Reply::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("  ").unwrap(), None);
        assert_eq!(
            Command::parse("search graph neural networks").unwrap(),
            Some(Command::Search("graph neural networks".into()))
        );
        assert_eq!(Command::parse("filter").unwrap(), Some(Command::Filter(String::new())));
        assert_eq!(
            Command::parse("sort citations desc").unwrap(),
            Some(Command::Sort(Some((SortKey::Citations, SortOrder::Descending))))
        );
        assert_eq!(Command::parse("sort off").unwrap(), Some(Command::Sort(None)));
        assert_eq!(Command::parse("select all").unwrap(), Some(Command::Select(RowSpec::All)));
        assert_eq!(
            Command::parse("select 1,3-4").unwrap(),
            Some(Command::Select(RowSpec::Rows(vec![0, 2, 3])))
        );
        assert_eq!(Command::parse("show 2").unwrap(), Some(Command::Show(Some(1))));
        assert_eq!(
            Command::parse("export out.bib bibtex").unwrap(),
            Some(Command::Export { path: "out.bib".into(), format: Some(ExportFormat::Bibtex) })
        );
        assert_eq!(Command::parse("QUIT").unwrap(), Some(Command::Quit));
    }

    #[test]
    fn test_parse_export_paths_with_spaces() {
        assert_eq!(
            Command::parse("export My Papers/refs 2024.bib csv").unwrap(),
            Some(Command::Export { path: "My Papers/refs 2024.bib".into(), format: Some(ExportFormat::Csv) })
        );
        assert_eq!(
            Command::parse("export My Papers/refs 2024.bib").unwrap(),
            Some(Command::Export { path: "My Papers/refs 2024.bib".into(), format: None })
        );
        assert_eq!(
            Command::parse("export notes on csv").unwrap(),
            Some(Command::Export { path: "notes on".into(), format: Some(ExportFormat::Csv) })
        );
        assert_eq!(
            Command::parse("export out.x ris").unwrap(),
            Some(Command::Export { path: "out.x ris".into(), format: None })
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(Command::parse("search").is_err());
        assert!(Command::parse("sort colour").is_err());
        assert!(Command::parse("sort year sideways").is_err());
        assert!(Command::parse("export").is_err());
        assert!(Command::parse("frobnicate").is_err());
        assert!(Command::parse("only-selected maybe").is_err());
    }

    #[tokio::test]
    async fn test_filter_sort_select_flow() {
        let mut shell = loaded_shell().await;

        let out = text(shell.execute("filter socket").unwrap());
        assert!(out.ends_with("Fetched: 2 » Filtered: 1 » Selected: 0"));

        let out = text(shell.execute("filter").unwrap());
        assert!(out.starts_with("Filter cleared."));

        shell.execute("sort citations desc").unwrap();
        let out = text(shell.execute("show").unwrap());
        let first = out.lines().next().unwrap();
        assert!(first.contains("Socket tricks"));

        let out = text(shell.execute("select 2").unwrap());
        assert!(out.contains("Selected: 1"));
        assert_eq!(shell.session().results().selected_records()[0].paper_id, "p1");
    }

    #[tokio::test]
    async fn test_bad_filter_shows_caret_and_all_rows() {
        let mut shell = loaded_shell().await;
        let out = text(shell.execute("filter graph AND").unwrap());
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("graph AND"));
        assert!(lines.next().unwrap().starts_with("         ^"));
        assert!(out.contains("Filter not applied, showing all results."));
        assert!(out.ends_with("Filtered: 2 » Selected: 0"));
    }

    #[tokio::test]
    async fn test_show_detail_and_unknown_row() {
        let mut shell = loaded_shell().await;
        let out = text(shell.execute("show 1").unwrap());
        assert!(out.starts_with("## 1. Graph networks"));
        assert!(shell.execute("show 9").is_err());
    }

    #[tokio::test]
    async fn test_quit_and_reset() {
        let mut shell = loaded_shell().await;
        assert_eq!(text(shell.execute("reset").unwrap()), "Cleared.");
        assert_eq!(text(shell.execute("show").unwrap()), "Nothing to show.");
        assert_eq!(shell.execute("quit").unwrap(), Reply::Quit);
    }
}
