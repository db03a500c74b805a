//! LitSift - Entry Point
//!
//! One-shot `search`, the interactive `shell`, and two offline helpers.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use litsift::{
    Config, Query, SemanticScholarClient, Session,
    export::{self, ExportFormat},
    formatters::{format_fields, format_records_markdown, format_row, results_json},
    results::{SortKey, SortOrder, parse_rows},
    shell::Shell,
};

#[derive(Parser, Debug)]
#[command(name = "litsift")]
#[command(about = "Search, sift and export Semantic Scholar results")]
#[command(version)]
struct Cli {
    /// Semantic Scholar API key (optional, enables higher rate limits)
    #[arg(long, global = true, env = "SEMANTIC_SCHOLAR_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch results once, optionally filter, sort and export them
    Search {
        /// Search query sent to Semantic Scholar
        query: String,

        /// Maximum number of results to fetch (1-1000)
        #[arg(long, short = 'n', default_value_t = 100)]
        limit: u32,

        /// Filter expression applied to the fetched results
        #[arg(long, short)]
        filter: Option<String>,

        /// Sort the results by this column
        #[arg(long, value_enum)]
        sort: Option<SortKey>,

        /// Sort descending instead of ascending
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Rows of the filtered view to select, e.g. 1,3,5-7
        #[arg(long)]
        select: Option<String>,

        /// Write the selection (or the whole view) to this file
        #[arg(long, short = 'o')]
        export: Option<PathBuf>,

        /// Export format; defaults to the file extension, then CSV
        #[arg(long, value_enum, requires = "export")]
        format: Option<ExportFormat>,

        /// Print results as JSON instead of rows
        #[arg(long, conflicts_with = "markdown")]
        json: bool,

        /// Print results as Markdown instead of rows
        #[arg(long)]
        markdown: bool,
    },
    /// Interactive shell
    Shell {
        /// Maximum number of results per search (1-1000)
        #[arg(long, short = 'n', default_value_t = 100)]
        limit: u32,
    },
    /// Parse a filter expression and print its normalized form
    Check {
        /// Filter expression
        expr: String,
    },
    /// List filterable fields
    Fields,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    // stdout carries results; logs go to stderr.
    if json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

fn open_session(config: Config) -> anyhow::Result<Session> {
    let client = SemanticScholarClient::new(&config)?;
    Ok(Session::new(Arc::new(client), config))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting LitSift");

    let config = Config::from_env()?.with_api_key(cli.api_key);

    match cli.command {
        Command::Search { query, limit, filter, sort, desc, select, export: export_path, format, json, markdown } => {
            let mut session = open_session(config)?;

            let fetched = session
                .search(&query, limit, |progress| eprintln!("[{:>3}%] {}", progress.percent, progress.message))
                .await
                .map_err(|e| anyhow::anyhow!(e.to_user_message()))?;
            tracing::info!(fetched, "Search finished");

            let results = session.results_mut();
            if let Some(text) = filter.as_deref() {
                match results.apply_filter(text) {
                    Ok(Some(query)) if !query.unknown_fields().is_empty() => eprintln!(
                        "Warning: unknown field(s) {} never match; run 'litsift fields'.",
                        query.unknown_fields().join(", ")
                    ),
                    Ok(_) => {}
                    Err(e) => eprintln!("{}\nFilter not applied, showing all results.", e.render(text)),
                }
            }
            if let Some(key) = sort {
                let order = if desc { SortOrder::Descending } else { SortOrder::Ascending };
                results.set_sort(key, order);
            }
            if let Some(rows) = select.as_deref() {
                let rows = parse_rows(rows).map_err(|e| anyhow::anyhow!(e.to_user_message()))?;
                results.select_rows(&rows);
            }

            if json {
                let value = results_json(&results.visible(), results.counts());
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else if markdown {
                println!("{}", format_records_markdown(&results.visible()));
            } else {
                for (row, &index) in results.view().iter().enumerate() {
                    println!("{}", format_row(row + 1, &results.records()[index], results.is_selected(index)));
                }
                println!("{}", results.counts());
            }

            if let Some(path) = export_path {
                let summary = export::export(results.export_candidates(), &path, format)?;
                eprintln!(
                    "Saved {} records as {} to {}",
                    summary.written,
                    summary.format,
                    summary.path.display()
                );
            }
        }
        Command::Shell { limit } => {
            let session = open_session(config)?;
            Shell::new(session, limit).run().await?;
        }
        Command::Check { expr } => match Query::parse(&expr) {
            Ok(query) => {
                println!("{query}");
                if !query.unknown_fields().is_empty() {
                    eprintln!("Warning: unknown field(s) {} never match.", query.unknown_fields().join(", "));
                }
            }
            Err(e) => {
                eprintln!("{}", e.render(&expr));
                return Ok(ExitCode::from(2));
            }
        },
        Command::Fields => println!("{}", format_fields()),
    }

    Ok(ExitCode::SUCCESS)
}
