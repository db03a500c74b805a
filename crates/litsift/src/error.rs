//! Error types for LitSift.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.
//! Each layer has its own enum; [`SiftError`] is what the front ends show to users.

use std::path::PathBuf;
use std::time::Duration;

/// Errors from the HTTP client layer.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Middleware error
    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// Rate limited by Semantic Scholar API (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time before retry
        retry_after: Duration,
    },

    /// Resource not found (404 response)
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Description of the missing resource
        resource: String,
    },

    /// Invalid request parameters (400 response)
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message from API
        message: String,
    },

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },

    /// Rate limit retries exhausted while paging through results.
    #[error("Gave up after {attempts} rate-limited attempts")]
    RetriesExhausted {
        /// Number of attempts made for the page
        attempts: u32,
    },
}

impl ClientError {
    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub fn rate_limited(seconds: u64) -> Self {
        Self::RateLimited { retry_after: Duration::from_secs(seconds) }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Server { .. })
    }

    /// Get the retry-after duration if this is a rate limit error.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

/// What went wrong while parsing a filter query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// A `(` without its `)`.
    UnclosedParen,
    /// A `)` without a preceding `(`.
    UnexpectedCloseParen,
    /// A `"` without its closing quote.
    UnterminatedQuote,
    /// `AND`, `OR` or `NOT` with nothing to apply to.
    MissingOperand,
    /// `()` with nothing inside.
    EmptyGroup,
    /// `field:` with no value.
    EmptyFieldValue,
    /// `""` with nothing between the quotes.
    EmptyPhrase,
    /// Wildcard term that could not be compiled.
    InvalidWildcard,
    /// Too many nested groups, `NOT`s or chained operators.
    TooDeep,
}

impl std::fmt::Display for QueryErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::UnclosedParen => "unbalanced parentheses: missing ')'",
            Self::UnexpectedCloseParen => "unbalanced parentheses: unexpected ')'",
            Self::UnterminatedQuote => "unterminated quoted phrase",
            Self::MissingOperand => "operator is missing an operand",
            Self::EmptyGroup => "empty parentheses",
            Self::EmptyFieldValue => "field has no search term",
            Self::EmptyPhrase => "empty quoted phrase",
            Self::InvalidWildcard => "wildcard pattern is too complex",
            Self::TooDeep => "query is nested too deeply",
        };
        f.write_str(text)
    }
}

/// A filter query that could not be parsed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} (at position {position})")]
pub struct QueryError {
    /// Error category.
    pub kind: QueryErrorKind,
    /// Byte offset into the query text.
    pub position: usize,
}

impl QueryError {
    #[must_use]
    pub const fn new(kind: QueryErrorKind, position: usize) -> Self {
        Self { kind, position }
    }

    /// Render the query with a caret under the offending position.
    #[must_use]
    pub fn render(&self, input: &str) -> String {
        let column = input
            .char_indices()
            .take_while(|(idx, _)| *idx < self.position)
            .count();
        format!("{input}\n{}^ {}", " ".repeat(column), self.kind)
    }
}

/// Errors from writing or reading export files.
#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    /// Filesystem failure, with the path involved.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Target path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// CSV encoding or decoding failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Format name or extension not recognised.
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),
}

impl ExportError {
    /// Create an I/O error for a path.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

/// Errors surfaced by the interactive front ends.
#[derive(thiserror::Error, Debug)]
pub enum SiftError {
    /// Error from the API client
    #[error("API error: {0}")]
    Client(#[from] ClientError),

    /// Filter query did not parse
    #[error("Filter error: {0}")]
    Query(#[from] QueryError),

    /// Export failed
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Input validation failed
    #[error("Validation error: {message}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },
}

impl SiftError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    /// Convert to a user-friendly error message.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::Client(ClientError::RateLimited { retry_after }) => {
                format!(
                    "Rate limited by Semantic Scholar API. Please wait {:?} before retrying.",
                    retry_after
                )
            }
            Self::Client(ClientError::Http(_) | ClientError::Middleware(_)) => {
                format!("Network error: {self}. Check your connection and try again.")
            }
            Self::Validation { field, message } => {
                format!("Invalid input for '{field}': {message}")
            }
            _ => self.to_string(),
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_retryable() {
        assert!(ClientError::rate_limited(60).is_retryable());
        assert!(ClientError::server(500, "Internal error").is_retryable());

        assert!(!ClientError::not_found("search").is_retryable());
        assert!(!ClientError::bad_request("invalid query").is_retryable());
        assert!(!ClientError::RetriesExhausted { attempts: 5 }.is_retryable());
    }

    #[test]
    fn test_client_error_retry_after() {
        let err = ClientError::rate_limited(60);
        assert_eq!(err.retry_after(), Some(Duration::from_secs(60)));

        let err = ClientError::not_found("paper");
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn test_query_error_render_points_at_position() {
        let err = QueryError::new(QueryErrorKind::UnexpectedCloseParen, 4);
        let rendered = err.render("foo )");
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "foo )");
        assert!(lines[1].starts_with("    ^"));
        assert!(lines[1].contains("unexpected ')'"));
    }

    #[test]
    fn test_query_error_render_counts_chars_not_bytes() {
        let err = QueryError::new(QueryErrorKind::UnterminatedQuote, "é ".len());
        let rendered = err.render("é \"x");
        assert!(rendered.lines().nth(1).unwrap().starts_with("  ^"));
    }

    #[test]
    fn test_sift_error_user_message() {
        let err = SiftError::validation("limit", "must be between 1 and 1000");
        assert!(err.to_user_message().contains("limit"));
        assert!(err.to_user_message().contains("between 1 and 1000"));

        let err = SiftError::from(ClientError::rate_limited(15));
        assert!(err.to_user_message().contains("Rate limited"));
    }

    #[test]
    fn test_export_error_mentions_path() {
        let err = ExportError::io(
            "/no/such/dir/out.csv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/no/such/dir/out.csv"));
        assert!(msg.contains("missing"));
    }
}
