//! Output formatters for the terminal, Markdown and JSON.

mod json;
mod markdown;
mod text;

pub use self::json::*;
pub use markdown::*;
pub use text::*;
