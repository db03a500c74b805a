//! Fuzzing library for litsift.
//!
//! Targets cover the filter query parser and JSON deserialization of the
//! search API models.
//!
//! # Usage
//!
//! ```bash
//! cd crates/litsift-fuzz
//! cargo +nightly fuzz run fuzz_query_parse -- -max_total_time=60
//! ```

pub use litsift::{filter, models};
