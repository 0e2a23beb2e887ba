//! supersearch - parallel recursive content search.
//!
//! Given a pattern and a starting path, reports every matching line beneath
//! that path, annotated with file name and line number, in the order files
//! were discovered.
//!
//! # Architecture
//!
//! ```text
//!  walker ──jobs──▶ dispatcher ──rendezvous──▶ workers ──results──▶ printer
//!  (discovery         (lazy pool                (scan +               (emit in
//!   order, one         growth up to              render)               discovery
//!   producer)          max_concurrency)                                order)
//! ```
//!
//! The walker assigns each file a dense, 1-based discovery index. Workers
//! scan files in parallel and tag their output with that index; the printer
//! linearizes results so stdout is deterministic for a given traversal order
//! without ever serializing the workers themselves.

pub mod config;
pub mod errors;
pub mod gitignore;
pub mod search;
pub mod stats;

// Re-export commonly used types
pub use config::Options;
pub use errors::{Result, SearchError};
pub use search::{search, search_with_writer};
pub use stats::SearchSummary;
