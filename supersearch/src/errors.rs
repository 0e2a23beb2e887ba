use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a search before or during the run.
///
/// Per-file problems (unreadable files, binary content, mid-file read
/// failures) are not represented here; workers degrade them to skipped
/// results and the search continues.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("invalid search location '{}'", .0.display())]
    InvalidLocation(PathBuf),

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("configuration file error: {0}")]
    ConfigFile(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("search thread panicked")]
    ThreadPanicked,
}

impl SearchError {
    pub fn config(msg: impl Into<String>) -> Self {
        SearchError::Config(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
