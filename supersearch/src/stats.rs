//! Shared counters and the end-of-run summary.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Lock-free counters updated from the walker and workers.
///
/// Writes are atomic fetch-adds on the hot path; consistent reads are only
/// taken through [`Counters::snapshot`] after every search thread has joined.
#[derive(Debug, Default)]
pub struct Counters {
    num_matches: AtomicU64,
    files_matched: AtomicU64,
    files_searched: AtomicU64,
}

impl Counters {
    /// Assigns the next discovery index. The files-searched counter doubles
    /// as the index generator, so `files_searched` is by construction the
    /// number of jobs the walker emitted.
    pub fn next_index(&self) -> u64 {
        self.files_searched.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_matches(&self, count: u64) {
        self.num_matches.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_file_matched(&self) {
        self.files_matched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, elapsed: Duration) -> SearchSummary {
        SearchSummary {
            num_matches: self.num_matches.load(Ordering::Relaxed),
            files_matched: self.files_matched.load(Ordering::Relaxed),
            files_searched: self.files_searched.load(Ordering::Relaxed),
            elapsed,
        }
    }
}

/// Aggregate result of one search run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSummary {
    /// Total highlighted intervals across all files.
    pub num_matches: u64,
    /// Files that produced at least one match.
    pub files_matched: u64,
    /// Files the walker emitted a job for.
    pub files_searched: u64,
    pub elapsed: Duration,
}

impl fmt::Display for SearchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} matches\n{} files contained matches\n{} files searched\n{:.3} seconds",
            self.num_matches,
            self.files_matched,
            self.files_searched,
            self.elapsed.as_secs_f64()
        )
    }
}
