//! Search orchestration.
//!
//! The driver wires the pipeline together: it spawns the printer and the
//! dispatcher on named threads, runs the walker on the calling thread (the
//! sole job producer), then joins everything and snapshots the counters.
//! Channel ownership doubles as the shutdown protocol: the walker dropping
//! the job sender unwinds the dispatcher, which closes the worker channel,
//! and once the last worker exits the result channel disconnects and the
//! printer drains out.

use crossbeam_channel::{bounded, unbounded};
use std::io::{self, Write};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::debug;

use super::dispatcher;
use super::matcher::MatchStrategy;
use super::printer;
use super::walker::Walker;
use super::{FileJob, FileResult};
use crate::config::Options;
use crate::errors::{Result, SearchError};
use crate::stats::{Counters, SearchSummary};

/// Jobs buffered between the walker and the dispatcher. Backpressure here
/// throttles discovery when the workers fall behind.
const JOB_QUEUE_CAPACITY: usize = 256;

/// State shared by every task in one run.
pub struct SearchContext {
    pub opts: Options,
    pub strategy: MatchStrategy,
    pub counters: Counters,
}

/// Runs a search, printing matches to stdout.
pub fn search(opts: &Options) -> Result<SearchSummary> {
    search_with_writer(opts, io::stdout())
}

/// Runs a search against an arbitrary output sink. Library callers and
/// tests use this to capture exact output bytes.
pub fn search_with_writer<W>(opts: &Options, writer: W) -> Result<SearchSummary>
where
    W: Write + Send + 'static,
{
    opts.validate()?;
    let start = Instant::now();
    debug!(pattern = %opts.pattern, location = %opts.location.display(), "starting search");

    let strategy = MatchStrategy::build(&opts.pattern, opts.ignore_case)?;
    let ctx = Arc::new(SearchContext {
        opts: opts.clone(),
        strategy,
        counters: Counters::default(),
    });

    let (job_tx, job_rx) = bounded::<FileJob>(JOB_QUEUE_CAPACITY);
    let (result_tx, result_rx) = unbounded::<FileResult>();

    let printer = {
        let quiet = opts.quiet;
        thread::Builder::new()
            .name("printer".into())
            .spawn(move || printer::print_loop(result_rx, quiet, writer))?
    };

    let dispatcher = {
        let ctx = Arc::clone(&ctx);
        thread::Builder::new()
            .name("dispatcher".into())
            .spawn(move || dispatcher::run(job_rx, result_tx, ctx))?
    };

    // The walker is the sole producer; dropping its sender on return is
    // what lets the pipeline drain.
    let walk_result = Walker::new(Arc::clone(&ctx), job_tx).run();

    dispatcher.join().map_err(|_| SearchError::ThreadPanicked)?;
    printer
        .join()
        .map_err(|_| SearchError::ThreadPanicked)??;

    walk_result?;

    let summary = ctx.counters.snapshot(start.elapsed());
    debug!(
        matches = summary.num_matches,
        files_searched = summary.files_searched,
        "search finished"
    );
    Ok(summary)
}
