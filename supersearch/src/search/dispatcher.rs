//! Job dispatch with lazy worker spawning.
//!
//! The worker channel has zero capacity, so a failed non-blocking send is a
//! reliable "every live worker is busy" signal. When that happens the pool
//! grows by one, up to the configured cap, before falling back to a blocking
//! send. Small searches pay for a single worker; large ones scale out
//! without knowing the workload size in advance.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, warn};

use super::engine::SearchContext;
use super::{worker, FileJob, FileResult};

pub fn run(jobs: Receiver<FileJob>, results: Sender<FileResult>, ctx: Arc<SearchContext>) {
    let (worker_tx, worker_rx) = bounded::<FileJob>(0);
    let mut workers: Vec<JoinHandle<()>> = Vec::new();
    let max_workers = ctx.opts.concurrency();

    // Seed one worker so the first job rendezvous immediately.
    spawn_worker(&mut workers, &worker_rx, &results, &ctx);

    for job in jobs.iter() {
        debug!(path = %job.path.display(), index = job.index, "dispatching");
        match worker_tx.try_send(job) {
            Ok(()) => {}
            Err(TrySendError::Full(job)) => {
                if workers.len() < max_workers {
                    debug!("workers busy; starting another");
                    spawn_worker(&mut workers, &worker_rx, &results, &ctx);
                } else {
                    debug!("workers busy and pool at cap; waiting");
                }
                if worker_tx.send(job).is_err() {
                    break;
                }
            }
            Err(TrySendError::Disconnected(_)) => break,
        }
    }

    // All jobs are handed off; closing the channel drains the workers.
    drop(worker_tx);
    for handle in workers {
        if handle.join().is_err() {
            warn!("worker panicked during shutdown");
        }
    }
}

fn spawn_worker(
    workers: &mut Vec<JoinHandle<()>>,
    worker_rx: &Receiver<FileJob>,
    results: &Sender<FileResult>,
    ctx: &Arc<SearchContext>,
) {
    let id = workers.len() + 1;
    match worker::spawn(id, worker_rx.clone(), results.clone(), Arc::clone(ctx)) {
        Ok(handle) => workers.push(handle),
        Err(err) => debug!(worker = id, error = %err, "failed to spawn worker"),
    }
}
