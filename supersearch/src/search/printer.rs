//! Discovery-ordered output assembly.
//!
//! Results arrive in worker-completion order. The printer holds each one
//! until every lower index has been emitted or skipped, then writes the
//! contiguous run it unlocked in a single buffered write. Files without
//! output are skip markers, so a run of matchless files costs nothing.

use crossbeam_channel::Receiver;
use std::collections::{HashMap, HashSet};
use std::io::{self, Write};
use tracing::debug;

use super::{FileResult, Outcome};

pub fn print_loop<W: Write>(
    results: Receiver<FileResult>,
    quiet: bool,
    mut writer: W,
) -> io::Result<()> {
    let mut next_index: u64 = 1;
    let mut pending: HashMap<u64, String> = HashMap::new();
    let mut skip: HashSet<u64> = HashSet::new();
    let mut output = String::new();

    for result in results.iter() {
        match result.outcome {
            Outcome::Match(text) => {
                pending.insert(result.index, text);
            }
            Outcome::NoMatch | Outcome::Skipped => {
                skip.insert(result.index);
            }
        }

        // Concatenate as many in-order outputs as possible before writing.
        output.clear();
        loop {
            if let Some(text) = pending.remove(&next_index) {
                output.push_str(&text);
                next_index += 1;
            } else if skip.remove(&next_index) {
                next_index += 1;
            } else {
                break;
            }
        }

        if !quiet && !output.is_empty() {
            writer.write_all(output.as_bytes())?;
        }
    }

    writer.flush()?;
    if !pending.is_empty() || !skip.is_empty() {
        debug!(
            pending = pending.len(),
            skipped = skip.len(),
            "print loop exiting with unclaimed results"
        );
    }
    Ok(())
}
