//! Recursive file discovery.
//!
//! The walker is the sole producer of `FileJob`s. Discovery indices come
//! from an atomic fetch-add on the files-searched counter, so the counter
//! and the index sequence can never disagree. Directory entries are sorted
//! by name, making discovery order (and therefore output order)
//! deterministic per run.

use crossbeam_channel::Sender;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use super::engine::SearchContext;
use super::FileJob;
use crate::errors::{Result, SearchError};
use crate::gitignore::IgnoreStack;

pub struct Walker {
    ctx: Arc<SearchContext>,
    jobs: Sender<FileJob>,
}

impl Walker {
    pub fn new(ctx: Arc<SearchContext>, jobs: Sender<FileJob>) -> Self {
        Self { ctx, jobs }
    }

    /// Walks the configured location, emitting one job per regular file.
    ///
    /// A location that is itself a regular file is queued as index 1 even
    /// when empty. Only an unreadable or non-regular root is fatal;
    /// everything below degrades to debug-logged skips.
    pub fn run(self) -> Result<()> {
        let location = self.ctx.opts.location.clone();
        let meta = fs::metadata(&location)
            .map_err(|_| SearchError::InvalidLocation(location.clone()))?;

        if meta.is_file() {
            let index = self.ctx.counters.next_index();
            debug!(path = %location.display(), index, "queueing single file");
            let _ = self.jobs.send(FileJob {
                path: location,
                index,
                size: meta.len(),
            });
            return Ok(());
        }
        if !meta.is_dir() {
            return Err(SearchError::InvalidLocation(location));
        }

        let ignores = if self.ctx.opts.unrestricted {
            IgnoreStack::empty()
        } else {
            IgnoreStack::global(&location)
        };
        self.walk_dir(&location, &ignores, true)
    }

    fn walk_dir(&self, dir: &Path, ignores: &IgnoreStack, is_root: bool) -> Result<()> {
        debug!(dir = %dir.display(), "scanning directory");

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) if is_root => return Err(err.into()),
            Err(err) => {
                debug!(dir = %dir.display(), error = %err, "skipping unreadable directory");
                return Ok(());
            }
        };
        let mut entries: Vec<fs::DirEntry> = entries.filter_map(|e| e.ok()).collect();
        entries.sort_by_key(|entry| entry.file_name());

        let ignores = if self.ctx.opts.unrestricted {
            ignores.clone()
        } else {
            ignores.descend(dir)
        };

        for entry in entries {
            let name = entry.file_name();
            if !self.ctx.opts.hidden && name.as_encoded_bytes().first() == Some(&b'.') {
                debug!(name = %name.to_string_lossy(), "skipping hidden entry");
                continue;
            }

            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(err) => {
                    debug!(path = %path.display(), error = %err, "skipping unstattable entry");
                    continue;
                }
            };

            if !self.ctx.opts.unrestricted && ignores.is_ignored(&path, file_type.is_dir()) {
                debug!(path = %path.display(), "skipping gitignore match");
                continue;
            }

            if file_type.is_dir() {
                self.walk_dir(&path, &ignores, false)?;
            } else if file_type.is_file() {
                let size = match entry.metadata() {
                    Ok(meta) => meta.len(),
                    Err(err) => {
                        debug!(path = %path.display(), error = %err, "skipping unstattable file");
                        continue;
                    }
                };
                let index = self.ctx.counters.next_index();
                debug!(path = %path.display(), index, "queueing");
                if self.jobs.send(FileJob { path, index, size }).is_err() {
                    // Consumers are gone; nothing left to discover for.
                    return Ok(());
                }
            }
        }

        debug!(dir = %dir.display(), "finished scanning directory");
        Ok(())
    }
}
