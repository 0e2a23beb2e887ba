//! Per-file scanning.
//!
//! A worker receives jobs until the rendezvous channel closes. Each file is
//! read in full, sniffed for binary content, scanned with the run's match
//! strategy, and rendered into a terminal-ready string. I/O problems are
//! never fatal; they turn into skipped results so one unreadable file
//! cannot abort a search.

use crossbeam_channel::{Receiver, Sender};
use memmap2::Mmap;
use regex::bytes::Regex;
use std::fs::File;
use std::io::{self, Read};
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::debug;

use super::boyer_moore::BoyerMoore;
use super::engine::SearchContext;
use super::matcher::MatchStrategy;
use super::{binary, render, FileJob, FileResult, Outcome};

/// Files at or above this size are memory-mapped instead of read.
const MMAP_THRESHOLD: u64 = 10 * 1024 * 1024;

pub(super) fn spawn(
    id: usize,
    jobs: Receiver<FileJob>,
    results: Sender<FileResult>,
    ctx: Arc<SearchContext>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("worker-{id}"))
        .spawn(move || worker_loop(id, jobs, results, ctx))
}

fn worker_loop(
    id: usize,
    jobs: Receiver<FileJob>,
    results: Sender<FileResult>,
    ctx: Arc<SearchContext>,
) {
    debug!(worker = id, "worker starting");
    for job in jobs.iter() {
        debug!(worker = id, path = %job.path.display(), "searching");
        let result = scan_file(&job, &ctx);
        if results.send(result).is_err() {
            break;
        }
    }
    debug!(worker = id, "worker finished");
}

/// Byte access to a file's contents, mapped or owned.
enum FileData {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl Deref for FileData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            FileData::Owned(buf) => buf,
            FileData::Mapped(mmap) => mmap,
        }
    }
}

fn read_file(path: &Path, size: u64) -> io::Result<FileData> {
    let file = File::open(path)?;
    if size >= MMAP_THRESHOLD {
        let mmap = unsafe { Mmap::map(&file) }?;
        Ok(FileData::Mapped(mmap))
    } else {
        let mut buf = Vec::with_capacity(size as usize);
        file.take(size).read_to_end(&mut buf)?;
        Ok(FileData::Owned(buf))
    }
}

/// Scans one file and updates the shared counters.
pub fn scan_file(job: &FileJob, ctx: &SearchContext) -> FileResult {
    if job.size == 0 {
        debug!(path = %job.path.display(), "skipping empty file");
        return FileResult::skipped(job.index);
    }

    let data = match read_file(&job.path, job.size) {
        Ok(data) => data,
        Err(err) => {
            debug!(path = %job.path.display(), error = %err, "failed to read file");
            return FileResult::skipped(job.index);
        }
    };

    if binary::is_binary(&data) {
        debug!(path = %job.path.display(), "skipping binary file");
        return FileResult::skipped(job.index);
    }

    let result = match &ctx.strategy {
        MatchStrategy::Regex(regex) => scan_regex(&job.path, job.index, regex, &data),
        MatchStrategy::Literal(bm) => scan_literal(&job.path, job.index, bm, &data),
    };

    if result.match_count > 0 {
        ctx.counters.record_matches(result.match_count);
        ctx.counters.record_file_matched();
    }
    result
}

/// Regex scan, line by line. Lines are the byte slices between `\n`s plus
/// the residual bytes after the final `\n`. A non-UTF-8 line before the
/// first match re-classifies the file as binary.
fn scan_regex(path: &Path, index: u64, regex: &Regex, buf: &[u8]) -> FileResult {
    let mut out = String::new();
    let mut match_count: u64 = 0;
    let mut match_found = false;
    let mut line_no: u64 = 1;
    let mut line_start = 0usize;

    while line_start < buf.len() {
        let (line_end, terminated) = match buf[line_start..].iter().position(|&b| b == b'\n') {
            Some(offset) => (line_start + offset, true),
            None => (buf.len(), false),
        };
        let line = &buf[line_start..line_end];

        if !match_found && std::str::from_utf8(line).is_err() {
            debug!(path = %path.display(), line_no, "binary content mid-file; skipping");
            return FileResult::skipped(index);
        }

        let spans: Vec<(usize, usize)> = regex.find_iter(line).map(|m| (m.start(), m.end())).collect();
        if !spans.is_empty() {
            if !match_found {
                match_found = true;
                out.push_str(&render::file_header(path));
            }
            match_count += spans.len() as u64;

            out.push_str(&render::line_number(line_no));
            let mut last = 0usize;
            for (start, end) in spans {
                out.push_str(&String::from_utf8_lossy(&line[last..start]));
                out.push_str(&render::highlight_match(&String::from_utf8_lossy(
                    &line[start..end],
                )));
                last = end;
            }
            out.push_str(&String::from_utf8_lossy(&line[last..]));
            if terminated {
                out.push('\n');
            }
        }

        if !terminated {
            break;
        }
        line_no += 1;
        line_start = line_end + 1;
    }

    if match_found {
        out.push('\n');
        FileResult {
            index,
            outcome: Outcome::Match(out),
            match_count,
        }
    } else {
        FileResult::no_match(index)
    }
}

/// Literal scan: Boyer-Moore over the whole buffer, then a single pass that
/// tracks line numbers and stitches highlighted segments together.
fn scan_literal(path: &Path, index: u64, bm: &BoyerMoore, buf: &[u8]) -> FileResult {
    let matches = bm.find_all(buf);
    if matches.is_empty() {
        return FileResult::no_match(index);
    }
    let pattern_len = bm.pattern_len();

    let mut out = String::new();
    out.push_str(&render::file_header(path));

    let mut line_no: u64 = 1;
    let mut last_index = 0usize;
    let mut next_match = 0usize;
    let mut printing_line = false;
    let mut i = 0usize;

    while i < buf.len() {
        if buf[i] == b'\n' {
            if printing_line {
                out.push_str(&String::from_utf8_lossy(&buf[last_index..i]));
                out.push('\n');
                printing_line = false;
            }
            line_no += 1;
            last_index = i + 1;
            if next_match >= matches.len() {
                break;
            }
            i += 1;
            continue;
        }

        if next_match < matches.len() && i == matches[next_match] {
            if !printing_line {
                out.push_str(&render::line_number(line_no));
                printing_line = true;
            }
            out.push_str(&String::from_utf8_lossy(&buf[last_index..i]));
            out.push_str(&render::highlight_match(&String::from_utf8_lossy(
                &buf[i..i + pattern_len],
            )));
            next_match += 1;
            last_index = i + pattern_len;
            i = last_index;
            continue;
        }

        i += 1;
    }

    // Final line without a trailing newline.
    if printing_line {
        out.push_str(&String::from_utf8_lossy(&buf[last_index..]));
    }

    out.push('\n');
    FileResult {
        index,
        outcome: Outcome::Match(out),
        match_count: matches.len() as u64,
    }
}
