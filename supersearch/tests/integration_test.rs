use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use supersearch::{search_with_writer, Options, SearchError, SearchSummary};
use tempfile::tempdir;

/// Shared sink so tests can read back what the printer thread wrote.
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn create_files(dir: &Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}

fn run_search(opts: &Options) -> (SearchSummary, String) {
    colored::control::set_override(false);
    let buf = SharedBuf::default();
    let summary = search_with_writer(opts, buf.clone()).unwrap();
    (summary, buf.contents())
}

#[test]
fn test_two_files_in_discovery_order() {
    let dir = tempdir().unwrap();
    create_files(
        dir.path(),
        &[("a.txt", "foo\nbar\n"), ("b.txt", "foo foo\n")],
    );

    let opts = Options::new("foo", dir.path());
    let (summary, output) = run_search(&opts);

    assert_eq!(summary.files_searched, 2);
    assert_eq!(summary.files_matched, 2);
    assert_eq!(summary.num_matches, 3);

    let expected = format!(
        "{a}\n1:foo\n\n{b}\n1:foo foo\n\n",
        a = dir.path().join("a.txt").display(),
        b = dir.path().join("b.txt").display(),
    );
    assert_eq!(output, expected);
}

#[test]
fn test_one_match_per_line_over_many_lines() {
    let dir = tempdir().unwrap();
    let content = "The quick brown fox jumped over the lazy dog.\n".repeat(100);
    create_files(dir.path(), &[("x", &content)]);

    let opts = Options::new("fox", dir.path());
    let (summary, output) = run_search(&opts);

    assert_eq!(summary.num_matches, 100);
    assert_eq!(summary.files_matched, 1);
    for line_no in [1u64, 50, 100] {
        assert!(
            output.contains(&format!("{line_no}:The quick brown fox")),
            "missing line {line_no}"
        );
    }
    assert!(!output.contains("101:"));
}

#[test]
fn test_binary_file_is_skipped() {
    let dir = tempdir().unwrap();
    let bytes: Vec<u8> = (0u8..=255).collect();
    fs::write(dir.path().join("bin"), &bytes).unwrap();

    let opts = Options::new("a", dir.path());
    let (summary, output) = run_search(&opts);

    assert_eq!(summary.files_searched, 1);
    assert_eq!(summary.files_matched, 0);
    assert_eq!(summary.num_matches, 0);
    assert_eq!(output, "");
}

#[test]
fn test_gitignore_excludes_matching_files() {
    let dir = tempdir().unwrap();
    create_files(
        dir.path(),
        &[
            ("keep.log", "x\n"),
            (".gitignore", "*.log\n"),
            ("other.txt", "x\n"),
        ],
    );

    let opts = Options::new("x", dir.path());
    let (summary, output) = run_search(&opts);

    // keep.log is ignored; .gitignore itself is hidden.
    assert_eq!(summary.files_searched, 1);
    assert_eq!(summary.num_matches, 1);
    assert!(output.contains("other.txt"));
    assert!(!output.contains("keep.log"));
    assert!(output.contains("1:x\n"));
}

#[test]
fn test_unrestricted_ignores_gitignore() {
    let dir = tempdir().unwrap();
    create_files(
        dir.path(),
        &[
            ("keep.log", "x\n"),
            (".gitignore", "*.log\n"),
            ("other.txt", "x\n"),
        ],
    );

    let mut opts = Options::new("x", dir.path());
    opts.unrestricted = true;
    let (summary, output) = run_search(&opts);

    assert_eq!(summary.files_searched, 2);
    assert_eq!(summary.files_matched, 2);
    assert!(output.contains("keep.log"));
    assert!(output.contains("other.txt"));
}

#[test]
fn test_gitignore_negation_re_includes() {
    let dir = tempdir().unwrap();
    create_files(
        dir.path(),
        &[
            (".gitignore", "*.log\n!keep.log\n"),
            ("keep.log", "x\n"),
            ("drop.log", "x\n"),
        ],
    );

    let opts = Options::new("x", dir.path());
    let (summary, output) = run_search(&opts);

    assert_eq!(summary.files_searched, 1);
    assert!(output.contains("keep.log"));
    assert!(!output.contains("drop.log"));
}

#[test]
fn test_nested_gitignore_applies_to_subtree_only() {
    let dir = tempdir().unwrap();
    create_files(
        dir.path(),
        &[
            ("top.tmp", "x\n"),
            ("sub/.gitignore", "*.tmp\n"),
            ("sub/inner.tmp", "x\n"),
            ("sub/inner.txt", "x\n"),
        ],
    );

    let opts = Options::new("x", dir.path());
    let (summary, output) = run_search(&opts);

    assert_eq!(summary.files_searched, 2);
    assert!(output.contains("top.tmp"));
    assert!(output.contains("inner.txt"));
    assert!(!output.contains("inner.tmp"));
}

#[test]
fn test_regex_pattern_matches_per_line() {
    let dir = tempdir().unwrap();
    create_files(dir.path(), &[("f", "abc\naac\n")]);

    let opts = Options::new("a.c", dir.path());
    let (summary, output) = run_search(&opts);

    assert_eq!(summary.num_matches, 2);
    assert!(output.contains("1:abc\n"));
    assert!(output.contains("2:aac\n"));
}

#[test]
fn test_escaped_regex_matches_literal_dot() {
    let dir = tempdir().unwrap();
    create_files(dir.path(), &[("f", "a.c\nabc\n")]);

    let opts = Options::new(r"a\.c", dir.path());
    let (summary, output) = run_search(&opts);

    assert_eq!(summary.num_matches, 1);
    assert!(output.contains("1:a.c\n"));
    assert!(!output.contains("2:"));
}

#[test]
fn test_hidden_files_skipped_by_default() {
    let dir = tempdir().unwrap();
    create_files(dir.path(), &[(".secret", "x\n"), ("plain.txt", "x\n")]);

    let opts = Options::new("x", dir.path());
    let (summary, _) = run_search(&opts);
    assert_eq!(summary.files_searched, 1);

    let mut opts = Options::new("x", dir.path());
    opts.hidden = true;
    let (summary, output) = run_search(&opts);
    assert_eq!(summary.files_searched, 2);
    assert!(output.contains(".secret"));
}

#[test]
fn test_empty_file_is_counted_then_skipped() {
    let dir = tempdir().unwrap();
    create_files(dir.path(), &[("empty.txt", ""), ("full.txt", "x\n")]);

    let opts = Options::new("x", dir.path());
    let (summary, output) = run_search(&opts);

    assert_eq!(summary.files_searched, 2);
    assert_eq!(summary.files_matched, 1);
    assert!(!output.contains("empty.txt"));
}

#[test]
fn test_single_file_location() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("only.txt");
    fs::write(&path, "fox\n").unwrap();

    let opts = Options::new("fox", &path);
    let (summary, output) = run_search(&opts);

    assert_eq!(summary.files_searched, 1);
    assert_eq!(summary.num_matches, 1);
    assert_eq!(output, format!("{}\n1:fox\n\n", path.display()));
}

#[test]
fn test_empty_root_file_is_still_queued() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty");
    fs::write(&path, "").unwrap();

    let opts = Options::new("fox", &path);
    let (summary, output) = run_search(&opts);

    assert_eq!(summary.files_searched, 1);
    assert_eq!(summary.num_matches, 0);
    assert_eq!(output, "");
}

#[test]
fn test_final_line_without_newline_is_searched() {
    let dir = tempdir().unwrap();
    create_files(dir.path(), &[("f", "cat\ndog")]);

    // Literal mode.
    let opts = Options::new("dog", dir.path());
    let (summary, output) = run_search(&opts);
    assert_eq!(summary.num_matches, 1);
    assert!(output.ends_with("2:dog\n"));

    // Regex mode must agree.
    let opts = Options::new("d.g", dir.path());
    let (summary, output) = run_search(&opts);
    assert_eq!(summary.num_matches, 1);
    assert!(output.ends_with("2:dog\n"));
}

#[test]
fn test_ignore_case_literal_and_regex() {
    let dir = tempdir().unwrap();
    create_files(dir.path(), &[("f", "FOO\nfoo\nFox\n")]);

    let mut opts = Options::new("foo", dir.path());
    opts.ignore_case = true;
    let (summary, _) = run_search(&opts);
    assert_eq!(summary.num_matches, 2);

    let mut opts = Options::new("f.x", dir.path());
    opts.ignore_case = true;
    let (summary, _) = run_search(&opts);
    assert_eq!(summary.num_matches, 1);
}

#[test]
fn test_pattern_longer_than_file() {
    let dir = tempdir().unwrap();
    create_files(dir.path(), &[("f", "ab\n")]);

    let opts = Options::new("much longer than the file", dir.path());
    let (summary, output) = run_search(&opts);
    assert_eq!(summary.num_matches, 0);
    assert_eq!(output, "");
}

#[test]
fn test_quiet_suppresses_output_but_not_counters() {
    let dir = tempdir().unwrap();
    create_files(dir.path(), &[("f", "fox\n")]);

    let mut opts = Options::new("fox", dir.path());
    opts.quiet = true;
    let (summary, output) = run_search(&opts);

    assert_eq!(summary.num_matches, 1);
    assert_eq!(output, "");
}

#[test]
fn test_output_is_deterministic_across_runs() {
    let dir = tempdir().unwrap();
    create_files(
        dir.path(),
        &[
            ("aa.txt", "needle one\n"),
            ("bb.txt", "no match here\n"),
            ("cc.txt", "needle two\nneedle three\n"),
            ("sub/dd.txt", "needle four\n"),
        ],
    );

    let opts = Options::new("needle", dir.path());
    let (first_summary, first) = run_search(&opts);
    let (second_summary, second) = run_search(&opts);

    assert_eq!(first, second);
    assert_eq!(first_summary.num_matches, second_summary.num_matches);

    // Entries are visited in sorted name order: aa.txt, bb.txt, cc.txt, sub/.
    let aa = first.find("aa.txt").unwrap();
    let cc = first.find("cc.txt").unwrap();
    let dd = first.find("dd.txt").unwrap();
    assert!(aa < cc && cc < dd);
    assert!(!first.contains("bb.txt"));
}

#[test]
fn test_many_files_exercise_the_worker_pool() {
    let dir = tempdir().unwrap();
    for i in 0..200 {
        let name = format!("file_{i:03}.txt");
        let content = if i % 3 == 0 {
            format!("line with fox number {i}\n")
        } else {
            format!("nothing to see in {i}\n")
        };
        fs::write(dir.path().join(name), content).unwrap();
    }

    let mut opts = Options::new("fox", dir.path());
    opts.max_concurrency = Some(4);
    let (summary, output) = run_search(&opts);

    assert_eq!(summary.files_searched, 200);
    assert_eq!(summary.num_matches, 67);
    assert_eq!(summary.files_matched, 67);

    // Output sections appear in discovery (sorted) order.
    let positions: Vec<usize> = (0..200)
        .step_by(3)
        .map(|i| output.find(&format!("file_{i:03}.txt")).unwrap())
        .collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted);
}

#[test]
fn test_invalid_location_is_fatal() {
    let opts = Options::new("fox", "/definitely/not/a/real/path");
    let err = search_with_writer(&opts, SharedBuf::default()).unwrap_err();
    assert!(matches!(err, SearchError::InvalidLocation(_)));
}

#[test]
fn test_invalid_regex_is_fatal() {
    let dir = tempdir().unwrap();
    let opts = Options::new("a(", dir.path());
    let err = search_with_writer(&opts, SharedBuf::default()).unwrap_err();
    assert!(matches!(err, SearchError::InvalidPattern(_)));
}

#[test]
fn test_repeated_quiet_runs_are_idempotent() {
    let dir = tempdir().unwrap();
    create_files(dir.path(), &[("f", "fox fox\nfox\n")]);

    let mut opts = Options::new("fox", dir.path());
    opts.quiet = true;
    opts.show_stats = true;

    let (first, _) = run_search(&opts);
    let (second, _) = run_search(&opts);
    assert_eq!(first.num_matches, second.num_matches);
    assert_eq!(first.files_matched, second.files_matched);
    assert_eq!(first.files_searched, second.files_searched);
}
