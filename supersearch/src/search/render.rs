//! Terminal rendering of match output.
//!
//! Coloring goes through the `colored` crate, which drops escape codes when
//! stdout is not a terminal (tests force this off with
//! `colored::control::set_override(false)` for byte-exact assertions).

use colored::Colorize;
use std::path::Path;

pub(crate) fn file_header(path: &Path) -> String {
    format!("{}\n", display_path(path).cyan().bold())
}

pub(crate) fn line_number(line_no: u64) -> String {
    format!("{}", format!("{line_no}:").green().bold())
}

pub(crate) fn highlight_match(text: &str) -> String {
    format!("{}", text.black().on_yellow().bold())
}

/// Strips a leading `./` so headers read like the paths the user typed.
pub(crate) fn display_path(path: &Path) -> String {
    let display = path.display().to_string();
    display
        .strip_prefix("./")
        .map(str::to_owned)
        .unwrap_or(display)
}
