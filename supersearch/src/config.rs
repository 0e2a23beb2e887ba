use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::{Result, SearchError};

/// Immutable configuration for one search run.
///
/// Values can be loaded from config files in order of precedence:
/// 1. Custom file passed via `--config`
/// 2. Local `.supersearch.yaml` in the current directory
/// 3. Global `$HOME/.config/supersearch/config.yaml`
///
/// Command-line arguments take precedence over config-file values; the
/// merging behavior is defined in [`Options::merge_with_cli`]. The pattern
/// and location never come from a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Options {
    /// Pattern to search for. Literal patterns use Boyer-Moore; patterns
    /// containing a regex metacharacter go through the regex engine.
    #[serde(skip)]
    pub pattern: String,

    /// File or directory to search.
    #[serde(skip)]
    pub location: PathBuf,

    /// ASCII-fold case when matching.
    #[serde(default)]
    pub ignore_case: bool,

    /// Include entries whose name begins with `.`.
    #[serde(default)]
    pub hidden: bool,

    /// Search all files, disregarding every gitignore rule.
    #[serde(default)]
    pub unrestricted: bool,

    /// Suppress match output; the search still runs to completion.
    #[serde(default)]
    pub quiet: bool,

    /// Emit diagnostics to stderr.
    #[serde(default)]
    pub debug: bool,

    /// Print the summary line after results.
    #[serde(default)]
    pub show_stats: bool,

    /// Worker pool cap. `None` means the number of logical cores.
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

impl Options {
    /// Creates options with default flags for the given pattern and location.
    pub fn new(pattern: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        Self {
            pattern: pattern.into(),
            location: location.into(),
            ignore_case: false,
            hidden: false,
            unrestricted: false,
            quiet: false,
            debug: false,
            show_stats: false,
            max_concurrency: None,
        }
    }

    /// The effective worker pool cap.
    pub fn concurrency(&self) -> usize {
        self.max_concurrency.unwrap_or_else(num_cpus::get)
    }

    /// Loads flag defaults from the standard config-file locations, plus an
    /// optional explicit file. Missing files are simply not sources.
    pub fn load_from(config_path: Option<&Path>) -> std::result::Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            dirs::config_dir().map(|p| p.join("supersearch/config.yaml")),
            Some(PathBuf::from(".supersearch.yaml")),
            config_path.map(PathBuf::from),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        builder.build()?.try_deserialize()
    }

    /// Merges CLI arguments over config-file values. The pattern and
    /// location always come from the CLI; boolean flags combine so a file
    /// can only turn behavior on, never veto an explicit flag; a thread
    /// count passed on the CLI always replaces the file's.
    pub fn merge_with_cli(mut self, cli: Options) -> Self {
        self.pattern = cli.pattern;
        self.location = cli.location;
        self.ignore_case |= cli.ignore_case;
        self.hidden |= cli.hidden;
        self.unrestricted |= cli.unrestricted;
        self.quiet |= cli.quiet;
        self.debug |= cli.debug;
        self.show_stats |= cli.show_stats;
        if cli.max_concurrency.is_some() {
            self.max_concurrency = cli.max_concurrency;
        }
        self
    }

    /// Rejects configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.pattern.is_empty() {
            return Err(SearchError::config("pattern must not be empty"));
        }
        if self.max_concurrency == Some(0) {
            return Err(SearchError::config("thread count must be at least 1"));
        }
        if !self.location.exists() {
            return Err(SearchError::InvalidLocation(self.location.clone()));
        }
        Ok(())
    }
}
