//! Gitignore handling for the walker.
//!
//! The active ignore rules form a chain of per-directory matchers. Entering
//! a directory extends the chain with that directory's `.gitignore` without
//! touching the parent's copy, so sibling descents never observe each
//! other's patterns. Pattern parsing and matching are delegated to the
//! `ignore` crate's gitignore engine.

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::Match;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub const GITIGNORE_FILE: &str = ".gitignore";
pub const GLOBAL_GITIGNORE: &str = ".gitignore_global";

/// An immutable chain of gitignore matchers, shallowest first.
#[derive(Debug, Clone, Default)]
pub struct IgnoreStack {
    chain: Vec<Arc<Gitignore>>,
}

impl IgnoreStack {
    /// A stack with no rules; nothing is ignored.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads `~/.gitignore_global`, rooted at the walk root so its patterns
    /// apply to the whole tree. A missing file is not an error.
    pub fn global(root: &Path) -> Self {
        let mut stack = Self::empty();
        let Some(home) = dirs::home_dir() else {
            return stack;
        };
        let path = home.join(GLOBAL_GITIGNORE);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    debug!(file = %path.display(), error = %err, "failed to read global gitignore");
                }
                return stack;
            }
        };

        let mut builder = GitignoreBuilder::new(root);
        for line in contents.lines() {
            if let Err(err) = builder.add_line(None, line) {
                debug!(line, error = %err, "skipping malformed global ignore pattern");
            }
        }
        match builder.build() {
            Ok(gitignore) if !gitignore.is_empty() => stack.chain.push(Arc::new(gitignore)),
            Ok(_) => {}
            Err(err) => debug!(file = %path.display(), error = %err, "failed to build global gitignore"),
        }
        stack
    }

    /// Returns a new stack extended with `dir/.gitignore` when present and
    /// non-empty. Read errors degrade to the unmodified stack.
    pub fn descend(&self, dir: &Path) -> Self {
        let path = dir.join(GITIGNORE_FILE);
        if !path.is_file() {
            return self.clone();
        }
        let (gitignore, err) = Gitignore::new(&path);
        if let Some(err) = err {
            debug!(file = %path.display(), error = %err, "partially unreadable gitignore");
        }
        if gitignore.is_empty() {
            return self.clone();
        }
        let mut next = self.clone();
        next.chain.push(Arc::new(gitignore));
        next
    }

    /// Whether `path` is excluded by the active rules. Deeper matchers are
    /// consulted first so later patterns override earlier ones, and `!`
    /// whitelist patterns re-include.
    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        for gitignore in self.chain.iter().rev() {
            match gitignore.matched(path, is_dir) {
                Match::Ignore(_) => return true,
                Match::Whitelist(_) => return false,
                Match::None => {}
            }
        }
        false
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}
