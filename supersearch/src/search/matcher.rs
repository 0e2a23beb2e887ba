//! Pattern strategy selection.

use regex::bytes::{Regex, RegexBuilder};
use tracing::debug;

use super::boyer_moore::BoyerMoore;

/// Bytes that route a pattern through the regex engine.
const REGEX_METACHARS: &[u8] = b"[{(*+.?^|\\";

pub fn is_regex_pattern(pattern: &str) -> bool {
    pattern.bytes().any(|b| REGEX_METACHARS.contains(&b))
}

/// How matches are found within a file.
///
/// Literal patterns run Boyer-Moore over the whole buffer; regex patterns
/// are applied line by line. Both are compiled once per run.
#[derive(Debug)]
pub enum MatchStrategy {
    Literal(BoyerMoore),
    Regex(Regex),
}

impl MatchStrategy {
    pub fn build(pattern: &str, ignore_case: bool) -> Result<Self, regex::Error> {
        if is_regex_pattern(pattern) {
            debug!(pattern, "using regex search");
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(ignore_case)
                .build()?;
            Ok(MatchStrategy::Regex(regex))
        } else {
            debug!(pattern, "using Boyer-Moore string search");
            Ok(MatchStrategy::Literal(BoyerMoore::new(pattern, ignore_case)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_literal() {
        assert!(!is_regex_pattern("fox"));
        assert!(!is_regex_pattern("hello world"));
        assert!(!is_regex_pattern("foo-bar_baz/qux"));
    }

    #[test]
    fn test_metacharacters_are_regex() {
        for pattern in ["a.c", "a*", "a+b", "a?", "[abc]", "a{2}", "(a)", "^a", "a|b", r"a\.c"] {
            assert!(is_regex_pattern(pattern), "{pattern} should be regex");
        }
    }

    #[test]
    fn test_build_literal() {
        let strategy = MatchStrategy::build("fox", false).unwrap();
        assert!(matches!(strategy, MatchStrategy::Literal(_)));
    }

    #[test]
    fn test_build_regex() {
        let strategy = MatchStrategy::build("a.c", false).unwrap();
        let MatchStrategy::Regex(regex) = strategy else {
            panic!("expected regex strategy");
        };
        assert!(regex.is_match(b"abc"));
        assert!(regex.is_match(b"aac"));
        assert!(!regex.is_match(b"ac"));
    }

    #[test]
    fn test_build_case_insensitive_regex() {
        let strategy = MatchStrategy::build("f.x", true).unwrap();
        let MatchStrategy::Regex(regex) = strategy else {
            panic!("expected regex strategy");
        };
        assert!(regex.is_match(b"FOX"));
    }

    #[test]
    fn test_invalid_regex_is_an_error() {
        assert!(MatchStrategy::build("a(", false).is_err());
    }
}
