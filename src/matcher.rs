//! Single-pattern regex wrapper used by the progress parser

use crate::error::Result;
use regex::Regex;

/// A compiled pattern with the few queries the parser needs
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
}

impl Matcher {
    /// Compile `pattern`
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    /// The source pattern
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Whether the pattern matches anywhere in `text`
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// First capture group of the first match, or an empty string
    pub fn extract(&self, text: &str) -> String {
        self.regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|group| group.as_str().to_string())
            .unwrap_or_default()
    }

    /// Up to `limit` matches, each as `[full match, group 1, group 2, ...]`
    ///
    /// Groups that did not take part in a match are returned as empty strings,
    /// so every record has the same length.
    pub fn extract_all_submatches(&self, text: &str, limit: usize) -> Vec<Vec<String>> {
        self.regex
            .captures_iter(text)
            .take(limit)
            .map(|caps| {
                caps.iter()
                    .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
                    .collect()
            })
            .collect()
    }

    /// Full text of the first match
    pub fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex.find(text).map(|m| m.as_str())
    }
}
