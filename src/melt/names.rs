//! Mapping element names onto safe SQL identifiers

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Words that cannot be used bare as a table or column name
pub static DEFAULT_RESERVED_WORDS: Lazy<HashSet<String>> = Lazy::new(|| {
    ["table", "select", "insert", "update", "delete", "where"]
        .into_iter()
        .map(String::from)
        .collect()
});

/// Case-insensitive reserved-word set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedWords(HashSet<String>);

impl ReservedWords {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ReservedWords(
            words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        )
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(&name.to_lowercase())
    }
}

impl Default for ReservedWords {
    fn default() -> Self {
        ReservedWords((*DEFAULT_RESERVED_WORDS).clone())
    }
}

/// Rewrites raw element names into identifiers that are safe to use in SQL
#[derive(Debug, Clone, Default)]
pub struct NameSanitizer {
    reserved: ReservedWords,
}

impl NameSanitizer {
    pub fn new(reserved: ReservedWords) -> Self {
        NameSanitizer { reserved }
    }

    /// Strip bracket decoration from the edges and wrap reserved words as `_name_`
    ///
    /// Total over all inputs; the original casing is kept.
    pub fn sanitize(&self, name: &str) -> String {
        let name = name.trim_matches(|c| c == '[' || c == ']');
        if self.reserved.contains(name) {
            format!("_{}_", name)
        } else {
            name.to_string()
        }
    }
}

/// Double-quote an identifier, doubling any embedded quotes
pub fn quote_name(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
