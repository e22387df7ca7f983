//! Search query building
//!
//! A search runs in two phases:
//!
//! 1. **Coarse filter** ([`CoarseQuery`]): every query word must occur in the
//!    document's romanized variants, and the document must carry the caller's
//!    repository tag. Cheap and index-native, but it admits false positives
//!    because the index matches per token.
//! 2. **Refinement** ([`RefinementFilter`]): a case-insensitive alternation of
//!    the literal query words, tested against each adapter's romanized names
//!    summary of the candidates. Costs one regex scan per candidate, bounded by
//!    the result limit.

use crate::search::error::SearchResult;
use crate::search::index::MAX_QUERY_LIMIT;
use crate::search::transliteration::Romanizer;
use crate::search::document::IndexHit;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Character reserved as phrase delimiter in the coarse query
const PHRASE_QUOTE: char = '"';

/// Main search query structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Repository to search in
    pub repo: String,

    /// Raw query text, in any script
    pub query: String,

    /// Number of results to return
    pub limit: usize,
}

impl SearchQuery {
    /// Create a new search query
    pub fn new(repo: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            query: query.into(),
            limit: 100,
        }
    }

    /// Set limit
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Words of a query, empty words dropped
pub fn query_words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Romanize query text with the primary adapter and remove phrase quotes.
///
/// Falls back to the raw text when the adapter offers no candidate.
pub fn normalize_query(primary: &dyn Romanizer, text: &str) -> SearchResult<String> {
    let romanized = primary
        .romanize(text)?
        .into_iter()
        .find(|candidate| !candidate.trim().is_empty())
        .unwrap_or_else(|| text.to_string());

    Ok(romanized.replace(PHRASE_QUOTE, ""))
}

/// `a b` → `"a" "b"`
pub fn enclose_in_double_quotes(text: &str) -> String {
    query_words(text)
        .iter()
        .map(|word| format!("{}{}{}", PHRASE_QUOTE, word, PHRASE_QUOTE))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Recall-oriented index query: literal phrases ANDed with a repository tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoarseQuery {
    /// Literal phrases, none containing a quote character
    pub phrases: Vec<String>,

    /// Exact repository tag every result must carry
    pub repo: String,
}

impl CoarseQuery {
    /// Build from already normalized query text
    pub fn new(normalized: &str, repo: impl Into<String>) -> Self {
        Self {
            phrases: query_words(normalized)
                .into_iter()
                .map(|word| word.replace(PHRASE_QUOTE, ""))
                .filter(|word| !word.is_empty())
                .collect(),
            repo: repo.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Query-language rendering: `"w1" "w2" AND (repo: r)`
    pub fn to_query_string(&self) -> String {
        format!(
            "{} AND (repo: {})",
            enclose_in_double_quotes(&self.phrases.join(" ")),
            self.repo
        )
    }
}

impl fmt::Display for CoarseQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

/// Execution options passed to the index store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Maximum number of documents to return
    pub limit: usize,

    /// Stored fields to return; empty returns every field
    pub returned_fields: Vec<String>,
}

impl QueryOptions {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.min(MAX_QUERY_LIMIT),
            returned_fields: Vec::new(),
        }
    }

    pub fn with_returned_fields(mut self, fields: Vec<String>) -> Self {
        self.returned_fields = fields;
        self
    }
}

/// Precision-oriented literal substring match over romanized name summaries
#[derive(Debug, Clone)]
pub struct RefinementFilter {
    regex: Option<Regex>,
}

impl RefinementFilter {
    /// `word1|word2|...`, each word escaped, matched case-insensitively
    pub fn new(text: &str) -> Self {
        let alternation = query_words(text)
            .into_iter()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");

        let regex = if alternation.is_empty() {
            None
        } else {
            // escaped literals always form a valid pattern
            RegexBuilder::new(&alternation)
                .case_insensitive(true)
                .build()
                .ok()
        };

        Self { regex }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.as_ref().map_or(false, |regex| regex.is_match(text))
    }

    /// True when any of `fields` of the hit matches
    pub fn matches(&self, hit: &IndexHit, fields: &[String]) -> bool {
        fields
            .iter()
            .filter_map(|name| hit.field(name))
            .any(|value| self.is_match(value))
    }

    pub fn pattern(&self) -> Option<&str> {
        self.regex.as_ref().map(Regex::as_str)
    }
}
