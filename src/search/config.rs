//! Search configuration

use crate::search::error::{SearchError, SearchResult};
use crate::search::index::MAX_QUERY_LIMIT;
use crate::search::transliteration::{
    JAPANESE_LOCATION_ADAPTER, JAPANESE_NAME_ADAPTER, UNIDECODE_ADAPTER,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Smallest writer heap tantivy accepts per indexing thread
const MIN_HEAP_PER_THREAD: usize = 15_000_000;

/// Search service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Path to the search index directory; in-memory index when unset
    pub index_path: Option<PathBuf>,

    /// Index writer heap size in bytes (default: 50MB)
    pub writer_heap_size: usize,

    /// Number of threads for indexing
    pub indexing_threads: usize,

    /// Commit after every single-document write or delete
    pub realtime_indexing: bool,

    /// Maximum search results to return
    pub max_results: usize,

    /// Adapters applied to name attributes; the first one normalizes queries
    pub name_adapters: Vec<String>,

    /// Adapters applied to home location attributes
    pub location_adapters: Vec<String>,

    /// JSON reading dictionary for Japanese names
    pub name_dictionary_path: Option<PathBuf>,

    /// JSON reading dictionary for Japanese place names
    pub location_dictionary_path: Option<PathBuf>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            index_path: None,
            writer_heap_size: 50_000_000, // 50MB
            indexing_threads: 1,
            realtime_indexing: true,
            max_results: MAX_QUERY_LIMIT,
            name_adapters: vec![
                UNIDECODE_ADAPTER.to_string(),
                JAPANESE_NAME_ADAPTER.to_string(),
            ],
            location_adapters: vec![
                UNIDECODE_ADAPTER.to_string(),
                JAPANESE_LOCATION_ADAPTER.to_string(),
            ],
            name_dictionary_path: None,
            location_dictionary_path: None,
        }
    }
}

impl SearchConfig {
    /// Check limits the index and the adapter setup depend on
    pub fn validate(&self) -> SearchResult<()> {
        if self.max_results == 0 || self.max_results > MAX_QUERY_LIMIT {
            return Err(SearchError::InvalidConfiguration(format!(
                "max_results must be between 1 and {}, got {}",
                MAX_QUERY_LIMIT, self.max_results
            )));
        }
        if self.indexing_threads == 0 {
            return Err(SearchError::InvalidConfiguration(
                "indexing_threads must be at least 1".to_string(),
            ));
        }
        if self.writer_heap_size / self.indexing_threads < MIN_HEAP_PER_THREAD {
            return Err(SearchError::InvalidConfiguration(format!(
                "writer_heap_size must be at least {} bytes per indexing thread",
                MIN_HEAP_PER_THREAD
            )));
        }
        if self.name_adapters.is_empty() {
            return Err(SearchError::InvalidConfiguration(
                "at least one name adapter is required".to_string(),
            ));
        }
        if self.location_adapters.is_empty() {
            return Err(SearchError::InvalidConfiguration(
                "at least one location adapter is required".to_string(),
            ));
        }
        for (kind, adapters) in [
            ("name_adapters", &self.name_adapters),
            ("location_adapters", &self.location_adapters),
        ] {
            if let Some(name) = first_duplicate(adapters) {
                return Err(SearchError::InvalidConfiguration(format!(
                    "{} lists {} more than once",
                    kind, name
                )));
            }
        }
        Ok(())
    }

    /// Name of the adapter used to normalize query text
    pub fn primary_adapter(&self) -> Option<&str> {
        self.name_adapters.first().map(String::as_str)
    }
}

/// Adapter names double as field name parts, so each may appear once
fn first_duplicate(names: &[String]) -> Option<&str> {
    let mut seen = HashSet::new();
    names
        .iter()
        .find(|name| !seen.insert(name.as_str()))
        .map(String::as_str)
}

/// Builder for SearchConfig
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    pub fn index_path(mut self, path: PathBuf) -> Self {
        self.config.index_path = Some(path);
        self
    }

    pub fn writer_heap_size(mut self, size: usize) -> Self {
        self.config.writer_heap_size = size;
        self
    }

    pub fn indexing_threads(mut self, threads: usize) -> Self {
        self.config.indexing_threads = threads;
        self
    }

    pub fn realtime_indexing(mut self, enabled: bool) -> Self {
        self.config.realtime_indexing = enabled;
        self
    }

    pub fn max_results(mut self, max: usize) -> Self {
        self.config.max_results = max;
        self
    }

    pub fn name_adapters(mut self, adapters: Vec<impl Into<String>>) -> Self {
        self.config.name_adapters = adapters.into_iter().map(Into::into).collect();
        self
    }

    pub fn location_adapters(mut self, adapters: Vec<impl Into<String>>) -> Self {
        self.config.location_adapters = adapters.into_iter().map(Into::into).collect();
        self
    }

    pub fn name_dictionary_path(mut self, path: PathBuf) -> Self {
        self.config.name_dictionary_path = Some(path);
        self
    }

    pub fn location_dictionary_path(mut self, path: PathBuf) -> Self {
        self.config.location_dictionary_path = Some(path);
        self
    }

    pub fn build(self) -> SearchConfig {
        self.config
    }
}

impl Default for SearchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
