//! Transliteration adapters
//!
//! Each adapter maps raw text to an ordered list of candidate romanizations.
//! Adapters are pure and identified by a stable name; the name namespaces every
//! index field the adapter's output is stored under, so variants from
//! different adapters are never combined with each other.

mod dictionary;
mod japanese;
mod kana;
mod unidecode;

pub use dictionary::ReadingDictionary;
pub use japanese::{JapaneseLocationRomanizer, JapaneseNameRomanizer};
pub use kana::kana_to_romaji;
pub use unidecode::UnidecodeRomanizer;

use crate::search::error::{SearchError, SearchResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Generic transliteration of any script
pub const UNIDECODE_ADAPTER: &str = "romanize_word_by_unidecode";

/// Japanese person names via reading dictionary
pub const JAPANESE_NAME_ADAPTER: &str = "romanize_japanese_name_by_name_dict";

/// Japanese place names via reading dictionary
pub const JAPANESE_LOCATION_ADAPTER: &str = "romanize_japanese_location";

/// A named, pure romanization function
pub trait Romanizer: Send + Sync {
    /// Stable name, used as the field namespace
    fn name(&self) -> &str;

    /// Romanize `text` into zero or more candidate spellings, most likely first
    fn romanize(&self, text: &str) -> SearchResult<Vec<String>>;
}

impl fmt::Debug for dyn Romanizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Romanizer").field("name", &self.name()).finish()
    }
}

/// Adapter wrapping an arbitrary infallible function
pub struct FnRomanizer<F> {
    name: String,
    func: F,
}

impl<F> FnRomanizer<F>
where
    F: Fn(&str) -> Vec<String> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Romanizer for FnRomanizer<F>
where
    F: Fn(&str) -> Vec<String> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn romanize(&self, text: &str) -> SearchResult<Vec<String>> {
        Ok((self.func)(text))
    }
}

/// Resolves configured adapter names to adapter instances
#[derive(Default, Clone)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn Romanizer>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the three bundled adapters
    pub fn with_defaults(names: ReadingDictionary, locations: ReadingDictionary) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(UnidecodeRomanizer::new()));
        registry.register(Arc::new(JapaneseNameRomanizer::new(names)));
        registry.register(Arc::new(JapaneseLocationRomanizer::new(locations)));
        registry
    }

    /// Register an adapter, replacing any adapter with the same name
    pub fn register(&mut self, adapter: Arc<dyn Romanizer>) {
        self.adapters.insert(adapter.name().to_string(), adapter);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Romanizer>> {
        self.adapters.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.adapters.contains_key(name)
    }

    /// Resolve an ordered list of names, failing on the first unknown one
    pub fn resolve(&self, names: &[String]) -> SearchResult<Vec<Arc<dyn Romanizer>>> {
        names
            .iter()
            .map(|name| {
                self.get(name).ok_or_else(|| {
                    SearchError::InvalidConfiguration(format!("Unknown romanizer: {}", name))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_romanizer() {
        let upper = FnRomanizer::new("upper", |text: &str| vec![text.to_uppercase()]);
        assert_eq!(upper.name(), "upper");
        assert_eq!(upper.romanize("abc").unwrap(), vec!["ABC".to_string()]);
    }

    #[test]
    fn test_registry_defaults() {
        let registry =
            AdapterRegistry::with_defaults(ReadingDictionary::new(), ReadingDictionary::new());
        assert!(registry.contains(UNIDECODE_ADAPTER));
        assert!(registry.contains(JAPANESE_NAME_ADAPTER));
        assert!(registry.contains(JAPANESE_LOCATION_ADAPTER));

        let resolved = registry
            .resolve(&[UNIDECODE_ADAPTER.to_string(), JAPANESE_NAME_ADAPTER.to_string()])
            .unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].name(), UNIDECODE_ADAPTER);
        assert_eq!(resolved[1].name(), JAPANESE_NAME_ADAPTER);
    }

    #[test]
    fn test_registry_unknown_name() {
        let registry = AdapterRegistry::new();
        let err = registry.resolve(&["missing".to_string()]).unwrap_err();
        assert!(matches!(err, SearchError::InvalidConfiguration(_)));
    }
}
