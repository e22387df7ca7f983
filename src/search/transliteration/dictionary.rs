use crate::search::error::{SearchError, SearchResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Spelling to romanized readings, most common reading first.
///
/// Serialized as a plain JSON object: `{"山田": ["yamada"], "東": ["higashi", "azuma"]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadingDictionary {
    entries: HashMap<String, Vec<String>>,
}

impl ReadingDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> SearchResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            SearchError::InvalidConfiguration(format!("Malformed reading dictionary: {}", e))
        })
    }

    /// Load a dictionary from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> SearchResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let dictionary = Self::from_json_str(&json)?;
        tracing::info!(
            path = %path.display(),
            entries = dictionary.len(),
            "Loaded reading dictionary"
        );
        Ok(dictionary)
    }

    /// Add readings for a spelling, after any readings it already has
    pub fn insert(&mut self, spelling: impl Into<String>, readings: Vec<impl Into<String>>) {
        let entry = self.entries.entry(spelling.into()).or_default();
        for reading in readings {
            let reading = reading.into();
            if !reading.is_empty() && !entry.contains(&reading) {
                entry.push(reading);
            }
        }
    }

    pub fn with_entry(mut self, spelling: impl Into<String>, readings: Vec<impl Into<String>>) -> Self {
        self.insert(spelling, readings);
        self
    }

    pub fn readings(&self, spelling: &str) -> Option<&[String]> {
        self.entries
            .get(spelling)
            .filter(|readings| !readings.is_empty())
            .map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_insert_dedups_and_keeps_order() {
        let mut dictionary = ReadingDictionary::new();
        dictionary.insert("東", vec!["higashi", "azuma"]);
        dictionary.insert("東", vec!["azuma", "", "tou"]);

        assert_eq!(
            dictionary.readings("東").unwrap(),
            &["higashi".to_string(), "azuma".to_string(), "tou".to_string()]
        );
        assert!(dictionary.readings("西").is_none());
    }

    #[test]
    fn test_from_json() {
        let dictionary =
            ReadingDictionary::from_json_str(r#"{"山田": ["yamada"], "空": []}"#).unwrap();
        assert_eq!(dictionary.len(), 2);
        assert_eq!(dictionary.readings("山田").unwrap(), &["yamada".to_string()]);
        assert!(dictionary.readings("空").is_none());

        let err = ReadingDictionary::from_json_str("[1, 2]").unwrap_err();
        assert!(matches!(err, SearchError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"太郎": ["taro", "tarou"]}}"#).unwrap();

        let dictionary = ReadingDictionary::from_json_file(file.path()).unwrap();
        assert_eq!(dictionary.readings("太郎").unwrap().len(), 2);
    }
}
