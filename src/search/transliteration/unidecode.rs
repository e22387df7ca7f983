use super::{Romanizer, UNIDECODE_ADAPTER};
use crate::search::error::SearchResult;

/// Script-agnostic transliteration to ASCII.
///
/// Produces at most one candidate. Han characters are read as Mandarin, so
/// Japanese names also need [`super::JapaneseNameRomanizer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UnidecodeRomanizer;

impl UnidecodeRomanizer {
    pub fn new() -> Self {
        Self
    }
}

impl Romanizer for UnidecodeRomanizer {
    fn name(&self) -> &str {
        UNIDECODE_ADAPTER
    }

    fn romanize(&self, text: &str) -> SearchResult<Vec<String>> {
        let ascii = deunicode::deunicode(text);
        let romanized = ascii.split_whitespace().collect::<Vec<_>>().join(" ");
        if romanized.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(vec![romanized])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin_passthrough() {
        let romanizer = UnidecodeRomanizer::new();
        assert_eq!(
            romanizer.romanize("Yamada  Taro").unwrap(),
            vec!["Yamada Taro".to_string()]
        );
    }

    #[test]
    fn test_strips_diacritics() {
        let romanizer = UnidecodeRomanizer::new();
        assert_eq!(romanizer.romanize("José").unwrap(), vec!["Jose".to_string()]);
    }

    #[test]
    fn test_non_latin_is_romanized() {
        let romanizer = UnidecodeRomanizer::new();
        let variants = romanizer.romanize("Москва").unwrap();
        assert_eq!(variants.len(), 1);
        assert!(variants[0].is_ascii());
        assert!(!variants[0].is_empty());
    }

    #[test]
    fn test_empty_input() {
        let romanizer = UnidecodeRomanizer::new();
        assert!(romanizer.romanize("").unwrap().is_empty());
        assert!(romanizer.romanize("   ").unwrap().is_empty());
    }
}
