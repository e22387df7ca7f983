use super::dictionary::ReadingDictionary;
use super::kana::kana_to_romaji;
use super::{Romanizer, JAPANESE_LOCATION_ADAPTER, JAPANESE_NAME_ADAPTER};
use crate::search::error::SearchResult;

/// Japanese person names.
///
/// Kanji names have several possible readings, so every dictionary reading is
/// returned. Names missing from the dictionary are romanized only when written
/// in kana.
#[derive(Debug, Clone, Default)]
pub struct JapaneseNameRomanizer {
    dictionary: ReadingDictionary,
}

impl JapaneseNameRomanizer {
    pub fn new(dictionary: ReadingDictionary) -> Self {
        Self { dictionary }
    }
}

impl Romanizer for JapaneseNameRomanizer {
    fn name(&self) -> &str {
        JAPANESE_NAME_ADAPTER
    }

    fn romanize(&self, text: &str) -> SearchResult<Vec<String>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(readings) = self.dictionary.readings(text) {
            return Ok(readings.to_vec());
        }
        Ok(kana_to_romaji(text).into_iter().collect())
    }
}

/// Japanese place names.
///
/// A whole-string dictionary hit returns all its readings. Otherwise each
/// whitespace-separated word is romanized with its first reading (or kana
/// fallback) and the words are re-joined; one unreadable word yields no
/// candidate at all.
#[derive(Debug, Clone, Default)]
pub struct JapaneseLocationRomanizer {
    dictionary: ReadingDictionary,
}

impl JapaneseLocationRomanizer {
    pub fn new(dictionary: ReadingDictionary) -> Self {
        Self { dictionary }
    }

    fn romanize_word(&self, word: &str) -> Option<String> {
        match self.dictionary.readings(word) {
            Some(readings) => readings.first().cloned(),
            None => kana_to_romaji(word),
        }
    }
}

impl Romanizer for JapaneseLocationRomanizer {
    fn name(&self) -> &str {
        JAPANESE_LOCATION_ADAPTER
    }

    fn romanize(&self, text: &str) -> SearchResult<Vec<String>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(readings) = self.dictionary.readings(text) {
            return Ok(readings.to_vec());
        }

        let words: Option<Vec<String>> = text
            .split_whitespace()
            .map(|word| self.romanize_word(word))
            .collect();

        Ok(words.map(|words| words.join(" ")).into_iter().collect())
    }
}
