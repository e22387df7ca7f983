//! Hepburn romanization of hiragana and katakana

use once_cell::sync::Lazy;
use std::collections::HashMap;

const MONOGRAPHS: &[(char, &str)] = &[
    ('あ', "a"), ('い', "i"), ('う', "u"), ('え', "e"), ('お', "o"),
    ('か', "ka"), ('き', "ki"), ('く', "ku"), ('け', "ke"), ('こ', "ko"),
    ('が', "ga"), ('ぎ', "gi"), ('ぐ', "gu"), ('げ', "ge"), ('ご', "go"),
    ('さ', "sa"), ('し', "shi"), ('す', "su"), ('せ', "se"), ('そ', "so"),
    ('ざ', "za"), ('じ', "ji"), ('ず', "zu"), ('ぜ', "ze"), ('ぞ', "zo"),
    ('た', "ta"), ('ち', "chi"), ('つ', "tsu"), ('て', "te"), ('と', "to"),
    ('だ', "da"), ('ぢ', "ji"), ('づ', "zu"), ('で', "de"), ('ど', "do"),
    ('な', "na"), ('に', "ni"), ('ぬ', "nu"), ('ね', "ne"), ('の', "no"),
    ('は', "ha"), ('ひ', "hi"), ('ふ', "fu"), ('へ', "he"), ('ほ', "ho"),
    ('ば', "ba"), ('び', "bi"), ('ぶ', "bu"), ('べ', "be"), ('ぼ', "bo"),
    ('ぱ', "pa"), ('ぴ', "pi"), ('ぷ', "pu"), ('ぺ', "pe"), ('ぽ', "po"),
    ('ま', "ma"), ('み', "mi"), ('む', "mu"), ('め', "me"), ('も', "mo"),
    ('や', "ya"), ('ゆ', "yu"), ('よ', "yo"),
    ('ら', "ra"), ('り', "ri"), ('る', "ru"), ('れ', "re"), ('ろ', "ro"),
    ('わ', "wa"), ('ゐ', "i"), ('ゑ', "e"), ('を', "o"), ('ん', "n"),
    ('ぁ', "a"), ('ぃ', "i"), ('ぅ', "u"), ('ぇ', "e"), ('ぉ', "o"),
    ('ゃ', "ya"), ('ゅ', "yu"), ('ょ', "yo"), ('ゔ', "vu"),
];

/// i-row kana that combine with a following small ya/yu/yo
const DIGRAPH_BASES: &[(char, &str)] = &[
    ('き', "ky"), ('ぎ', "gy"), ('し', "sh"), ('じ', "j"), ('ち', "ch"), ('ぢ', "j"),
    ('に', "ny"), ('ひ', "hy"), ('び', "by"), ('ぴ', "py"), ('み', "my"), ('り', "ry"),
];

const SMALL_Y: &[(char, &str)] = &[('ゃ', "a"), ('ゅ', "u"), ('ょ', "o")];

const SOKUON: char = 'っ';
const CHOONPU: char = 'ー';
const NAKAGURO: char = '・';

static SYLLABLES: Lazy<HashMap<String, String>> = Lazy::new(|| {
    let mut table = HashMap::new();
    for (kana, romaji) in MONOGRAPHS {
        table.insert(kana.to_string(), romaji.to_string());
    }
    for (base, onset) in DIGRAPH_BASES {
        for (small, vowel) in SMALL_Y {
            table.insert(format!("{}{}", base, small), format!("{}{}", onset, vowel));
        }
    }
    table
});

fn katakana_to_hiragana(c: char) -> char {
    match c {
        'ァ'..='ヶ' => char::from_u32(c as u32 - 0x60).unwrap_or(c),
        _ => c,
    }
}

fn lookup(chars: &[char]) -> Option<(&'static str, usize)> {
    if chars.len() >= 2 {
        let pair: String = chars[..2].iter().collect();
        if let Some(romaji) = SYLLABLES.get(&pair) {
            return Some((romaji.as_str(), 2));
        }
    }
    let single = chars.first()?.to_string();
    SYLLABLES.get(&single).map(|romaji| (romaji.as_str(), 1))
}

/// Romanize text written purely in kana.
///
/// Returns `None` when the text is empty or contains anything other than
/// kana, the prolonged sound mark, the middle dot, or whitespace. Long vowels
/// are not marked.
pub fn kana_to_romaji(text: &str) -> Option<String> {
    let chars: Vec<char> = text.chars().map(katakana_to_hiragana).collect();
    let mut out = String::with_capacity(chars.len() * 2);
    let mut geminate = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == SOKUON {
            geminate = true;
            i += 1;
            continue;
        }
        if c == CHOONPU {
            i += 1;
            continue;
        }
        if c.is_whitespace() || c == NAKAGURO {
            out.push(' ');
            geminate = false;
            i += 1;
            continue;
        }

        let (romaji, consumed) = lookup(&chars[i..])?;
        if geminate {
            if romaji.starts_with("ch") {
                out.push('t');
            } else if let Some(first) = romaji.chars().next() {
                if !"aiueon".contains(first) {
                    out.push(first);
                }
            }
            geminate = false;
        }
        out.push_str(romaji);
        i += consumed;
    }

    let romanized = out.split_whitespace().collect::<Vec<_>>().join(" ");
    if romanized.is_empty() {
        None
    } else {
        Some(romanized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hiragana() {
        assert_eq!(kana_to_romaji("やまだ").as_deref(), Some("yamada"));
        assert_eq!(kana_to_romaji("たろう").as_deref(), Some("tarou"));
    }

    #[test]
    fn test_katakana() {
        assert_eq!(kana_to_romaji("ヤマダ タロウ").as_deref(), Some("yamada tarou"));
        assert_eq!(kana_to_romaji("スズキ・イチロー").as_deref(), Some("suzuki ichiro"));
    }

    #[test]
    fn test_digraphs_and_sokuon() {
        assert_eq!(kana_to_romaji("きょうと").as_deref(), Some("kyouto"));
        assert_eq!(kana_to_romaji("しゅん").as_deref(), Some("shun"));
        assert_eq!(kana_to_romaji("ほっかいどう").as_deref(), Some("hokkaidou"));
        assert_eq!(kana_to_romaji("まっちゃ").as_deref(), Some("matcha"));
    }

    #[test]
    fn test_rejects_non_kana() {
        assert_eq!(kana_to_romaji("山田"), None);
        assert_eq!(kana_to_romaji("yamada"), None);
        assert_eq!(kana_to_romaji("やま田"), None);
    }

    #[test]
    fn test_empty() {
        assert_eq!(kana_to_romaji(""), None);
        assert_eq!(kana_to_romaji(" ・ "), None);
    }
}
