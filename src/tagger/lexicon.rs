// Dictionary-driven segmenter and tagger.
//
// CJK runs are segmented by forward maximum matching against a user
// dictionary; other scripts split on whitespace and punctuation. Tags come
// from the dictionary when it has one for the word, otherwise from simple
// shape rules (capitalized Latin words are proper nouns).
//
// Dictionary format, one entry per line, UTF-8 (a leading BOM is tolerated):
//
//   word freq [tag]
//
// Blank lines are skipped. The frequency is kept as a tie-break weight.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use super::traits::{Tagger, Token};
use crate::error::{Error, Result};

/// Tag for punctuation and symbols.
pub const PUNCT_TAG: &str = "PUNCT";
/// Tag for capitalized Latin-script words with no dictionary entry.
pub const PROPER_NOUN_TAG: &str = "NNP";
/// Tag for numbers with no dictionary entry.
pub const NUMBER_TAG: &str = "CD";
/// Default tag for everything else.
pub const DEFAULT_TAG: &str = "Na";

#[derive(Debug, Clone, PartialEq)]
pub struct LexiconEntry {
    pub freq: f64,
    pub tag: Option<String>,
}

/// Segmenter/tagger backed by a word list.
#[derive(Debug, Clone, Default)]
pub struct LexiconTagger {
    entries: HashMap<String, LexiconEntry>,
    /// Longest dictionary word, in characters
    max_word_chars: usize,
}

impl LexiconTagger {
    pub fn new(entries: HashMap<String, LexiconEntry>) -> Self {
        let max_word_chars = entries.keys().map(|w| w.chars().count()).max().unwrap_or(0);
        Self {
            entries,
            max_word_chars,
        }
    }

    /// Load a user dictionary file.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| Error::load(path, e))?;
        let text = String::from_utf8(bytes)
            .map_err(|_| Error::load(path, "dictionary file must be utf-8"))?;
        let tagger = Self::from_dictionary_str(&text)
            .map_err(|reason| Error::load(path, reason))?;
        debug!(
            path = %path.display(),
            entries = tagger.entries.len(),
            "Loaded tagger dictionary"
        );
        Ok(tagger)
    }

    /// Parse dictionary text. Returns a description of the first bad line.
    pub fn from_dictionary_str(text: &str) -> std::result::Result<Self, String> {
        let mut entries = HashMap::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim_start_matches('\u{feff}').trim();
            if line.is_empty() {
                continue;
            }
            let mut fields = line.split_whitespace();
            let (Some(word), Some(freq)) = (fields.next(), fields.next()) else {
                return Err(format!("line {}: expected `word freq [tag]`", lineno + 1));
            };
            let freq: f64 = freq
                .parse()
                .map_err(|_| format!("line {}: invalid frequency {freq:?}", lineno + 1))?;
            let tag = fields.next().map(str::to_string);
            entries.insert(word.to_string(), LexiconEntry { freq, tag });
        }
        Ok(Self::new(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, word: &str) -> Option<&LexiconEntry> {
        self.entries.get(word)
    }

    /// Segment a run of CJK characters by forward maximum matching.
    fn segment_cjk(&self, run: &[char], out: &mut Vec<String>) {
        let mut start = 0;
        while start < run.len() {
            let longest = self.max_word_chars.min(run.len() - start).max(1);
            let mut taken = 1;
            for len in (2..=longest).rev() {
                let candidate: String = run[start..start + len].iter().collect();
                if self.entries.contains_key(&candidate) {
                    taken = len;
                    break;
                }
            }
            out.push(run[start..start + taken].iter().collect());
            start += taken;
        }
    }

    fn tag_for(&self, word: &str) -> String {
        if let Some(tag) = self.entries.get(word).and_then(|e| e.tag.as_ref()) {
            return tag.clone();
        }
        let mut chars = word.chars();
        let first = chars.next();
        match first {
            Some(c) if c.is_ascii_digit() => NUMBER_TAG.to_string(),
            Some(c) if c.is_ascii_uppercase() => PROPER_NOUN_TAG.to_string(),
            Some(c) if !c.is_alphanumeric() => PUNCT_TAG.to_string(),
            _ => DEFAULT_TAG.to_string(),
        }
    }
}

impl Tagger for LexiconTagger {
    fn segment(&self, text: &str, with_pos: bool) -> Result<Vec<Token>> {
        let mut words: Vec<String> = Vec::new();
        let mut cjk_run: Vec<char> = Vec::new();
        let mut latin_run = String::new();

        for c in text.chars() {
            if is_cjk(c) {
                flush_latin(&mut latin_run, &mut words);
                cjk_run.push(c);
                continue;
            }
            if !cjk_run.is_empty() {
                self.segment_cjk(&cjk_run, &mut words);
                cjk_run.clear();
            }
            if c.is_alphanumeric() || (matches!(c, '\'' | '-') && !latin_run.is_empty()) {
                latin_run.push(c);
            } else {
                flush_latin(&mut latin_run, &mut words);
                if !c.is_whitespace() {
                    words.push(c.to_string());
                }
            }
        }
        if !cjk_run.is_empty() {
            self.segment_cjk(&cjk_run, &mut words);
        }
        flush_latin(&mut latin_run, &mut words);

        Ok(words
            .into_iter()
            .map(|word| {
                let tag = if with_pos {
                    self.tag_for(&word)
                } else {
                    String::new()
                };
                Token { word, tag }
            })
            .collect())
    }
}

fn flush_latin(run: &mut String, out: &mut Vec<String>) {
    if run.is_empty() {
        return;
    }
    let word = run.trim_end_matches(['\'', '-']);
    if !word.is_empty() {
        out.push(word.to_string());
    }
    run.clear();
}

/// CJK unified ideographs (basic block and extension A) and compatibility ideographs.
fn is_cjk(c: char) -> bool {
    matches!(c, '\u{3400}'..='\u{4dbf}' | '\u{4e00}'..='\u{9fff}' | '\u{f900}'..='\u{faff}')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagger() -> LexiconTagger {
        LexiconTagger::from_dictionary_str(
            "\u{feff}洗錢 100 Na\n\n台北 50 Nc\n台北市 40 Nc\n王宏舜 10 Nb\nbank 5 NN\n",
        )
        .unwrap()
    }

    fn words(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.word.as_str()).collect()
    }

    #[test]
    fn test_reads_every_line() {
        let t = tagger();
        assert_eq!(t.len(), 5);
        assert_eq!(t.entry("bank").unwrap().tag.as_deref(), Some("NN"));
    }

    #[test]
    fn test_forward_maximum_matching() {
        let tokens = tagger().segment("台北市洗錢案", true).unwrap();
        assert_eq!(words(&tokens), vec!["台北市", "洗錢", "案"]);
        assert_eq!(tokens[0].tag, "Nc");
        assert_eq!(tokens[2].tag, DEFAULT_TAG);
    }

    #[test]
    fn test_latin_and_punctuation() {
        let tokens = tagger().segment("Acme bank, fined 20 times!", true).unwrap();
        assert_eq!(
            words(&tokens),
            vec!["Acme", "bank", ",", "fined", "20", "times", "!"]
        );
        assert_eq!(tokens[0].tag, PROPER_NOUN_TAG);
        assert_eq!(tokens[1].tag, "NN");
        assert_eq!(tokens[2].tag, PUNCT_TAG);
        assert_eq!(tokens[4].tag, NUMBER_TAG);
    }

    #[test]
    fn test_mixed_scripts() {
        let tokens = tagger().segment("記者王宏舜報導 HSBC洗錢", true).unwrap();
        let w = words(&tokens);
        assert!(w.contains(&"王宏舜"));
        assert!(w.contains(&"HSBC"));
        assert!(w.contains(&"洗錢"));
    }

    #[test]
    fn test_without_pos_has_empty_tags() {
        let tokens = tagger().segment("台北 bank", false).unwrap();
        assert!(tokens.iter().all(|t| t.tag.is_empty()));
    }

    #[test]
    fn test_ner_is_unsupported() {
        assert!(matches!(
            tagger().ner("台北"),
            Err(Error::Unsupported(_))
        ));
    }

    #[test]
    fn test_bad_line_rejected() {
        assert!(LexiconTagger::from_dictionary_str("lonely\n").is_err());
        assert!(LexiconTagger::from_dictionary_str("word many\n").is_err());
    }
}
