// Supported document languages and their part-of-speech selections.
//
// The declared `lang` field on a record is authoritative: it picks the
// tokenizer behaviour, the POS tags kept as features, and the keyword
// dictionary. It is never re-derived from tokenizer output.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Language codes understood by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Traditional Chinese (CKIP tag set)
    ZhTw,
    /// Simplified Chinese (ICTCLAS-style tag set)
    ZhCn,
    /// English (Penn Treebank tag set)
    En,
}

/// Traditional Chinese: Nb (proper noun), Nc (place noun), Nd (time noun).
const ZHTW_POS: &[&str] = &["Nb", "Nc", "Nd"];
/// English: singular proper noun.
const EN_POS: &[&str] = &["NNP"];
/// Simplified Chinese: person, place, organization, work title, other proper noun.
const ZHCN_POS: &[&str] = &["nr", "ns", "nt", "nw", "nz"];

impl Language {
    pub const ALL: [Language; 3] = [Language::ZhTw, Language::ZhCn, Language::En];

    /// Parse a language code such as `zhtw`. Unknown codes are an error.
    pub fn from_code(code: &str) -> Result<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "zhtw" => Ok(Language::ZhTw),
            "zhcn" => Ok(Language::ZhCn),
            "en" => Ok(Language::En),
            _ => Err(Error::UnsupportedLanguage(code.to_string())),
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::ZhTw => "zhtw",
            Language::ZhCn => "zhcn",
            Language::En => "en",
        }
    }

    /// Part-of-speech tags whose tokens are kept as features regardless of
    /// keyword membership.
    pub fn pos_tags(self) -> &'static [&'static str] {
        match self {
            Language::ZhTw => ZHTW_POS,
            Language::ZhCn => ZHCN_POS,
            Language::En => EN_POS,
        }
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Language::from_code(s)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for lang in Language::ALL {
            assert_eq!(Language::from_code(lang.code()).unwrap(), lang);
        }
    }

    #[test]
    fn test_code_is_case_insensitive() {
        assert_eq!(Language::from_code("ZhTw").unwrap(), Language::ZhTw);
    }

    #[test]
    fn test_unknown_code_is_unsupported() {
        let err = Language::from_code("fr").unwrap_err();
        assert_eq!(err.to_string(), "unsupported language: fr");
        assert!(matches!(err, Error::UnsupportedLanguage(code) if code == "fr"));
    }

    #[test]
    fn test_pos_tables() {
        assert_eq!(Language::En.pos_tags(), &["NNP"]);
        assert!(Language::ZhTw.pos_tags().contains(&"Nc"));
        assert_eq!(Language::ZhCn.pos_tags().len(), 5);
    }
}
