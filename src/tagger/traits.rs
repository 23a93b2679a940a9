// Tagger and segmenter traits: the swap-ready seams for language tooling.
//
// A `Tagger` is a loaded language model: it segments text into words with
// optional POS tags and may offer named-entity recognition. A `Segmenter` is
// what documents are bound to: it adds language dispatch on top.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One segmented word and its part-of-speech tag (empty when untagged).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub word: String,
    pub tag: String,
}

impl Token {
    pub fn new(word: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            tag: tag.into(),
        }
    }
}

/// A named entity span, in character offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub start: usize,
    pub end: usize,
    /// Entity type, e.g. PERSON or ORG
    pub entity: String,
    /// Surface text of the span
    pub value: String,
}

/// A word segmenter / POS tagger.
pub trait Tagger: Send + Sync {
    /// Segment text into words. Tags are filled only when `with_pos` is set.
    fn segment(&self, text: &str, with_pos: bool) -> Result<Vec<Token>>;

    /// Named-entity recognition. Taggers without it fail explicitly rather
    /// than returning an empty entity list.
    fn ner(&self, _text: &str) -> Result<Vec<Entity>> {
        Err(Error::Unsupported("named-entity recognition"))
    }
}

/// The tokenizer collaborator documents are bound to.
///
/// Must be idempotent for identical (text, language) inputs, and fail with
/// `UnsupportedLanguage` for languages it cannot handle.
pub trait Segmenter: Send + Sync {
    fn segment(&self, text: &str, language: &str) -> Result<Vec<Token>>;
}
