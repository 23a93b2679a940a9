// NewsDocument: one article with lazily computed token sequences.
//
// Title and content are tokenized on first access through the segmenter the
// document was bound to, and cached for the document's lifetime. The cache is
// keyed on nothing: if the record's `lang` field were changed after the first
// access, the cached tokens would still reflect the old language. Records are
// read-only once added to a corpus, so this never happens in the pipeline.

use std::cell::OnceCell;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::byline;
use crate::error::Result;
use crate::tagger::{Segmenter, Token};

/// Metadata key the space-joined extracted keywords are written to.
pub const KEYWORDS_FIELD: &str = "keywords";

/// One input article, as read from the batch input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsRecord {
    /// Unique case id, conventionally `<source>:<url>`
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, alias = "title")]
    pub subject: String,
    /// Declared language code (authoritative)
    #[serde(default)]
    pub lang: String,
    /// Any other columns of the input
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl NewsRecord {
    pub fn new(
        id: impl Into<String>,
        subject: impl Into<String>,
        content: impl Into<String>,
        lang: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            subject: subject.into(),
            lang: lang.into(),
            extra: IndexMap::new(),
        }
    }
}

/// Tokens of one field plus the space-joined segmented text.
#[derive(Debug, Clone)]
struct Segmented {
    text: String,
    tokens: Vec<Token>,
}

/// An article bound to the segmenter of the corpus that owns it.
pub struct NewsDocument {
    case_id: String,
    record: NewsRecord,
    segmenter: Arc<dyn Segmenter>,
    title: OnceCell<Segmented>,
    content: OnceCell<Segmented>,
}

impl fmt::Debug for NewsDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsDocument")
            .field("case_id", &self.case_id)
            .field("record", &self.record)
            .field("title_tokenized", &self.title.get().is_some())
            .field("content_tokenized", &self.content.get().is_some())
            .finish()
    }
}

impl NewsDocument {
    pub fn new(case_id: impl Into<String>, record: NewsRecord, segmenter: Arc<dyn Segmenter>) -> Self {
        Self {
            case_id: case_id.into(),
            record,
            segmenter,
            title: OnceCell::new(),
            content: OnceCell::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.case_id
    }

    pub fn record(&self) -> &NewsRecord {
        &self.record
    }

    /// The declared language code.
    pub fn lang(&self) -> &str {
        &self.record.lang
    }

    pub fn title(&self) -> &str {
        &self.record.subject
    }

    pub fn content(&self) -> &str {
        &self.record.content
    }

    /// A field by name: the fixed columns first, then string metadata.
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "id" => Some(&self.record.id),
            "content" => Some(&self.record.content),
            "subject" | "title" => Some(&self.record.subject),
            "lang" => Some(&self.record.lang),
            _ => self.record.extra.get(key).and_then(Value::as_str),
        }
    }

    /// Raw metadata value by name.
    pub fn metadata(&self, key: &str) -> Option<&Value> {
        self.record.extra.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.record.extra.insert(key.into(), value.into());
    }

    pub fn has(&self, key: &str) -> bool {
        matches!(key, "id" | "content" | "subject" | "lang") || self.record.extra.contains_key(key)
    }

    /// Number of fields on the record (fixed columns plus metadata).
    pub fn field_count(&self) -> usize {
        4 + self.record.extra.len()
    }

    /// Whether the record carries the `top{rank}` flag (top1..top3).
    pub fn has_top(&self, rank: u8) -> bool {
        self.has(&format!("top{rank}"))
    }

    /// Tokenized title, computed on first call.
    pub fn tokenize_title(&self) -> Result<&[Token]> {
        Ok(&self.segmented_title()?.tokens)
    }

    /// Tokenized content, computed on first call.
    pub fn tokenize_content(&self) -> Result<&[Token]> {
        Ok(&self.segmented_content()?.tokens)
    }

    /// Space-joined segmented title.
    pub fn title_seg(&self) -> Result<&str> {
        Ok(&self.segmented_title()?.text)
    }

    /// Space-joined segmented content.
    pub fn content_seg(&self) -> Result<&str> {
        Ok(&self.segmented_content()?.text)
    }

    fn segmented_title(&self) -> Result<&Segmented> {
        cached(&self.title, || self.segment(&self.record.subject))
    }

    fn segmented_content(&self) -> Result<&Segmented> {
        cached(&self.content, || self.segment(&self.record.content))
    }

    fn segment(&self, text: &str) -> Result<Segmented> {
        let text = text.replace('\n', " ");
        let tokens = self.segmenter.segment(&text, &self.record.lang)?;
        let joined = tokens
            .iter()
            .map(|t| t.word.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Ok(Segmented {
            text: joined,
            tokens,
        })
    }

    /// Count tokens worth keeping as features.
    ///
    /// Title tokens are scanned before content tokens. A token is kept when it
    /// is at least two characters long and either its surface form is in
    /// `stems` or its tag is in `pos`. The kept words (in first-seen order) are
    /// also written space-joined to the `keywords` metadata field.
    pub fn extract_keywords(
        &mut self,
        stems: &IndexSet<String>,
        pos: &[&str],
    ) -> Result<IndexMap<String, usize>> {
        let mut counts: IndexMap<String, usize> = IndexMap::new();
        for tokens in [self.tokenize_title()?, self.tokenize_content()?] {
            for token in tokens {
                if token.word.chars().count() < 2 {
                    continue;
                }
                if !stems.contains(&token.word) && !pos.contains(&token.tag.as_str()) {
                    continue;
                }
                *counts.entry(token.word.clone()).or_insert(0) += 1;
            }
        }

        debug!(case_id = %self.case_id, kept = counts.len(), "Extracted keywords");

        let joined = counts.keys().map(String::as_str).collect::<Vec<_>>().join(" ");
        self.set(KEYWORDS_FIELD, joined);
        Ok(counts)
    }

    /// Reporter named in the first byline-shaped line of the content.
    pub fn reporter(&self) -> Option<String> {
        self.record.content.lines().find_map(byline::reporter)
    }

    /// First date mentioned in the title or content.
    pub fn publish_date(&self) -> Option<NaiveDate> {
        byline::publish_date(&self.record.subject)
            .or_else(|| byline::publish_date(&self.record.content))
    }
}

/// Fill a cache cell at most once. A failed computation leaves it empty.
fn cached<T>(cell: &OnceCell<T>, compute: impl FnOnce() -> Result<T>) -> Result<&T> {
    if let Some(value) = cell.get() {
        return Ok(value);
    }
    let value = compute()?;
    Ok(cell.get_or_init(|| value))
}
