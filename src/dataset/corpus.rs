// Corpus: the per-batch collection of news documents.
//
// Documents are kept in insertion order and keyed by case id. Every document
// is bound to the corpus's segmenter. Adding a case id twice replaces the
// earlier document in place (last write wins, first position kept).

use std::sync::Arc;

use indexmap::IndexMap;

use super::document::{NewsDocument, NewsRecord};
use crate::error::{Error, Result};
use crate::tagger::Segmenter;

pub struct Corpus {
    customer_id: String,
    cases: IndexMap<String, NewsDocument>,
    segmenter: Arc<dyn Segmenter>,
}

impl Corpus {
    pub fn new(customer_id: impl Into<String>, segmenter: Arc<dyn Segmenter>) -> Self {
        Self {
            customer_id: customer_id.into(),
            cases: IndexMap::new(),
            segmenter,
        }
    }

    /// Build a corpus from records, using each record's `id` as its case id.
    pub fn from_records(
        customer_id: impl Into<String>,
        segmenter: Arc<dyn Segmenter>,
        records: impl IntoIterator<Item = NewsRecord>,
    ) -> Self {
        let mut corpus = Self::new(customer_id, segmenter);
        for record in records {
            let case_id = record.id.clone();
            corpus.add_case(case_id, record);
        }
        corpus
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    /// Add (or replace) a case.
    pub fn add_case(&mut self, case_id: impl Into<String>, record: NewsRecord) {
        let case_id = case_id.into();
        let document = NewsDocument::new(case_id.clone(), record, Arc::clone(&self.segmenter));
        self.cases.insert(case_id, document);
    }

    pub fn get(&self, case_id: &str) -> Result<&NewsDocument> {
        self.cases
            .get(case_id)
            .ok_or_else(|| Error::NotFound(case_id.to_string()))
    }

    pub fn get_mut(&mut self, case_id: &str) -> Result<&mut NewsDocument> {
        self.cases
            .get_mut(case_id)
            .ok_or_else(|| Error::NotFound(case_id.to_string()))
    }

    pub fn contains(&self, case_id: &str) -> bool {
        self.cases.contains_key(case_id)
    }

    /// Number of unique case ids.
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Cases in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NewsDocument)> {
        self.cases.iter().map(|(id, doc)| (id.as_str(), doc))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut NewsDocument)> {
        self.cases.iter_mut().map(|(id, doc)| (id.as_str(), doc))
    }

    pub fn case_ids(&self) -> impl Iterator<Item = &str> {
        self.cases.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::Token;

    struct Whitespace;

    impl Segmenter for Whitespace {
        fn segment(&self, text: &str, _language: &str) -> Result<Vec<Token>> {
            Ok(text.split_whitespace().map(|w| Token::new(w, "")).collect())
        }
    }

    fn record(id: &str, subject: &str) -> NewsRecord {
        NewsRecord::new(id, subject, "", "en")
    }

    #[test]
    fn test_insertion_order_and_len() {
        let mut corpus = Corpus::new("batch-1", Arc::new(Whitespace));
        corpus.add_case("b", record("b", "second"));
        corpus.add_case("a", record("a", "first"));
        let ids: Vec<&str> = corpus.case_ids().collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.customer_id(), "batch-1");
    }

    #[test]
    fn test_duplicate_overwrites() {
        let mut corpus = Corpus::new("batch", Arc::new(Whitespace));
        corpus.add_case("a", record("a", "old"));
        corpus.add_case("b", record("b", "other"));
        corpus.add_case("a", record("a", "new"));
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.get("a").unwrap().title(), "new");
        assert_eq!(corpus.case_ids().next(), Some("a"));
    }

    #[test]
    fn test_get_unknown_is_not_found() {
        let corpus = Corpus::new("batch", Arc::new(Whitespace));
        assert!(matches!(corpus.get("zzz"), Err(Error::NotFound(id)) if id == "zzz"));
    }

    #[test]
    fn test_documents_share_segmenter() {
        let corpus = Corpus::from_records(
            "batch",
            Arc::new(Whitespace),
            vec![record("a", "one two"), record("b", "three")],
        );
        let tokens = corpus.get("a").unwrap().tokenize_title().unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(corpus.get("b").unwrap().tokenize_title().unwrap()[0].word, "three");
    }
}
