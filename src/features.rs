// Feature extraction: turn a corpus into labeled training examples.
//
// Each document contributes one example: the distinct words kept by keyword /
// part-of-speech filtering (in first-seen order), labeled with its case id.
// Documents with nothing kept still yield an example with no words, so the
// example list always lines up one-to-one with the corpus.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::dataset::{Corpus, NewsDocument};
use crate::error::Result;
use crate::keywords::library::KeywordLibrary;
use crate::keywords::store::KeywordStore;
use crate::language::Language;

/// Filtered token sequence paired with its single case-id label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub words: Vec<String>,
    pub tags: Vec<String>,
}

impl TrainingExample {
    pub fn new(words: Vec<String>, label: impl Into<String>) -> Self {
        Self {
            words,
            tags: vec![label.into()],
        }
    }

    /// The document label (case id).
    pub fn label(&self) -> &str {
        self.tags.first().map(String::as_str).unwrap_or_default()
    }
}

/// Extract the training example for one document.
pub fn extract_example(
    document: &mut NewsDocument,
    store: &KeywordStore,
    language: Language,
) -> Result<TrainingExample> {
    let counts = document.extract_keywords(store.all_stemmed_values(), language.pos_tags())?;
    let words: Vec<String> = counts.into_keys().collect();
    if words.is_empty() {
        warn!(case_id = document.id(), "Document has no keyword features");
    }
    Ok(TrainingExample::new(words, document.id()))
}

/// Build the training set for a corpus whose documents share one language.
pub fn build_training_set(
    corpus: &mut Corpus,
    store: &KeywordStore,
    language: Language,
) -> Result<Vec<TrainingExample>> {
    let mut examples = Vec::with_capacity(corpus.len());
    for (_, document) in corpus.iter_mut() {
        examples.push(extract_example(document, store, language)?);
    }
    info!(
        documents = examples.len(),
        language = language.code(),
        "Built training set"
    );
    Ok(examples)
}

/// Build the training set using each document's own declared language to pick
/// its keyword dictionary and part-of-speech table.
pub fn build_training_set_by_language(
    corpus: &mut Corpus,
    library: &mut KeywordLibrary,
) -> Result<Vec<TrainingExample>> {
    let mut examples = Vec::with_capacity(corpus.len());
    for (_, document) in corpus.iter_mut() {
        let language = Language::from_code(document.lang())?;
        let store = library.store(language)?;
        examples.push(extract_example(document, store, language)?);
    }
    info!(documents = examples.len(), "Built training set");
    Ok(examples)
}
