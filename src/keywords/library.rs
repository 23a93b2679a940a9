// Keyword dictionaries per language, loaded on first use.
//
// Each supported language may have its own dictionary file. A language with
// no configured source is unsupported for feature extraction.

use std::path::PathBuf;

use indexmap::IndexMap;
use tracing::info;

use super::store::KeywordStore;
use crate::error::{Error, Result};
use crate::language::Language;

/// Lazily loaded keyword stores keyed by language.
#[derive(Debug, Default)]
pub struct KeywordLibrary {
    sources: IndexMap<Language, PathBuf>,
    loaded: IndexMap<Language, KeywordStore>,
}

impl KeywordLibrary {
    /// A library that loads each language's dictionary from the given path.
    pub fn new(sources: IndexMap<Language, PathBuf>) -> Self {
        Self {
            sources,
            loaded: IndexMap::new(),
        }
    }

    /// A library with stores already in memory (tests, embedded dictionaries).
    pub fn from_stores(stores: impl IntoIterator<Item = (Language, KeywordStore)>) -> Self {
        Self {
            sources: IndexMap::new(),
            loaded: stores.into_iter().collect(),
        }
    }

    /// The store for `language`, loading it on first request.
    pub fn store(&mut self, language: Language) -> Result<&KeywordStore> {
        if !self.loaded.contains_key(&language) {
            let path = self
                .sources
                .get(&language)
                .ok_or_else(|| Error::UnsupportedLanguage(language.code().to_string()))?;
            let store = KeywordStore::load(path)?;
            info!(
                language = language.code(),
                keywords = store.all_values().len(),
                "Keyword dictionary loaded"
            );
            self.loaded.insert(language, store);
        }

        self.loaded
            .get(&language)
            .ok_or_else(|| Error::UnsupportedLanguage(language.code().to_string()))
    }

    /// Languages with a configured or preloaded dictionary.
    pub fn languages(&self) -> Vec<Language> {
        let mut languages: Vec<Language> = self.loaded.keys().copied().collect();
        for lang in self.sources.keys() {
            if !languages.contains(lang) {
                languages.push(*lang);
            }
        }
        languages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preloaded_store() {
        let store = KeywordStore::from_json_str(r#"{"1": ["fraud"]}"#).unwrap();
        let mut library = KeywordLibrary::from_stores([(Language::En, store)]);
        assert_eq!(library.store(Language::En).unwrap().criminal().len(), 1);
        assert_eq!(library.languages(), vec![Language::En]);
    }

    #[test]
    fn test_unconfigured_language_is_unsupported() {
        let mut library = KeywordLibrary::default();
        let err = library.store(Language::ZhCn).unwrap_err();
        assert!(matches!(err, Error::UnsupportedLanguage(code) if code == "zhcn"));
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let mut sources = IndexMap::new();
        sources.insert(Language::ZhTw, PathBuf::from("/nonexistent/keyword.json"));
        let mut library = KeywordLibrary::new(sources);
        assert!(matches!(
            library.store(Language::ZhTw),
            Err(Error::LoadError { .. })
        ));
    }
}
