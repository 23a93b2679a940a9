// NLP client: language dispatch over a lazily loaded tagger.
//
// The tagger model is loaded at most once, on the first `ensure_loaded` call,
// and shared read-only afterwards for the lifetime of the client (in practice
// the process). There is no teardown.

use std::path::PathBuf;
use std::sync::OnceLock;

use tracing::info;

use super::lexicon::LexiconTagger;
use super::traits::{Segmenter, Tagger, Token};
use crate::error::{Error, Result};
use crate::language::Language;

type Loader = Box<dyn Fn() -> Result<Box<dyn Tagger>> + Send + Sync>;

/// Segmenter backed by a single tagger model.
pub struct NlpClient {
    languages: Vec<Language>,
    loader: Loader,
    tagger: OnceLock<Box<dyn Tagger>>,
}

impl NlpClient {
    /// A client whose tagger is built by `loader` on first use.
    pub fn new<F>(languages: Vec<Language>, loader: F) -> Self
    where
        F: Fn() -> Result<Box<dyn Tagger>> + Send + Sync + 'static,
    {
        Self {
            languages,
            loader: Box::new(loader),
            tagger: OnceLock::new(),
        }
    }

    /// A client backed by the lexicon tagger loaded from `dict_path`.
    pub fn with_lexicon(languages: Vec<Language>, dict_path: PathBuf) -> Self {
        Self::new(languages, move || {
            let tagger = LexiconTagger::load(&dict_path)?;
            Ok(Box::new(tagger) as Box<dyn Tagger>)
        })
    }

    /// A client around an already constructed tagger.
    pub fn from_tagger(languages: Vec<Language>, tagger: Box<dyn Tagger>) -> Self {
        let client = Self::new(languages, || {
            Err(Error::Configuration("tagger was provided preloaded".to_string()))
        });
        let _ = client.tagger.set(tagger);
        client
    }

    /// Load the tagger if it isn't loaded yet. Safe to call repeatedly.
    pub fn ensure_loaded(&self) -> Result<&dyn Tagger> {
        if let Some(tagger) = self.tagger.get() {
            return Ok(tagger.as_ref());
        }
        info!("Tagger model loading...");
        let loaded = (self.loader)()?;
        // If another thread won the race its tagger is kept and ours dropped.
        let tagger = self.tagger.get_or_init(|| loaded);
        info!("Tagger model loaded");
        Ok(tagger.as_ref())
    }

    pub fn is_loaded(&self) -> bool {
        self.tagger.get().is_some()
    }

    pub fn supports(&self, language: Language) -> bool {
        self.languages.contains(&language)
    }

    fn resolve(&self, code: &str) -> Result<Language> {
        let language = Language::from_code(code)?;
        if !self.supports(language) {
            return Err(Error::UnsupportedLanguage(code.to_string()));
        }
        Ok(language)
    }
}

impl Segmenter for NlpClient {
    fn segment(&self, text: &str, language: &str) -> Result<Vec<Token>> {
        self.resolve(language)?;
        self.ensure_loaded()?.segment(text, true)
    }
}
