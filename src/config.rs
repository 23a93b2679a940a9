use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::cluster::birch::DEFAULT_BRANCHING_FACTOR;
use crate::embedding::TrainerSettings;
use crate::error::{Error, Result};
use crate::keywords::library::KeywordLibrary;
use crate::language::Language;
use crate::tagger::NlpClient;

/// Threshold used by one-shot URL grouping when none is configured.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Thresholds tried by an evaluation sweep when none are configured.
pub const DEFAULT_THRESHOLDS: [f64; 7] = [0.3, 0.5, 0.7, 0.9, 1.1, 1.3, 1.5];

/// Knobs for one evaluation run: embedding size and training length, the
/// BIRCH branching factor, and the thresholds to sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub vector_size: usize,
    pub epochs: usize,
    pub branching_factor: usize,
    /// Threshold for single-run grouping (`group_urls`)
    pub default_threshold: f64,
    pub thresholds: Vec<f64>,
    /// Training seed; unset means a fresh random seed per run
    pub seed: Option<u64>,
    /// Training threads; unset means one per available core
    pub workers: Option<usize>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            vector_size: 3,
            epochs: 100,
            branching_factor: DEFAULT_BRANCHING_FACTOR,
            default_threshold: DEFAULT_THRESHOLD,
            thresholds: DEFAULT_THRESHOLDS.to_vec(),
            seed: None,
            workers: None,
        }
    }
}

impl PipelineSettings {
    /// Reject non-positive sizes, branching factors, and thresholds.
    pub fn validate(&self) -> Result<()> {
        if self.vector_size < 1 {
            return Err(Error::invalid_parameter("vector_size", "must be at least 1"));
        }
        if self.epochs < 1 {
            return Err(Error::invalid_parameter("epochs", "must be at least 1"));
        }
        if self.branching_factor < 2 {
            return Err(Error::invalid_parameter("branching_factor", "must be at least 2"));
        }
        if self.thresholds.is_empty() {
            return Err(Error::invalid_parameter("thresholds", "need at least one threshold"));
        }
        let positive = |t: f64| t > 0.0 && t.is_finite();
        if let Some(bad) = self.thresholds.iter().copied().find(|&t| !positive(t)) {
            return Err(Error::invalid_parameter("threshold", format!("must be positive, got {bad}")));
        }
        if !positive(self.default_threshold) {
            return Err(Error::invalid_parameter(
                "default_threshold",
                format!("must be positive, got {}", self.default_threshold),
            ));
        }
        Ok(())
    }

    /// Embedding trainer settings for this run.
    pub fn trainer(&self) -> TrainerSettings {
        TrainerSettings {
            seed: self.seed,
            workers: self.workers,
            ..TrainerSettings::new(self.vector_size, self.epochs)
        }
    }
}

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Every value
/// has a default; CLI flags override what is loaded here.
#[derive(Debug, Clone)]
pub struct Config {
    /// Keyword dictionary per language
    pub keyword_paths: IndexMap<Language, PathBuf>,
    /// Tagger user dictionary (`word freq [tag]` per line)
    pub tagger_dict: PathBuf,
    /// Languages the tagger accepts
    pub languages: Vec<Language>,
    pub settings: PipelineSettings,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup` (an environment stand-in).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut keyword_paths = IndexMap::new();
        keyword_paths.insert(
            Language::ZhTw,
            lookup("NEWSCLUSTER_KEYWORDS")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("assets/keyword.json")),
        );
        for (language, var) in [
            (Language::ZhCn, "NEWSCLUSTER_KEYWORDS_ZHCN"),
            (Language::En, "NEWSCLUSTER_KEYWORDS_EN"),
        ] {
            if let Some(path) = lookup(var) {
                keyword_paths.insert(language, PathBuf::from(path));
            }
        }

        let languages = match lookup("NEWSCLUSTER_LANGUAGES") {
            Some(raw) => parse_list(&raw, "NEWSCLUSTER_LANGUAGES", |s| Language::from_code(s))?,
            None => vec![Language::ZhTw],
        };

        let defaults = PipelineSettings::default();
        let thresholds = match lookup("NEWSCLUSTER_THRESHOLDS") {
            Some(raw) => parse_list(&raw, "NEWSCLUSTER_THRESHOLDS", |s| s.parse::<f64>())?,
            None => defaults.thresholds.clone(),
        };

        let settings = PipelineSettings {
            vector_size: parse_var(&lookup, "NEWSCLUSTER_VECTOR_SIZE")?.unwrap_or(defaults.vector_size),
            epochs: parse_var(&lookup, "NEWSCLUSTER_EPOCHS")?.unwrap_or(defaults.epochs),
            branching_factor: parse_var(&lookup, "DEFAULT_BRANCHING_FACTOR")?
                .unwrap_or(defaults.branching_factor),
            default_threshold: parse_var(&lookup, "DEFAULT_THRESHOLD")?
                .unwrap_or(defaults.default_threshold),
            thresholds,
            seed: parse_var(&lookup, "NEWSCLUSTER_SEED")?,
            workers: parse_var(&lookup, "NEWSCLUSTER_WORKERS")?,
        };

        Ok(Self {
            keyword_paths,
            tagger_dict: lookup("NEWSCLUSTER_TAGGER_DICT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("assets/tagger_dict.txt")),
            languages,
            settings,
        })
    }

    /// Check every setting before a run.
    pub fn validate(&self) -> Result<()> {
        if self.languages.is_empty() {
            return Err(Error::Configuration("NEWSCLUSTER_LANGUAGES is empty".to_string()));
        }
        self.settings.validate()
    }

    /// Keyword dictionaries, loaded lazily per language.
    pub fn keyword_library(&self) -> KeywordLibrary {
        KeywordLibrary::new(self.keyword_paths.clone())
    }

    /// Tagger client over the configured dictionary (loaded on first use).
    pub fn nlp_client(&self) -> NlpClient {
        NlpClient::with_lexicon(self.languages.clone(), self.tagger_dict.clone())
    }
}

fn parse_var<F, T>(lookup: &F, name: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| Error::Configuration(format!("{name}={raw:?}: {e}")))
        })
        .transpose()
}

fn parse_list<T, E, P>(raw: &str, name: &str, parse: P) -> Result<Vec<T>>
where
    E: Display,
    P: Fn(&str) -> std::result::Result<T, E>,
{
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse(s).map_err(|e| Error::Configuration(format!("{name}: {s:?}: {e}"))))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = config(&[]).unwrap();
        assert_eq!(c.settings, PipelineSettings::default());
        assert_eq!(c.settings.branching_factor, 50);
        assert_eq!(c.settings.default_threshold, 0.5);
        assert_eq!(c.keyword_paths[&Language::ZhTw], PathBuf::from("assets/keyword.json"));
        assert_eq!(c.languages, vec![Language::ZhTw]);
        assert!(c.validate().is_ok());

        let client = c.nlp_client();
        assert!(client.supports(Language::ZhTw));
        assert!(!client.supports(Language::En));
        assert!(!client.supports(Language::ZhCn));
    }

    #[test]
    fn test_overrides() {
        let c = config(&[
            ("DEFAULT_BRANCHING_FACTOR", "20"),
            ("NEWSCLUSTER_THRESHOLDS", "0.2, 0.4"),
            ("NEWSCLUSTER_LANGUAGES", "zhtw,en"),
            ("NEWSCLUSTER_KEYWORDS_EN", "kw_en.json"),
            ("NEWSCLUSTER_SEED", "42"),
        ])
        .unwrap();
        assert_eq!(c.settings.branching_factor, 20);
        assert_eq!(c.settings.thresholds, vec![0.2, 0.4]);
        assert_eq!(c.languages, vec![Language::ZhTw, Language::En]);
        assert_eq!(c.keyword_paths.len(), 2);
        assert_eq!(c.settings.trainer().seed, Some(42));
    }

    #[test]
    fn test_unparseable_values() {
        assert!(matches!(
            config(&[("NEWSCLUSTER_EPOCHS", "many")]),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            config(&[("NEWSCLUSTER_THRESHOLDS", "0.3,abc")]),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            config(&[("NEWSCLUSTER_LANGUAGES", "fr")]),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_validate_rejects_non_positive() {
        let c = config(&[("NEWSCLUSTER_VECTOR_SIZE", "0")]).unwrap();
        assert!(matches!(
            c.validate(),
            Err(Error::InvalidParameter { name: "vector_size", .. })
        ));
        let c = config(&[("NEWSCLUSTER_THRESHOLDS", "0.5,-0.1")]).unwrap();
        assert!(matches!(
            c.validate(),
            Err(Error::InvalidParameter { name: "threshold", .. })
        ));
    }
}
