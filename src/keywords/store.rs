// KeywordStore: per-category domain keyword lists.
//
// The backing resource is a JSON object keyed by category code ("0".."4"),
// each value an ordered list of surface-form keywords:
//
//   { "0": ["重大", ...], "1": ["洗錢", "詐欺"], "4": ["開曼群島"] }
//
// Stems are derived once at load time. The store is immutable afterwards.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::stem::stem;
use crate::error::{Error, Result};

/// Fixed, closed set of keyword categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Emphasis,
    Criminal,
    Legal,
    Compliance,
    Geo,
}

impl Category {
    /// All categories in their canonical order.
    pub const ORDERED: [Category; 5] = [
        Category::Emphasis,
        Category::Criminal,
        Category::Legal,
        Category::Compliance,
        Category::Geo,
    ];

    /// The code used as the key in keyword dictionaries.
    pub fn code(self) -> &'static str {
        match self {
            Category::Emphasis => "0",
            Category::Criminal => "1",
            Category::Legal => "2",
            Category::Compliance => "3",
            Category::Geo => "4",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Emphasis => "emphasis",
            Category::Criminal => "criminal",
            Category::Legal => "legal",
            Category::Compliance => "compliance",
            Category::Geo => "geo",
        }
    }

    /// Accepts either the dictionary code (`"1"`) or the name (`"criminal"`).
    pub fn from_code(code: &str) -> Result<Self> {
        let code = code.trim();
        Category::ORDERED
            .into_iter()
            .find(|c| c.code() == code || c.name().eq_ignore_ascii_case(code))
            .ok_or_else(|| Error::InvalidCategory(code.to_string()))
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Category::from_code(s)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Keyword lists per category, plus their stemmed forms.
#[derive(Debug, Clone, Default)]
pub struct KeywordStore {
    keywords: IndexMap<Category, Vec<String>>,
    stemmed: IndexMap<Category, Vec<String>>,
    all_values: IndexSet<String>,
    all_stemmed_values: IndexSet<String>,
}

impl KeywordStore {
    /// Build a store from in-memory category lists. Categories missing from
    /// the map have no keywords.
    pub fn new(keywords: IndexMap<Category, Vec<String>>) -> Self {
        let stemmed: IndexMap<Category, Vec<String>> = keywords
            .iter()
            .map(|(category, words)| (*category, words.iter().map(|w| stem(w)).collect()))
            .collect();

        // Union over every category, in category-then-keyword order.
        let all_values = keywords.values().flatten().cloned().collect();
        let all_stemmed_values = stemmed.values().flatten().cloned().collect();

        Self {
            keywords,
            stemmed,
            all_values,
            all_stemmed_values,
        }
    }

    /// Parse the JSON dictionary format. Keys outside the category set make
    /// the resource malformed.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::parse(json, Path::new("<inline>"))
    }

    /// Load a keyword dictionary from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| Error::load(path, e))?;
        let store = Self::parse(&json, path)?;
        debug!(
            path = %path.display(),
            keywords = store.all_values.len(),
            "Loaded keyword dictionary"
        );
        Ok(store)
    }

    fn parse(json: &str, path: &Path) -> Result<Self> {
        let raw: IndexMap<String, Vec<String>> =
            serde_json::from_str(json).map_err(|e| Error::load(path, e))?;

        let mut keywords = IndexMap::with_capacity(raw.len());
        for (code, words) in raw {
            let category = Category::from_code(&code)
                .map_err(|_| Error::load(path, format!("unknown category key {code:?}")))?;
            keywords.insert(category, words);
        }
        Ok(Self::new(keywords))
    }

    /// Surface-form keywords of one category.
    pub fn values(&self, category: Category) -> &[String] {
        self.keywords.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Stemmed keywords of one category, parallel to [`values`](Self::values).
    pub fn stemmed(&self, category: Category) -> &[String] {
        self.stemmed.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Like [`values`](Self::values), for a category given as a code or name.
    pub fn values_by_code(&self, code: &str) -> Result<&[String]> {
        Ok(self.values(Category::from_code(code)?))
    }

    /// Like [`stemmed`](Self::stemmed), for a category given as a code or name.
    pub fn stemmed_by_code(&self, code: &str) -> Result<&[String]> {
        Ok(self.stemmed(Category::from_code(code)?))
    }

    /// Every keyword across all categories.
    pub fn all_values(&self) -> &IndexSet<String> {
        &self.all_values
    }

    /// Every stemmed keyword across all categories.
    pub fn all_stemmed_values(&self) -> &IndexSet<String> {
        &self.all_stemmed_values
    }

    pub fn emphasis(&self) -> &[String] {
        self.values(Category::Emphasis)
    }

    pub fn criminal(&self) -> &[String] {
        self.values(Category::Criminal)
    }

    pub fn legal(&self) -> &[String] {
        self.values(Category::Legal)
    }

    pub fn compliance(&self) -> &[String] {
        self.values(Category::Compliance)
    }

    pub fn geo(&self) -> &[String] {
        self.values(Category::Geo)
    }
}
