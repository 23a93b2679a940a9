// Newscluster: group news articles that report the same event
//
// This is the library root. Each module corresponds to a stage of the
// clustering pipeline: keyword dictionaries and tagging feed document
// features, features train embeddings, embeddings are clustered.

pub mod cluster;
pub mod config;
pub mod dataset;
pub mod embedding;
pub mod error;
pub mod features;
pub mod keywords;
pub mod language;
pub mod output;
pub mod pipeline;
pub mod tagger;

pub use error::{Error, Result};
