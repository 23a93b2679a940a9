// Word segmentation and part-of-speech tagging.
//
// The pipeline only needs the `Segmenter` contract: given text and a language
// code, return ordered {word, tag} pairs. `NlpClient` provides it on top of any
// `Tagger`; `LexiconTagger` is the bundled dictionary-driven tagger.

pub mod client;
pub mod lexicon;
pub mod traits;

pub use client::NlpClient;
pub use lexicon::LexiconTagger;
pub use traits::{Entity, Segmenter, Tagger, Token};
