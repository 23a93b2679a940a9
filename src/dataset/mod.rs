// News dataset: input records, lazily tokenized documents, and the per-batch
// corpus that owns them.

pub mod byline;
pub mod corpus;
pub mod document;

pub use corpus::Corpus;
pub use document::{NewsDocument, NewsRecord};
