// Pipeline drivers that wire the subsystems together.

pub mod evaluate;
pub mod grouping;

pub use evaluate::{evaluate, infer_vectors, preprocessing, Evaluation};
pub use grouping::{group_urls, label_url};
