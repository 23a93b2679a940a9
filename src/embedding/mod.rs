// Document embeddings: paragraph vectors trained over keyword features.

pub mod model;
pub mod trainer;
pub mod vocab;

pub use model::EmbeddingModel;
pub use trainer::{train, EmbeddingTrainer, TrainerSettings};
