// Trained embedding model: vocabulary, word vectors, shared output layer, and
// one vector per training document.
//
// Inference never mutates the model. A fresh document vector is trained
// against the frozen output layer, seeded from the words themselves, so the
// same word sequence always infers the same vector.

use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::trainer::{random_matrix, OutputLayer, Step, TrainerSettings};
use super::vocab::{NegativeSampler, Vocabulary};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

#[derive(Debug, Clone)]
pub struct EmbeddingModel {
    settings: TrainerSettings,
    vocab: Vocabulary,
    sampler: NegativeSampler,
    word_vectors: Vec<f32>,
    output: Vec<f32>,
    doc_vectors: Vec<f32>,
    /// Training label -> row in `doc_vectors` (first example wins on duplicates)
    labels: IndexMap<String, usize>,
}

impl EmbeddingModel {
    pub(crate) fn new(
        settings: TrainerSettings,
        vocab: Vocabulary,
        sampler: NegativeSampler,
        word_vectors: Vec<f32>,
        output: Vec<f32>,
        doc_vectors: Vec<f32>,
        labels: Vec<String>,
    ) -> Self {
        let mut label_rows = IndexMap::with_capacity(labels.len());
        for (row, label) in labels.into_iter().enumerate() {
            label_rows.entry(label).or_insert(row);
        }
        Self {
            settings,
            vocab,
            sampler,
            word_vectors,
            output,
            doc_vectors,
            labels: label_rows,
        }
    }

    pub fn vector_size(&self) -> usize {
        self.settings.vector_size
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocab.len()
    }

    pub fn contains_word(&self, word: &str) -> bool {
        self.vocab.contains(word)
    }

    pub fn settings(&self) -> &TrainerSettings {
        &self.settings
    }

    /// Training labels in training order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.keys().map(String::as_str)
    }

    /// The vector learned for a training label.
    pub fn document_vector(&self, label: &str) -> Option<&[f32]> {
        let row = *self.labels.get(label)?;
        let dim = self.vector_size();
        self.doc_vectors.get(row * dim..(row + 1) * dim)
    }

    /// The learned vector for a vocabulary word.
    pub fn word_vector(&self, word: &str) -> Option<&[f32]> {
        let row = self.vocab.index_of(word)?;
        let dim = self.vector_size();
        self.word_vectors.get(row * dim..(row + 1) * dim)
    }

    /// Infer a vector for any word sequence. Unknown words are ignored; a
    /// sequence with no known words returns its seeded starting point.
    pub fn infer(&self, words: &[String]) -> Vec<f32> {
        let dim = self.vector_size();
        let mut rng = StdRng::seed_from_u64(sequence_seed(words));
        let mut vector = random_matrix(&mut rng, 1, dim);
        let targets = self.vocab.encode(words);
        if targets.is_empty() {
            return vector;
        }

        for epoch in 0..self.settings.epochs {
            let mut step = Step {
                alpha: self.settings.alpha_at(epoch),
                negative: self.settings.negative,
                sampler: &self.sampler,
                rng: &mut rng,
            };
            for &target in &targets {
                step.train_pair(&mut vector, target, OutputLayer::Frozen(&self.output), dim);
            }
        }
        vector
    }
}

/// FNV-1a over the words, with a separator so ["ab"] and ["a", "b"] differ.
fn sequence_seed(words: &[String]) -> u64 {
    let mut hash = FNV_OFFSET;
    for word in words {
        for byte in word.bytes().chain(std::iter::once(0x1f)) {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::trainer::{EmbeddingTrainer, TrainerSettings};
    use crate::features::TrainingExample;

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    fn model() -> EmbeddingModel {
        let examples = vec![
            TrainingExample::new(words("bank fraud laundering bank"), "a:1"),
            TrainingExample::new(words("storm flood rescue"), "b:2"),
        ];
        let mut settings = TrainerSettings::new(3, 20);
        settings.seed = Some(3);
        EmbeddingTrainer::new(settings).train(&examples).unwrap()
    }

    #[test]
    fn test_infer_is_deterministic_and_sized() {
        let model = model();
        let a = model.infer(&words("bank fraud"));
        let b = model.infer(&words("bank fraud"));
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
        assert!(a.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_infer_handles_unseen_and_empty_sequences() {
        let model = model();
        assert_eq!(model.infer(&words("never seen")).len(), 3);
        assert_eq!(model.infer(&[]).len(), 3);
        assert!(!model.contains_word("never"));
    }

    #[test]
    fn test_lookup_accessors() {
        let model = model();
        assert_eq!(model.vocabulary_len(), 6);
        assert!(model.contains_word("flood"));
        assert_eq!(model.word_vector("flood").map(<[f32]>::len), Some(3));
        assert_eq!(model.labels().collect::<Vec<_>>(), vec!["a:1", "b:2"]);
        assert!(model.document_vector("missing").is_none());
    }

    #[test]
    fn test_sequence_seed_separates_words() {
        assert_ne!(sequence_seed(&words("ab")), sequence_seed(&words("a b")));
    }
}
