// Embedding trainer: distributed bag-of-words paragraph vectors (PV-DBOW).
//
// Each document vector is trained to predict the words of its document with
// negative sampling. Skip-gram word training is interleaved over the same
// text (window 3), so word vectors and document vectors share one output
// layer. The learning rate decays linearly from `alpha` to `min_alpha` over
// the epochs.
//
// Parallelism: each epoch splits the documents into one chunk per worker.
// A worker owns its chunk of document vectors outright and trains against a
// private copy of the shared word/output weights; the copies' changes are
// summed back into the shared weights when the epoch ends.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info};

use super::model::EmbeddingModel;
use super::vocab::{NegativeSampler, Vocabulary};
use crate::error::{Error, Result};
use crate::features::TrainingExample;

/// Exponent applied to word counts in the negative-sampling distribution.
const NEGATIVE_POWER: f64 = 0.75;
/// Dot products are clamped to this range before the sigmoid.
const MAX_EXP: f32 = 6.0;

/// Training hyperparameters.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerSettings {
    pub vector_size: usize,
    pub epochs: usize,
    /// Maximum skip-gram distance between a word and its context
    pub window: usize,
    /// Noise words drawn per positive example
    pub negative: usize,
    pub min_count: u64,
    pub alpha: f32,
    pub min_alpha: f32,
    /// Worker threads; `None` uses every available core
    pub workers: Option<usize>,
    /// Fixed seed for reproducible runs; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for TrainerSettings {
    fn default() -> Self {
        Self {
            vector_size: 3,
            epochs: 100,
            window: 3,
            negative: 5,
            min_count: 1,
            alpha: 0.025,
            min_alpha: 0.0001,
            workers: None,
            seed: None,
        }
    }
}

impl TrainerSettings {
    pub fn new(vector_size: usize, epochs: usize) -> Self {
        Self {
            vector_size,
            epochs,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.vector_size < 1 {
            return Err(Error::invalid_parameter("vector_size", "must be at least 1"));
        }
        if self.epochs < 1 {
            return Err(Error::invalid_parameter("epochs", "must be at least 1"));
        }
        if self.window < 1 {
            return Err(Error::invalid_parameter("window", "must be at least 1"));
        }
        if !(self.alpha > 0.0) || self.min_alpha < 0.0 || self.min_alpha > self.alpha {
            return Err(Error::invalid_parameter(
                "alpha",
                format!("need 0 <= min_alpha <= alpha, alpha > 0 (got {} / {})", self.min_alpha, self.alpha),
            ));
        }
        Ok(())
    }

    /// Learning rate for `epoch` (0-based).
    pub(crate) fn alpha_at(&self, epoch: usize) -> f32 {
        let progress = epoch as f32 / self.epochs as f32;
        self.alpha - (self.alpha - self.min_alpha) * progress
    }
}

/// Train a model with default settings apart from the vector size and epochs.
pub fn train(examples: &[TrainingExample], vector_size: usize, epochs: usize) -> Result<EmbeddingModel> {
    EmbeddingTrainer::new(TrainerSettings::new(vector_size, epochs)).train(examples)
}

/// Fits [`EmbeddingModel`]s.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingTrainer {
    settings: TrainerSettings,
}

impl EmbeddingTrainer {
    pub fn new(settings: TrainerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &TrainerSettings {
        &self.settings
    }

    /// Fit document and word vectors over `examples`.
    ///
    /// Every example gets a document vector, including examples with no words
    /// (those keep their random initial position).
    pub fn train(&self, examples: &[TrainingExample]) -> Result<EmbeddingModel> {
        let settings = &self.settings;
        settings.validate()?;
        if examples.is_empty() {
            return Err(Error::invalid_parameter("examples", "training set is empty"));
        }

        let dim = settings.vector_size;
        let vocab = Vocabulary::build(examples.iter().map(|e| e.words.as_slice()), settings.min_count);
        let sampler = NegativeSampler::new(&vocab, NEGATIVE_POWER);
        let documents: Vec<Vec<usize>> = examples.iter().map(|e| vocab.encode(&e.words)).collect();

        let workers = settings
            .workers
            .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
            .unwrap_or(1)
            .max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to start training workers: {e}")))?;

        let seed = settings.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = StdRng::seed_from_u64(seed);
        let mut word_vectors = random_matrix(&mut rng, vocab.len(), dim);
        let mut doc_vectors = random_matrix(&mut rng, examples.len(), dim);
        let mut output = vec![0.0f32; vocab.len() * dim];

        info!(
            documents = examples.len(),
            vocabulary = vocab.len(),
            vector_size = dim,
            epochs = settings.epochs,
            workers,
            "Training document embeddings"
        );

        let docs_per_chunk = examples.len().div_ceil(workers).max(1);
        for epoch in 0..settings.epochs {
            let alpha = settings.alpha_at(epoch);
            let words_snapshot = &word_vectors;
            let output_snapshot = &output;

            let updates: Vec<(Vec<f32>, Vec<f32>)> = pool.install(|| {
                doc_vectors
                    .par_chunks_mut(docs_per_chunk * dim)
                    .zip(documents.par_chunks(docs_per_chunk))
                    .enumerate()
                    .map(|(chunk, (doc_rows, docs))| {
                        let mut rng = StdRng::seed_from_u64(mix_seed(seed, epoch, chunk));
                        let mut words = words_snapshot.clone();
                        let mut out = output_snapshot.clone();
                        let mut step = Step {
                            alpha,
                            negative: settings.negative,
                            sampler: &sampler,
                            rng: &mut rng,
                        };
                        for (doc_vec, doc) in doc_rows.chunks_mut(dim).zip(docs) {
                            train_document(doc_vec, doc, &mut words, &mut out, settings.window, dim, &mut step);
                        }
                        (words, out)
                    })
                    .collect()
            });

            apply_updates(&mut word_vectors, &mut output, updates);
            debug!(epoch, alpha, "Epoch complete");
        }

        Ok(EmbeddingModel::new(
            settings.clone(),
            vocab,
            sampler,
            word_vectors,
            output,
            doc_vectors,
            examples.iter().map(|e| e.label().to_string()).collect(),
        ))
    }
}

/// Merge each worker's weights into the shared weights by summing their
/// differences from the snapshot the epoch started with.
fn apply_updates(words: &mut [f32], output: &mut [f32], updates: Vec<(Vec<f32>, Vec<f32>)>) {
    let words_before = words.to_vec();
    let output_before = output.to_vec();
    for (local_words, local_output) in updates {
        for (shared, (local, before)) in words.iter_mut().zip(local_words.iter().zip(&words_before)) {
            *shared += local - before;
        }
        for (shared, (local, before)) in output.iter_mut().zip(local_output.iter().zip(&output_before)) {
            *shared += local - before;
        }
    }
}

/// One document's updates: the document vector predicts each of its words,
/// then each word's context vectors predict it (skip-gram).
fn train_document(
    doc_vec: &mut [f32],
    doc: &[usize],
    words: &mut [f32],
    output: &mut [f32],
    window: usize,
    dim: usize,
    step: &mut Step<'_>,
) {
    for &target in doc {
        step.train_pair(doc_vec, target, OutputLayer::Learn(&mut *output), dim);
    }

    for (pos, &target) in doc.iter().enumerate() {
        let reduced = window - step.rng.random_range(0..window);
        let start = pos.saturating_sub(reduced);
        let end = (pos + reduced + 1).min(doc.len());
        for (ctx_pos, &context) in doc.iter().enumerate().take(end).skip(start) {
            if ctx_pos == pos {
                continue;
            }
            let input = &mut words[context * dim..(context + 1) * dim];
            step.train_pair(input, target, OutputLayer::Learn(&mut *output), dim);
        }
    }
}

/// Output weights for one update: trainable, or frozen during inference.
pub(crate) enum OutputLayer<'a> {
    Learn(&'a mut [f32]),
    Frozen(&'a [f32]),
}

impl OutputLayer<'_> {
    fn row(&self, index: usize, dim: usize) -> &[f32] {
        match self {
            OutputLayer::Learn(w) => &w[index * dim..(index + 1) * dim],
            OutputLayer::Frozen(w) => &w[index * dim..(index + 1) * dim],
        }
    }
}

/// Shared state for a run of negative-sampling updates.
pub(crate) struct Step<'a> {
    pub alpha: f32,
    pub negative: usize,
    pub sampler: &'a NegativeSampler,
    pub rng: &'a mut StdRng,
}

impl Step<'_> {
    /// One negative-sampling update: `input` learns to score `target` high
    /// and `negative` sampled noise words low.
    pub(crate) fn train_pair(&mut self, input: &mut [f32], target: usize, mut output: OutputLayer<'_>, dim: usize) {
        let mut input_grad = vec![0.0f32; dim];
        for d in 0..=self.negative {
            let (word, label) = if d == 0 {
                (target, 1.0)
            } else {
                match self.sampler.sample(&mut *self.rng) {
                    Some(w) if w != target => (w, 0.0),
                    _ => continue,
                }
            };

            let row = output.row(word, dim);
            let f = dot(input, row).clamp(-MAX_EXP, MAX_EXP);
            let g = (label - sigmoid(f)) * self.alpha;
            axpy(&mut input_grad, g, row);
            if let OutputLayer::Learn(w) = &mut output {
                axpy(&mut w[word * dim..(word + 1) * dim], g, input);
            }
        }
        axpy(input, 1.0, &input_grad);
    }
}

/// Initial vectors drawn uniformly from (-0.5/dim, 0.5/dim).
pub(crate) fn random_matrix(rng: &mut StdRng, rows: usize, dim: usize) -> Vec<f32> {
    (0..rows * dim)
        .map(|_| (rng.random::<f32>() - 0.5) / dim as f32)
        .collect()
}

fn mix_seed(seed: u64, epoch: usize, chunk: usize) -> u64 {
    seed ^ (epoch as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ (chunk as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn axpy(y: &mut [f32], a: f32, x: &[f32]) {
    for (yi, xi) in y.iter_mut().zip(x) {
        *yi += a * xi;
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example(words: &str, label: &str) -> TrainingExample {
        TrainingExample::new(words.split_whitespace().map(String::from).collect(), label)
    }

    #[test]
    fn test_rejects_invalid_sizes() {
        let examples = vec![example("bank fraud", "a:1")];
        assert!(matches!(
            train(&examples, 0, 10),
            Err(Error::InvalidParameter { name: "vector_size", .. })
        ));
        assert!(matches!(
            train(&examples, 3, 0),
            Err(Error::InvalidParameter { name: "epochs", .. })
        ));
        assert!(matches!(
            train(&[], 3, 10),
            Err(Error::InvalidParameter { name: "examples", .. })
        ));
    }

    #[test]
    fn test_alpha_decays_linearly() {
        let settings = TrainerSettings::new(3, 4);
        assert_eq!(settings.alpha_at(0), settings.alpha);
        assert!(settings.alpha_at(3) < settings.alpha_at(2));
        assert!(settings.alpha_at(3) >= settings.min_alpha);
    }

    #[test]
    fn test_trains_one_vector_per_document() {
        let examples = vec![
            example("bank fraud laundering", "a:1"),
            example("", "b:2"),
            example("storm flood", "c:3"),
        ];
        let mut settings = TrainerSettings::new(4, 5);
        settings.workers = Some(2);
        settings.seed = Some(11);
        let model = EmbeddingTrainer::new(settings).train(&examples).unwrap();

        assert_eq!(model.vector_size(), 4);
        assert_eq!(model.vocabulary_len(), 5);
        for label in ["a:1", "b:2", "c:3"] {
            let v = model.document_vector(label).unwrap();
            assert_eq!(v.len(), 4);
            assert!(v.iter().all(|x| x.is_finite()));
        }
    }

    #[test]
    fn test_seeded_training_is_reproducible() {
        let examples = vec![example("bank fraud", "a:1"), example("storm flood", "b:2")];
        let mut settings = TrainerSettings::new(3, 10);
        settings.workers = Some(2);
        settings.seed = Some(5);
        let first = EmbeddingTrainer::new(settings.clone()).train(&examples).unwrap();
        let second = EmbeddingTrainer::new(settings).train(&examples).unwrap();
        assert_eq!(first.document_vector("a:1"), second.document_vector("a:1"));
    }
}
