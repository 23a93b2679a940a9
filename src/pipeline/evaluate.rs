// Evaluation pipeline: records -> features -> embeddings -> threshold sweep.
//
// 1. Load every record into a corpus bound to the segmenter
// 2. Extract keyword features per document, using the document's own language
// 3. Train paragraph vectors over the features
// 4. Infer one vector per document and cluster at every threshold
//
// Configuration or input problems abort the run. Thresholds whose clustering
// can't be scored are kept in the results with a skipped score.

use std::sync::Arc;

use indexmap::IndexSet;
use tracing::info;

use crate::cluster::{self, ClusterResult};
use crate::config::PipelineSettings;
use crate::dataset::{Corpus, NewsRecord};
use crate::embedding::{EmbeddingModel, EmbeddingTrainer};
use crate::error::Result;
use crate::features::{build_training_set_by_language, TrainingExample};
use crate::keywords::library::KeywordLibrary;
use crate::tagger::Segmenter;

/// Corpus name used for ad-hoc evaluation batches.
const BATCH_ID: &str = "dataset";

/// Everything an evaluation run produced.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub examples: Vec<TrainingExample>,
    pub model: EmbeddingModel,
    /// One result per threshold, in sweep order
    pub results: Vec<ClusterResult>,
}

impl Evaluation {
    /// Case ids in input order (the order of every assignment).
    pub fn labels(&self) -> Vec<&str> {
        self.examples.iter().map(TrainingExample::label).collect()
    }

    /// The best-scoring threshold, if any threshold could be scored.
    pub fn best(&self) -> Option<&ClusterResult> {
        cluster::best(&self.results)
    }

    /// Members of each cluster at the best threshold; empty when nothing scored.
    pub fn best_clusters(&self) -> Result<Vec<(usize, IndexSet<String>)>> {
        match self.best() {
            Some(result) => cluster::materialize_clusters(result, &self.labels()),
            None => Ok(Vec::new()),
        }
    }
}

/// Build one training example per record, in record order.
pub fn preprocessing(
    records: Vec<NewsRecord>,
    segmenter: Arc<dyn Segmenter>,
    library: &mut KeywordLibrary,
) -> Result<Vec<TrainingExample>> {
    let mut corpus = Corpus::from_records(BATCH_ID, segmenter, records);
    build_training_set_by_language(&mut corpus, library)
}

/// Infer a vector for every example, in example order.
pub fn infer_vectors(model: &EmbeddingModel, examples: &[TrainingExample]) -> Vec<Vec<f32>> {
    examples.iter().map(|e| model.infer(&e.words)).collect()
}

/// Run the full pipeline over `records` and sweep every configured threshold.
pub fn evaluate(
    records: Vec<NewsRecord>,
    settings: &PipelineSettings,
    segmenter: Arc<dyn Segmenter>,
    library: &mut KeywordLibrary,
) -> Result<Evaluation> {
    settings.validate()?;

    let examples = preprocessing(records, segmenter, library)?;
    let model = EmbeddingTrainer::new(settings.trainer()).train(&examples)?;
    let vectors = infer_vectors(&model, &examples);
    let results = cluster::sweep(&vectors, &settings.thresholds, settings.branching_factor)?;

    info!(
        documents = examples.len(),
        thresholds = results.len(),
        best_threshold = cluster::best(&results).map(|r| r.threshold),
        "Evaluation complete"
    );

    Ok(Evaluation {
        examples,
        model,
        results,
    })
}
