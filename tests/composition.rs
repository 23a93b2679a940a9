// Composition tests: the pipeline stages chained end to end.
//
//   records -> Corpus -> training set -> embeddings -> sweep -> clusters
//
// Uses the lexicon tagger with an inline dictionary and an in-memory keyword
// store, so nothing touches the filesystem. Training is seeded, but the
// assertions only rely on structure: documents with the same keyword
// sequence infer the same vector and must land in the same cluster, and
// documents that only share most of their keywords must usually do so too.

use std::sync::Arc;

use newscluster::cluster::Score;
use newscluster::config::PipelineSettings;
use newscluster::dataset::NewsRecord;
use newscluster::embedding::EmbeddingTrainer;
use newscluster::keywords::library::KeywordLibrary;
use newscluster::keywords::store::KeywordStore;
use newscluster::language::Language;
use newscluster::pipeline::{self, label_url};
use newscluster::tagger::{LexiconTagger, NlpClient, Segmenter};
use newscluster::Error;

const DICTIONARY: &str = "\
洗錢 100 Na
地檢署 60 Nc
台北 80 Nc
今天 50 Nd
金管會 50 Nb
開曼群島 10 Nc
颱風 40 Na
詐欺 30 Na
";

const KEYWORDS: &str = r#"{"1": ["洗錢", "詐欺"], "2": ["地檢署"], "4": ["開曼群島"]}"#;

fn segmenter() -> Arc<dyn Segmenter> {
    let tagger = LexiconTagger::from_dictionary_str(DICTIONARY).unwrap();
    Arc::new(NlpClient::from_tagger(vec![Language::ZhTw], Box::new(tagger)))
}

fn library() -> KeywordLibrary {
    let store = KeywordStore::from_json_str(KEYWORDS).unwrap();
    KeywordLibrary::from_stores([(Language::ZhTw, store)])
}

/// A and B share their keyword sequence; C and D share nothing with them.
fn records() -> Vec<NewsRecord> {
    vec![
        NewsRecord::new("cna:https://cna.example/a", "地檢署偵辦洗錢", "", "zhtw"),
        NewsRecord::new("udn:https://udn.example/b", "地檢署追查洗錢", "", "zhtw"),
        NewsRecord::new("ltn:https://ltn.example/c", "颱風襲擊台北", "今天停班", "zhtw"),
        NewsRecord::new("ett:https://ett.example/d", "金管會調查開曼群島", "", "zhtw"),
    ]
}

/// A and B share two keywords but differ in a third, so their inferred vectors
/// only end up close if training learned the shared words.
fn overlapping_records() -> Vec<NewsRecord> {
    vec![
        NewsRecord::new("cna:https://cna.example/a", "地檢署偵辦洗錢詐欺", "", "zhtw"),
        NewsRecord::new("udn:https://udn.example/b", "地檢署追查洗錢", "", "zhtw"),
        NewsRecord::new("ltn:https://ltn.example/c", "颱風襲擊台北", "今天停班", "zhtw"),
        NewsRecord::new("ett:https://ett.example/d", "金管會調查開曼群島", "", "zhtw"),
    ]
}

fn settings() -> PipelineSettings {
    PipelineSettings {
        epochs: 30,
        thresholds: vec![1e-6, 0.3, 0.9, 1.5],
        seed: Some(7),
        ..PipelineSettings::default()
    }
}

// ============================================================
// Chain: records -> training set
// ============================================================

#[test]
fn preprocessing_extracts_keywords_and_proper_nouns() {
    let mut library = library();
    let examples = pipeline::preprocessing(records(), segmenter(), &mut library).unwrap();

    assert_eq!(examples.len(), 4);
    assert_eq!(examples[0].words, vec!["地檢署", "洗錢"]);
    assert_eq!(examples[0].words, examples[1].words);
    // Place (Nc) and time (Nd) nouns are kept even when not keywords; 颱風 (Na) is not.
    assert_eq!(examples[2].words, vec!["台北", "今天"]);
    assert_eq!(examples[3].words, vec!["金管會", "開曼群島"]);
    assert_eq!(examples[3].label(), "ett:https://ett.example/d");
}

#[test]
fn unsupported_document_language_fails_the_run() {
    let mut library = library();
    let mut batch = records();
    batch.push(NewsRecord::new("x:https://x.example", "洗錢", "", "en"));
    let result = pipeline::evaluate(batch, &settings(), segmenter(), &mut library);
    assert!(matches!(result, Err(Error::UnsupportedLanguage(_))));
}

// ============================================================
// Chain: training set -> embeddings -> sweep -> clusters
// ============================================================

#[test]
fn keyword_overlapping_documents_cluster_together() {
    let mut library = library();
    let evaluation = pipeline::evaluate(records(), &settings(), segmenter(), &mut library).unwrap();

    assert_eq!(evaluation.results.len(), 4);
    for (result, threshold) in evaluation.results.iter().zip([1e-6, 0.3, 0.9, 1.5]) {
        assert_eq!(result.threshold, threshold);
        assert_eq!(result.assignment.len(), 4);
    }
    // The tiny threshold separates every distinct vector, so it always scores.
    assert!(matches!(evaluation.results[0].score, Score::Scored { .. }));

    let best = evaluation.best().expect("a scored threshold");
    assert_eq!(best.assignment[0], best.assignment[1], "A and B split apart");
    assert!(
        best.assignment[2] != best.assignment[0] || best.assignment[3] != best.assignment[0],
        "every document landed in the A/B cluster"
    );

    let clusters = evaluation.best_clusters().unwrap();
    let with_a = clusters
        .iter()
        .find(|(_, labels)| labels.contains("cna:https://cna.example/a"))
        .expect("A is in some cluster");
    assert!(with_a.1.contains("udn:https://udn.example/b"));
    let total: usize = clusters.iter().map(|(_, labels)| labels.len()).sum();
    assert_eq!(total, 4);
}

#[test]
fn partially_overlapping_documents_cluster_together_across_seeds() {
    let seeds = 0..10u64;
    let mut grouped = 0;
    for seed in seeds.clone() {
        let mut library = library();
        let settings = PipelineSettings {
            seed: Some(seed),
            ..PipelineSettings::default()
        };
        let evaluation =
            pipeline::evaluate(overlapping_records(), &settings, segmenter(), &mut library).unwrap();

        let examples = &evaluation.examples;
        assert_eq!(examples[0].words, vec!["地檢署", "洗錢", "詐欺"]);
        assert_eq!(examples[1].words, vec!["地檢署", "洗錢"]);

        let vectors = pipeline::infer_vectors(&evaluation.model, examples);
        assert_ne!(vectors[0], vectors[1]);

        if let Some(best) = evaluation.best() {
            let a = best.assignment[0];
            if best.assignment[1] == a && best.assignment[2] != a {
                grouped += 1;
            }
        }
    }
    assert!(
        grouped * 10 >= seeds.count() * 7,
        "A and B grouped apart from C in only {grouped} runs"
    );
}

#[test]
fn inferred_vectors_have_model_dimensions() {
    let mut library = library();
    let examples = pipeline::preprocessing(records(), segmenter(), &mut library).unwrap();
    let model = EmbeddingTrainer::new(settings().trainer()).train(&examples).unwrap();

    let vectors = pipeline::infer_vectors(&model, &examples);
    assert_eq!(vectors.len(), 4);
    assert!(vectors.iter().all(|v| v.len() == 3 && v.iter().all(|x| x.is_finite())));
    assert_eq!(vectors[0], vectors[1]);
    assert_ne!(vectors[0], vectors[2]);
    assert_eq!(model.vocabulary_len(), 6);
    assert!(model.document_vector("ltn:https://ltn.example/c").is_some());
}

#[test]
fn group_urls_strips_sources() {
    let mut library = library();
    let examples = pipeline::preprocessing(records(), segmenter(), &mut library).unwrap();
    let model = EmbeddingTrainer::new(settings().trainer()).train(&examples).unwrap();

    let groups = pipeline::group_urls(&model, &examples, 50, 1e-6).unwrap();
    for group in &groups {
        assert!(group.iter().all(|url| url.starts_with("https://")));
    }
    assert_eq!(groups.iter().map(Vec::len).sum::<usize>(), 4);
    let ab = groups
        .iter()
        .find(|g| g.contains(&label_url("cna:https://cna.example/a").to_string()))
        .unwrap();
    assert!(ab.contains(&"https://udn.example/b".to_string()));
}
