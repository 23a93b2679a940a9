use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use newscluster::config::Config;
use newscluster::dataset::NewsRecord;
use newscluster::embedding::EmbeddingTrainer;
use newscluster::language::Language;
use newscluster::output::terminal;
use newscluster::pipeline;
use newscluster::tagger::Segmenter;

/// Newscluster: group news articles that report the same event.
///
/// Filters each article down to domain keywords and proper nouns, embeds it
/// with paragraph vectors, and clusters the vectors with BIRCH across a range
/// of thresholds, keeping the one with the best silhouette score.
#[derive(Parser)]
#[command(name = "newscluster", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sweep clustering thresholds over a batch of articles
    Run {
        #[command(flatten)]
        batch: BatchArgs,

        /// Thresholds to try, comma-separated (default: NEWSCLUSTER_THRESHOLDS)
        #[arg(long, value_delimiter = ',')]
        thresholds: Option<Vec<f64>>,

        /// Print results as JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Cluster once at a fixed threshold and print grouped URLs
    Group {
        #[command(flatten)]
        batch: BatchArgs,

        /// Merge threshold (default: DEFAULT_THRESHOLD)
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Show the keyword dictionary for a language
    Keywords {
        /// Language code (zhtw, zhcn, en)
        #[arg(long, default_value = "zhtw")]
        lang: String,
    },

    /// Segment and tag a piece of text
    Segment {
        /// Text to segment
        text: String,

        /// Language code (zhtw, zhcn, en)
        #[arg(long, default_value = "zhtw")]
        lang: String,
    },
}

/// Input and model options shared by the clustering commands.
#[derive(Args)]
struct BatchArgs {
    /// JSON array of records: {"id", "subject", "content", "lang", ...}
    #[arg(long)]
    input: PathBuf,

    /// Embedding dimensions (default: NEWSCLUSTER_VECTOR_SIZE)
    #[arg(long)]
    vector_size: Option<usize>,

    /// Training epochs (default: NEWSCLUSTER_EPOCHS)
    #[arg(long)]
    epochs: Option<usize>,

    /// BIRCH branching factor (default: DEFAULT_BRANCHING_FACTOR)
    #[arg(long)]
    branching_factor: Option<usize>,

    /// Fixed training seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

impl BatchArgs {
    fn apply(&self, config: &mut Config) {
        let settings = &mut config.settings;
        if let Some(v) = self.vector_size {
            settings.vector_size = v;
        }
        if let Some(e) = self.epochs {
            settings.epochs = e;
        }
        if let Some(b) = self.branching_factor {
            settings.branching_factor = b;
        }
        if self.seed.is_some() {
            settings.seed = self.seed;
        }
    }
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("newscluster=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::load().context("Failed to load configuration")?;

    match cli.command {
        Commands::Run {
            batch,
            thresholds,
            json,
        } => {
            batch.apply(&mut config);
            if let Some(thresholds) = thresholds {
                config.settings.thresholds = thresholds;
            }
            config.validate()?;

            let records = read_records(&batch.input)?;
            println!("Clustering {} articles...", records.len());

            let spinner = spinner("Training embeddings and sweeping thresholds");
            let segmenter: Arc<dyn Segmenter> = Arc::new(config.nlp_client());
            let mut library = config.keyword_library();
            let evaluation = pipeline::evaluate(records, &config.settings, segmenter, &mut library);
            spinner.finish_and_clear();
            let evaluation = evaluation.context("Evaluation failed")?;

            let clusters = evaluation.best_clusters()?;
            if json {
                let report = serde_json::json!({
                    "results": evaluation.results,
                    "best_threshold": evaluation.best().map(|r| r.threshold),
                    "clusters": clusters,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                terminal::display_sweep(&evaluation.results);
                terminal::display_clusters(&clusters);
            }
        }

        Commands::Group { batch, threshold } => {
            batch.apply(&mut config);
            if let Some(t) = threshold {
                config.settings.default_threshold = t;
            }
            config.validate()?;

            let records = read_records(&batch.input)?;
            let spinner = spinner("Training embeddings");
            let segmenter: Arc<dyn Segmenter> = Arc::new(config.nlp_client());
            let mut library = config.keyword_library();
            let grouped = pipeline::preprocessing(records, segmenter, &mut library).and_then(|examples| {
                let model = EmbeddingTrainer::new(config.settings.trainer()).train(&examples)?;
                pipeline::group_urls(
                    &model,
                    &examples,
                    config.settings.branching_factor,
                    config.settings.default_threshold,
                )
            });
            spinner.finish_and_clear();
            let groups = grouped.context("Grouping failed")?;

            info!(groups = groups.len(), "URL grouping complete");
            for (i, urls) in groups.iter().enumerate() {
                println!("{} {}", format!("#{i}").cyan().bold(), urls.join("  "));
            }
        }

        Commands::Keywords { lang } => {
            let language = Language::from_code(&lang)?;
            let mut library = config.keyword_library();
            let store = library
                .store(language)
                .with_context(|| format!("No keyword dictionary for {language}"))?;
            terminal::display_keywords(store);
        }

        Commands::Segment { text, lang } => {
            let client = config.nlp_client();
            let tokens = client.segment(&text, &lang)?;
            terminal::display_tokens(&tokens);
            match client.ensure_loaded()?.ner(&text) {
                Ok(entities) => println!("{} entities", entities.len()),
                Err(e) => println!("{}", format!("NER: {e}").dimmed()),
            }
        }
    }

    Ok(())
}

fn read_records(path: &Path) -> Result<Vec<NewsRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Input {} is not a JSON array of records", path.display()))
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner} {msg} ({elapsed})") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
