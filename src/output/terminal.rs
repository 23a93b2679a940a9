// Colored terminal output for threshold sweeps and cluster membership.
//
// main.rs delegates all terminal formatting here.

use colored::Colorize;
use indexmap::IndexSet;

use super::truncate_chars;
use crate::cluster::{self, ClusterResult, Score};
use crate::keywords::store::{Category, KeywordStore};
use crate::pipeline::label_url;
use crate::tagger::Token;

/// Longest URL shown before truncation.
const MAX_URL_CHARS: usize = 96;

/// Display one row per threshold, highlighting the best-scoring one.
pub fn display_sweep(results: &[ClusterResult]) {
    if results.is_empty() {
        println!("No thresholds evaluated.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Threshold Sweep ({} thresholds) ===", results.len()).bold()
    );
    println!();
    println!(
        "  {:>9}  {:>8}  {:>10}",
        "Threshold".dimmed(),
        "Clusters".dimmed(),
        "Silhouette".dimmed(),
    );
    println!("  {}", "-".repeat(31).dimmed());

    let best = cluster::best(results).map(|r| r.threshold);
    for result in results {
        let score = match &result.score {
            Score::Scored { silhouette } => colorize_score(*silhouette),
            Score::Skipped { .. } => "skipped".dimmed().to_string(),
        };
        let marker = if Some(result.threshold) == best {
            "<- best".green().bold().to_string()
        } else {
            String::new()
        };
        println!(
            "  {:>9.2}  {:>8}  {:>10}  {}",
            result.threshold, result.cluster_count, score, marker
        );
    }

    println!();
    if best.is_none() {
        println!(
            "  {} no threshold produced a scorable clustering",
            "!".yellow()
        );
    }
}

/// Display each cluster's member URLs.
pub fn display_clusters(clusters: &[(usize, IndexSet<String>)]) {
    if clusters.is_empty() {
        println!("No clusters to show.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Clusters ({}) ===", clusters.len()).bold()
    );
    for (id, labels) in clusters {
        let size = format!("{} article(s)", labels.len());
        println!("\n  {} {}", format!("#{id}").cyan().bold(), size.dimmed());
        for label in labels {
            println!("    {}", truncate_chars(label_url(label), MAX_URL_CHARS));
        }
    }
    println!();
}

/// Display a keyword dictionary category by category.
pub fn display_keywords(store: &KeywordStore) {
    for category in Category::ORDERED {
        let values = store.values(category);
        println!(
            "{} {}",
            format!("[{}] {}", category.code(), category.name()).bold(),
            format!("({})", values.len()).dimmed()
        );
        if !values.is_empty() {
            println!("  {}", values.join(", "));
        }
    }
}

/// Display a segmented text as `word/TAG` pairs.
pub fn display_tokens(tokens: &[Token]) {
    let line: Vec<String> = tokens
        .iter()
        .map(|t| {
            if t.tag.is_empty() {
                t.word.clone()
            } else {
                format!("{}/{}", t.word, t.tag.dimmed())
            }
        })
        .collect();
    println!("{}", line.join(" "));
}

fn colorize_score(score: f64) -> String {
    let text = format!("{score:.4}");
    if score >= 0.5 {
        text.green().to_string()
    } else if score >= 0.25 {
        text.yellow().to_string()
    } else {
        text.red().to_string()
    }
}
