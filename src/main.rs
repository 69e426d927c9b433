// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Sentiment evaluation pipeline CLI
//!
//! Usage:
//!   sentiment-eval --db db/results.db
//!   sentiment-eval --retrain --seed 42
//!   sentiment-eval --import-reviews reviewed.csv
//!   sentiment-eval --export-unreviewed to_review.csv

use anyhow::Result;
use clap::Parser;
use sentiment_eval::dataset::{export_unreviewed, import_reviews, SplitOptions};
use sentiment_eval::pipeline::{EvaluationPipeline, PipelineConfig};
use sentiment_eval::report::render_summary;
use sentiment_eval::store::ResultStore;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sentiment-eval")]
#[command(about = "Train and evaluate sentiment classification models")]
#[command(version)]
struct Args {
    /// Result store location
    #[arg(long, default_value = "db/results.db")]
    db: PathBuf,

    /// Directory for trained model artifacts
    #[arg(long, default_value = "trained_models")]
    artifacts: PathBuf,

    /// Wipe the artifact cache and retrain every model
    #[arg(short, long)]
    retrain: bool,

    /// Seed for a reproducible train/test split
    #[arg(short, long)]
    seed: Option<u64>,

    /// Fraction of samples assigned to the train split
    #[arg(long, default_value_t = 0.5)]
    train_ratio: f64,

    /// Import manually reviewed labels from a CSV before running
    #[arg(long)]
    import_reviews: Option<PathBuf>,

    /// Export unreviewed posts to a CSV and exit
    #[arg(long)]
    export_unreviewed: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if let Some(ref path) = args.export_unreviewed {
        let store = ResultStore::open(&args.db)?;
        let count = export_unreviewed(&store, path)?;
        println!("Exported {} unreviewed posts to {}", count, path.display());
        return Ok(());
    }

    if let Some(ref path) = args.import_reviews {
        let store = ResultStore::open(&args.db)?;
        let count = import_reviews(&store, path)?;
        println!("Imported {} reviewed labels from {}", count, path.display());
    }

    let config = PipelineConfig {
        db_path: args.db,
        artifact_dir: args.artifacts,
        retrain: args.retrain,
        split: SplitOptions {
            train_ratio: args.train_ratio,
            seed: args.seed,
        },
    };

    let mut pipeline = EvaluationPipeline::new(config)?;
    let summary = pipeline.run()?;

    println!("\n{}", "=".repeat(70));
    println!("EVALUATION SUMMARY");
    println!("{}", "=".repeat(70));
    println!(
        "\nSamples: {} train, {} test{}",
        summary.train_samples,
        summary.test_samples,
        if summary.resumed { " (resumed from cached artifacts)" } else { "" }
    );
    println!("{:-<70}", "");
    println!(
        "{:<18} {:>6} {:>10} {:>10} {:>10} {:>10}",
        "Model", "Split", "Accuracy", "Precision", "Recall", "F1"
    );
    println!("{:-<70}", "");

    for outcome in &summary.outcomes {
        for (split, report) in &outcome.results {
            println!(
                "{:<18} {:>6} {:>10.4} {:>10.4} {:>10.4} {:>10.4}",
                outcome.name,
                split.as_str(),
                report.accuracy,
                report.precision,
                report.recall,
                report.f1
            );
        }
    }
    println!("{:-<70}", "");

    let report = render_summary(pipeline.store())?;
    println!("\n{report}");

    Ok(())
}
