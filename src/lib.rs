// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Evaluation pipeline for heterogeneous text-sentiment classifiers
//!
//! This crate provides:
//! - Text normalization for raw social-media posts
//! - One capability contract over lexicon, pattern, Bayes and
//!   vectorize-then-classify strategies
//! - Dataset building with seeded train/test partitioning
//! - Evaluation metrics (accuracy, weighted precision/recall/F1)
//! - A resumable train/evaluate/persist lifecycle with artifact caching
//! - Relational persistence of predictions and metrics for reporting

pub mod dataset;
pub mod error;
pub mod metrics;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod store;

pub use dataset::{Dataset, LabeledSample, Sentiment, Split, SplitOptions};
pub use error::{Error, Result};
pub use metrics::{ConfusionMatrix, MetricsReport};
pub use models::{fresh_models, sentiment_score, ModelArtifact, SentimentModel};
pub use normalize::normalize;
pub use pipeline::{EvaluationPipeline, PipelineConfig, RunSummary};
pub use report::GroundTruthCache;
pub use store::ResultStore;
