// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Evaluation orchestrator.
//!
//! Drives the lifecycle across all registered model instances:
//! Resolve -> Build -> Wipe -> Train -> Evaluate -> Persist.
//!
//! An empty dataset is fatal and aborts before the wipe. Artifact load and
//! save failures, and storage write failures during evaluation, are logged
//! and degrade the run instead of aborting it: results for the remaining
//! models stay available.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::dataset::{Dataset, Sentiment, Split, SplitOptions};
use crate::error::Result;
use crate::metrics::MetricsReport;
use crate::models::{fresh_models, restore, ModelArtifact, SentimentModel};
use crate::store::ResultStore;

/// Configuration for one evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Result store location.
    pub db_path: PathBuf,
    /// Directory for serialized model artifacts.
    pub artifact_dir: PathBuf,
    /// Skip the artifact cache and train the full fresh set.
    pub retrain: bool,
    /// Train/test partitioning.
    pub split: SplitOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("db/results.db"),
            artifact_dir: PathBuf::from("trained_models"),
            retrain: false,
            split: SplitOptions::default(),
        }
    }
}

/// One model instance tracked through a run.
struct ModelInstance {
    model: Box<dyn SentimentModel>,
    trained: bool,
    resumed: bool,
}

impl ModelInstance {
    fn fresh(model: Box<dyn SentimentModel>) -> Self {
        Self {
            model,
            trained: false,
            resumed: false,
        }
    }

    fn resumed(model: Box<dyn SentimentModel>) -> Self {
        Self {
            model,
            trained: true,
            resumed: true,
        }
    }
}

/// Metrics gathered for one model across both splits.
#[derive(Debug, Clone)]
pub struct ModelOutcome {
    pub name: String,
    pub results: Vec<(Split, MetricsReport)>,
}

/// What a run produced, for the caller's console summary.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub outcomes: Vec<ModelOutcome>,
    pub train_samples: usize,
    pub test_samples: usize,
    pub resumed: bool,
}

/// Main evaluation pipeline.
pub struct EvaluationPipeline {
    config: PipelineConfig,
    store: ResultStore,
}

impl EvaluationPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let store = ResultStore::open(&config.db_path)?;
        Ok(Self { config, store })
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Run the full lifecycle.
    pub fn run(&mut self) -> Result<RunSummary> {
        let mut instances = self.resolve_models();
        let resumed = instances.iter().any(|i| i.resumed);

        // The dataset is built before anything is deleted, so an empty
        // dataset aborts with previous results intact.
        let dataset = Dataset::build(&self.store, &self.config.split)?;
        tracing::info!(
            "dataset built: {} train, {} test",
            dataset.train.len(),
            dataset.test.len()
        );

        self.store.clear_run()?;

        self.train(&mut instances, &dataset);
        let outcomes = self.evaluate(&instances, &dataset);
        self.persist(&instances);

        Ok(RunSummary {
            outcomes,
            train_samples: dataset.train.len(),
            test_samples: dataset.test.len(),
            resumed,
        })
    }

    /// Resolve the model set, restoring cached instances unless a retrain was
    /// requested. Falls back to the full fresh set when nothing resumes.
    fn resolve_models(&self) -> Vec<ModelInstance> {
        if !self.config.retrain {
            let rows = match self.store.list_models() {
                Ok(rows) => rows,
                Err(err) => {
                    tracing::warn!("failed to list cached models: {err}");
                    Vec::new()
                }
            };

            let mut instances = Vec::new();
            for row in rows {
                let Some(path) = row.artifact_path else {
                    tracing::warn!("{}: no artifact recorded, dropping from resumed set", row.name);
                    continue;
                };
                match ModelArtifact::load(&path) {
                    Ok(artifact) => {
                        tracing::info!("{}: restored from {}", row.name, path.display());
                        instances.push(ModelInstance::resumed(restore(artifact)));
                    }
                    Err(err) => {
                        tracing::warn!("{}: dropping from resumed set: {err}", row.name);
                    }
                }
            }

            if !instances.is_empty() {
                return instances;
            }
        }

        fresh_models().into_iter().map(ModelInstance::fresh).collect()
    }

    fn train(&self, instances: &mut [ModelInstance], dataset: &Dataset) {
        let texts = Dataset::texts(&dataset.train);
        let labels = Dataset::labels(&dataset.train);

        for instance in instances.iter_mut().filter(|i| !i.trained) {
            tracing::info!("training model: {}", instance.model.name());
            instance.model.train(&texts, &labels);
            instance.trained = true;
        }
    }

    fn evaluate(&self, instances: &[ModelInstance], dataset: &Dataset) -> Vec<ModelOutcome> {
        let mut outcomes = Vec::new();

        for instance in instances {
            let name = instance.model.name().to_string();
            let model_id = match self.store.upsert_model(&name) {
                Ok(id) => id,
                Err(err) => {
                    tracing::warn!("{name}: failed to register, skipping evaluation: {err}");
                    continue;
                }
            };

            tracing::info!("{name}: conducting classification");
            let mut results = Vec::new();

            for split in Split::BOTH {
                let samples = match split {
                    Split::Train => &dataset.train,
                    Split::Test => &dataset.test,
                };
                let predictions = instance.model.classify(&Dataset::texts(samples));
                let report =
                    MetricsReport::from_predictions(&predictions, &Dataset::labels(samples));

                let rows: Vec<(i64, Sentiment)> = samples
                    .iter()
                    .map(|s| s.id)
                    .zip(predictions.iter().copied())
                    .collect();
                if let Err(err) = self.store.put_predictions(model_id, split, &rows) {
                    tracing::warn!("{name}: failed to store {} predictions: {err}", split.as_str());
                }
                if let Err(err) = self.store.put_metrics(
                    model_id,
                    split,
                    report.accuracy,
                    report.precision,
                    report.recall,
                    report.f1,
                ) {
                    tracing::warn!("{name}: failed to store {} metrics: {err}", split.as_str());
                }

                results.push((split, report));
            }

            outcomes.push(ModelOutcome { name, results });
        }

        outcomes
    }

    /// Serialize freshly trained instances and record their artifact paths.
    fn persist(&self, instances: &[ModelInstance]) {
        for instance in instances.iter().filter(|i| !i.resumed) {
            let name = instance.model.name();
            let path = self.config.artifact_dir.join(artifact_file_name(name));

            if let Err(err) = instance.model.snapshot().save(&path) {
                tracing::warn!("{name}: model stays uncached: {err}");
                continue;
            }
            tracing::info!("{name}: artifact saved at {}", path.display());

            match self.store.get_model_id(name) {
                Ok(Some(model_id)) => {
                    if let Err(err) = self.store.save_artifact_path(model_id, &path) {
                        tracing::warn!("{name}: failed to record artifact path: {err}");
                    }
                }
                Ok(None) => {
                    tracing::warn!("{name}: not registered, artifact path not recorded");
                }
                Err(err) => {
                    tracing::warn!("{name}: failed to record artifact path: {err}");
                }
            }
        }
    }
}

/// Artifact file name derived from a model name, `tfidf-nb (1,2)` becoming
/// `tfidf-nb_1-2.json`.
fn artifact_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('_'),
            ',' => Some('-'),
            '(' | ')' => None,
            other => Some(other),
        })
        .collect();
    format!("{cleaned}.json")
}
