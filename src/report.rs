// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Reporting-layer boundary.
//!
//! The dashboard renderer itself lives elsewhere; this module gives it the
//! persisted metrics as a markdown summary and a ground-truth cache handle.
//! A missing metrics row means "result unavailable" for that model, never a
//! deleted or invalid state.

use std::collections::HashMap;

use chrono::Utc;

use crate::dataset::Sentiment;
use crate::error::Result;
use crate::store::ResultStore;

/// Explicit cache for the reviewed ground-truth series.
///
/// The reporting collaborator holds one of these by handle and reuses the
/// label series across calls; `invalidate` must be called when the underlying
/// dataset changes.
#[derive(Debug, Default)]
pub struct GroundTruthCache {
    labels: Option<HashMap<i64, Sentiment>>,
}

impl GroundTruthCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The reviewed label series, loaded on first use.
    pub fn get(&mut self, store: &ResultStore) -> Result<&HashMap<i64, Sentiment>> {
        if self.labels.is_none() {
            let series: HashMap<i64, Sentiment> = store
                .labeled_samples()?
                .into_iter()
                .filter_map(|(id, _, label)| Some((id, label.and_then(Sentiment::from_i64)?)))
                .collect();
            self.labels = Some(series);
        }
        Ok(self.labels.as_ref().unwrap())
    }

    /// Drop the cached series so the next `get` reloads it.
    pub fn invalidate(&mut self) {
        self.labels = None;
    }
}

/// Render the persisted metrics as a markdown summary.
pub fn render_summary(store: &ResultStore) -> Result<String> {
    let metrics = store.get_metrics_all()?;

    let mut report = String::new();
    report.push_str("# Sentiment Analysis Results\n\n");
    report.push_str(&format!(
        "**Generated:** {}\n\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if metrics.is_empty() {
        report.push_str("No performance data found. Run the evaluation pipeline first.\n");
        return Ok(report);
    }

    report.push_str("| Model | Split | Accuracy | Precision | Recall | F1 |\n");
    report.push_str("|-------|-------|----------|-----------|--------|----|\n");

    for row in &metrics {
        let name = store
            .get_model_name(row.model_id)?
            .unwrap_or_else(|| format!("model {}", row.model_id));
        report.push_str(&format!(
            "| {} | {} | {:.4} | {:.4} | {:.4} | {:.4} |\n",
            name,
            row.split.as_str(),
            row.accuracy,
            row.precision,
            row.recall,
            row.f1
        ));
    }

    Ok(report)
}
