// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Labeled samples and dataset construction for sentiment evaluation.
//!
//! The builder pulls manually reviewed posts from the store, drops anything
//! without a usable label, normalizes the text, and partitions into train and
//! test splits. Partitioning is randomized per run unless the caller supplies
//! a seed.

use std::collections::HashMap;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::normalize::normalize;
use crate::store::ResultStore;

/// Three-class sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Negative, Sentiment::Neutral, Sentiment::Positive];

    /// Numeric value stored in the database (-1, 0, 1).
    pub fn to_i64(self) -> i64 {
        match self {
            Sentiment::Negative => -1,
            Sentiment::Neutral => 0,
            Sentiment::Positive => 1,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            -1 => Some(Sentiment::Negative),
            0 => Some(Sentiment::Neutral),
            1 => Some(Sentiment::Positive),
            _ => None,
        }
    }

    /// Dense index for confusion-matrix bookkeeping.
    pub fn index(self) -> usize {
        match self {
            Sentiment::Negative => 0,
            Sentiment::Neutral => 1,
            Sentiment::Positive => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
            Sentiment::Positive => "positive",
        }
    }
}

/// The partition a sample belongs to for a given evaluation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Split {
    Train,
    Test,
}

impl Split {
    pub const BOTH: [Split; 2] = [Split::Train, Split::Test];

    pub fn as_str(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Test => "test",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "train" => Some(Split::Train),
            "test" => Some(Split::Test),
            _ => None,
        }
    }
}

/// A single labeled, normalized sample. Immutable once the dataset is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledSample {
    pub id: i64,
    pub text: String,
    pub label: Sentiment,
}

/// How to partition reviewed samples into train and test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitOptions {
    /// Fraction of samples assigned to the train split.
    pub train_ratio: f64,
    /// Seed for reproducible partitioning; `None` shuffles from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            train_ratio: 0.5,
            seed: None,
        }
    }
}

/// A dataset partitioned for one evaluation run.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub train: Vec<LabeledSample>,
    pub test: Vec<LabeledSample>,
}

impl Dataset {
    /// Build a dataset from the store's reviewed posts.
    pub fn build(store: &ResultStore, options: &SplitOptions) -> Result<Self> {
        let rows = store.labeled_samples()?;
        Self::from_rows(rows, options)
    }

    /// Build a dataset from raw `(id, text, label)` rows. Rows with a missing
    /// or out-of-range label are dropped before partitioning.
    pub fn from_rows(rows: Vec<(i64, String, Option<i64>)>, options: &SplitOptions) -> Result<Self> {
        let mut samples: Vec<LabeledSample> = rows
            .into_iter()
            .filter_map(|(id, text, label)| {
                let label = label.and_then(Sentiment::from_i64)?;
                Some(LabeledSample {
                    id,
                    text: normalize(&text),
                    label,
                })
            })
            .collect();

        if samples.is_empty() {
            return Err(Error::DatasetEmpty);
        }

        let mut rng = match options.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        samples.shuffle(&mut rng);

        let train_end = (samples.len() as f64 * options.train_ratio) as usize;
        let test = samples.split_off(train_end);

        Ok(Self {
            train: samples,
            test,
        })
    }

    pub fn total_samples(&self) -> usize {
        self.train.len() + self.test.len()
    }

    /// Get label distribution for a split.
    pub fn label_distribution(samples: &[LabeledSample]) -> HashMap<Sentiment, usize> {
        let mut dist = HashMap::new();
        for sample in samples {
            *dist.entry(sample.label).or_insert(0) += 1;
        }
        dist
    }

    pub fn texts(samples: &[LabeledSample]) -> Vec<String> {
        samples.iter().map(|s| s.text.clone()).collect()
    }

    pub fn labels(samples: &[LabeledSample]) -> Vec<Sentiment> {
        samples.iter().map(|s| s.label).collect()
    }
}

/// Import manually reviewed labels from a CSV with `id,rate` columns.
///
/// Ratings are matched case-insensitively against `positive`, `neutral` and
/// `negative`; rows with a blank or unknown rating are skipped as unreviewed.
pub fn import_reviews(store: &ResultStore, path: &Path) -> Result<usize> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut reviewed = Vec::new();

    for record in reader.records() {
        let record = record?;
        let id: i64 = match record.get(0).and_then(|v| v.trim().parse().ok()) {
            Some(id) => id,
            None => continue,
        };
        let rate = record.get(1).unwrap_or("").trim().to_lowercase();
        let label = match rate.as_str() {
            "positive" => Sentiment::Positive,
            "neutral" => Sentiment::Neutral,
            "negative" => Sentiment::Negative,
            _ => continue,
        };
        reviewed.push((id, label));
    }

    let count = reviewed.len();
    store.add_reviewed(&reviewed)?;
    tracing::info!("imported {} reviewed labels from {}", count, path.display());
    Ok(count)
}

/// Export posts that have no review yet to a CSV with `id,text` columns.
pub fn export_unreviewed(store: &ResultStore, path: &Path) -> Result<usize> {
    let posts = store.unreviewed_posts()?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["id", "text"])?;
    for (id, text) in &posts {
        writer.write_record([id.to_string().as_str(), text.as_str()])?;
    }
    writer.flush()?;
    tracing::info!("exported {} unreviewed posts to {}", posts.len(), path.display());
    Ok(posts.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<(i64, String, Option<i64>)> {
        vec![
            (1, "good service".to_string(), Some(1)),
            (2, "bad experience".to_string(), Some(-1)),
            (3, "ok trip".to_string(), Some(0)),
            (4, "terrible delay".to_string(), Some(-1)),
        ]
    }

    #[test]
    fn test_sentiment_roundtrip() {
        for label in Sentiment::ALL {
            assert_eq!(Sentiment::from_i64(label.to_i64()), Some(label));
        }
        assert_eq!(Sentiment::from_i64(2), None);
    }

    #[test]
    fn test_drops_unlabeled_rows() {
        let mut rows = rows();
        rows.push((5, "unreviewed".to_string(), None));
        rows.push((6, "bogus label".to_string(), Some(7)));

        let dataset = Dataset::from_rows(rows, &SplitOptions::default()).unwrap();
        assert_eq!(dataset.total_samples(), 4);
    }

    #[test]
    fn test_empty_dataset_is_fatal() {
        let rows = vec![(1, "unreviewed".to_string(), None)];
        let err = Dataset::from_rows(rows, &SplitOptions::default()).unwrap_err();
        assert!(matches!(err, Error::DatasetEmpty));
    }

    #[test]
    fn test_normalizes_text() {
        let rows = vec![(1, "RT @user #good service".to_string(), Some(1))];
        let dataset = Dataset::from_rows(
            rows,
            &SplitOptions {
                train_ratio: 1.0,
                seed: Some(7),
            },
        )
        .unwrap();
        assert_eq!(dataset.train[0].text, "good service");
    }

    #[test]
    fn test_half_split_sizes() {
        let dataset = Dataset::from_rows(rows(), &SplitOptions::default()).unwrap();
        assert_eq!(dataset.train.len(), 2);
        assert_eq!(dataset.test.len(), 2);
    }

    #[test]
    fn test_seeded_split_is_reproducible() {
        let options = SplitOptions {
            train_ratio: 0.5,
            seed: Some(42),
        };
        let a = Dataset::from_rows(rows(), &options).unwrap();
        let b = Dataset::from_rows(rows(), &options).unwrap();

        let ids = |samples: &[LabeledSample]| samples.iter().map(|s| s.id).collect::<Vec<_>>();
        assert_eq!(ids(&a.train), ids(&b.train));
        assert_eq!(ids(&a.test), ids(&b.test));
    }

    #[test]
    fn test_import_reviews_csv() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::open(dir.path().join("results.db")).unwrap();
        store
            .add_posts(&[
                (10, "good service".to_string()),
                (11, "bad experience".to_string()),
                (12, "still waiting".to_string()),
            ])
            .unwrap();

        let csv_path = dir.path().join("reviewed.csv");
        std::fs::write(
            &csv_path,
            "id,rate\n10,Positive\n11,negative\n12,\nnonsense,positive\n",
        )
        .unwrap();

        let imported = import_reviews(&store, &csv_path).unwrap();
        assert_eq!(imported, 2);

        let labeled = store.labeled_samples().unwrap();
        assert_eq!(labeled.len(), 2);
        assert_eq!(labeled[0].2, Some(1));
        assert_eq!(labeled[1].2, Some(-1));
    }

    #[test]
    fn test_export_unreviewed_csv() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::open(dir.path().join("results.db")).unwrap();
        store
            .add_posts(&[(1, "reviewed".to_string()), (2, "not yet".to_string())])
            .unwrap();
        store.add_reviewed(&[(1, Sentiment::Neutral)]).unwrap();

        let csv_path = dir.path().join("to_review.csv");
        let exported = export_unreviewed(&store, &csv_path).unwrap();
        assert_eq!(exported, 1);

        let contents = std::fs::read_to_string(&csv_path).unwrap();
        assert!(contents.starts_with("id,text"));
        assert!(contents.contains("2,not yet"));
    }

    #[test]
    fn test_label_distribution() {
        let dataset = Dataset::from_rows(
            rows(),
            &SplitOptions {
                train_ratio: 1.0,
                seed: Some(1),
            },
        )
        .unwrap();
        let dist = Dataset::label_distribution(&dataset.train);
        assert_eq!(dist.get(&Sentiment::Negative), Some(&2));
        assert_eq!(dist.get(&Sentiment::Neutral), Some(&1));
        assert_eq!(dist.get(&Sentiment::Positive), Some(&1));
    }
}
