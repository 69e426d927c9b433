// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Relational result store.
//!
//! Persists model metadata, per-item predictions and aggregate metrics for
//! the reporting layer, plus the review-side tables the dataset builder reads
//! from. Every operation runs inside a scoped connection whose transaction
//! commits on success only and rolls back on failure.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension, Transaction};

use crate::dataset::{Sentiment, Split};
use crate::error::Result;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS posts(
    id INTEGER PRIMARY KEY,
    text TEXT NOT NULL,
    created_at TEXT
);
CREATE TABLE IF NOT EXISTS reviews(
    post_id INTEGER PRIMARY KEY REFERENCES posts(id),
    sentiment INTEGER
);
CREATE TABLE IF NOT EXISTS models(
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    artifact_path TEXT
);
CREATE TABLE IF NOT EXISTS predictions(
    model_id INTEGER NOT NULL REFERENCES models(id),
    split TEXT NOT NULL,
    sample_id INTEGER NOT NULL,
    predicted_label INTEGER NOT NULL,
    UNIQUE(model_id, split, sample_id)
);
CREATE TABLE IF NOT EXISTS metrics(
    model_id INTEGER NOT NULL REFERENCES models(id),
    split TEXT NOT NULL,
    accuracy REAL NOT NULL,
    precision REAL NOT NULL,
    recall REAL NOT NULL,
    f1 REAL NOT NULL,
    UNIQUE(model_id, split)
);
";

/// One row of `models`.
#[derive(Debug, Clone)]
pub struct ModelRow {
    pub id: i64,
    pub name: String,
    pub artifact_path: Option<PathBuf>,
}

/// One row of `metrics`.
#[derive(Debug, Clone)]
pub struct MetricsRow {
    pub model_id: i64,
    pub split: Split,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// SQLite-backed store. Cheap to clone paths around; each operation opens its
/// own scoped connection.
#[derive(Debug, Clone)]
pub struct ResultStore {
    path: PathBuf,
}

impl ResultStore {
    /// Open the store, creating the directory and schema on first use.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let store = Self { path };
        store.with_txn(|tx| tx.execute_batch(SCHEMA))?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn with_txn<T>(&self, f: impl FnOnce(&Transaction) -> rusqlite::Result<T>) -> Result<T> {
        let mut conn = Connection::open(&self.path)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Delete all model, prediction and metrics rows for the run.
    pub fn clear_run(&self) -> Result<()> {
        self.with_txn(|tx| {
            tx.execute("DELETE FROM predictions", [])?;
            tx.execute("DELETE FROM metrics", [])?;
            tx.execute("DELETE FROM models", [])?;
            Ok(())
        })
    }

    /// Register a model by name, returning its id. Idempotent.
    pub fn upsert_model(&self, name: &str) -> Result<i64> {
        self.with_txn(|tx| {
            tx.execute(
                "INSERT INTO models(name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
                params![name],
            )?;
            tx.query_row("SELECT id FROM models WHERE name = ?1", params![name], |row| {
                row.get(0)
            })
        })
    }

    pub fn get_model_id(&self, name: &str) -> Result<Option<i64>> {
        self.with_txn(|tx| {
            tx.query_row("SELECT id FROM models WHERE name = ?1", params![name], |row| {
                row.get(0)
            })
            .optional()
        })
    }

    pub fn get_model_name(&self, model_id: i64) -> Result<Option<String>> {
        self.with_txn(|tx| {
            tx.query_row(
                "SELECT name FROM models WHERE id = ?1",
                params![model_id],
                |row| row.get(0),
            )
            .optional()
        })
    }

    pub fn save_artifact_path(&self, model_id: i64, path: &Path) -> Result<()> {
        self.with_txn(|tx| {
            tx.execute(
                "UPDATE models SET artifact_path = ?1 WHERE id = ?2",
                params![path.to_string_lossy(), model_id],
            )?;
            Ok(())
        })
    }

    pub fn list_models(&self) -> Result<Vec<ModelRow>> {
        self.with_txn(|tx| {
            let mut statement =
                tx.prepare("SELECT id, name, artifact_path FROM models ORDER BY id")?;
            let rows = statement.query_map([], |row| {
                Ok(ModelRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    artifact_path: row.get::<_, Option<String>>(2)?.map(PathBuf::from),
                })
            })?;
            rows.collect()
        })
    }

    /// Write one prediction row per sample for a (model, split) pair.
    pub fn put_predictions(
        &self,
        model_id: i64,
        split: Split,
        predictions: &[(i64, Sentiment)],
    ) -> Result<()> {
        self.with_txn(|tx| {
            let mut statement = tx.prepare(
                "INSERT INTO predictions(model_id, split, sample_id, predicted_label)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (sample_id, label) in predictions {
                statement.execute(params![model_id, split.as_str(), sample_id, label.to_i64()])?;
            }
            Ok(())
        })
    }

    /// Write the aggregate metrics row for a (model, split) pair.
    pub fn put_metrics(
        &self,
        model_id: i64,
        split: Split,
        accuracy: f64,
        precision: f64,
        recall: f64,
        f1: f64,
    ) -> Result<()> {
        self.with_txn(|tx| {
            tx.execute(
                "INSERT INTO metrics(model_id, split, accuracy, precision, recall, f1)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![model_id, split.as_str(), accuracy, precision, recall, f1],
            )?;
            Ok(())
        })
    }

    pub fn get_metrics_all(&self) -> Result<Vec<MetricsRow>> {
        self.with_txn(|tx| {
            let mut statement = tx.prepare(
                "SELECT model_id, split, accuracy, precision, recall, f1
                 FROM metrics ORDER BY model_id, split",
            )?;
            let rows = statement.query_map([], |row| {
                let split: String = row.get(1)?;
                Ok(MetricsRow {
                    model_id: row.get(0)?,
                    split: Split::from_str(&split).unwrap_or(Split::Test),
                    accuracy: row.get(2)?,
                    precision: row.get(3)?,
                    recall: row.get(4)?,
                    f1: row.get(5)?,
                })
            })?;
            rows.collect()
        })
    }

    pub fn get_predictions(&self, model_id: i64, split: Split) -> Result<Vec<(i64, Sentiment)>> {
        self.with_txn(|tx| {
            let mut statement = tx.prepare(
                "SELECT sample_id, predicted_label FROM predictions
                 WHERE model_id = ?1 AND split = ?2 ORDER BY sample_id",
            )?;
            let rows = statement.query_map(params![model_id, split.as_str()], |row| {
                let label: i64 = row.get(1)?;
                Ok((row.get(0)?, Sentiment::from_i64(label).unwrap_or(Sentiment::Neutral)))
            })?;
            rows.collect()
        })
    }

    /// Add raw posts, ignoring ids already present.
    pub fn add_posts(&self, posts: &[(i64, String)]) -> Result<()> {
        self.with_txn(|tx| {
            let mut statement =
                tx.prepare("INSERT OR IGNORE INTO posts(id, text) VALUES (?1, ?2)")?;
            for (id, text) in posts {
                statement.execute(params![id, text])?;
            }
            Ok(())
        })
    }

    /// Record manual review labels, replacing any earlier review.
    pub fn add_reviewed(&self, reviewed: &[(i64, Sentiment)]) -> Result<()> {
        self.with_txn(|tx| {
            let mut statement =
                tx.prepare("INSERT OR REPLACE INTO reviews(post_id, sentiment) VALUES (?1, ?2)")?;
            for (post_id, label) in reviewed {
                statement.execute(params![post_id, label.to_i64()])?;
            }
            Ok(())
        })
    }

    /// Reviewed `(id, text, label)` triples for the dataset builder.
    pub fn labeled_samples(&self) -> Result<Vec<(i64, String, Option<i64>)>> {
        self.with_txn(|tx| {
            let mut statement = tx.prepare(
                "SELECT p.id, p.text, r.sentiment FROM posts p
                 JOIN reviews r ON r.post_id = p.id ORDER BY p.id",
            )?;
            let rows = statement.query_map([], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })?;
            rows.collect()
        })
    }

    /// Posts with no review yet, for export to manual review.
    pub fn unreviewed_posts(&self) -> Result<Vec<(i64, String)>> {
        self.with_txn(|tx| {
            let mut statement = tx.prepare(
                "SELECT id, text FROM posts
                 WHERE id NOT IN (SELECT post_id FROM reviews) ORDER BY id",
            )?;
            let rows = statement.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
            rows.collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn temp_store() -> (tempfile::TempDir, ResultStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::open(dir.path().join("db").join("results.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_open_creates_directory_and_schema() {
        let (_dir, store) = temp_store();
        assert!(store.path().exists());
        assert!(store.list_models().unwrap().is_empty());
    }

    #[test]
    fn test_upsert_model_is_idempotent() {
        let (_dir, store) = temp_store();
        let first = store.upsert_model("lexicon").unwrap();
        let second = store.upsert_model("lexicon").unwrap();
        assert_eq!(first, second);
        assert_eq!(store.get_model_id("lexicon").unwrap(), Some(first));
        assert_eq!(store.get_model_name(first).unwrap().as_deref(), Some("lexicon"));
    }

    #[test]
    fn test_artifact_path_roundtrip() {
        let (_dir, store) = temp_store();
        let id = store.upsert_model("custom-nb").unwrap();
        store
            .save_artifact_path(id, Path::new("artifacts/custom-nb.json"))
            .unwrap();

        let models = store.list_models().unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(
            models[0].artifact_path.as_deref(),
            Some(Path::new("artifacts/custom-nb.json"))
        );
    }

    #[test]
    fn test_predictions_roundtrip_and_uniqueness() {
        let (_dir, store) = temp_store();
        let id = store.upsert_model("lexicon").unwrap();
        let predictions = vec![(1, Sentiment::Positive), (2, Sentiment::Negative)];
        store.put_predictions(id, Split::Test, &predictions).unwrap();

        assert_eq!(store.get_predictions(id, Split::Test).unwrap(), predictions);
        assert!(store.get_predictions(id, Split::Train).unwrap().is_empty());

        // second write for the same (model, split, sample) triple violates
        // the uniqueness constraint and rolls back
        let err = store
            .put_predictions(id, Split::Test, &[(1, Sentiment::Neutral)])
            .unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert_eq!(store.get_predictions(id, Split::Test).unwrap(), predictions);
    }

    #[test]
    fn test_predictions_require_registered_model() {
        let (_dir, store) = temp_store();
        let err = store
            .put_predictions(999, Split::Test, &[(1, Sentiment::Neutral)])
            .unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[test]
    fn test_metrics_one_row_per_model_split() {
        let (_dir, store) = temp_store();
        let id = store.upsert_model("pattern").unwrap();
        store.put_metrics(id, Split::Train, 0.9, 0.8, 0.7, 0.75).unwrap();
        store.put_metrics(id, Split::Test, 0.6, 0.5, 0.4, 0.45).unwrap();

        let err = store.put_metrics(id, Split::Test, 1.0, 1.0, 1.0, 1.0).unwrap_err();
        assert!(matches!(err, Error::Storage(_)));

        let rows = store.get_metrics_all().unwrap();
        assert_eq!(rows.len(), 2);
        // "test" sorts before "train"
        assert_eq!(rows[0].split, Split::Test);
        assert!((rows[0].accuracy - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_clear_run_leaves_zero_rows() {
        let (_dir, store) = temp_store();
        let id = store.upsert_model("lexicon").unwrap();
        store.put_predictions(id, Split::Train, &[(1, Sentiment::Neutral)]).unwrap();
        store.put_metrics(id, Split::Train, 1.0, 1.0, 1.0, 1.0).unwrap();

        store.clear_run().unwrap();

        assert!(store.list_models().unwrap().is_empty());
        assert!(store.get_metrics_all().unwrap().is_empty());
        assert!(store.get_predictions(id, Split::Train).unwrap().is_empty());
    }

    #[test]
    fn test_clear_run_keeps_review_tables() {
        let (_dir, store) = temp_store();
        store.add_posts(&[(1, "good service".to_string())]).unwrap();
        store.add_reviewed(&[(1, Sentiment::Positive)]).unwrap();

        store.clear_run().unwrap();

        assert_eq!(
            store.labeled_samples().unwrap(),
            vec![(1, "good service".to_string(), Some(1))]
        );
    }

    #[test]
    fn test_review_source() {
        let (_dir, store) = temp_store();
        store
            .add_posts(&[
                (1, "good service".to_string()),
                (2, "bad experience".to_string()),
                (3, "not yet reviewed".to_string()),
            ])
            .unwrap();
        // duplicate post ids are ignored
        store.add_posts(&[(1, "good service again".to_string())]).unwrap();
        store
            .add_reviewed(&[(1, Sentiment::Positive), (2, Sentiment::Negative)])
            .unwrap();

        let labeled = store.labeled_samples().unwrap();
        assert_eq!(labeled.len(), 2);
        assert_eq!(labeled[0], (1, "good service".to_string(), Some(1)));
        assert_eq!(labeled[1], (2, "bad experience".to_string(), Some(-1)));

        assert_eq!(
            store.unreviewed_posts().unwrap(),
            vec![(3, "not yet reviewed".to_string())]
        );
    }
}
