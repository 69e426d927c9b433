// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Error types for the sentiment evaluation pipeline.
//!
//! Fatal conditions (`DatasetEmpty`, storage failure during the wipe) abort a
//! run before any destructive write. Everything else is recoverable: the
//! orchestrator logs it at the point of occurrence and continues with a
//! degraded model set or partial results.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The main error type for pipeline operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No labeled samples are available. Fatal: the run aborts before the
    /// result tables are wiped.
    #[error("no labeled samples available")]
    DatasetEmpty,

    /// A cached model artifact could not be read or deserialized. The model
    /// is dropped from the resumed set.
    #[error("failed to load model artifact {path}: {reason}")]
    ArtifactLoad { path: PathBuf, reason: String },

    /// A trained model artifact could not be written. The model stays usable
    /// in-memory but uncached for future runs.
    #[error("failed to save model artifact {path}: {reason}")]
    ArtifactSave { path: PathBuf, reason: String },

    /// Result store errors
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// I/O errors (artifact files, CSV import/export)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parsing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for operations that may fail with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn artifact_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::ArtifactLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn artifact_save(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::ArtifactSave {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
