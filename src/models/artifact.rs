// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Serialized trained state of a model instance.
//!
//! One JSON file per trained model, written after training and read back at
//! orchestration start when resuming. The artifact is independent of the raw
//! training data.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::bayes::NaiveBayes;
use crate::models::vectorized::{ClassifierHead, TfidfVectorizer};

/// Tagged trained state, one variant per strategy family.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ModelArtifact {
    /// Lexicon scoring carries no trained state.
    Lexicon,
    /// Pattern scoring carries no trained state.
    Pattern,
    CorpusNb {
        model: NaiveBayes,
    },
    CustomNb {
        model: NaiveBayes,
    },
    Tfidf {
        name: String,
        vectorizer: TfidfVectorizer,
        head: ClassifierHead,
    },
}

impl ModelArtifact {
    /// Write the artifact as pretty JSON, creating the directory on first use.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::artifact_save(path, e))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| Error::artifact_save(path, e))?;
        fs::write(path, json).map_err(|e| Error::artifact_save(path, e))?;
        Ok(())
    }

    /// Read an artifact back from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| Error::artifact_load(path, e))?;
        serde_json::from_slice(&bytes).map_err(|e| Error::artifact_load(path, e))
    }
}
