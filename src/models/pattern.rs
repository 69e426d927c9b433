// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Pattern-based sentiment model.
//!
//! Averages the polarity of matched pattern-lexicon entries, with intensifier
//! and negation handling on the preceding token. Polarities live on [-1, 1]
//! already, so the mean feeds the shared threshold rule directly. No training
//! step.

use crate::dataset::Sentiment;
use crate::models::{sentiment_score, tokenize, ModelArtifact, SentimentModel};

/// Word polarities on [-1, 1].
const POLARITY: &[(&str, f64)] = &[
    ("amazing", 0.6),
    ("angry", -0.5),
    ("awful", -1.0),
    ("bad", -0.7),
    ("best", 1.0),
    ("better", 0.5),
    ("delayed", -0.3),
    ("disappointed", -0.75),
    ("excellent", 1.0),
    ("fine", 0.42),
    ("glad", 0.5),
    ("good", 0.7),
    ("great", 0.8),
    ("happy", 0.8),
    ("hate", -0.8),
    ("horrible", -1.0),
    ("love", 0.5),
    ("nice", 0.6),
    ("ok", 0.5),
    ("okay", 0.5),
    ("painful", -0.7),
    ("perfect", 1.0),
    ("poor", -0.4),
    ("sad", -0.5),
    ("safe", 0.5),
    ("scared", -0.6),
    ("sick", -0.7),
    ("slow", -0.3),
    ("terrible", -1.0),
    ("useless", -0.5),
    ("wonderful", 1.0),
    ("worst", -1.0),
    ("wrong", -0.5),
];

/// Intensity multipliers applied to the following lexicon word.
const INTENSIFIERS: &[(&str, f64)] = &[
    ("extremely", 1.5),
    ("really", 1.3),
    ("so", 1.2),
    ("too", 1.3),
    ("very", 1.3),
];

const NEGATIONS: &[&str] = &["not", "no", "never", "cannot", "cant", "dont", "isnt", "wasnt"];

/// Negation halves the magnitude and flips the sign.
const NEGATION_FACTOR: f64 = -0.5;

fn polarity(token: &str) -> Option<f64> {
    POLARITY
        .binary_search_by(|(word, _)| word.cmp(&token))
        .ok()
        .map(|i| POLARITY[i].1)
}

fn intensity(token: &str) -> Option<f64> {
    INTENSIFIERS
        .iter()
        .find(|(word, _)| *word == token)
        .map(|(_, factor)| *factor)
}

#[derive(Debug, Clone, Default)]
pub struct PatternModel;

impl PatternModel {
    pub fn new() -> Self {
        Self
    }

    /// Mean polarity of matched entries, 0.0 when nothing matches.
    pub fn polarity(&self, text: &str) -> f64 {
        let tokens = tokenize(text);
        let mut matched = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            let Some(mut score) = polarity(token) else {
                continue;
            };
            if let Some(previous) = i.checked_sub(1).map(|p| tokens[p].as_str()) {
                if let Some(factor) = intensity(previous) {
                    score = (score * factor).clamp(-1.0, 1.0);
                } else if NEGATIONS.contains(&previous) {
                    score *= NEGATION_FACTOR;
                }
            }
            matched.push(score);
        }

        if matched.is_empty() {
            return 0.0;
        }
        matched.iter().sum::<f64>() / matched.len() as f64
    }
}

impl SentimentModel for PatternModel {
    fn name(&self) -> &str {
        "pattern"
    }

    fn classify(&self, texts: &[String]) -> Vec<Sentiment> {
        texts
            .iter()
            .map(|text| sentiment_score(self.polarity(text)))
            .collect()
    }

    fn snapshot(&self) -> ModelArtifact {
        ModelArtifact::Pattern
    }
}
