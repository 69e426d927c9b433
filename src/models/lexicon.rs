// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Lexicon-based sentiment model.
//!
//! Scores text with a fixed valence lexicon: token valences are summed, with
//! a sign flip when a negation appears in the preceding window, and the sum
//! is normalized into a compound score in [-1, 1]. No training step.

use crate::dataset::Sentiment;
use crate::models::{sentiment_score, tokenize, ModelArtifact, SentimentModel};

/// Valences on the lexicon's native [-4, 4] scale.
const LEXICON: &[(&str, f64)] = &[
    ("afraid", -2.2),
    ("amazing", 2.8),
    ("angry", -2.3),
    ("anxious", -1.7),
    ("awesome", 3.1),
    ("awful", -2.0),
    ("bad", -2.5),
    ("best", 3.2),
    ("better", 1.9),
    ("brilliant", 2.8),
    ("calm", 1.3),
    ("cancelled", -1.2),
    ("care", 2.2),
    ("crisis", -2.4),
    ("dangerous", -2.1),
    ("dead", -3.3),
    ("death", -2.9),
    ("delay", -1.2),
    ("die", -2.9),
    ("disappointed", -2.1),
    ("disaster", -3.1),
    ("effective", 2.1),
    ("excellent", 2.7),
    ("excited", 2.3),
    ("fail", -2.5),
    ("failed", -2.3),
    ("fake", -1.9),
    ("fantastic", 2.6),
    ("fear", -2.2),
    ("fine", 0.8),
    ("glad", 2.0),
    ("good", 1.9),
    ("grateful", 2.3),
    ("great", 3.1),
    ("happy", 2.7),
    ("hate", -2.7),
    ("healthy", 1.7),
    ("hoax", -1.7),
    ("hope", 1.9),
    ("hopeful", 1.8),
    ("horrible", -2.5),
    ("hurt", -2.4),
    ("lie", -1.8),
    ("lies", -1.8),
    ("love", 3.2),
    ("nice", 1.8),
    ("ok", 0.9),
    ("okay", 0.9),
    ("pain", -2.3),
    ("panic", -2.0),
    ("perfect", 2.7),
    ("poor", -1.9),
    ("problem", -1.7),
    ("protected", 1.3),
    ("refuse", -1.5),
    ("relief", 1.6),
    ("relieved", 1.7),
    ("sad", -2.1),
    ("safe", 1.9),
    ("scam", -2.2),
    ("scared", -1.9),
    ("sick", -1.7),
    ("terrible", -2.1),
    ("thank", 1.5),
    ("thanks", 1.9),
    ("trust", 2.1),
    ("well", 1.1),
    ("wonderful", 2.7),
    ("worried", -1.5),
    ("worry", -1.6),
    ("worst", -3.1),
    ("wrong", -2.1),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "neither", "nor", "cannot", "cant", "dont", "doesnt", "didnt", "isnt",
    "wasnt", "wont", "wouldnt",
];

/// Negated valences keep a dampened fraction of their magnitude.
const NEGATION_FACTOR: f64 = -0.74;

/// Normalization constant mapping the valence sum into [-1, 1].
const NORMALIZATION_ALPHA: f64 = 15.0;

fn valence(token: &str) -> Option<f64> {
    LEXICON
        .binary_search_by(|(word, _)| word.cmp(&token))
        .ok()
        .map(|i| LEXICON[i].1)
}

fn is_negation(token: &str) -> bool {
    NEGATIONS.contains(&token)
}

#[derive(Debug, Clone, Default)]
pub struct LexiconModel;

impl LexiconModel {
    pub fn new() -> Self {
        Self
    }

    /// Compound polarity score in [-1, 1].
    pub fn compound(&self, text: &str) -> f64 {
        let tokens = tokenize(text);
        let mut sum = 0.0;

        for (i, token) in tokens.iter().enumerate() {
            let Some(mut valence) = valence(token) else {
                continue;
            };
            let window = &tokens[i.saturating_sub(3)..i];
            if window.iter().any(|t| is_negation(t)) {
                valence *= NEGATION_FACTOR;
            }
            sum += valence;
        }

        if sum == 0.0 {
            return 0.0;
        }
        (sum / (sum * sum + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0)
    }
}

impl SentimentModel for LexiconModel {
    fn name(&self) -> &str {
        "lexicon"
    }

    fn classify(&self, texts: &[String]) -> Vec<Sentiment> {
        texts
            .iter()
            .map(|text| sentiment_score(self.compound(text)))
            .collect()
    }

    fn snapshot(&self) -> ModelArtifact {
        ModelArtifact::Lexicon
    }
}
