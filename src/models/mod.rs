// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Sentiment classification models.
//!
//! Implements one capability contract over four strategy families:
//! - Lexicon scoring (fixed valence lexicon, no training)
//! - Pattern scoring (fixed polarity patterns, no training)
//! - Naive Bayes fit on a built-in corpus or on the provided data
//! - TF-IDF vectorization feeding a Bayes or margin-based head
//!
//! The orchestrator only ever sees `dyn SentimentModel`; variant-specific
//! configuration is captured in the instance name at construction time.

pub mod artifact;
pub mod bayes;
pub mod lexicon;
pub mod pattern;
pub mod vectorized;

pub use artifact::ModelArtifact;
pub use bayes::{CorpusNbModel, CustomNbModel};
pub use lexicon::LexiconModel;
pub use pattern::PatternModel;
pub use vectorized::{TfidfModel, TfidfVectorizer};

use crate::dataset::Sentiment;

/// Capability contract shared by every classification strategy.
pub trait SentimentModel {
    /// Unique human-readable identifier encoding strategy and hyperparameters.
    fn name(&self) -> &str;

    /// Fit the model on the given texts and labels.
    ///
    /// Strategies that require no fitting keep this default, which logs an
    /// explicit notice and changes nothing.
    fn train(&mut self, _texts: &[String], _labels: &[Sentiment]) {
        tracing::info!("{}: training unavailable", self.name());
    }

    /// Classify a batch of texts.
    fn classify(&self, texts: &[String]) -> Vec<Sentiment>;

    /// Serializable trained state for the artifact store.
    fn snapshot(&self) -> ModelArtifact;
}

/// Shared tie-break rule for converting a continuous polarity score into a
/// discrete label. Boundary-inclusive on both sides.
pub fn sentiment_score(score: f64) -> Sentiment {
    if score >= 0.5 {
        Sentiment::Positive
    } else if score <= -0.5 {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// Lowercased alphanumeric tokens of at least two characters.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| s.len() >= 2)
        .map(str::to_string)
        .collect()
}

/// The full fresh strategy set, all untrained.
pub fn fresh_models() -> Vec<Box<dyn SentimentModel>> {
    vec![
        Box::new(LexiconModel::new()),
        Box::new(PatternModel::new()),
        Box::new(CorpusNbModel::new()),
        Box::new(CustomNbModel::new()),
        Box::new(TfidfModel::bayes((1, 1))),
        Box::new(TfidfModel::bayes((1, 2))),
        Box::new(TfidfModel::margin((1, 1))),
        Box::new(TfidfModel::margin((1, 2))),
    ]
}

/// Rebuild a model instance from its stored artifact.
pub fn restore(artifact: ModelArtifact) -> Box<dyn SentimentModel> {
    match artifact {
        ModelArtifact::Lexicon => Box::new(LexiconModel::new()),
        ModelArtifact::Pattern => Box::new(PatternModel::new()),
        ModelArtifact::CorpusNb { model } => Box::new(CorpusNbModel::from_state(model)),
        ModelArtifact::CustomNb { model } => Box::new(CustomNbModel::from_state(model)),
        ModelArtifact::Tfidf {
            name,
            vectorizer,
            head,
        } => Box::new(TfidfModel::from_state(name, vectorizer, head)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_rule_boundaries() {
        assert_eq!(sentiment_score(0.5), Sentiment::Positive);
        assert_eq!(sentiment_score(-0.5), Sentiment::Negative);
        assert_eq!(sentiment_score(0.4999), Sentiment::Neutral);
        assert_eq!(sentiment_score(-0.4999), Sentiment::Neutral);
        assert_eq!(sentiment_score(0.0), Sentiment::Neutral);
        assert_eq!(sentiment_score(1.0), Sentiment::Positive);
        assert_eq!(sentiment_score(-1.0), Sentiment::Negative);
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("Good, SERVICE!"), vec!["good", "service"]);
        assert_eq!(tokenize("a I ok"), vec!["ok"]);
        assert!(tokenize("!!!").is_empty());
    }

    #[test]
    fn test_fresh_models_roster() {
        let models = fresh_models();
        let names: Vec<&str> = models.iter().map(|m| m.name()).collect();
        assert_eq!(
            names,
            vec![
                "lexicon",
                "pattern",
                "corpus-nb",
                "custom-nb",
                "tfidf-nb (1,1)",
                "tfidf-nb (1,2)",
                "tfidf-svm (1,1)",
                "tfidf-svm (1,2)",
            ]
        );
    }

    #[test]
    fn test_restore_preserves_name() {
        for model in fresh_models() {
            let restored = restore(model.snapshot());
            assert_eq!(restored.name(), model.name());
        }
    }
}
