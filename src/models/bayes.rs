// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Naive Bayes sentiment models.
//!
//! Two strategies share one multinomial core:
//! - `CorpusNbModel` ignores the provided training data and fits once against
//!   a fixed built-in corpus, classifying by positive vs. negative posterior.
//! - `CustomNbModel` fits three-class on the provided (text, label) pairs and
//!   returns the highest-posterior class.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::dataset::Sentiment;
use crate::models::{tokenize, ModelArtifact, SentimentModel};

/// Multinomial naive Bayes over token counts with Laplace smoothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NaiveBayes {
    token_counts: Vec<HashMap<String, usize>>,
    total_tokens: Vec<usize>,
    doc_counts: Vec<usize>,
    vocabulary: HashSet<String>,
}

impl NaiveBayes {
    pub fn fit(classes: usize, documents: &[(Vec<String>, usize)]) -> Self {
        let mut model = Self {
            token_counts: vec![HashMap::new(); classes],
            total_tokens: vec![0; classes],
            doc_counts: vec![0; classes],
            vocabulary: HashSet::new(),
        };

        for (tokens, class) in documents {
            model.doc_counts[*class] += 1;
            for token in tokens {
                *model.token_counts[*class].entry(token.clone()).or_insert(0) += 1;
                model.total_tokens[*class] += 1;
                model.vocabulary.insert(token.clone());
            }
        }

        model
    }

    pub fn is_fitted(&self) -> bool {
        self.doc_counts.iter().sum::<usize>() > 0
    }

    /// Log posterior per class (up to a shared constant).
    pub fn log_posteriors(&self, tokens: &[String]) -> Vec<f64> {
        let total_docs: usize = self.doc_counts.iter().sum();
        let vocab_size = self.vocabulary.len() as f64;

        self.doc_counts
            .iter()
            .enumerate()
            .map(|(class, &docs)| {
                if docs == 0 {
                    return f64::NEG_INFINITY;
                }
                let mut score = (docs as f64 / total_docs as f64).ln();
                let denominator = self.total_tokens[class] as f64 + vocab_size;
                for token in tokens {
                    let count = self.token_counts[class].get(token).copied().unwrap_or(0);
                    score += ((count as f64 + 1.0) / denominator).ln();
                }
                score
            })
            .collect()
    }
}

/// Small fixed review corpus the pretrained model fits against.
const BUILT_IN_CORPUS: &[(&str, bool)] = &[
    ("a wonderful experience from start to finish", true),
    ("the staff were friendly and genuinely helpful", true),
    ("great value and a great result, would recommend", true),
    ("everything went smoothly and on time", true),
    ("an excellent service, polite and quick", true),
    ("i love how easy the whole process was", true),
    ("really happy with the outcome, thank you", true),
    ("the best decision i made this year", true),
    ("clear information and a painless appointment", true),
    ("brilliant organisation, felt safe the whole time", true),
    ("top marks, a smooth and pleasant visit", true),
    ("fantastic team, they answered every question", true),
    ("a terrible experience, i want my time back", false),
    ("the staff were rude and completely unhelpful", false),
    ("awful organisation, nobody knew anything", false),
    ("everything ran late and nothing worked", false),
    ("a horrible service, slow and chaotic", false),
    ("i hate how confusing the whole process was", false),
    ("really disappointed with the outcome", false),
    ("the worst decision i made this year", false),
    ("vague information and a painful appointment", false),
    ("dreadful queues, felt unsafe the whole time", false),
    ("a complete waste of an afternoon", false),
    ("useless team, they ignored every question", false),
];

const NEGATIVE: usize = 0;
const POSITIVE: usize = 1;

/// Probabilistic model fit once against the built-in corpus.
#[derive(Debug, Clone)]
pub struct CorpusNbModel {
    nb: NaiveBayes,
}

impl CorpusNbModel {
    pub fn new() -> Self {
        Self {
            nb: Self::fit_corpus(),
        }
    }

    pub fn from_state(nb: NaiveBayes) -> Self {
        Self { nb }
    }

    fn fit_corpus() -> NaiveBayes {
        let documents: Vec<(Vec<String>, usize)> = BUILT_IN_CORPUS
            .iter()
            .map(|(text, positive)| {
                (
                    tokenize(text),
                    if *positive { POSITIVE } else { NEGATIVE },
                )
            })
            .collect();
        NaiveBayes::fit(2, &documents)
    }
}

impl Default for CorpusNbModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentModel for CorpusNbModel {
    fn name(&self) -> &str {
        "corpus-nb"
    }

    fn train(&mut self, _texts: &[String], _labels: &[Sentiment]) {
        // Provided data is ignored; the model fits its built-in corpus.
        tracing::info!("{}: fitting built-in corpus", self.name());
        self.nb = Self::fit_corpus();
    }

    fn classify(&self, texts: &[String]) -> Vec<Sentiment> {
        texts
            .iter()
            .map(|text| {
                let posteriors = self.nb.log_posteriors(&tokenize(text));
                if posteriors[POSITIVE] > posteriors[NEGATIVE] {
                    Sentiment::Positive
                } else if posteriors[POSITIVE] < posteriors[NEGATIVE] {
                    Sentiment::Negative
                } else {
                    Sentiment::Neutral
                }
            })
            .collect()
    }

    fn snapshot(&self) -> ModelArtifact {
        ModelArtifact::CorpusNb {
            model: self.nb.clone(),
        }
    }
}

/// Three-class Bayes classifier fit on the provided data.
#[derive(Debug, Clone, Default)]
pub struct CustomNbModel {
    nb: NaiveBayes,
}

impl CustomNbModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(nb: NaiveBayes) -> Self {
        Self { nb }
    }
}

impl SentimentModel for CustomNbModel {
    fn name(&self) -> &str {
        "custom-nb"
    }

    fn train(&mut self, texts: &[String], labels: &[Sentiment]) {
        let documents: Vec<(Vec<String>, usize)> = texts
            .iter()
            .zip(labels.iter())
            .map(|(text, label)| (tokenize(text), label.index()))
            .collect();
        self.nb = NaiveBayes::fit(3, &documents);
    }

    fn classify(&self, texts: &[String]) -> Vec<Sentiment> {
        texts
            .iter()
            .map(|text| {
                if !self.nb.is_fitted() {
                    return Sentiment::Neutral;
                }
                let posteriors = self.nb.log_posteriors(&tokenize(text));
                // stable argmax: on an exact tie the lowest class wins
                let (best, _) = posteriors.iter().enumerate().fold(
                    (0, f64::NEG_INFINITY),
                    |(best, high), (class, &score)| {
                        if score > high {
                            (class, score)
                        } else {
                            (best, high)
                        }
                    },
                );
                Sentiment::ALL[best]
            })
            .collect()
    }

    fn snapshot(&self) -> ModelArtifact {
        ModelArtifact::CustomNb {
            model: self.nb.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_naive_bayes_separates_classes() {
        let documents = vec![
            (tokenize("great happy wonderful"), 1),
            (tokenize("great nice day"), 1),
            (tokenize("awful terrible sad"), 0),
            (tokenize("terrible horrible day"), 0),
        ];
        let nb = NaiveBayes::fit(2, &documents);

        let positive = nb.log_posteriors(&tokenize("a great wonderful thing"));
        assert!(positive[1] > positive[0]);

        let negative = nb.log_posteriors(&tokenize("a terrible awful thing"));
        assert!(negative[0] > negative[1]);
    }

    #[test]
    fn test_unfitted_class_never_wins() {
        let documents = vec![(tokenize("great"), 1)];
        let nb = NaiveBayes::fit(2, &documents);
        let posteriors = nb.log_posteriors(&tokenize("anything"));
        assert_eq!(posteriors[0], f64::NEG_INFINITY);
        assert!(posteriors[1] > posteriors[0]);
    }

    #[test]
    fn test_corpus_model_ignores_provided_data() {
        let mut model = CorpusNbModel::new();
        let probe = vec!["a wonderful friendly helpful visit".to_string()];
        let before = model.classify(&probe);

        // Adversarial training data must not change the fitted corpus.
        model.train(
            &["wonderful".to_string(), "friendly".to_string()],
            &[Sentiment::Negative, Sentiment::Negative],
        );
        assert_eq!(model.classify(&probe), before);
        assert_eq!(before, vec![Sentiment::Positive]);
    }

    #[test]
    fn test_corpus_model_negative_posterior() {
        let model = CorpusNbModel::new();
        let predictions = model.classify(&["a terrible rude awful experience".to_string()]);
        assert_eq!(predictions, vec![Sentiment::Negative]);
    }

    #[test]
    fn test_custom_model_learns_provided_pairs() {
        let mut model = CustomNbModel::new();
        let texts = vec![
            "great happy wonderful service".to_string(),
            "lovely great staff".to_string(),
            "awful terrible experience".to_string(),
            "horrible terrible queue".to_string(),
            "an average ordinary day".to_string(),
            "ordinary average visit".to_string(),
        ];
        let labels = vec![
            Sentiment::Positive,
            Sentiment::Positive,
            Sentiment::Negative,
            Sentiment::Negative,
            Sentiment::Neutral,
            Sentiment::Neutral,
        ];
        model.train(&texts, &labels);

        assert_eq!(
            model.classify(&["great wonderful staff".to_string()]),
            vec![Sentiment::Positive]
        );
        assert_eq!(
            model.classify(&["terrible awful queue".to_string()]),
            vec![Sentiment::Negative]
        );
        assert_eq!(
            model.classify(&["an ordinary day".to_string()]),
            vec![Sentiment::Neutral]
        );
    }

    #[test]
    fn test_custom_model_untrained_defaults_to_neutral() {
        let model = CustomNbModel::new();
        assert_eq!(
            model.classify(&["anything".to_string()]),
            vec![Sentiment::Neutral]
        );
    }
}
