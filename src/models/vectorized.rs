// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Vectorize-then-classify sentiment models.
//!
//! A term-frequency-inverse-document-frequency vectorizer (configurable
//! n-gram span, English stop-word removal, smooth idf, L2 normalization) is
//! fit on training text; the resulting feature vectors feed one of two heads:
//! a generative Gaussian Bayes classifier or a margin-based linear classifier
//! trained on hinge loss. Classification transforms new text through the
//! already-fitted vectorizer.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::dataset::Sentiment;
use crate::models::{tokenize, ModelArtifact, SentimentModel};

const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "cannot", "could", "did", "do", "does", "doing", "down", "during", "each",
    "few", "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its",
    "itself", "just", "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of",
    "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own",
    "same", "she", "should", "so", "some", "such", "than", "that", "the", "their", "theirs",
    "them", "themselves", "then", "there", "these", "they", "this", "those", "through", "to",
    "too", "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
    "yourselves",
];

fn is_stop_word(token: &str) -> bool {
    ENGLISH_STOP_WORDS.contains(&token)
}

/// TF-IDF vectorizer with a configurable n-gram span.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    ngram_range: (usize, usize),
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    pub fn new(ngram_range: (usize, usize)) -> Self {
        Self {
            ngram_range,
            vocabulary: HashMap::new(),
            idf: Vec::new(),
        }
    }

    pub fn ngram_range(&self) -> (usize, usize) {
        self.ngram_range
    }

    pub fn n_features(&self) -> usize {
        self.vocabulary.len()
    }

    fn features(&self, text: &str) -> Vec<String> {
        let tokens: Vec<String> = tokenize(text)
            .into_iter()
            .filter(|t| !is_stop_word(t))
            .collect();

        let (lo, hi) = self.ngram_range;
        let mut features = Vec::new();
        for n in lo.max(1)..=hi {
            for window in tokens.windows(n) {
                features.push(window.join(" "));
            }
        }
        features
    }

    /// Learn the vocabulary and idf weights from the training texts.
    pub fn fit(&mut self, texts: &[String]) {
        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        for text in texts {
            let unique: HashSet<String> = self.features(text).into_iter().collect();
            for feature in unique {
                *document_frequency.entry(feature).or_insert(0) += 1;
            }
        }

        let mut terms: Vec<String> = document_frequency.keys().cloned().collect();
        terms.sort();

        let n_docs = texts.len() as f64;
        self.idf = terms
            .iter()
            .map(|term| ((1.0 + n_docs) / (1.0 + document_frequency[term] as f64)).ln() + 1.0)
            .collect();
        self.vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(index, term)| (term, index))
            .collect();
    }

    /// Map texts into L2-normalized tf-idf vectors using the fitted
    /// vocabulary. Unknown terms are ignored.
    pub fn transform(&self, texts: &[String]) -> Vec<Vec<f64>> {
        texts
            .iter()
            .map(|text| {
                let mut vector = vec![0.0; self.vocabulary.len()];
                for feature in self.features(text) {
                    if let Some(&index) = self.vocabulary.get(&feature) {
                        vector[index] += 1.0;
                    }
                }
                for (value, idf) in vector.iter_mut().zip(self.idf.iter()) {
                    *value *= idf;
                }
                let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
                if norm > 0.0 {
                    for value in vector.iter_mut() {
                        *value /= norm;
                    }
                }
                vector
            })
            .collect()
    }
}

/// Gaussian naive Bayes over dense feature vectors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GaussianNb {
    priors: Vec<f64>,
    theta: Vec<Vec<f64>>,
    variance: Vec<Vec<f64>>,
}

impl GaussianNb {
    pub fn fit(&mut self, x: &[Vec<f64>], y: &[usize], classes: usize) {
        if x.is_empty() {
            return;
        }
        let n_features = x[0].len();
        let n_samples = x.len() as f64;

        // variance floor proportional to the largest feature variance
        let mut grand_mean = vec![0.0; n_features];
        for row in x {
            for (m, v) in grand_mean.iter_mut().zip(row.iter()) {
                *m += v / n_samples;
            }
        }
        let mut max_variance = 0.0f64;
        for feature in 0..n_features {
            let variance = x
                .iter()
                .map(|row| (row[feature] - grand_mean[feature]).powi(2))
                .sum::<f64>()
                / n_samples;
            max_variance = max_variance.max(variance);
        }
        let epsilon = if max_variance > 0.0 {
            1e-9 * max_variance
        } else {
            1e-9
        };

        self.priors = vec![0.0; classes];
        self.theta = vec![vec![0.0; n_features]; classes];
        self.variance = vec![vec![epsilon; n_features]; classes];

        for class in 0..classes {
            let members: Vec<&Vec<f64>> = x
                .iter()
                .zip(y.iter())
                .filter(|(_, label)| **label == class)
                .map(|(row, _)| row)
                .collect();
            if members.is_empty() {
                continue;
            }
            let count = members.len() as f64;
            self.priors[class] = count / n_samples;

            for feature in 0..n_features {
                let mean = members.iter().map(|row| row[feature]).sum::<f64>() / count;
                let variance = members
                    .iter()
                    .map(|row| (row[feature] - mean).powi(2))
                    .sum::<f64>()
                    / count;
                self.theta[class][feature] = mean;
                self.variance[class][feature] = variance + epsilon;
            }
        }
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<usize> {
        x.iter()
            .map(|row| {
                let mut best = 0;
                let mut high = f64::NEG_INFINITY;
                for (class, &prior) in self.priors.iter().enumerate() {
                    if prior == 0.0 {
                        continue;
                    }
                    let mut score = prior.ln();
                    for (feature, value) in row.iter().enumerate() {
                        let variance = self.variance[class][feature];
                        let delta = value - self.theta[class][feature];
                        score += -0.5 * (2.0 * std::f64::consts::PI * variance).ln()
                            - delta * delta / (2.0 * variance);
                    }
                    if score > high {
                        best = class;
                        high = score;
                    }
                }
                best
            })
            .collect()
    }
}

/// One-vs-rest linear classifier trained with SGD on hinge loss.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSvm {
    lambda: f64,
    epochs: usize,
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

impl Default for LinearSvm {
    fn default() -> Self {
        Self {
            lambda: 0.01,
            epochs: 50,
            weights: Vec::new(),
            bias: Vec::new(),
        }
    }
}

impl LinearSvm {
    pub fn fit(&mut self, x: &[Vec<f64>], y: &[usize], classes: usize) {
        if x.is_empty() {
            return;
        }
        let n_features = x[0].len();
        self.weights = vec![vec![0.0; n_features]; classes];
        self.bias = vec![0.0; classes];

        for class in 0..classes {
            let weights = &mut self.weights[class];
            let bias = &mut self.bias[class];
            let mut step = 0usize;

            for _ in 0..self.epochs {
                for (row, label) in x.iter().zip(y.iter()) {
                    step += 1;
                    let eta = 1.0 / (self.lambda * step as f64);
                    let target = if *label == class { 1.0 } else { -1.0 };
                    let margin = target
                        * (weights.iter().zip(row.iter()).map(|(w, v)| w * v).sum::<f64>() + *bias);

                    let decay = 1.0 - eta * self.lambda;
                    for weight in weights.iter_mut() {
                        *weight *= decay;
                    }
                    if margin < 1.0 {
                        for (weight, value) in weights.iter_mut().zip(row.iter()) {
                            *weight += eta * target * value;
                        }
                        *bias += eta * target;
                    }
                }
            }
        }
    }

    fn decision(&self, class: usize, row: &[f64]) -> f64 {
        self.weights[class]
            .iter()
            .zip(row.iter())
            .map(|(w, v)| w * v)
            .sum::<f64>()
            + self.bias[class]
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<usize> {
        x.iter()
            .map(|row| {
                let mut best = 0;
                let mut high = f64::NEG_INFINITY;
                for class in 0..self.weights.len() {
                    let score = self.decision(class, row);
                    if score > high {
                        best = class;
                        high = score;
                    }
                }
                best
            })
            .collect()
    }
}

/// Classifier fed by the vectorizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "head", rename_all = "kebab-case")]
pub enum ClassifierHead {
    Bayes(GaussianNb),
    Margin(LinearSvm),
}

impl ClassifierHead {
    fn fit(&mut self, x: &[Vec<f64>], y: &[usize], classes: usize) {
        match self {
            ClassifierHead::Bayes(nb) => nb.fit(x, y, classes),
            ClassifierHead::Margin(svm) => svm.fit(x, y, classes),
        }
    }

    fn predict(&self, x: &[Vec<f64>]) -> Vec<usize> {
        match self {
            ClassifierHead::Bayes(nb) => nb.predict(x),
            ClassifierHead::Margin(svm) => svm.predict(x),
        }
    }
}

/// Vectorized model: TF-IDF features plus a classifier head. The instance
/// name encodes the head and the n-gram span so configurations stay
/// comparable in the result store.
#[derive(Debug, Clone)]
pub struct TfidfModel {
    name: String,
    vectorizer: TfidfVectorizer,
    head: ClassifierHead,
}

impl TfidfModel {
    pub fn bayes(ngram_range: (usize, usize)) -> Self {
        Self {
            name: format!("tfidf-nb ({},{})", ngram_range.0, ngram_range.1),
            vectorizer: TfidfVectorizer::new(ngram_range),
            head: ClassifierHead::Bayes(GaussianNb::default()),
        }
    }

    pub fn margin(ngram_range: (usize, usize)) -> Self {
        Self {
            name: format!("tfidf-svm ({},{})", ngram_range.0, ngram_range.1),
            vectorizer: TfidfVectorizer::new(ngram_range),
            head: ClassifierHead::Margin(LinearSvm::default()),
        }
    }

    pub fn from_state(name: String, vectorizer: TfidfVectorizer, head: ClassifierHead) -> Self {
        Self {
            name,
            vectorizer,
            head,
        }
    }
}

impl SentimentModel for TfidfModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn train(&mut self, texts: &[String], labels: &[Sentiment]) {
        self.vectorizer.fit(texts);
        let x = self.vectorizer.transform(texts);
        let y: Vec<usize> = labels.iter().map(|label| label.index()).collect();
        self.head.fit(&x, &y, Sentiment::ALL.len());
    }

    fn classify(&self, texts: &[String]) -> Vec<Sentiment> {
        if self.vectorizer.n_features() == 0 {
            return vec![Sentiment::Neutral; texts.len()];
        }
        let x = self.vectorizer.transform(texts);
        self.head
            .predict(&x)
            .into_iter()
            .map(|class| Sentiment::ALL[class])
            .collect()
    }

    fn snapshot(&self) -> ModelArtifact {
        ModelArtifact::Tfidf {
            name: self.name.clone(),
            vectorizer: self.vectorizer.clone(),
            head: self.head.clone(),
        }
    }
}
