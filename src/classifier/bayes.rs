//! Multinomial naive Bayes classifier
//!
//! Generative model over term counts: per-class term-frequency
//! distributions estimated with additive smoothing, empirical class
//! priors, classification by maximum posterior. All arithmetic happens
//! in log space; the posterior is normalized with log-sum-exp so a
//! vector with no known terms falls back to the prior distribution
//! instead of producing NaN.

use anyhow::{bail, Result};

use crate::classifier::vectorizer::SparseVector;
use crate::models::Label;

/// The fixed class order used for priors, term distributions, and the
/// output of [`MultinomialNb::predict_proba`].
pub const CLASSES: [Label; 2] = [Label::Fake, Label::Real];

/// Trained multinomial naive Bayes parameters.
#[derive(Debug, Clone)]
pub struct MultinomialNb {
    /// log P(class), indexed as [`CLASSES`]
    class_log_priors: [f64; 2],
    /// log P(term | class), indexed [class][term]
    term_log_probs: [Vec<f64>; 2],
}

impl MultinomialNb {
    /// Fit the model on vectorized training documents.
    ///
    /// `alpha` is the additive smoothing strength applied to every term
    /// count; it must be positive. Vectors and labels must be parallel
    /// and non-empty. A class absent from the labels gets a zero prior
    /// and can never win the posterior, which is the correct degenerate
    /// behavior for a single-class training partition.
    pub fn fit(
        vectors: &[SparseVector],
        labels: &[Label],
        vocabulary_size: usize,
        alpha: f64,
    ) -> Result<Self> {
        if vectors.len() != labels.len() {
            bail!(
                "Vector/label length mismatch: {} vectors, {} labels",
                vectors.len(),
                labels.len()
            );
        }
        if vectors.is_empty() {
            bail!("Cannot fit a classifier on an empty training set");
        }
        if alpha <= 0.0 {
            bail!("Smoothing strength must be positive, got {}", alpha);
        }

        let mut class_counts = [0usize; 2];
        let mut term_counts = [
            vec![0u64; vocabulary_size],
            vec![0u64; vocabulary_size],
        ];
        let mut total_counts = [0u64; 2];

        for (vector, label) in vectors.iter().zip(labels) {
            let class = class_index(*label);
            class_counts[class] += 1;
            for &(term, count) in vector {
                term_counts[class][term] += u64::from(count);
                total_counts[class] += u64::from(count);
            }
        }

        let n = vectors.len() as f64;
        let class_log_priors =
            [0usize, 1].map(|class| (class_counts[class] as f64 / n).ln());

        let term_log_probs = [0usize, 1].map(|class| {
            let denominator =
                total_counts[class] as f64 + alpha * vocabulary_size as f64;
            term_counts[class]
                .iter()
                .map(|&count| ((count as f64 + alpha) / denominator).ln())
                .collect()
        });

        Ok(Self {
            class_log_priors,
            term_log_probs,
        })
    }

    /// Predict the label with the highest posterior probability.
    ///
    /// Ties break toward FAKE, the first class in [`CLASSES`], so the
    /// outcome is deterministic.
    pub fn predict(&self, vector: &SparseVector) -> Label {
        let joint = self.joint_log_likelihood(vector);
        if joint[1] > joint[0] {
            Label::Real
        } else {
            Label::Fake
        }
    }

    /// Posterior distribution over [`CLASSES`].
    ///
    /// The result always sums to 1.0 up to floating-point tolerance,
    /// even for a vector with no known terms (where it equals the
    /// class priors).
    pub fn predict_proba(&self, vector: &SparseVector) -> [f64; 2] {
        let joint = self.joint_log_likelihood(vector);

        // log-sum-exp normalization
        let max = if joint[0] > joint[1] { joint[0] } else { joint[1] };
        let exp = [(joint[0] - max).exp(), (joint[1] - max).exp()];
        let sum = exp[0] + exp[1];

        [exp[0] / sum, exp[1] / sum]
    }

    /// Predicted label together with its posterior probability.
    pub fn predict_with_confidence(&self, vector: &SparseVector) -> (Label, f64) {
        let proba = self.predict_proba(vector);
        if proba[1] > proba[0] {
            (Label::Real, proba[1])
        } else {
            (Label::Fake, proba[0])
        }
    }

    fn joint_log_likelihood(&self, vector: &SparseVector) -> [f64; 2] {
        [0usize, 1].map(|class| {
            let mut log_likelihood = self.class_log_priors[class];
            for &(term, count) in vector {
                log_likelihood += f64::from(count) * self.term_log_probs[class][term];
            }
            log_likelihood
        })
    }
}

fn class_index(label: Label) -> usize {
    match label {
        Label::Fake => 0,
        Label::Real => 1,
    }
}
