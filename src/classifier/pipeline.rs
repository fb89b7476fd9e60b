//! Training pipeline
//!
//! Orchestrates a full training run: concatenates each record's title and
//! content into one document, performs a seeded 80/20 train/test split,
//! fits the vectorizer on the training partition only, fits the naive
//! Bayes model on the vectorized partition, and measures accuracy on the
//! held-out 20%.
//!
//! The split is reproducible: the same dataset and seed always produce
//! the same partition, the same accuracy number, and the same fitted
//! parameters. Retraining over the same artifacts must be serialized by
//! the caller; the pipeline itself only returns in-memory artifacts.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::classifier::bayes::MultinomialNb;
use crate::classifier::vectorizer::CountVectorizer;
use crate::dataset::NewsRecord;
use crate::models::Label;

/// Minimum number of records needed to form a meaningful split.
pub const MIN_TRAINING_RECORDS: usize = 5;

/// Fraction of the dataset held out for accuracy measurement.
const TEST_FRACTION: f64 = 0.2;

/// Fatal training configuration errors.
///
/// These indicate a deployment misconfiguration (an unusable dataset),
/// not a recoverable runtime condition, and abort startup.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error(
        "Training dataset has {0} record(s); at least {MIN_TRAINING_RECORDS} are required"
    )]
    DatasetTooSmall(usize),

    #[error("Training dataset contains a single label class; both FAKE and REAL examples are required")]
    SingleClass,

    #[error("Smoothing strength must be positive, got {0}")]
    InvalidSmoothing(f64),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Training options.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    /// Additive smoothing strength for the naive Bayes model
    pub alpha: f64,
    /// Seed for the reproducible train/test split
    pub seed: u64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            seed: 42,
        }
    }
}

/// A label with the posterior probability the model assigned to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    /// Predicted label
    pub label: Label,
    /// Posterior of the predicted label, in [0.5, 1.0] for a two-class model
    pub confidence: f64,
}

/// The artifacts of a training run.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    vectorizer: CountVectorizer,
    classifier: MultinomialNb,
    accuracy: f64,
}

impl TrainedModel {
    /// Fraction of held-out records classified correctly
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    /// Predict the label for raw text
    pub fn predict(&self, text: &str) -> Label {
        self.classifier.predict(&self.vectorizer.transform(text))
    }

    /// Posterior probability of the predicted label for raw text
    pub fn predict_confidence(&self, text: &str) -> f64 {
        let (_, confidence) = self
            .classifier
            .predict_with_confidence(&self.vectorizer.transform(text));
        confidence
    }

    /// Classify an article the way submissions are classified: title and
    /// content concatenated into one document.
    pub fn classify(&self, title: &str, content: &str) -> Classification {
        let document = combine(title, content);
        let (label, confidence) = self
            .classifier
            .predict_with_confidence(&self.vectorizer.transform(&document));
        Classification { label, confidence }
    }
}

/// Run the full training pipeline over a labeled dataset.
pub fn train(
    records: &[NewsRecord],
    options: &TrainOptions,
) -> Result<TrainedModel, TrainingError> {
    if records.len() < MIN_TRAINING_RECORDS {
        return Err(TrainingError::DatasetTooSmall(records.len()));
    }
    let has_fake = records.iter().any(|r| r.label == Label::Fake);
    let has_real = records.iter().any(|r| r.label == Label::Real);
    if !(has_fake && has_real) {
        return Err(TrainingError::SingleClass);
    }
    if options.alpha <= 0.0 {
        return Err(TrainingError::InvalidSmoothing(options.alpha));
    }

    // Reproducible shuffle, then hold out the leading 20%
    let mut indices: Vec<usize> = (0..records.len()).collect();
    let mut rng = StdRng::seed_from_u64(options.seed);
    indices.shuffle(&mut rng);

    let test_len = ((records.len() as f64) * TEST_FRACTION).round() as usize;
    let test_len = test_len.clamp(1, records.len() - 1);
    let (test_indices, train_indices) = indices.split_at(test_len);

    let train_documents: Vec<String> = train_indices
        .iter()
        .map(|&i| combine(&records[i].title, &records[i].content))
        .collect();
    let train_labels: Vec<Label> =
        train_indices.iter().map(|&i| records[i].label).collect();

    let vectorizer = CountVectorizer::fit(&train_documents);
    let train_vectors: Vec<_> = train_documents
        .iter()
        .map(|doc| vectorizer.transform(doc))
        .collect();

    let classifier = MultinomialNb::fit(
        &train_vectors,
        &train_labels,
        vectorizer.vocabulary_size(),
        options.alpha,
    )?;

    let correct = test_indices
        .iter()
        .filter(|&&i| {
            let document = combine(&records[i].title, &records[i].content);
            classifier.predict(&vectorizer.transform(&document)) == records[i].label
        })
        .count();
    let accuracy = correct as f64 / test_len as f64;

    Ok(TrainedModel {
        vectorizer,
        classifier,
        accuracy,
    })
}

fn combine(title: &str, content: &str) -> String {
    format!("{} {}", title, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, content: &str, label: Label) -> NewsRecord {
        NewsRecord {
            title: title.to_string(),
            content: content.to_string(),
            label,
        }
    }

    /// 5 FAKE records all mentioning aliens, 5 REAL records that don't.
    fn alien_dataset() -> Vec<NewsRecord> {
        vec![
            record("Shock claim", "aliens landed in ohio overnight", Label::Fake),
            record("Exposed", "aliens control the federal reserve", Label::Fake),
            record("Cover up", "government hides aliens in desert base", Label::Fake),
            record("Revealed", "aliens replaced the town council", Label::Fake),
            record("Insider", "aliens built the ancient pyramids", Label::Fake),
            record("City news", "council passes annual budget vote", Label::Real),
            record("Economy", "central bank holds interest rates steady", Label::Real),
            record("Local", "library extends weekend opening hours", Label::Real),
            record("Weather", "rain expected across the region tomorrow", Label::Real),
            record("Sports", "home team wins the league final", Label::Real),
        ]
    }

    #[test]
    fn test_train_rejects_tiny_dataset() {
        let records = vec![
            record("a", "b", Label::Fake),
            record("c", "d", Label::Real),
        ];
        let result = train(&records, &TrainOptions::default());
        assert!(matches!(result, Err(TrainingError::DatasetTooSmall(2))));
    }

    #[test]
    fn test_train_rejects_single_class_dataset() {
        let records: Vec<NewsRecord> = (0..6)
            .map(|i| record(&format!("t{}", i), "same label everywhere", Label::Real))
            .collect();
        let result = train(&records, &TrainOptions::default());
        assert!(matches!(result, Err(TrainingError::SingleClass)));
    }

    #[test]
    fn test_train_rejects_non_positive_alpha() {
        let result = train(
            &alien_dataset(),
            &TrainOptions {
                alpha: 0.0,
                seed: 42,
            },
        );
        assert!(matches!(result, Err(TrainingError::InvalidSmoothing(_))));
    }

    #[test]
    fn test_training_is_deterministic() {
        let records = alien_dataset();
        let options = TrainOptions::default();

        let first = train(&records, &options).expect("Failed to train");
        let second = train(&records, &options).expect("Failed to train");

        assert_eq!(first.accuracy(), second.accuracy());

        let probe = "Breaking aliens landed downtown";
        assert_eq!(first.predict(probe), second.predict(probe));
        assert_eq!(
            first.predict_confidence(probe),
            second.predict_confidence(probe)
        );
    }

    #[test]
    fn test_different_seeds_may_change_split_but_stay_valid() {
        let records = alien_dataset();
        for seed in [1, 7, 42, 1000] {
            let model = train(&records, &TrainOptions { alpha: 1.0, seed })
                .expect("Failed to train");
            assert!((0.0..=1.0).contains(&model.accuracy()));
        }
    }

    #[test]
    fn test_alien_articles_classified_fake_with_confidence() {
        let model =
            train(&alien_dataset(), &TrainOptions::default()).expect("Failed to train");

        let classification = model.classify("Breaking", "aliens landed");
        assert_eq!(classification.label, Label::Fake);
        assert!(classification.confidence > 0.5);
    }

    #[test]
    fn test_classify_matches_predict_on_combined_text() {
        let model =
            train(&alien_dataset(), &TrainOptions::default()).expect("Failed to train");

        let classification = model.classify("Breaking", "aliens landed");
        assert_eq!(
            classification.label,
            model.predict("Breaking aliens landed")
        );
        assert!(
            (classification.confidence - model.predict_confidence("Breaking aliens landed"))
                .abs()
                < 1e-12
        );
    }

    #[test]
    fn test_unseen_vocabulary_still_yields_valid_classification() {
        let model =
            train(&alien_dataset(), &TrainOptions::default()).expect("Failed to train");

        let classification = model.classify("Zxqv", "wubble frotz grue");
        assert!(classification.confidence.is_finite());
        assert!((0.0..=1.0).contains(&classification.confidence));
    }
}
