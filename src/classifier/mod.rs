//! Text classification
//!
//! The statistical core of the service: a bag-of-words count vectorizer,
//! a multinomial naive Bayes model over those counts, and the training
//! pipeline that fits both on a labeled corpus and measures held-out
//! accuracy.
//!
//! Everything here is deterministic: the same corpus and options always
//! produce the same vocabulary, the same parameters, the same accuracy
//! number, and the same prediction for a given probe text.

pub mod bayes;
pub mod pipeline;
pub mod vectorizer;

pub use bayes::MultinomialNb;
pub use pipeline::{train, Classification, TrainOptions, TrainedModel, TrainingError};
pub use vectorizer::{CountVectorizer, SparseVector};
