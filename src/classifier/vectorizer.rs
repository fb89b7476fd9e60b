//! Bag-of-words count vectorizer
//!
//! Builds a vocabulary from a training corpus and turns arbitrary text
//! into sparse term-count vectors over that vocabulary. Token order is
//! ignored, duplicates are counted, and terms unseen at fit time are
//! silently dropped at transform time.

use std::collections::HashMap;

/// A sparse term-count vector.
///
/// Entries are `(term_index, count)` pairs sorted by term index, so
/// iteration order (and therefore any floating-point accumulation over
/// the vector) is deterministic.
pub type SparseVector = Vec<(usize, u32)>;

/// Count vectorizer with a learned vocabulary.
#[derive(Debug, Clone)]
pub struct CountVectorizer {
    vocabulary: HashMap<String, usize>,
}

impl CountVectorizer {
    /// Build the vocabulary from a corpus.
    ///
    /// Terms are indexed in order of first appearance, which makes the
    /// mapping a pure function of the corpus contents and order.
    pub fn fit<S: AsRef<str>>(corpus: &[S]) -> Self {
        let mut vocabulary = HashMap::new();

        for document in corpus {
            for token in tokenize(document.as_ref()) {
                let next_index = vocabulary.len();
                vocabulary.entry(token).or_insert(next_index);
            }
        }

        Self { vocabulary }
    }

    /// Transform text into a sparse count vector over the fitted
    /// vocabulary. Unknown terms are dropped, never an error.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: HashMap<usize, u32> = HashMap::new();

        for token in tokenize(text) {
            if let Some(&index) = self.vocabulary.get(&token) {
                *counts.entry(index).or_insert(0) += 1;
            }
        }

        let mut vector: SparseVector = counts.into_iter().collect();
        vector.sort_unstable_by_key(|&(index, _)| index);
        vector
    }

    /// Number of distinct terms in the fitted vocabulary
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }
}

/// Lowercased whitespace/punctuation tokenization.
///
/// Splits on any non-alphanumeric character, so "Breaking: aliens!" and
/// "breaking aliens" produce the same tokens.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase())
}
