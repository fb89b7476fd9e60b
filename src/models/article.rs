//! Article model
//!
//! This module provides:
//! - `Label` - the binary classification outcome (FAKE or REAL)
//! - `Article` - a classified news article
//! - `RankedArticle` - an article together with its endorsement count,
//!   as returned by the popularity query

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Binary classification outcome for an article.
///
/// Labels only ever change through a moderation toggle, which flips
/// FAKE to REAL and vice versa. There is no third state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    /// Likely fabricated
    Fake,
    /// Likely genuine
    Real,
}

impl Label {
    /// Database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Fake => "FAKE",
            Label::Real => "REAL",
        }
    }

    /// The opposite label. Toggling twice returns the original.
    pub fn toggled(&self) -> Self {
        match self {
            Label::Fake => Label::Real,
            Label::Real => Label::Fake,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Label {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "FAKE" => Ok(Label::Fake),
            "REAL" => Ok(Label::Real),
            _ => Err(anyhow::anyhow!("Invalid article label: {}", s)),
        }
    }
}

/// A classified news article.
///
/// `confidence` is the posterior probability the model assigned to the
/// *predicted* label at classification time. Bulk-loaded ground truth
/// carries the sentinel `0.0`, meaning the label was assigned without
/// a model score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Unique identifier (insertion order proxy)
    pub id: i64,
    /// Headline
    pub title: String,
    /// Body text
    pub content: String,
    /// Current classification
    pub label: Label,
    /// Posterior of the predicted label, in [0, 1]
    pub confidence: f64,
}

/// An article with its endorsement count, for popularity listings.
///
/// Popularity is the number of distinct users linked to the article,
/// not a visit counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedArticle {
    /// The article itself
    #[serde(flatten)]
    pub article: Article,
    /// Number of distinct endorsing users
    pub endorsement_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_toggled_is_involution() {
        assert_eq!(Label::Fake.toggled(), Label::Real);
        assert_eq!(Label::Real.toggled(), Label::Fake);
        assert_eq!(Label::Fake.toggled().toggled(), Label::Fake);
    }

    #[test]
    fn test_label_display() {
        assert_eq!(Label::Fake.to_string(), "FAKE");
        assert_eq!(Label::Real.to_string(), "REAL");
    }

    #[test]
    fn test_label_from_str() {
        assert_eq!(Label::from_str("FAKE").unwrap(), Label::Fake);
        assert_eq!(Label::from_str("real").unwrap(), Label::Real);
        assert!(Label::from_str("maybe").is_err());
    }

    #[test]
    fn test_label_serde_uppercase() {
        let json = serde_json::to_string(&Label::Fake).unwrap();
        assert_eq!(json, "\"FAKE\"");

        let label: Label = serde_json::from_str("\"REAL\"").unwrap();
        assert_eq!(label, Label::Real);
    }
}
