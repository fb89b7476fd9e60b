//! Report model
//!
//! A report is a flag raised by a non-privileged user disputing an
//! article's label. Reports are keyed by `(user_id, article_id)` - a user
//! can hold at most one open report per article. Every resolution action
//! is terminal: the report record is deleted as part of it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::Label;

/// An open report against an article's classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Reporting user
    pub user_id: i64,
    /// Disputed article
    pub article_id: i64,
    /// Reporter's justification (at least 20 characters)
    pub report_content: String,
    /// Submission timestamp
    pub created_at: DateTime<Utc>,
}

/// A report joined with its article's title, for the admin review queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportView {
    /// Disputed article
    pub article_id: i64,
    /// Article title at review time
    pub title: String,
    /// Reporter's justification
    pub report_content: String,
    /// Reporting user
    pub user_id: i64,
}

/// Admin action closing a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveAction {
    /// Flip the article's label and close this report
    Toggle,
    /// Delete the article, all its reports, and its endorsements
    Delete,
    /// Close this report without touching the article
    Dismiss,
}

impl fmt::Display for ResolveAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveAction::Toggle => write!(f, "toggle"),
            ResolveAction::Delete => write!(f, "delete"),
            ResolveAction::Dismiss => write!(f, "dismiss"),
        }
    }
}

impl FromStr for ResolveAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "toggle" => Ok(ResolveAction::Toggle),
            "delete" => Ok(ResolveAction::Delete),
            "dismiss" => Ok(ResolveAction::Dismiss),
            _ => Err(anyhow::anyhow!("Invalid resolve action: {}", s)),
        }
    }
}

/// Outcome of a resolution attempt.
///
/// `AlreadyResolved` covers the race where another admin closed the same
/// report first; callers treat it as a notice, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "label")]
pub enum Resolution {
    /// The article label was flipped; carries the new label
    Toggled(Label),
    /// The article and everything referencing it were removed
    ArticleDeleted,
    /// Only the report was removed
    Dismissed,
    /// The report no longer existed when the action ran
    AlreadyResolved,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_action_round_trip() {
        for action in [
            ResolveAction::Toggle,
            ResolveAction::Delete,
            ResolveAction::Dismiss,
        ] {
            let parsed = ResolveAction::from_str(&action.to_string()).unwrap();
            assert_eq!(parsed, action);
        }
        assert!(ResolveAction::from_str("merge").is_err());
    }

    #[test]
    fn test_resolution_serialization() {
        let json = serde_json::to_string(&Resolution::Toggled(Label::Real)).unwrap();
        assert!(json.contains("toggled"));
        assert!(json.contains("REAL"));

        let json = serde_json::to_string(&Resolution::AlreadyResolved).unwrap();
        assert!(json.contains("already_resolved"));
    }
}
