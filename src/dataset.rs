//! Labeled dataset loading
//!
//! Reads the ground-truth news CSV used for training and for seeding the
//! article store. The file must carry `title`, `content`, and `label`
//! columns; anything else is a startup error, not something to degrade
//! around.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::models::Label;

/// One labeled record from the training dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsRecord {
    /// Headline
    pub title: String,
    /// Body text
    pub content: String,
    /// Ground-truth label
    pub label: Label,
}

/// Load the labeled dataset from a CSV file.
pub fn load_dataset(path: &Path) -> Result<Vec<NewsRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open dataset: {}", path.display()))?;

    let mut records = Vec::new();
    for (line, result) in reader.deserialize().enumerate() {
        let record: NewsRecord = result.with_context(|| {
            format!(
                "Invalid dataset record at line {} of {}",
                line + 2, // header is line 1
                path.display()
            )
        })?;
        records.push(record);
    }

    Ok(records)
}
