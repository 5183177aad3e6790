//! History Log
//!
//! Append-only record of completed try-ons for the session, newest first.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::media::{self, ImageData, InlineImage};

/// One completed try-on. Never mutated after it is recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    pub person_image: ImageData,
    pub clothing_image: ImageData,
    pub result_image: InlineImage,
    pub critique: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl HistoryItem {
    pub fn new(
        person_image: ImageData,
        clothing_image: ImageData,
        result_image: InlineImage,
        critique: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            person_image,
            clothing_image,
            result_image,
            critique,
            created_at: Utc::now(),
        }
    }

    /// File name used when the result is downloaded.
    pub fn download_file_name(&self) -> String {
        format!("wearai-result-{}.{}", self.id, self.result_image.file_extension())
    }

    /// Write the result image into `dir`, returning the written path.
    pub fn save_result(&self, dir: &Path) -> media::Result<PathBuf> {
        let path = dir.join(self.download_file_name());
        self.result_image.write_to(&path)?;
        Ok(path)
    }
}

#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    items: Vec<HistoryItem>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a completed try-on.
    pub fn record(&mut self, item: HistoryItem) {
        tracing::info!(id = %item.id, total = self.items.len() + 1, "try-on recorded in history");
        self.items.insert(0, item);
    }

    /// All items, most recent first.
    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn latest(&self) -> Option<&HistoryItem> {
        self.items.first()
    }

    pub fn get(&self, id: &str) -> Option<&HistoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
