//! JSON snapshot of the normalized articles.
//!
//! The snapshot is an envelope `{ "last_updated": ..., "articles": [...] }`
//! written with two-space indentation and non-ASCII text kept as-is. The
//! file is replaced atomically, so a failed run leaves the previous snapshot
//! intact.

mod record;
mod writer;

pub use record::{derive_path, to_path_records, PathArticle};
pub use writer::{write_envelope, WriteError};

use serde::{Deserialize, Serialize};

/// Shape of each record in the snapshot.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputVariant {
    /// `title, url, enclosure, published_at, summary, category, tags`
    #[default]
    Tagged,
    /// `title, url, path, emoji, liked_count, published_at, summary`
    Path,
}

/// Top-level JSON object of the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Envelope<T> {
    pub last_updated: String,
    pub articles: Vec<T>,
}

impl<T: Serialize> Envelope<T> {
    /// Stamps `articles` with the current UTC time.
    pub fn now(articles: Vec<T>) -> Self {
        Self {
            last_updated: crate::util::now_iso8601(),
            articles,
        }
    }

    /// Pretty-printed UTF-8 JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
