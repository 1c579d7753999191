//! Represents an uploaded photo and its metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

/// Metadata for a single uploaded photo.
///
/// The binary payload lives in the blob store under `file_name`; this struct
/// stores everything else. Photos are created once on upload and never
/// mutated or deleted afterwards.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    /// Unique identifier, also the file-name stem in the blob store.
    pub id: String,

    /// Display title (required, trimmed).
    pub title: String,

    /// Optional free-text caption.
    pub caption: Option<String>,

    /// Optional location description.
    pub location: Option<String>,

    /// People tagged in the photo, order-preserving. Persisted as a JSON
    /// array in a single column.
    pub people: Json<Vec<String>>,

    /// Name of the stored payload file, e.g. `1714399200123-1a2b3c4d.jpg`.
    pub file_name: String,

    /// Publicly resolvable URL of the payload.
    pub url: String,

    /// MIME type reported at upload time.
    pub content_type: Option<String>,

    /// When the photo was uploaded.
    pub created_at: DateTime<Utc>,
}
