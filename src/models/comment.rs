//! Represents a comment attached to a photo.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single comment on a photo. Append-only: comments are never edited or
/// removed once stored.
///
/// `photo_id` is a soft reference — a comment may be created for a photo id
/// that does not exist, and no referential check is performed.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Unique identifier, `{photo_id}-{unix_millis}-{random suffix}`.
    pub id: String,

    /// Id of the photo this comment belongs to.
    pub photo_id: String,

    /// Display name of the author, defaults to "Anonymous".
    pub name: String,

    /// Comment body (trimmed, non-empty, length-capped).
    pub text: String,

    /// When the comment was posted.
    pub created_at: DateTime<Utc>,
}
