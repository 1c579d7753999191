//! Represents star ratings and their derived per-photo summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A star rating submitted by one user for one photo.
///
/// The id is the deterministic composite `{photo_id}::{user_key}`, so there
/// is at most one row per (photo, user) pair. Resubmitting overwrites the
/// stored value via upsert rather than appending a new record.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    /// Composite identifier `{photo_id}::{user_key}`.
    pub id: String,

    /// Id of the rated photo.
    pub photo_id: String,

    /// Key identifying the submitting user, defaults to "anon".
    pub user_key: String,

    /// Star value in the inclusive range [1, 5].
    pub value: f64,

    /// Timestamp of the most recent submission for this (photo, user) pair.
    pub updated_at: DateTime<Utc>,
}

/// Aggregate rating figures for a photo. Derived on every read, never
/// persisted.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub photo_id: String,

    /// Number of stored ratings (one per distinct user key).
    pub count: i64,

    /// Arithmetic mean rounded to 2 decimal places; 0 when there are no
    /// ratings.
    pub average: f64,
}
