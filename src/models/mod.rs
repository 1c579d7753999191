//! Core data models for the photo-sharing API.
//!
//! These entities represent the three logical collections (photos, comments,
//! ratings) plus the derived rating summary. They map to database rows via
//! `sqlx::FromRow` and serialize as camelCase JSON via `serde`, matching the
//! wire format consumed by the demo frontend.

pub mod comment;
pub mod photo;
pub mod rating;
