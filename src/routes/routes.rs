//! Defines routes for the photo-sharing API.
//!
//! ## Structure
//! - **Photo endpoints**
//!   - `GET  /api/photos` — list photos, supports `?q=` free-text search
//!   - `POST /api/photos` — multipart upload (file + title + caption + location + people)
//!   - `GET  /api/photos/{id}` — single photo or 404
//!
//! - **Per-photo endpoints**
//!   - `GET  /api/photos/{id}/comments` — comments, newest first
//!   - `POST /api/photos/{id}/comments` — append a comment
//!   - `GET  /api/photos/{id}/rating` — `{photoId, count, average}`
//!   - `POST /api/photos/{id}/rating` — upsert this user's rating
//!
//! - **Media**
//!   - `GET /media/{file}` — stream a stored payload (public-read blobs)

use crate::{
    handlers::{
        comment_handlers::{create_comment, list_comments},
        health_handlers::{healthz, readyz},
        photo_handlers::{get_media, get_photo, list_photos, upload_photo},
        rating_handlers::{get_rating, submit_rating},
    },
    state::AppState,
};
use axum::{Router, extract::DefaultBodyLimit, routing::get};

/// Upload bodies are capped at the ingress layer; anything larger than this
/// never reaches a handler.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Build and return the router for the whole API surface.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // photo collection
        .route("/api/photos", get(list_photos).post(upload_photo))
        .route("/api/photos/{id}", get(get_photo))
        // per-photo children
        .route(
            "/api/photos/{id}/comments",
            get(list_comments).post(create_comment),
        )
        .route(
            "/api/photos/{id}/rating",
            get(get_rating).post(submit_rating),
        )
        // blob payloads
        .route("/media/{file}", get(get_media))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
