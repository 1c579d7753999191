//! HTTP handlers for photo comments.

use crate::{errors::AppError, ids, models::comment::Comment, state::AppState};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;

const MAX_NAME_LEN: usize = 80;
const MAX_TEXT_LEN: usize = 1000;

/// JSON body for `POST /api/photos/{id}/comments`.
#[derive(Debug, Deserialize)]
pub struct NewComment {
    pub name: Option<String>,
    pub text: Option<String>,
}

/// GET `/api/photos/{id}/comments` — newest first. An unknown photo id
/// yields an empty list rather than a 404; parent existence is not checked
/// on this endpoint.
pub async fn list_comments(
    State(state): State<AppState>,
    Path(photo_id): Path<String>,
) -> Result<Json<Vec<Comment>>, AppError> {
    Ok(Json(state.store.list_comments(&photo_id).await?))
}

/// POST `/api/photos/{id}/comments` — append a comment.
pub async fn create_comment(
    State(state): State<AppState>,
    Path(photo_id): Path<String>,
    Json(body): Json<NewComment>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let (name, text) = shape_comment(&body)?;

    let comment = Comment {
        id: ids::comment_id(&photo_id),
        photo_id,
        name,
        text,
        created_at: Utc::now(),
    };
    state.store.create_comment(&comment).await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// Validate and normalize the comment body: text is required (trimmed,
/// non-empty, capped at 1000 chars), name defaults to "Anonymous" and is
/// capped at 80 chars.
fn shape_comment(body: &NewComment) -> Result<(String, String), AppError> {
    let text = body.text.as_deref().unwrap_or("").trim();
    if text.is_empty() {
        return Err(AppError::bad_request("comment text is required"));
    }

    let name = match body.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => "Anonymous",
    };

    Ok((
        truncate_chars(name, MAX_NAME_LEN),
        truncate_chars(text, MAX_TEXT_LEN),
    ))
}

pub(crate) fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(name: Option<&str>, text: Option<&str>) -> NewComment {
        NewComment {
            name: name.map(str::to_string),
            text: text.map(str::to_string),
        }
    }

    #[test]
    fn empty_or_whitespace_text_is_rejected() {
        assert!(shape_comment(&body(None, None)).is_err());
        assert!(shape_comment(&body(None, Some(""))).is_err());
        assert!(shape_comment(&body(Some("Ann"), Some("   \n"))).is_err());
    }

    #[test]
    fn missing_name_defaults_to_anonymous() {
        let (name, text) = shape_comment(&body(None, Some(" great shot "))).unwrap();
        assert_eq!(name, "Anonymous");
        assert_eq!(text, "great shot");

        let (name, _) = shape_comment(&body(Some("  "), Some("x"))).unwrap();
        assert_eq!(name, "Anonymous");
    }

    #[test]
    fn name_and_text_are_length_capped() {
        let long_name = "n".repeat(200);
        let long_text = "t".repeat(2000);
        let (name, text) = shape_comment(&body(Some(&long_name), Some(&long_text))).unwrap();
        assert_eq!(name.chars().count(), MAX_NAME_LEN);
        assert_eq!(text.chars().count(), MAX_TEXT_LEN);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
