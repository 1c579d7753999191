//! HTTP handlers for star ratings: submission (upsert by composite key) and
//! the aggregated per-photo summary.

use crate::{
    errors::AppError,
    ids,
    models::rating::{Rating, RatingSummary},
    services::rating_aggregator,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

const MAX_USER_KEY_LEN: usize = 120;
const DEFAULT_USER_KEY: &str = "anon";

/// JSON body for `POST /api/photos/{id}/rating`.
///
/// `value` is kept as raw JSON so that both numbers and numeric strings are
/// accepted, matching the loose coercion of the original clients.
#[derive(Debug, Deserialize)]
pub struct NewRating {
    pub value: Option<Value>,
    #[serde(rename = "userKey")]
    pub user_key: Option<String>,
}

/// GET `/api/photos/{id}/rating` — `{photoId, count, average}`. A photo with
/// no ratings (or an unknown photo id) gets a zero summary, never a 404.
pub async fn get_rating(
    State(state): State<AppState>,
    Path(photo_id): Path<String>,
) -> Result<Json<RatingSummary>, AppError> {
    let summary = rating_aggregator::summarize(&state.store, &photo_id).await?;
    Ok(Json(summary))
}

/// POST `/api/photos/{id}/rating` — upsert this user's rating for the photo.
/// A resubmission with the same user key overwrites the stored value.
pub async fn submit_rating(
    State(state): State<AppState>,
    Path(photo_id): Path<String>,
    Json(body): Json<NewRating>,
) -> Result<(StatusCode, Json<Rating>), AppError> {
    // both checks run before any storage I/O
    let value = parse_rating_value(body.value.as_ref())?;
    let user_key = normalize_user_key(body.user_key.as_deref());

    let rating = Rating {
        id: ids::rating_id(&photo_id, &user_key),
        photo_id,
        user_key,
        value,
        updated_at: Utc::now(),
    };
    let saved = state.store.upsert_rating(&rating).await?;

    Ok((StatusCode::CREATED, Json(saved)))
}

/// Accept a JSON number or a numeric string; it must be finite and within
/// [1, 5] inclusive.
fn parse_rating_value(raw: Option<&Value>) -> Result<f64, AppError> {
    let parsed = match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() && (1.0..=5.0).contains(&v) => Ok(v),
        _ => Err(AppError::bad_request(
            "rating value must be a number between 1 and 5",
        )),
    }
}

/// Trim the user key, default to "anon" when absent or blank, cap at 120
/// characters.
fn normalize_user_key(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(key) if !key.is_empty() => {
            crate::handlers::comment_handlers::truncate_chars(key, MAX_USER_KEY_LEN)
        }
        _ => DEFAULT_USER_KEY.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn in_range_numbers_are_accepted() {
        assert_eq!(parse_rating_value(Some(&json!(3))).unwrap(), 3.0);
        assert_eq!(parse_rating_value(Some(&json!(1))).unwrap(), 1.0);
        assert_eq!(parse_rating_value(Some(&json!(5))).unwrap(), 5.0);
        assert_eq!(parse_rating_value(Some(&json!(4.5))).unwrap(), 4.5);
    }

    #[test]
    fn numeric_strings_are_coerced() {
        assert_eq!(parse_rating_value(Some(&json!("4"))).unwrap(), 4.0);
        assert_eq!(parse_rating_value(Some(&json!(" 2.5 "))).unwrap(), 2.5);
    }

    #[test]
    fn out_of_range_and_non_numeric_are_rejected() {
        for bad in [json!(6), json!(0), json!(-1), json!("abc"), json!("NaN"), json!(null), json!([3])] {
            assert!(parse_rating_value(Some(&bad)).is_err(), "value: {bad}");
        }
        assert!(parse_rating_value(None).is_err());
    }

    #[test]
    fn user_key_defaults_and_caps() {
        assert_eq!(normalize_user_key(None), "anon");
        assert_eq!(normalize_user_key(Some("  ")), "anon");
        assert_eq!(normalize_user_key(Some(" carol ")), "carol");
        assert_eq!(
            normalize_user_key(Some(&"k".repeat(300))).chars().count(),
            MAX_USER_KEY_LEN
        );
    }
}
