//! Rating aggregation: count and mean of the stored ratings for a photo.
//!
//! Recomputed in full on every read. Rating sets per photo are small (one
//! row per distinct user key), so no running aggregate is maintained.

use crate::models::rating::RatingSummary;
use crate::services::metadata_store::{MetadataStore, StoreResult};

/// Fetch all rating values for `photo_id` and reduce them to a summary.
pub async fn summarize(store: &MetadataStore, photo_id: &str) -> StoreResult<RatingSummary> {
    let values = store.rating_values(photo_id).await?;
    Ok(summary_of(photo_id, &values))
}

/// Reduce a set of rating values to `{count, average}`.
///
/// The average is rounded to 2 decimal places. Zero ratings means an average
/// of 0 — not NaN, not null, not an error.
pub fn summary_of(photo_id: &str, values: &[f64]) -> RatingSummary {
    let count = values.len();
    let average = if count == 0 {
        0.0
    } else {
        round2(values.iter().sum::<f64>() / count as f64)
    };
    RatingSummary {
        photo_id: photo_id.to_string(),
        count: count as i64,
        average,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_ratings_is_a_zero_summary() {
        let summary = summary_of("p1", &[]);
        assert_eq!(summary.photo_id, "p1");
        assert_eq!(summary.count, 0);
        assert_eq!(summary.average, 0.0);
    }

    #[test]
    fn mean_of_three_ratings() {
        let summary = summary_of("p1", &[5.0, 4.0, 3.0]);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.average, 4.0);
    }

    #[test]
    fn mean_is_rounded_to_two_decimals() {
        assert_eq!(summary_of("p1", &[1.0, 1.0, 2.0]).average, 1.33);
        assert_eq!(summary_of("p1", &[2.0, 3.0]).average, 2.5);
        assert_eq!(summary_of("p1", &[5.0, 5.0, 5.0, 4.0, 4.0, 4.0, 4.0]).average, 4.43);
    }

    #[test]
    fn single_rating_is_its_own_mean() {
        let summary = summary_of("p1", &[4.0]);
        assert_eq!(summary.count, 1);
        assert_eq!(summary.average, 4.0);
    }
}
