//! Identifier derivation for the three collections.
//!
//! Pure functions of wall-clock time and randomness; none of them can fail.
//! Photo and comment ids only need to be collision-resistant, while the
//! rating id is fully deterministic so that an upsert by id doubles as
//! "find this user's rating and overwrite it".

use chrono::Utc;
use uuid::Uuid;

/// New photo id: `{unix_millis}-{8 hex chars}`. Stable once assigned — it is
/// both the primary key in the metadata store and the file-name stem in the
/// blob store.
pub fn photo_id() -> String {
    format!("{}-{}", Utc::now().timestamp_millis(), random_suffix(8))
}

/// New comment id: `{photo_id}-{unix_millis}-{6 hex chars}`. Unique without
/// any coordination between writers.
pub fn comment_id(photo_id: &str) -> String {
    format!(
        "{}-{}-{}",
        photo_id,
        Utc::now().timestamp_millis(),
        random_suffix(6)
    )
}

/// Rating id: `{photo_id}::{user_key}`. Deterministic composite key that
/// enforces at most one rating per (photo, user) pair.
pub fn rating_id(photo_id: &str, user_key: &str) -> String {
    format!("{}::{}", photo_id, user_key)
}

fn random_suffix(len: usize) -> String {
    let mut hex = Uuid::new_v4().simple().to_string();
    hex.truncate(len);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_id_is_deterministic() {
        assert_eq!(rating_id("p1", "alice"), "p1::alice");
        assert_eq!(rating_id("p1", "alice"), rating_id("p1", "alice"));
        assert_ne!(rating_id("p1", "alice"), rating_id("p1", "bob"));
    }

    #[test]
    fn comment_ids_embed_photo_id_and_differ() {
        let a = comment_id("photo-42");
        let b = comment_id("photo-42");
        assert!(a.starts_with("photo-42-"));
        assert_ne!(a, b);
    }

    #[test]
    fn photo_ids_differ_and_start_with_timestamp() {
        let a = photo_id();
        let b = photo_id();
        assert_ne!(a, b);
        let (ts, suffix) = a.split_once('-').expect("dash separator");
        assert!(ts.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(suffix.len(), 8);
    }

    #[test]
    fn random_suffix_is_lowercase_hex() {
        let suffix = random_suffix(8);
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
