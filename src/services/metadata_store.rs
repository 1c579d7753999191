//! src/services/metadata_store.rs
//!
//! MetadataStore — document-style CRUD over the three logical collections
//! (photos, comments, ratings) backed by SQLite. This file owns the data
//! access contract only; validation happens in the handlers and payload
//! bytes live in the blob store.

use crate::models::{comment::Comment, photo::Photo, rating::Rating};
use sqlx::{QueryBuilder, SqlitePool, sqlite::Sqlite};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a record with id `{0}` already exists")]
    Conflict(String),
    #[error("metadata store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// MetadataStore provides the per-collection operations the handlers need:
/// - create (photos, comments): strict insert, duplicate id is a `Conflict`
/// - upsert (ratings): insert-or-overwrite by the composite rating id
/// - point and range queries, newest first
/// - free-text search over photo fields
///
/// "Not found" is an empty result (`None` / empty `Vec`), never an error;
/// every service-level fault surfaces as `StoreError::Unavailable`.
#[derive(Clone)]
pub struct MetadataStore {
    /// Shared SQLite connection pool.
    db: Arc<SqlitePool>,
}

const PHOTO_COLUMNS: &str =
    "id, title, caption, location, people, file_name, url, content_type, created_at";
const COMMENT_COLUMNS: &str = "id, photo_id, name, text, created_at";
const RATING_COLUMNS: &str = "id, photo_id, user_key, value, updated_at";

impl MetadataStore {
    /// Create a new MetadataStore backed by the provided SQLite pool.
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Lightweight connectivity check used by the readiness probe.
    pub async fn ping(&self) -> StoreResult<()> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&*self.db)
            .await?;
        Ok(())
    }

    /// Insert a new photo document. Photos are immutable after creation, so
    /// this is a strict insert: a duplicate id is a `Conflict`.
    pub async fn create_photo(&self, photo: &Photo) -> StoreResult<()> {
        let result = sqlx::query(
            "INSERT INTO photos (id, title, caption, location, people, file_name, url, content_type, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&photo.id)
        .bind(&photo.title)
        .bind(&photo.caption)
        .bind(&photo.location)
        .bind(&photo.people)
        .bind(&photo.file_name)
        .bind(&photo.url)
        .bind(&photo.content_type)
        .bind(photo.created_at)
        .execute(&*self.db)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(StoreError::Conflict(photo.id.clone())),
            Err(err) => Err(err.into()),
        }
    }

    /// Fetch a single photo by id. Absence is `Ok(None)`.
    pub async fn get_photo(&self, id: &str) -> StoreResult<Option<Photo>> {
        let photo = sqlx::query_as::<_, Photo>(&format!(
            "SELECT {PHOTO_COLUMNS} FROM photos WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&*self.db)
        .await?;
        Ok(photo)
    }

    /// All photos, newest first.
    pub async fn list_photos(&self) -> StoreResult<Vec<Photo>> {
        let photos = sqlx::query_as::<_, Photo>(&format!(
            "SELECT {PHOTO_COLUMNS} FROM photos ORDER BY created_at DESC"
        ))
        .fetch_all(&*self.db)
        .await?;
        Ok(photos)
    }

    /// Case-insensitive substring search over title, caption, location and
    /// the people list. An empty or whitespace-only term degrades to the
    /// full ordered listing.
    ///
    /// SQLite `LIKE` is case-insensitive for ASCII, which matches the search
    /// semantics of the original service. Wildcard characters in the term
    /// are escaped so `%` and `_` match themselves, keeping this a plain
    /// substring match. The people column holds a JSON array, so matching
    /// against its text also covers tagged names.
    pub async fn search_photos(&self, term: &str) -> StoreResult<Vec<Photo>> {
        let term = term.trim();
        if term.is_empty() {
            return self.list_photos().await;
        }

        let pattern = format!("%{}%", like_escape(term));
        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {PHOTO_COLUMNS} FROM photos WHERE title LIKE "
        ));
        builder.push_bind(pattern.clone());
        builder.push(" ESCAPE '\\' OR caption LIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" ESCAPE '\\' OR location LIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" ESCAPE '\\' OR people LIKE ");
        builder.push_bind(pattern);
        builder.push(" ESCAPE '\\' ORDER BY created_at DESC");

        let photos = builder.build_query_as().fetch_all(&*self.db).await?;
        Ok(photos)
    }

    /// Append a comment. Comment ids carry a random suffix, so a `Conflict`
    /// here indicates a caller bug rather than an expected race.
    pub async fn create_comment(&self, comment: &Comment) -> StoreResult<()> {
        let result = sqlx::query(
            "INSERT INTO comments (id, photo_id, name, text, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&comment.id)
        .bind(&comment.photo_id)
        .bind(&comment.name)
        .bind(&comment.text)
        .bind(comment.created_at)
        .execute(&*self.db)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => {
                Err(StoreError::Conflict(comment.id.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// All comments for a photo, newest first. An unknown photo id yields an
    /// empty list — parent existence is not checked.
    pub async fn list_comments(&self, photo_id: &str) -> StoreResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE photo_id = ? ORDER BY created_at DESC"
        ))
        .bind(photo_id)
        .fetch_all(&*self.db)
        .await?;
        Ok(comments)
    }

    /// Insert or overwrite a rating by its composite id.
    ///
    /// Last write wins: resubmitting for the same (photo, user) pair replaces
    /// the stored value and timestamp instead of appending a row. No
    /// optimistic concurrency token is used, so concurrent submissions race
    /// and the storage layer decides the winner.
    pub async fn upsert_rating(&self, rating: &Rating) -> StoreResult<Rating> {
        let saved = sqlx::query_as::<_, Rating>(
            r#"
            INSERT INTO ratings (id, photo_id, user_key, value, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            RETURNING id, photo_id, user_key, value, updated_at
            "#,
        )
        .bind(&rating.id)
        .bind(&rating.photo_id)
        .bind(&rating.user_key)
        .bind(rating.value)
        .bind(rating.updated_at)
        .fetch_one(&*self.db)
        .await?;
        Ok(saved)
    }

    /// All ratings for a photo, most recently updated first.
    pub async fn list_ratings(&self, photo_id: &str) -> StoreResult<Vec<Rating>> {
        let ratings = sqlx::query_as::<_, Rating>(&format!(
            "SELECT {RATING_COLUMNS} FROM ratings WHERE photo_id = ? ORDER BY updated_at DESC"
        ))
        .bind(photo_id)
        .fetch_all(&*self.db)
        .await?;
        Ok(ratings)
    }

    /// Bare rating values for a photo, one per distinct user key.
    pub async fn rating_values(&self, photo_id: &str) -> StoreResult<Vec<f64>> {
        let values =
            sqlx::query_scalar::<_, f64>("SELECT value FROM ratings WHERE photo_id = ?")
                .bind(photo_id)
                .fetch_all(&*self.db)
                .await?;
        Ok(values)
    }
}

/// Escape `LIKE` wildcards so a search term matches itself literally.
fn like_escape(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Return true if the SQLx error indicates a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids;
    use chrono::{Duration, Utc};
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::types::Json;

    async fn test_store() -> MetadataStore {
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite");
        for stmt in include_str!("../../migrations/0001_init.sql")
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            sqlx::query(stmt).execute(&db).await.expect("schema");
        }
        MetadataStore::new(Arc::new(db))
    }

    fn sample_photo(id: &str, title: &str, age_secs: i64) -> Photo {
        Photo {
            id: id.to_string(),
            title: title.to_string(),
            caption: None,
            location: None,
            people: Json(Vec::new()),
            file_name: format!("{id}.jpg"),
            url: format!("/media/{id}.jpg"),
            content_type: Some("image/jpeg".to_string()),
            created_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    fn sample_comment(photo_id: &str, text: &str, age_secs: i64) -> Comment {
        Comment {
            id: ids::comment_id(photo_id),
            photo_id: photo_id.to_string(),
            name: "Anonymous".to_string(),
            text: text.to_string(),
            created_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    fn sample_rating(photo_id: &str, user_key: &str, value: f64) -> Rating {
        Rating {
            id: ids::rating_id(photo_id, user_key),
            photo_id: photo_id.to_string(),
            user_key: user_key.to_string(),
            value,
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_photo_rejects_duplicate_id() {
        let store = test_store().await;
        store
            .create_photo(&sample_photo("p1", "Sunset", 0))
            .await
            .unwrap();
        let err = store
            .create_photo(&sample_photo("p1", "Sunset again", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(id) if id == "p1"));
    }

    #[tokio::test]
    async fn get_photo_absence_is_none() {
        let store = test_store().await;
        assert!(store.get_photo("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_photos_is_newest_first() {
        let store = test_store().await;
        store
            .create_photo(&sample_photo("old", "Old", 60))
            .await
            .unwrap();
        store
            .create_photo(&sample_photo("new", "New", 0))
            .await
            .unwrap();
        let photos = store.list_photos().await.unwrap();
        let ids: Vec<&str> = photos.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_substring() {
        let store = test_store().await;
        let mut tagged = sample_photo("p1", "Beach day", 10);
        tagged.people = Json(vec!["Alice".to_string(), "Bob".to_string()]);
        store.create_photo(&tagged).await.unwrap();
        let mut captioned = sample_photo("p2", "Mountains", 0);
        captioned.caption = Some("sunset over the ALPS".to_string());
        store.create_photo(&captioned).await.unwrap();

        let by_title = store.search_photos("beach").await.unwrap();
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].id, "p1");

        let by_caption = store.search_photos("alps").await.unwrap();
        assert_eq!(by_caption.len(), 1);
        assert_eq!(by_caption[0].id, "p2");

        let by_person = store.search_photos("alice").await.unwrap();
        assert_eq!(by_person.len(), 1);
        assert_eq!(by_person[0].id, "p1");

        assert!(store.search_photos("nowhere").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_wildcards_match_literally() {
        let store = test_store().await;
        store
            .create_photo(&sample_photo("p1", "100% sunset", 10))
            .await
            .unwrap();
        store
            .create_photo(&sample_photo("p2", "acb variant", 5))
            .await
            .unwrap();
        store
            .create_photo(&sample_photo("p3", "a_b pattern", 0))
            .await
            .unwrap();

        // `%` is a literal character, not match-everything
        let percent = store.search_photos("%").await.unwrap();
        assert_eq!(percent.len(), 1);
        assert_eq!(percent[0].id, "p1");

        assert_eq!(store.search_photos("100% su").await.unwrap().len(), 1);

        // `_` does not act as a single-character wildcard
        let underscore = store.search_photos("a_b").await.unwrap();
        assert_eq!(underscore.len(), 1);
        assert_eq!(underscore[0].id, "p3");
    }

    #[tokio::test]
    async fn empty_search_term_equals_full_listing() {
        let store = test_store().await;
        store
            .create_photo(&sample_photo("a", "First", 30))
            .await
            .unwrap();
        store
            .create_photo(&sample_photo("b", "Second", 0))
            .await
            .unwrap();

        let listed: Vec<String> = store
            .list_photos()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        let searched: Vec<String> = store
            .search_photos("   ")
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(listed, searched);
    }

    #[tokio::test]
    async fn comments_are_append_only_and_newest_first() {
        let store = test_store().await;
        let first = sample_comment("p1", "first!", 60);
        store.create_comment(&first).await.unwrap();
        store
            .create_comment(&sample_comment("p1", "second", 0))
            .await
            .unwrap();
        store
            .create_comment(&sample_comment("other", "elsewhere", 0))
            .await
            .unwrap();

        let comments = store.list_comments("p1").await.unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].text, "second");
        assert_eq!(comments[1].text, "first!");
        // prior comment untouched by later writes
        assert_eq!(comments[1].id, first.id);

        assert!(store.list_comments("unknown").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rating_upsert_overwrites_same_user() {
        let store = test_store().await;
        let first = sample_rating("p1", "alice", 5.0);
        store.upsert_rating(&first).await.unwrap();
        let mut second = sample_rating("p1", "alice", 3.0);
        second.updated_at = Utc::now() + Duration::seconds(5);
        let saved = store.upsert_rating(&second).await.unwrap();

        assert_eq!(saved.id, first.id);
        assert_eq!(saved.value, 3.0);
        // updatedAt reflects the second submission
        assert!(saved.updated_at > first.updated_at);

        let values = store.rating_values("p1").await.unwrap();
        assert_eq!(values, vec![3.0]);
    }

    #[tokio::test]
    async fn ratings_from_distinct_users_accumulate() {
        let store = test_store().await;
        store
            .upsert_rating(&sample_rating("p1", "alice", 5.0))
            .await
            .unwrap();
        store
            .upsert_rating(&sample_rating("p1", "bob", 4.0))
            .await
            .unwrap();
        store
            .upsert_rating(&sample_rating("p2", "alice", 1.0))
            .await
            .unwrap();

        let mut values = store.rating_values("p1").await.unwrap();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(values, vec![4.0, 5.0]);
        assert_eq!(store.list_ratings("p1").await.unwrap().len(), 2);
    }
}
