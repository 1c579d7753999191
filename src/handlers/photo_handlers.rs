//! HTTP handlers for photo upload, listing, search, lookup, and media
//! download. Validation happens here, before any storage I/O; the adapters
//! never see an untrimmed title or an uncapped people list.

use crate::{
    errors::AppError,
    ids,
    models::photo::Photo,
    services::{blob_store::BlobStore, metadata_store::MetadataStore},
    state::AppState,
};
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::Response,
};
use bytes::Bytes;
use chrono::Utc;
use serde::Deserialize;
use sqlx::types::Json as SqlJson;
use tokio_util::io::ReaderStream;

/// Query params accepted by the photo listing.
#[derive(Debug, Deserialize)]
pub struct ListPhotosQuery {
    /// Free-text search term. Absent or blank returns the full list.
    pub q: Option<String>,
}

const MAX_PEOPLE_ENTRIES: usize = 30;

/// GET `/api/photos[?q=term]` — all photos newest first, optionally filtered
/// by a case-insensitive substring search over title, caption, location, and
/// tagged people.
pub async fn list_photos(
    State(state): State<AppState>,
    Query(query): Query<ListPhotosQuery>,
) -> Result<Json<Vec<Photo>>, AppError> {
    let photos = state
        .store
        .search_photos(query.q.as_deref().unwrap_or(""))
        .await?;
    Ok(Json(photos))
}

/// GET `/api/photos/{id}` — single photo, 404 when the id is unknown.
pub async fn get_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Photo>, AppError> {
    match state.store.get_photo(&id).await? {
        Some(photo) => Ok(Json(photo)),
        None => Err(AppError::not_found(format!("photo `{id}` not found"))),
    }
}

/// Fields collected from the upload form before validation.
#[derive(Default)]
struct PhotoUpload {
    bytes: Option<Bytes>,
    original_name: Option<String>,
    content_type: Option<String>,
    title: Option<String>,
    caption: Option<String>,
    location: Option<String>,
    people: Option<String>,
}

/// POST `/api/photos` — multipart upload: `file` plus `title`, `caption`,
/// `location`, and a comma-separated `people` field.
///
/// Two-phase write with a documented failure window: the payload is uploaded
/// to the blob store first and metadata is only written once that succeeds.
/// A metadata write that fails afterwards leaves an orphaned blob behind;
/// that gap is accepted, not remediated.
pub async fn upload_photo(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Photo>), AppError> {
    let mut upload = PhotoUpload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(format!("malformed multipart body: {err}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "file" => {
                upload.original_name = field.file_name().map(str::to_string);
                upload.content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|err| {
                    AppError::bad_request(format!("failed to read file field: {err}"))
                })?;
                upload.bytes = Some(bytes);
            }
            "title" => upload.title = Some(read_text(field).await?),
            "caption" => upload.caption = Some(read_text(field).await?),
            "location" => upload.location = Some(read_text(field).await?),
            "people" => {
                let chunk = read_text(field).await?;
                // repeated people fields are joined like a single CSV value
                upload.people = Some(match upload.people.take() {
                    Some(existing) => format!("{existing},{chunk}"),
                    None => chunk,
                });
            }
            _ => {}
        }
    }

    let new_photo = validate_upload(upload)?;
    let photo = persist_photo(&state.store, &state.blobs, new_photo).await?;

    tracing::info!(photo_id = %photo.id, "photo uploaded");
    Ok((StatusCode::CREATED, Json(photo)))
}

/// A photo upload that has passed validation and is ready to persist.
struct NewPhoto {
    title: String,
    caption: Option<String>,
    location: Option<String>,
    people: Vec<String>,
    bytes: Bytes,
    content_type: Option<String>,
    original_name: Option<String>,
}

/// Apply the creation rules: file and title required, optional fields
/// trimmed to `None`, people parsed from CSV. Runs before any storage I/O.
fn validate_upload(upload: PhotoUpload) -> Result<NewPhoto, AppError> {
    let bytes = upload
        .bytes
        .ok_or_else(|| AppError::bad_request("file field is required"))?;
    let title = match upload.title.as_deref().map(str::trim) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => return Err(AppError::bad_request("title is required")),
    };

    Ok(NewPhoto {
        title,
        caption: trimmed_optional(upload.caption),
        location: trimmed_optional(upload.location),
        people: parse_people(upload.people.as_deref().unwrap_or("")),
        bytes,
        content_type: upload.content_type,
        original_name: upload.original_name,
    })
}

/// Two-phase write with a strict ordering contract: the payload is uploaded
/// to the blob store first, and the metadata row is only created once that
/// succeeds. A failed upload leaves no metadata behind; a metadata write
/// that fails after a successful upload orphans the blob, which is accepted.
async fn persist_photo(
    store: &MetadataStore,
    blobs: &BlobStore,
    new: NewPhoto,
) -> Result<Photo, AppError> {
    let id = ids::photo_id();
    let file_name = format!("{id}.{}", file_extension(new.original_name.as_deref()));

    let url = blobs
        .upload(&file_name, new.bytes, new.content_type.as_deref())
        .await?;

    let photo = Photo {
        id,
        title: new.title,
        caption: new.caption,
        location: new.location,
        people: SqlJson(new.people),
        file_name,
        url,
        content_type: new.content_type,
        created_at: Utc::now(),
    };
    store.create_photo(&photo).await?;
    Ok(photo)
}

/// GET `/media/{file}` — stream a stored payload back with the content type
/// recorded at upload time.
pub async fn get_media(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response, AppError> {
    let reader = state.blobs.open(&file).await?;

    let content_type = reader
        .content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));

    let mut response = Response::new(Body::from_stream(ReaderStream::new(reader.file)));
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, content_type);
    if let Ok(length) = HeaderValue::from_str(&reader.len.to_string()) {
        response.headers_mut().insert(header::CONTENT_LENGTH, length);
    }
    Ok(response)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|err| AppError::bad_request(format!("malformed multipart field: {err}")))
}

fn trimmed_optional(value: Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse the comma-separated people field into trimmed non-empty entries.
/// Order is preserved, duplicates are kept, case is untouched, and the list
/// is capped at 30 entries.
fn parse_people(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .take(MAX_PEOPLE_ENTRIES)
        .map(str::to_string)
        .collect()
}

/// Derive a safe file extension from the uploaded file name, falling back to
/// `bin` for anything missing or suspicious.
fn file_extension(original_name: Option<&str>) -> String {
    let ext = original_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(stem, ext)| (stem, ext.to_ascii_lowercase()))
        .filter(|(stem, ext)| {
            !stem.is_empty()
                && !ext.is_empty()
                && ext.len() <= 8
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|(_, ext)| ext);
    ext.unwrap_or_else(|| "bin".to_string())
}
