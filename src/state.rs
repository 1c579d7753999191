//! Shared application state injected into every handler.

use crate::services::{blob_store::BlobStore, metadata_store::MetadataStore};

/// Both storage adapters, constructed once at startup and passed to the
/// router via `with_state`. Handlers receive them by injection rather than
/// reaching for globals, so tests can build an `AppState` over an in-memory
/// database and a temp directory.
#[derive(Clone)]
pub struct AppState {
    pub store: MetadataStore,
    pub blobs: BlobStore,
}

impl AppState {
    pub fn new(store: MetadataStore, blobs: BlobStore) -> Self {
        Self { store, blobs }
    }
}
