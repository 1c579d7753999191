//! src/services/blob_store.rs
//!
//! BlobStore — photo payload storage on local disk, standing in for a
//! managed blob service. Uploads land under a single container directory
//! and are served back through the `/media/{file}` route, which is what
//! makes the returned URLs publicly resolvable.

use bytes::Bytes;
use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("invalid blob name `{0}`")]
    InvalidName(String),
    #[error("blob `{0}` not found")]
    NotFound(String),
    #[error("blob storage unavailable: {0}")]
    Io(#[from] io::Error),
}

pub type BlobResult<T> = Result<T, BlobError>;

/// An opened blob ready to be streamed out.
#[derive(Debug)]
pub struct BlobReader {
    pub file: File,
    pub len: u64,
    /// Content type recorded at upload time, if any.
    pub content_type: Option<String>,
}

/// BlobStore writes payloads durably (temp file, fsync, atomic rename) and
/// remembers each blob's content type in a hidden sidecar file so the media
/// route can serve it back with the right headers. There is no dedup and no
/// content hashing; overwriting an existing name replaces it.
#[derive(Clone)]
pub struct BlobStore {
    /// Container directory holding all payloads.
    base_path: PathBuf,

    /// Base prepended to `/media/{name}` when building public URLs. May be
    /// empty, in which case URLs are host-relative.
    public_base: String,
}

const MAX_BLOB_NAME_LEN: usize = 255;

impl BlobStore {
    /// Create a new BlobStore rooted at `base_path`. `public_base` is the
    /// externally visible origin, e.g. `http://localhost:3000`.
    pub fn new(base_path: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            public_base: public_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Basic name validation to avoid trivial path traversal vectors.
    ///
    /// Rejects separators, `..`, control bytes, and leading dots (which
    /// would collide with temp and sidecar files).
    fn ensure_name_safe(&self, name: &str) -> BlobResult<()> {
        if name.is_empty() || name.len() > MAX_BLOB_NAME_LEN {
            return Err(BlobError::InvalidName(name.to_string()));
        }
        if name.starts_with('.') || name.contains("..") || name.contains('/') {
            return Err(BlobError::InvalidName(name.to_string()));
        }
        if name
            .bytes()
            .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0')
        {
            return Err(BlobError::InvalidName(name.to_string()));
        }
        Ok(())
    }

    /// Idempotent creation of the container directory. Called lazily before
    /// each upload — handlers carry no state between requests.
    pub async fn ensure_container_exists(&self) -> BlobResult<()> {
        fs::create_dir_all(&self.base_path).await?;
        Ok(())
    }

    /// Public URL under which an uploaded blob is retrievable.
    pub fn url_for(&self, name: &str) -> String {
        format!("{}/media/{}", self.public_base, name)
    }

    fn blob_path(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }

    fn sidecar_path(&self, name: &str) -> PathBuf {
        self.base_path.join(format!(".{name}.type"))
    }

    /// Store a payload and return its public URL.
    ///
    /// Writes to a temp file, fsyncs, then renames into place so a crashed
    /// upload never leaves a half-written blob under its final name.
    pub async fn upload(
        &self,
        name: &str,
        bytes: Bytes,
        content_type: Option<&str>,
    ) -> BlobResult<String> {
        self.ensure_name_safe(name)?;
        self.ensure_container_exists().await?;

        let final_path = self.blob_path(name);
        let tmp_path = self.base_path.join(format!(".tmp-{}", Uuid::new_v4()));
        let mut file = File::create(&tmp_path).await?;

        if let Err(err) = file.write_all(&bytes).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(err.into());
        }
        if let Err(err) = file.flush().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(err.into());
        }
        if let Err(err) = file.sync_all().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(err.into());
        }

        if let Err(err) = fs::rename(&tmp_path, &final_path).await {
            if err.kind() == ErrorKind::AlreadyExists {
                fs::remove_file(&final_path).await?;
                fs::rename(&tmp_path, &final_path).await?;
            } else {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(err.into());
            }
        }

        match content_type {
            Some(ct) => fs::write(self.sidecar_path(name), ct).await?,
            None => {
                if let Err(err) = fs::remove_file(self.sidecar_path(name)).await {
                    if err.kind() != ErrorKind::NotFound {
                        return Err(err.into());
                    }
                }
            }
        }

        Ok(self.url_for(name))
    }

    /// Open a stored blob for streaming, along with its length and recorded
    /// content type.
    pub async fn open(&self, name: &str) -> BlobResult<BlobReader> {
        self.ensure_name_safe(name)?;

        let file = File::open(self.blob_path(name)).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                BlobError::NotFound(name.to_string())
            } else {
                BlobError::Io(err)
            }
        })?;
        let len = file.metadata().await?.len();

        let content_type = match fs::read_to_string(self.sidecar_path(name)).await {
            Ok(ct) => {
                let ct = ct.trim().to_string();
                (!ct.is_empty()).then_some(ct)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => return Err(err.into()),
        };

        Ok(BlobReader {
            file,
            len,
            content_type,
        })
    }
}
