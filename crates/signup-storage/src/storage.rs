//! Object storage backends.
//!
//! The registration pipeline performs exactly one side effect: it uploads the
//! avatar into a bucket under the file's own name. [`Storage`] is that
//! contract. Backends overwrite an existing object with the same key.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use signup_core::error::UploadError;
use signup_core::settings::{StorageBackend, StorageSettings};

/// A bucket-based object store.
///
/// The trait requires `Send + Sync` so a single backend can be shared by
/// every form instance through an `Arc<dyn Storage>`.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Stores `bytes` in `bucket` under `key`.
    async fn upload(&self, bucket: &str, key: &str, bytes: &[u8]) -> Result<(), UploadError>;

    /// A short backend name for logs.
    fn backend_name(&self) -> &'static str;
}

/// Checks that a bucket or object key is a single, non-empty path segment.
///
/// # Examples
///
/// ```
/// use signup_storage::validate_key;
///
/// assert!(validate_key("avatar.png").is_ok());
/// assert!(validate_key("../etc/passwd").is_err());
/// assert!(validate_key("").is_err());
/// ```
pub fn validate_key(key: &str) -> Result<(), UploadError> {
    if key.is_empty() || key == "." || key == ".." {
        return Err(UploadError::InvalidKey(format!("'{key}' is not a usable name")));
    }
    if key.contains(['/', '\\', '\0']) {
        return Err(UploadError::InvalidKey(format!(
            "'{key}' must not contain path separators"
        )));
    }
    Ok(())
}

/// Builds the backend described by the settings.
pub fn storage_from_settings(settings: &StorageSettings) -> Arc<dyn Storage> {
    match settings.backend {
        StorageBackend::Filesystem => Arc::new(FileSystemStorage::new(settings.location.clone())),
        StorageBackend::Memory => Arc::new(InMemoryStorage::new()),
    }
}

/// Filesystem-based storage backend.
///
/// Each bucket is a directory below `location`; objects are written to a
/// temporary sibling first and renamed into place so a reader never sees a
/// half-written avatar.
#[derive(Debug, Clone)]
pub struct FileSystemStorage {
    /// The root directory holding one directory per bucket.
    pub location: PathBuf,
}

impl FileSystemStorage {
    /// Creates a new filesystem storage rooted at `location`.
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
        }
    }

    /// Returns the full filesystem path for an object.
    pub fn path(&self, bucket: &str, key: &str) -> PathBuf {
        self.location.join(bucket).join(key)
    }

    /// Reads an object back.
    pub async fn open(&self, bucket: &str, key: &str) -> Result<Vec<u8>, UploadError> {
        validate_key(bucket)?;
        validate_key(key)?;
        Ok(tokio::fs::read(self.path(bucket, key)).await?)
    }

    async fn ensure_bucket(&self, bucket: &str) -> Result<PathBuf, UploadError> {
        let dir = self.location.join(bucket);
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                UploadError::BucketNotFound(format!("{bucket} ({})", dir.display()))
            } else {
                UploadError::Io(e)
            }
        })?;
        Ok(dir)
    }
}

/// A temporary sibling name unique to one write, so concurrent uploads of the
/// same key never share a partial file.
fn temp_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!(".{key}.{}.part", Uuid::new_v4().simple()))
}

#[async_trait]
impl Storage for FileSystemStorage {
    async fn upload(&self, bucket: &str, key: &str, bytes: &[u8]) -> Result<(), UploadError> {
        validate_key(bucket)?;
        validate_key(key)?;

        let dir = self.ensure_bucket(bucket).await?;
        let tmp = temp_path(&dir, key);
        let target = dir.join(key);

        if let Err(e) = tokio::fs::write(&tmp, bytes).await {
            tokio::fs::remove_file(&tmp).await.ok();
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&tmp, &target).await {
            tokio::fs::remove_file(&tmp).await.ok();
            return Err(e.into());
        }

        tracing::debug!(bucket, key, path = %target.display(), "object written");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }
}

/// A storage backend that keeps objects in memory.
///
/// Objects can be inspected in tests. Clones share the same buckets.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    objects: Arc<RwLock<HashMap<(String, String), Vec<u8>>>>,
}

impl InMemoryStorage {
    /// Creates a new, empty in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of an object's bytes.
    pub async fn get(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Returns the number of stored objects across all buckets.
    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Removes every object.
    pub async fn clear(&self) {
        self.objects.write().await.clear();
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn upload(&self, bucket: &str, key: &str, bytes: &[u8]) -> Result<(), UploadError> {
        validate_key(bucket)?;
        validate_key(key)?;
        self.objects
            .write()
            .await
            .insert((bucket.to_string(), key.to_string()), bytes.to_vec());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
