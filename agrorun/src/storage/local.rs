//! Filesystem-backed object store.

use super::{ObjectLocation, ObjectStore};
use crate::errors::StorageError;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// An [`ObjectStore`] that keeps `bucket/key` under a root directory.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    /// Creates a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a location to a path under the root, rejecting escapes.
    pub fn object_path(&self, location: &ObjectLocation) -> Result<PathBuf, StorageError> {
        let invalid = || StorageError::InvalidKey {
            bucket: location.bucket.clone(),
            key: location.key.clone(),
        };

        let mut path = self.root.clone();
        for part in [location.bucket.as_str(), location.key.as_str()] {
            if part.is_empty() {
                return Err(invalid());
            }
            for component in Path::new(part).components() {
                match component {
                    Component::Normal(c) => path.push(c),
                    Component::CurDir => {}
                    _ => return Err(invalid()),
                }
            }
        }
        Ok(path)
    }
}

fn io_error(location: &ObjectLocation, source: std::io::Error) -> StorageError {
    if source.kind() == std::io::ErrorKind::NotFound {
        StorageError::NotFound {
            bucket: location.bucket.clone(),
            key: location.key.clone(),
        }
    } else {
        StorageError::Io {
            bucket: location.bucket.clone(),
            key: location.key.clone(),
            source,
        }
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn download(&self, location: &ObjectLocation, dest: &Path) -> Result<(), StorageError> {
        let src = self.object_path(location)?;
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(location, e))?;
        }
        tokio::fs::copy(&src, dest)
            .await
            .map_err(|e| io_error(location, e))?;
        debug!(object = %location, dest = %dest.display(), "Downloaded object");
        Ok(())
    }

    async fn upload(&self, src: &Path, location: &ObjectLocation) -> Result<String, StorageError> {
        let dest = self.object_path(location)?;
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(location, e))?;
        }
        tokio::fs::copy(src, &dest).await.map_err(|e| StorageError::Io {
            bucket: location.bucket.clone(),
            key: location.key.clone(),
            source: e,
        })?;
        debug!(object = %location, src = %src.display(), "Uploaded object");
        Ok(location.to_string())
    }
}
