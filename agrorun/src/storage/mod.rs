//! Object storage seam.
//!
//! Jobs only need two primitives: download an object to a local
//! path and upload a local file to an object. Backends implement
//! [`ObjectStore`]; [`LocalObjectStore`] maps buckets onto directories.

mod local;

pub use local::LocalObjectStore;

use crate::errors::StorageError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A `(bucket, key)` pair addressing one object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectLocation {
    /// The bucket name.
    pub bucket: String,
    /// The object key.
    pub key: String,
}

impl ObjectLocation {
    /// Creates a new location.
    #[must_use]
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Creates a location for `name` under a key prefix in the same bucket.
    ///
    /// Trailing slashes on the prefix are ignored.
    #[must_use]
    pub fn under_prefix(bucket: impl Into<String>, prefix: &str, name: &str) -> Self {
        let prefix = prefix.trim_end_matches('/');
        let key = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}/{name}")
        };
        Self::new(bucket, key)
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Download/upload primitives used by staging and delivery.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Downloads the object at `location` into `dest`, replacing any file there.
    async fn download(&self, location: &ObjectLocation, dest: &Path) -> Result<(), StorageError>;

    /// Uploads `src` to `location` and returns the object URI.
    async fn upload(&self, src: &Path, location: &ObjectLocation) -> Result<String, StorageError>;
}
