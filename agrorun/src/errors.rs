//! Error types for agrorun jobs.
//!
//! Only setup failures are represented as errors. A non-zero engine exit is
//! recorded on the run outcome, and precheck findings are plain warnings.

use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for agrorun operations.
#[derive(Debug, Error)]
pub enum AgrorunError {
    /// The core reference dataset could not be provisioned.
    #[error("Core data provisioning failed for {}: {source}", path.display())]
    Provision {
        /// The path that could not be read or written.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The job's working directory could not be prepared or populated.
    #[error("Workspace setup failed for {}: {source}", path.display())]
    Workspace {
        /// The path that could not be created or written.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The job input was missing or malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An archive could not be read or written.
    #[error("Archive error: {0}")]
    Archive(String),

    /// An object storage transfer failed.
    #[error("{0}")]
    Storage(#[from] StorageError),

    /// The engine process could not be started.
    #[error("Failed to launch engine {}: {source}", executable.display())]
    Launch {
        /// The executable that was invoked.
        executable: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AgrorunError {
    /// Creates a provisioning error for the given path.
    #[must_use]
    pub fn provision(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Provision {
            path: path.into(),
            source,
        }
    }

    /// Creates a workspace error for the given path.
    #[must_use]
    pub fn workspace(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Workspace {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Returns a stable machine-readable code for the error.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Provision { .. } => "SETUP_PROVISION",
            Self::Workspace { .. } => "SETUP_WORKSPACE",
            Self::InvalidInput(_) => "SETUP_INPUT",
            Self::Archive(_) => "SETUP_ARCHIVE",
            Self::Storage(_) => "SETUP_STORAGE",
            Self::Launch { .. } => "SETUP_LAUNCH",
            Self::Serialization(_) => "SERIALIZATION",
            Self::Io(_) => "IO",
        }
    }

    /// Returns true if the error aborts a job before or instead of a run.
    #[must_use]
    pub fn is_setup(&self) -> bool {
        self.kind().starts_with("SETUP_")
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("type".to_string(), serde_json::json!(self.kind()));
        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map.insert("setup".to_string(), serde_json::json!(self.is_setup()));
        map
    }
}

impl From<zip::result::ZipError> for AgrorunError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive(err.to_string())
    }
}

impl From<serde_json::Error> for AgrorunError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<base64::DecodeError> for AgrorunError {
    fn from(err: base64::DecodeError) -> Self {
        Self::InvalidInput(format!("payload is not valid base64: {err}"))
    }
}

impl From<walkdir::Error> for AgrorunError {
    fn from(err: walkdir::Error) -> Self {
        Self::Io(err.into())
    }
}

/// Errors raised by object storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The requested object does not exist.
    #[error("Object not found: {bucket}/{key}")]
    NotFound {
        /// The bucket name.
        bucket: String,
        /// The object key.
        key: String,
    },

    /// The bucket or key cannot be mapped to a safe location.
    #[error("Invalid object key: {bucket}/{key}")]
    InvalidKey {
        /// The bucket name.
        bucket: String,
        /// The object key.
        key: String,
    },

    /// A transfer failed.
    #[error("Storage IO error for {bucket}/{key}: {source}")]
    Io {
        /// The bucket name.
        bucket: String,
        /// The object key.
        key: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Result alias used throughout the crate.
pub type Result<T, E = AgrorunError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_classification() {
        let err = AgrorunError::invalid_input("no input");
        assert!(err.is_setup());
        assert_eq!(err.kind(), "SETUP_INPUT");

        let err = AgrorunError::Serialization("bad json".to_string());
        assert!(!err.is_setup());
    }

    #[test]
    fn test_provision_error_message() {
        let err = AgrorunError::provision(
            "/var/task/Data/Data.CDE",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );

        assert!(err.to_string().contains("/var/task/Data/Data.CDE"));
        assert_eq!(err.kind(), "SETUP_PROVISION");
    }

    #[test]
    fn test_workspace_error_is_setup() {
        let err = AgrorunError::workspace(
            "/tmp/job-1/Weather",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );

        assert!(err.is_setup());
        assert_eq!(err.to_dict().get("type").unwrap(), "SETUP_WORKSPACE");
        assert!(err.to_string().contains("/tmp/job-1/Weather"));
    }

    #[test]
    fn test_error_to_dict() {
        let err: AgrorunError = StorageError::NotFound {
            bucket: "inputs".to_string(),
            key: "job.zip".to_string(),
        }
        .into();
        let dict = err.to_dict();

        assert_eq!(dict.get("type").unwrap(), "SETUP_STORAGE");
        assert_eq!(dict.get("setup").unwrap(), true);
        assert!(dict.get("message").unwrap().as_str().unwrap().contains("inputs/job.zip"));
    }

    #[test]
    fn test_base64_error_is_input_error() {
        use base64::Engine;
        let err: AgrorunError = base64::engine::general_purpose::STANDARD
            .decode("***")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), "SETUP_INPUT");
    }
}
