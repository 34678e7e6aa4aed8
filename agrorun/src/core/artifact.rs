//! Collected output artifacts.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// The output files selected after a run, plus their packaged archive.
///
/// The archive holds exactly the files listed in `artifacts`, in the same
/// order, named by their path relative to the working directory.
#[derive(Debug, Clone, Default)]
pub struct ArtifactBundle {
    /// Relative paths (`/`-separated) of the selected files.
    pub artifacts: Vec<String>,
    /// The deflate zip archive bytes.
    pub archive: Vec<u8>,
}

impl ArtifactBundle {
    /// Returns the number of artifacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Returns true if nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Writes the archive to disk, creating parent directories.
    pub fn write_archive(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &self.archive)
    }
}

/// A single output file rendered inline in a job response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineArtifact {
    /// Relative path of the file.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Hex-encoded SHA-256 of the content.
    pub sha256: String,
    /// Base64-encoded content.
    pub content_b64: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_archive_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = ArtifactBundle {
            artifacts: vec!["Summary.OUT".to_string()],
            archive: vec![1, 2, 3],
        };

        let path = dir.path().join("out").join("results.zip");
        bundle.write_archive(&path).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);
        assert_eq!(bundle.len(), 1);
    }
}
