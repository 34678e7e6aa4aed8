//! Job input shapes.

use crate::storage::ObjectLocation;
use std::path::PathBuf;

/// Where the bytes of one input file come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Raw content supplied inline.
    Inline(Vec<u8>),
    /// Content held in object storage.
    Stored(ObjectLocation),
}

/// A named input file. Exists only until staged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// File name including extension.
    pub name: String,
    /// The file content or a reference to it.
    pub payload: Payload,
}

impl InputFile {
    /// Creates an input file with inline content.
    #[must_use]
    pub fn inline(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            payload: Payload::Inline(content.into()),
        }
    }

    /// Creates an input file referencing an object.
    #[must_use]
    pub fn stored(name: impl Into<String>, location: ObjectLocation) -> Self {
        Self {
            name: name.into(),
            payload: Payload::Stored(location),
        }
    }
}

/// The inputs of one job, in any of the supported shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// An in-memory zip archive.
    Archive(Vec<u8>),
    /// A zip archive already on local disk.
    ArchivePath(PathBuf),
    /// A zip archive held in object storage.
    StoredArchive(ObjectLocation),
    /// Individual files, in the order they were supplied.
    Files(Vec<InputFile>),
}

impl InputSource {
    /// Returns a short label describing the input shape.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Archive(_) => "archive",
            Self::ArchivePath(_) => "archive_path",
            Self::StoredArchive(_) => "stored_archive",
            Self::Files(_) => "files",
        }
    }
}
