//! Engine module codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the engine variant to run (e.g. `MZCER048`).
///
/// Codes are carried verbatim: an override supplied by the caller is not
/// validated at this layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleCode(String);

impl ModuleCode {
    /// Creates a module code.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ModuleCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Which resolution step produced a module code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleSource {
    /// Crop code taken from the experiment file extension.
    Extension,
    /// Crop code sniffed from the cultivar section of the experiment file.
    Content,
    /// Caller-supplied override.
    Override,
    /// Generic fallback module.
    Fallback,
}

impl fmt::Display for ModuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extension => write!(f, "extension"),
            Self::Content => write!(f, "content"),
            Self::Override => write!(f, "override"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// A resolved module code together with how it was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedModule {
    /// The module code passed to the engine.
    pub code: ModuleCode,
    /// The resolution step that produced it.
    pub source: ModuleSource,
}

impl ResolvedModule {
    /// Creates a resolved module.
    #[must_use]
    pub fn new(code: impl Into<String>, source: ModuleSource) -> Self {
        Self {
            code: ModuleCode::new(code),
            source,
        }
    }

    /// Returns true if no heuristic or override produced the code.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.source == ModuleSource::Fallback
    }
}
