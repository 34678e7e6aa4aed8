//! Inline listing of collected artifacts.

use crate::core::InlineArtifact;
use crate::errors::Result;
use crate::workspace::WorkingDirectory;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha2::{Digest, Sha256};

/// Renders every artifact as base64 content with its size and SHA-256.
pub fn inline_artifacts(work: &WorkingDirectory, artifacts: &[String]) -> Result<Vec<InlineArtifact>> {
    artifacts
        .iter()
        .map(|name| {
            let content = std::fs::read(work.join(name))?;
            Ok(InlineArtifact {
                name: name.clone(),
                size: content.len() as u64,
                sha256: hex::encode(Sha256::digest(&content)),
                content_b64: STANDARD.encode(&content),
            })
        })
        .collect()
}
