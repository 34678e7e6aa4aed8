//! Seeding a working directory with the engine's core reference data.

use super::{WorkingDirectory, GENOTYPE_DIR, STANDARD_DATA_DIR};
use crate::errors::{AgrorunError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Support files the engine expects in its current directory.
pub const ESSENTIAL_FILES: [&str; 3] = ["DSSATPRO.v48", "Data.CDE", "Detail.CDE"];

/// Directory trees copied from the core dataset on every job.
const CORE_TREES: [&str; 2] = [STANDARD_DATA_DIR, GENOTYPE_DIR];

/// Copies the fixed core dataset into a working directory.
///
/// Must run before any user file is placed so that user-supplied genotype,
/// weather and soil files overwrite the provisioned defaults.
#[derive(Debug, Clone)]
pub struct CoreDataProvisioner {
    source: PathBuf,
}

impl CoreDataProvisioner {
    /// Creates a provisioner reading from `source`.
    #[must_use]
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Returns the core data directory.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Provisions `work`, replacing any stale copy of the core trees.
    ///
    /// Any missing or unreadable part of the dataset is a setup error.
    pub fn provision(&self, work: &WorkingDirectory) -> Result<()> {
        work.ensure_layout()
            .map_err(|e| AgrorunError::provision(work.root(), e))?;

        for name in ESSENTIAL_FILES {
            let src = self.source.join(name);
            std::fs::copy(&src, work.join(name)).map_err(|e| AgrorunError::provision(&src, e))?;
        }

        for tree in CORE_TREES {
            let src = self.source.join(tree);
            if !src.is_dir() {
                return Err(AgrorunError::provision(
                    &src,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "core data directory missing"),
                ));
            }
            let dest = work.join(tree);
            if dest.exists() {
                std::fs::remove_dir_all(&dest).map_err(|e| AgrorunError::provision(&dest, e))?;
            }
            let copied = copy_tree(&src, &dest)?;
            debug!(tree, files = copied, "Copied core data tree");
        }

        info!(
            source = %self.source.display(),
            work_dir = %work.root().display(),
            "Provisioned core data"
        );
        Ok(())
    }
}

fn copy_tree(src: &Path, dest: &Path) -> Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| AgrorunError::provision(src, e.into()))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| AgrorunError::provision(entry.path(), std::io::Error::other(e)))?;
        let target = dest.join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| AgrorunError::provision(&target, e))?;
        } else {
            std::fs::copy(entry.path(), &target)
                .map_err(|e| AgrorunError::provision(entry.path(), e))?;
            copied += 1;
        }
    }
    Ok(copied)
}
