//! The per-job working directory and the rules for placing files in it.
//!
//! A working directory has three canonical subdirectories (`Weather/`,
//! `Soil/`, `Genotype/`) plus `StandardData/`, and a flat root holding
//! experiment, batch-control and core support files. The engine runs with
//! the root as its current directory, so a working directory must never be
//! shared by two concurrent jobs.

mod classify;
mod provision;

pub use classify::{
    classify, classify_and_place, is_batch_control, is_experiment, placement, FileKind,
};
pub use provision::{CoreDataProvisioner, ESSENTIAL_FILES};

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Subdirectory for weather files.
pub const WEATHER_DIR: &str = "Weather";
/// Subdirectory for soil files.
pub const SOIL_DIR: &str = "Soil";
/// Subdirectory for genotype (cultivar/ecotype/species) files.
pub const GENOTYPE_DIR: &str = "Genotype";
/// Subdirectory for standard reference data.
pub const STANDARD_DATA_DIR: &str = "StandardData";

/// The single mutable root for one job.
#[derive(Debug)]
pub struct WorkingDirectory {
    root: PathBuf,
    _guard: Option<TempDir>,
}

impl WorkingDirectory {
    /// Uses `root` as the working directory, creating it if needed.
    ///
    /// The directory is not removed when the value is dropped.
    pub fn at(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root, _guard: None })
    }

    /// Creates a fresh, uniquely named working directory under `scratch`.
    ///
    /// The directory and its contents are removed when the value is dropped.
    pub fn ephemeral_in(scratch: &Path) -> std::io::Result<Self> {
        std::fs::create_dir_all(scratch)?;
        let dir = tempfile::Builder::new().prefix("job-").tempdir_in(scratch)?;
        Ok(Self {
            root: dir.path().to_path_buf(),
            _guard: Some(dir),
        })
    }

    /// Returns the root path.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the path of a file in the root.
    #[must_use]
    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.root.join(name)
    }

    /// Returns the weather subdirectory.
    #[must_use]
    pub fn weather_dir(&self) -> PathBuf {
        self.root.join(WEATHER_DIR)
    }

    /// Returns the soil subdirectory.
    #[must_use]
    pub fn soil_dir(&self) -> PathBuf {
        self.root.join(SOIL_DIR)
    }

    /// Returns the genotype subdirectory.
    #[must_use]
    pub fn genotype_dir(&self) -> PathBuf {
        self.root.join(GENOTYPE_DIR)
    }

    /// Creates the canonical subdirectories.
    pub fn ensure_layout(&self) -> std::io::Result<()> {
        for dir in [WEATHER_DIR, SOIL_DIR, GENOTYPE_DIR, STANDARD_DATA_DIR] {
            std::fs::create_dir_all(self.root.join(dir))?;
        }
        Ok(())
    }
}
