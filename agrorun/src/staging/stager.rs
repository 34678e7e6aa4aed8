//! Turning job inputs into a staged working directory.

use super::pool::materialize;
use super::precheck::precheck;
use super::InputSource;
use crate::core::ModeHint;
use crate::errors::{AgrorunError, Result};
use crate::storage::ObjectStore;
use crate::workspace::{
    classify, classify_and_place, placement, CoreDataProvisioner, FileKind, WorkingDirectory,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of staging one job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagingResult {
    /// Staged experiment files, de-duplicated, in discovery order.
    pub experiment_files: Vec<PathBuf>,
    /// The staged batch-control file, if any.
    pub batch_file: Option<PathBuf>,
    /// Mode hint derived from the staged files.
    pub mode_hint: Option<ModeHint>,
    /// Advisory findings from the precheck.
    pub precheck_warnings: Vec<String>,
}

impl StagingResult {
    /// Returns the experiment file names.
    #[must_use]
    pub fn experiment_names(&self) -> Vec<String> {
        self.experiment_files.iter().map(|p| file_name(p)).collect()
    }

    /// Returns the batch-control file name.
    #[must_use]
    pub fn batch_name(&self) -> Option<String> {
        self.batch_file.as_deref().map(file_name)
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Derives the mode hint: `Batch` when a control file exists, `Single` for
/// exactly one experiment, otherwise none.
#[must_use]
pub fn derive_mode_hint(experiments: usize, has_batch: bool) -> Option<ModeHint> {
    if has_batch {
        Some(ModeHint::Batch)
    } else if experiments == 1 {
        Some(ModeHint::Single)
    } else {
        None
    }
}

/// Stages job inputs into a working directory.
#[derive(Clone)]
pub struct Stager {
    provisioner: CoreDataProvisioner,
    store: Option<Arc<dyn ObjectStore>>,
}

impl std::fmt::Debug for Stager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stager")
            .field("provisioner", &self.provisioner)
            .field("store", &self.store.is_some())
            .finish()
    }
}

impl Stager {
    /// Creates a stager without object storage.
    #[must_use]
    pub fn new(provisioner: CoreDataProvisioner) -> Self {
        Self {
            provisioner,
            store: None,
        }
    }

    /// Sets the object store used for stored inputs.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Materializes, provisions, places and prechecks.
    ///
    /// Core data is provisioned before any user file is placed, so user
    /// files shadow the defaults. A file whose name collides with one of the
    /// layout directories is left out with a warning.
    pub async fn stage(&self, source: &InputSource, work: &WorkingDirectory) -> Result<StagingResult> {
        let pool = tempfile::Builder::new()
            .prefix(".pool-")
            .tempdir_in(work.root())
            .map_err(|e| AgrorunError::workspace(work.root(), e))?;
        let pooled = materialize(source, pool.path(), self.store.as_deref()).await?;

        self.provisioner.provision(work)?;

        let mut result = StagingResult::default();
        let mut batch_candidates: Vec<String> = Vec::new();
        for src in &pooled {
            let name = file_name(src);
            let kind = classify(&name);
            if placement(&name, work).is_dir() {
                let message =
                    format!("Input {name} collides with the {name}/ directory and was not staged");
                warn!("{message}");
                result.precheck_warnings.push(message);
                continue;
            }
            let placed =
                classify_and_place(src, work).map_err(|e| AgrorunError::workspace(src, e))?;
            match kind {
                FileKind::Experiment => {
                    if !result.experiment_files.contains(&placed) {
                        result.experiment_files.push(placed);
                    }
                }
                FileKind::BatchControl => {
                    batch_candidates.push(name);
                    result.batch_file = Some(placed);
                }
                _ => {}
            }
        }
        drop(pool);

        if batch_candidates.len() > 1 {
            if let Some(chosen) = result.batch_name() {
                let message = format!(
                    "Multiple batch-control files supplied ({}); using {chosen}",
                    batch_candidates.join(", ")
                );
                warn!("{message}");
                result.precheck_warnings.push(message);
            }
        }

        result.mode_hint =
            derive_mode_hint(result.experiment_files.len(), result.batch_file.is_some());
        result
            .precheck_warnings
            .extend(precheck(work, &result.experiment_files));

        info!(
            files = pooled.len(),
            experiments = result.experiment_files.len(),
            batch = result.batch_file.is_some(),
            warnings = result.precheck_warnings.len(),
            "Staged job inputs"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::archive_from_entries;
    use crate::staging::InputFile;
    use crate::testing::CoreDataFixture;
    use pretty_assertions::assert_eq;

    fn setup() -> (CoreDataFixture, tempfile::TempDir, WorkingDirectory, Stager) {
        let core = CoreDataFixture::new();
        let tmp = tempfile::tempdir().unwrap();
        let work = WorkingDirectory::at(tmp.path().join("work")).unwrap();
        let stager = Stager::new(CoreDataProvisioner::new(core.path()));
        (core, tmp, work, stager)
    }

    #[test]
    fn test_derive_mode_hint() {
        assert_eq!(derive_mode_hint(0, true), Some(ModeHint::Batch));
        assert_eq!(derive_mode_hint(3, true), Some(ModeHint::Batch));
        assert_eq!(derive_mode_hint(1, false), Some(ModeHint::Single));
        assert_eq!(derive_mode_hint(0, false), None);
        assert_eq!(derive_mode_hint(2, false), None);
    }

    #[tokio::test]
    async fn test_stage_places_files_by_kind() {
        let (_core, _tmp, work, stager) = setup();
        let source = InputSource::Files(vec![
            InputFile::inline("UFGA8201.MZX", "*EXP.DETAILS\n"),
            InputFile::inline("UFGA8201.WTH", "w"),
            InputFile::inline("IB.SOL", "*IBMZ910014\n"),
            InputFile::inline("MZCER048.CUL", "user cultivars"),
            InputFile::inline("notes.txt", "n"),
        ]);

        let staged = stager.stage(&source, &work).await.unwrap();

        assert_eq!(staged.experiment_names(), vec!["UFGA8201.MZX"]);
        assert_eq!(staged.mode_hint, Some(ModeHint::Single));
        assert!(work.join("Weather/UFGA8201.WTH").is_file());
        assert!(work.join("Soil/IB.SOL").is_file());
        assert!(work.join("notes.txt").is_file());
        assert_eq!(
            std::fs::read_to_string(work.join("Genotype/MZCER048.CUL")).unwrap(),
            "user cultivars"
        );
    }

    #[tokio::test]
    async fn test_stage_archive_with_batch_control() {
        let (_core, _tmp, work, stager) = setup();
        let bytes = archive_from_entries(&[
            ("job/A.MZX", "a"),
            ("job/B.MZX", "b"),
            ("job/DSSBatch.v48", "batch"),
        ])
        .unwrap();

        let staged = stager.stage(&InputSource::Archive(bytes), &work).await.unwrap();

        assert_eq!(staged.experiment_names(), vec!["A.MZX", "B.MZX"]);
        assert_eq!(staged.batch_name().as_deref(), Some("DSSBatch.v48"));
        assert_eq!(staged.mode_hint, Some(ModeHint::Batch));
    }

    #[tokio::test]
    async fn test_last_batch_control_wins_with_warning() {
        let (_core, _tmp, work, stager) = setup();
        let source = InputSource::Files(vec![
            InputFile::inline("FIRST.V48", "1"),
            InputFile::inline("SECOND.V47", "2"),
        ]);

        let staged = stager.stage(&source, &work).await.unwrap();

        assert_eq!(staged.batch_name().as_deref(), Some("SECOND.V47"));
        assert!(staged.precheck_warnings[0].contains("using SECOND.V47"));
    }

    #[tokio::test]
    async fn test_input_named_like_layout_directory_is_skipped() {
        let (_core, _tmp, work, stager) = setup();
        let source = InputSource::Files(vec![
            InputFile::inline("A.MZX", "a"),
            InputFile::inline("Weather", "not a directory"),
        ]);

        let staged = stager.stage(&source, &work).await.unwrap();

        assert_eq!(staged.experiment_names(), vec!["A.MZX"]);
        assert!(work.weather_dir().is_dir());
        assert!(staged.precheck_warnings[0].contains("Weather"));
        assert!(staged.precheck_warnings[0].contains("not staged"));
    }

    #[tokio::test]
    async fn test_no_experiments_has_no_hint() {
        let (_core, _tmp, work, stager) = setup();
        let source = InputSource::Files(vec![InputFile::inline("UFGA.WTH", "w")]);

        let staged = stager.stage(&source, &work).await.unwrap();

        assert!(staged.experiment_files.is_empty());
        assert_eq!(staged.mode_hint, None);
    }

    #[tokio::test]
    async fn test_pool_is_removed_after_staging() {
        let (_core, _tmp, work, stager) = setup();
        let source = InputSource::Files(vec![InputFile::inline("A.MZX", "a")]);

        stager.stage(&source, &work).await.unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(work.root())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".pool-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_missing_core_data_fails_before_placement() {
        let tmp = tempfile::tempdir().unwrap();
        let work = WorkingDirectory::at(tmp.path().join("work")).unwrap();
        let stager = Stager::new(CoreDataProvisioner::new(tmp.path().join("missing")));
        let source = InputSource::Files(vec![InputFile::inline("A.MZX", "a")]);

        let err = stager.stage(&source, &work).await.unwrap_err();

        assert_eq!(err.kind(), "SETUP_PROVISION");
        assert!(!work.join("A.MZX").exists());
    }
}
