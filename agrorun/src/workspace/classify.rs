//! Routing of input files into the working directory by name suffix.

use super::{WorkingDirectory, GENOTYPE_DIR, SOIL_DIR, WEATHER_DIR};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Engine profile file; shares the batch-control suffix but is support data.
const PROFILE_STEM: &str = "DSSATPRO";

/// The role of an input file, decided from its name alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// Experiment file (three-letter extension ending in `X`, e.g. `.MZX`).
    Experiment,
    /// Weather file (`.WTH`).
    Weather,
    /// Soil profile file (`.SOL`).
    Soil,
    /// Cultivar, ecotype or species file (`.CUL`, `.ECO`, `.SPE`).
    Genotype,
    /// Versioned batch-control file (e.g. `.V48`).
    BatchControl,
    /// Anything else; kept in the root as-is.
    Other,
}

impl FileKind {
    /// Returns the subdirectory this kind is placed in, if any.
    #[must_use]
    pub fn subdirectory(&self) -> Option<&'static str> {
        match self {
            Self::Weather => Some(WEATHER_DIR),
            Self::Soil => Some(SOIL_DIR),
            Self::Genotype => Some(GENOTYPE_DIR),
            Self::Experiment | Self::BatchControl | Self::Other => None,
        }
    }
}

/// Returns the upper-cased extension (without the dot) of a file name.
pub(crate) fn extension_upper(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_uppercase)
}

/// Returns true if the name looks like an experiment file for any crop.
#[must_use]
pub fn is_experiment(name: &str) -> bool {
    extension_upper(name).is_some_and(|ext| ext.chars().count() == 3 && ext.ends_with('X'))
}

/// Returns true if the name looks like a batch-control file.
#[must_use]
pub fn is_batch_control(name: &str) -> bool {
    let Some(ext) = extension_upper(name) else {
        return false;
    };
    let bytes = ext.as_bytes();
    let versioned = bytes.len() == 3
        && bytes[0] == b'V'
        && bytes[1].is_ascii_digit()
        && bytes[2].is_ascii_digit();
    let is_profile = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| stem.eq_ignore_ascii_case(PROFILE_STEM));
    versioned && !is_profile
}

/// Classifies a file by name. Never rejects a file.
#[must_use]
pub fn classify(name: &str) -> FileKind {
    if is_experiment(name) {
        return FileKind::Experiment;
    }
    if is_batch_control(name) {
        return FileKind::BatchControl;
    }
    match extension_upper(name).as_deref() {
        Some("WTH") => FileKind::Weather,
        Some("SOL") => FileKind::Soil,
        Some("CUL" | "ECO" | "SPE") => FileKind::Genotype,
        _ => FileKind::Other,
    }
}

/// Returns the canonical location of a file named `name` inside the working directory.
#[must_use]
pub fn placement(name: &str, work: &WorkingDirectory) -> PathBuf {
    match classify(name).subdirectory() {
        Some(sub) => work.join(sub).join(name),
        None => work.join(name),
    }
}

/// Moves `src` to its canonical location inside the working directory.
///
/// Returns the placed path. Calling this again after the source has been
/// moved is a no-op that returns the same destination. A destination that
/// is an existing directory is refused with `AlreadyExists`.
pub fn classify_and_place(src: &Path, work: &WorkingDirectory) -> std::io::Result<PathBuf> {
    let name = src
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("not a file path: {}", src.display()),
            )
        })?;
    let dest = placement(&name, work);

    if !src.exists() {
        return Ok(dest);
    }
    if dest.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("{} is a directory", dest.display()),
        ));
    }

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    move_file(src, &dest)?;
    debug!(file = %name, kind = ?classify(&name), dest = %dest.display(), "Placed input file");
    Ok(dest)
}

fn move_file(src: &Path, dest: &Path) -> std::io::Result<()> {
    if std::fs::rename(src, dest).is_ok() {
        return Ok(());
    }
    // Cross-device moves fall back to copy and delete.
    std::fs::copy(src, dest)?;
    std::fs::remove_file(src)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_experiment_extensions() {
        for name in ["UFGA8201.MZX", "KSAS8101.WHX", "test.rix", "x.SBX", "y.COX"] {
            assert_eq!(classify(name), FileKind::Experiment, "{name}");
        }
        assert!(!is_experiment("file.X"));
        assert!(!is_experiment("file.MZXX"));
        assert!(!is_experiment("noextension"));
    }

    #[test]
    fn test_support_extensions() {
        assert_eq!(classify("UFGA8201.WTH"), FileKind::Weather);
        assert_eq!(classify("soil.sol"), FileKind::Soil);
        assert_eq!(classify("MZCER048.CUL"), FileKind::Genotype);
        assert_eq!(classify("MZCER048.ECO"), FileKind::Genotype);
        assert_eq!(classify("MZCER048.SPE"), FileKind::Genotype);
        assert_eq!(classify("notes.txt"), FileKind::Other);
    }

    #[test]
    fn test_batch_control_excludes_profile() {
        assert_eq!(classify("DSSBatch.v48"), FileKind::BatchControl);
        assert_eq!(classify("RUN.V47"), FileKind::BatchControl);
        assert_eq!(classify("DSSATPRO.v48"), FileKind::Other);
        assert!(!is_batch_control("file.VAB"));
    }

    #[test]
    fn test_place_by_kind() {
        let tmp = tempfile::tempdir().unwrap();
        let pool = tmp.path().join("pool");
        std::fs::create_dir_all(&pool).unwrap();
        let work = WorkingDirectory::at(tmp.path().join("work")).unwrap();

        let cases = [
            ("EXP.MZX", "EXP.MZX"),
            ("UFGA.WTH", "Weather/UFGA.WTH"),
            ("IB.SOL", "Soil/IB.SOL"),
            ("MZCER048.CUL", "Genotype/MZCER048.CUL"),
            ("DSSBatch.v48", "DSSBatch.v48"),
            ("readme.md", "readme.md"),
        ];
        for (name, expected) in cases {
            let src = pool.join(name);
            std::fs::write(&src, name).unwrap();
            let placed = classify_and_place(&src, &work).unwrap();
            assert_eq!(placed, work.join(expected));
            assert!(placed.exists());
            assert!(!src.exists());
        }
    }

    #[test]
    fn test_place_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let work = WorkingDirectory::at(tmp.path().join("work")).unwrap();
        let src = tmp.path().join("UFGA.WTH");
        std::fs::write(&src, "data").unwrap();

        let first = classify_and_place(&src, &work).unwrap();
        let second = classify_and_place(&src, &work).unwrap();

        assert_eq!(first, second);
        assert_eq!(std::fs::read_to_string(first).unwrap(), "data");
    }

    #[test]
    fn test_place_refuses_directory_destination() {
        let tmp = tempfile::tempdir().unwrap();
        let work = WorkingDirectory::at(tmp.path().join("work")).unwrap();
        std::fs::create_dir_all(work.weather_dir()).unwrap();
        let src = tmp.path().join("Weather");
        std::fs::write(&src, "not a directory").unwrap();

        assert_eq!(placement("Weather", &work), work.weather_dir());
        let err = classify_and_place(&src, &work).unwrap_err();

        assert_eq!(err.kind(), std::io::ErrorKind::AlreadyExists);
        assert!(src.exists());
    }
}
