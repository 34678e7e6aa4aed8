//! On-disk fixtures and experiment file builders.

use crate::workspace::{ESSENTIAL_FILES, GENOTYPE_DIR, STANDARD_DATA_DIR};
use std::path::Path;
use tempfile::TempDir;

/// A minimal core dataset in a temporary directory.
///
/// Holds the essential support files, `StandardData/SOIL.SDA` and
/// `Genotype/MZCER048.CUL`.
#[derive(Debug)]
pub struct CoreDataFixture {
    dir: TempDir,
}

impl CoreDataFixture {
    /// Creates the dataset.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be written.
    #[must_use]
    pub fn new() -> Self {
        let dir = tempfile::Builder::new()
            .prefix("core-data-")
            .tempdir()
            .expect("create core data dir");
        let root = dir.path();
        for name in ESSENTIAL_FILES {
            write(root, name, &format!("core {name}\n"));
        }
        write(root, &format!("{STANDARD_DATA_DIR}/SOIL.SDA"), "*SOILS: standard\n");
        write(
            root,
            &format!("{GENOTYPE_DIR}/MZCER048.CUL"),
            "*MAIZE CULTIVAR COEFFICIENTS\n",
        );
        Self { dir }
    }

    /// Returns the dataset root.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

impl Default for CoreDataFixture {
    fn default() -> Self {
        Self::new()
    }
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create fixture dir");
    }
    std::fs::write(path, content).expect("write fixture file");
}

/// Builds experiment file text section by section.
#[derive(Debug, Clone)]
pub struct ExperimentText {
    text: String,
}

impl ExperimentText {
    /// Starts a file with the `*EXP.DETAILS` header line.
    #[must_use]
    pub fn new(title: &str) -> Self {
        Self {
            text: format!("*EXP.DETAILS: {title}\n\n"),
        }
    }

    /// Appends a section verbatim.
    #[must_use]
    pub fn section(mut self, section: &str) -> Self {
        self.text.push_str(section);
        if !section.ends_with('\n') {
            self.text.push('\n');
        }
        self.text.push('\n');
        self
    }

    /// Returns the file text.
    #[must_use]
    pub fn build(self) -> String {
        self.text
    }
}

/// A `*FIELDS` section with one field row.
#[must_use]
pub fn fields_section(weather_station: &str, soil_id: &str) -> String {
    format!(
        "*FIELDS\n\
         @L ID_FIELD WSTA....  FLSA  FLOB  FLDT  FLDD  FLDS  FLST SLTX  SLDP  ID_SOIL    FLNAME\n \
         1 UFGA0002 {weather_station:<8}   -99     0 DR000     0     0 00000 -99    180  {soil_id} -99\n"
    )
}

/// A `*CULTIVARS` section with one cultivar row.
#[must_use]
pub fn cultivars_section(crop: &str, cultivar: &str) -> String {
    format!(
        "*CULTIVARS\n\
         @C CR INGENO CNAME\n \
         1 {crop} {cultivar} TEST CULTIVAR\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_fixture_layout() {
        let core = CoreDataFixture::new();
        for name in ESSENTIAL_FILES {
            assert!(core.path().join(name).is_file());
        }
        assert!(core.path().join("Genotype/MZCER048.CUL").is_file());
    }

    #[test]
    fn test_experiment_builder() {
        let text = ExperimentText::new("TEST")
            .section(&cultivars_section("MZ", "IB0035"))
            .build();
        assert!(text.starts_with("*EXP.DETAILS: TEST"));
        assert!(text.contains(" 1 MZ IB0035 TEST CULTIVAR"));
    }
}
