//! Selecting and packaging engine outputs.

mod inline;

pub use inline::inline_artifacts;

use crate::archive;
use crate::core::ArtifactBundle;
use crate::errors::Result;
use crate::workspace::WorkingDirectory;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Well-known outputs, in the order they are preferred.
pub const DEFAULT_OUTPUTS: [&str; 5] = [
    "Summary.OUT",
    "PlantGro.OUT",
    "Evaluate.OUT",
    "Warning.OUT",
    "MODEL.ERR",
];

/// Extensions collected when no priority name matched.
pub const FALLBACK_EXTENSIONS: [&str; 4] = ["OUT", "CSV", "PLT", "DSS"];

/// File names always collected in the fallback pass.
pub const FALLBACK_NAMES: [&str; 2] = ["MODEL.ERR", "WARNING.OUT"];

/// Picks output files from a working directory and archives them.
#[derive(Debug, Clone, Default)]
pub struct OutputCollector;

impl OutputCollector {
    /// Creates a collector.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns the relative paths of the files to deliver, in delivery order.
    ///
    /// Names in `priority` are matched case-insensitively against every file
    /// in the tree; the first match in sorted walk order wins. When nothing
    /// in `priority` matches, the defaults are taken first and then every
    /// file with an output extension or well-known name.
    pub fn select(&self, work: &WorkingDirectory, priority: &[String]) -> Result<Vec<String>> {
        let files = list_files(work.root())?;

        let mut selected: Vec<String> = Vec::new();
        for name in priority {
            push_first_match(&mut selected, &files, name);
        }
        if !selected.is_empty() {
            debug!(matched = selected.len(), "Collected priority outputs");
            return Ok(selected);
        }

        for name in DEFAULT_OUTPUTS {
            push_first_match(&mut selected, &files, name);
        }
        for rel in &files {
            if is_fallback_output(rel) && !selected.contains(rel) {
                selected.push(rel.clone());
            }
        }
        debug!(matched = selected.len(), "Collected fallback outputs");
        Ok(selected)
    }

    /// Selects outputs and writes them into a fresh archive.
    ///
    /// The archive contains exactly the selected files; an empty selection
    /// yields a valid empty archive.
    pub fn collect(&self, work: &WorkingDirectory, priority: &[String]) -> Result<ArtifactBundle> {
        let artifacts = self.select(work, priority)?;
        let archive = archive::write_archive(work.root(), &artifacts)?;
        info!(
            artifacts = artifacts.len(),
            archive_bytes = archive.len(),
            "Packaged output artifacts"
        );
        Ok(ArtifactBundle { artifacts, archive })
    }
}

/// Every regular file under `root` as a `/`-separated relative path, in
/// sorted walk order.
fn list_files(root: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        let rel = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push(rel);
    }
    Ok(files)
}

fn base_name(rel: &str) -> &str {
    rel.rsplit('/').next().unwrap_or(rel)
}

fn push_first_match(selected: &mut Vec<String>, files: &[String], name: &str) {
    if let Some(found) = files
        .iter()
        .find(|rel| base_name(rel).eq_ignore_ascii_case(name))
    {
        if !selected.contains(found) {
            selected.push(found.clone());
        }
    }
}

fn is_fallback_output(rel: &str) -> bool {
    let name = base_name(rel);
    if FALLBACK_NAMES.iter().any(|n| n.eq_ignore_ascii_case(name)) {
        return true;
    }
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| FALLBACK_EXTENSIONS.iter().any(|x| x.eq_ignore_ascii_case(ext)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{extract_bytes, read_entries};
    use pretty_assertions::assert_eq;

    fn work_with(files: &[(&str, &str)]) -> (tempfile::TempDir, WorkingDirectory) {
        let tmp = tempfile::tempdir().unwrap();
        let work = WorkingDirectory::at(tmp.path()).unwrap();
        for (rel, content) in files {
            let path = work.join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
        (tmp, work)
    }

    #[test]
    fn test_default_order_and_exclusion() {
        let (_tmp, work) = work_with(&[
            ("Summary.OUT", "summary"),
            ("random.txt", "noise"),
            ("PlantGro.OUT", "growth"),
        ]);

        let bundle = OutputCollector::new().collect(&work, &[]).unwrap();

        assert_eq!(bundle.artifacts, vec!["Summary.OUT", "PlantGro.OUT"]);
        let names: Vec<_> = read_entries(&bundle.archive)
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["Summary.OUT", "PlantGro.OUT"]);
    }

    #[test]
    fn test_priority_list_is_case_insensitive_and_ordered() {
        let (_tmp, work) = work_with(&[
            ("SUMMARY.OUT", "s"),
            ("sub/plantgro.out", "p"),
            ("Evaluate.OUT", "e"),
        ]);
        let priority = vec!["PlantGro.OUT".to_string(), "Summary.OUT".to_string(), "Missing.OUT".to_string()];

        let selected = OutputCollector::new().select(&work, &priority).unwrap();

        assert_eq!(selected, vec!["sub/plantgro.out", "SUMMARY.OUT"]);
    }

    #[test]
    fn test_unmatched_priority_falls_back() {
        let (_tmp, work) = work_with(&[
            ("ET.OUT", "et"),
            ("MODEL.ERR", "err"),
            ("Weather/UFGA.WTH", "w"),
            ("PlantGro.OUT", "p"),
            ("results.csv", "c"),
        ]);

        let selected = OutputCollector::new()
            .select(&work, &["Nothing.OUT".to_string()])
            .unwrap();

        assert_eq!(selected, vec!["PlantGro.OUT", "MODEL.ERR", "ET.OUT", "results.csv"]);
    }

    #[test]
    fn test_empty_directory_yields_empty_archive() {
        let (_tmp, work) = work_with(&[]);
        let bundle = OutputCollector::new().collect(&work, &[]).unwrap();
        assert!(bundle.is_empty());
        assert!(read_entries(&bundle.archive).unwrap().is_empty());
    }

    #[test]
    fn test_archive_round_trip_reproduces_files() {
        let (_tmp, work) = work_with(&[
            ("Summary.OUT", "summary body"),
            ("out/Evaluate.OUT", "evaluate body"),
        ]);
        let bundle = OutputCollector::new().collect(&work, &[]).unwrap();

        let entries = read_entries(&bundle.archive).unwrap();
        assert_eq!(entries.len(), bundle.artifacts.len());
        for (name, content) in entries {
            assert!(bundle.artifacts.contains(&name));
            assert_eq!(content, std::fs::read(work.join(&name)).unwrap());
        }

        let dest = tempfile::tempdir().unwrap();
        let extracted = extract_bytes(&bundle.archive, dest.path()).unwrap();
        assert_eq!(extracted.len(), 2);
    }
}
