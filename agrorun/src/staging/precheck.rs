//! Best-effort referential-integrity checks on a staged working directory.
//!
//! Findings are advisory. Nothing here fails; unreadable files become
//! warnings too.

use crate::workspace::{WorkingDirectory, ESSENTIAL_FILES};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

/// Placeholder the engine uses for "no value".
const MISSING_VALUE: &str = "-99";

/// Cross-references read from one experiment file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExperimentRefs {
    /// Weather station codes (upper-cased, de-duplicated).
    pub weather_stations: Vec<String>,
    /// Soil profile ids (upper-cased, de-duplicated).
    pub soil_ids: Vec<String>,
}

impl ExperimentRefs {
    fn add_station(&mut self, code: &str) {
        push_unique(&mut self.weather_stations, code);
    }

    fn add_soil(&mut self, id: &str) {
        push_unique(&mut self.soil_ids, id);
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    let value = value.trim().to_ascii_uppercase();
    if value.is_empty() || value == MISSING_VALUE || list.contains(&value) {
        return;
    }
    list.push(value);
}

static WEATHER_KV: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bWSTA\.*\s*[=:]\s*([A-Z0-9_]+)").expect("valid weather regex")
});

static SOIL_KV: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bID_SOIL\s*[=:]\s*([A-Z0-9_]+)").expect("valid soil regex")
});

/// Extracts weather station and soil references from experiment file text.
///
/// Understands `KEY = VALUE` lines and the tabular `*FIELDS` section whose
/// `@` header names the `WSTA` and `ID_SOIL` columns.
#[must_use]
pub fn extract_refs(text: &str) -> ExperimentRefs {
    let mut refs = ExperimentRefs::default();

    for caps in WEATHER_KV.captures_iter(text) {
        refs.add_station(&caps[1]);
    }
    for caps in SOIL_KV.captures_iter(text) {
        refs.add_soil(&caps[1]);
    }

    let mut in_fields = false;
    let mut columns: (Option<usize>, Option<usize>) = (None, None);
    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('*') {
            in_fields = trimmed.to_ascii_uppercase().starts_with("*FIELDS");
            columns = (None, None);
            continue;
        }
        if !in_fields || trimmed.is_empty() || trimmed.starts_with('!') {
            continue;
        }
        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        if trimmed.starts_with('@') {
            let column = |name: &str| {
                tokens
                    .iter()
                    .position(|t| t.trim_end_matches('.').eq_ignore_ascii_case(name))
            };
            columns = (column("WSTA"), column("ID_SOIL"));
            continue;
        }
        if let Some(code) = columns.0.and_then(|i| tokens.get(i)) {
            refs.add_station(code);
        }
        if let Some(id) = columns.1.and_then(|i| tokens.get(i)) {
            refs.add_soil(id);
        }
    }

    refs
}

/// Runs every check over a staged working directory.
#[must_use]
pub fn precheck(work: &WorkingDirectory, experiments: &[PathBuf]) -> Vec<String> {
    let mut warnings = Vec::new();

    for name in ESSENTIAL_FILES {
        if !work.join(name).is_file() {
            warnings.push(format!(
                "Essential support file {name} is missing from the working directory"
            ));
        }
    }

    let weather_files = list_upper(&work.weather_dir(), "WTH");
    if weather_files.is_empty() {
        warnings.push("No weather files (.WTH) staged in Weather/".to_string());
    }
    let soil_dir = work.soil_dir();

    for experiment in experiments {
        let display = experiment
            .file_name()
            .map_or_else(|| experiment.display().to_string(), |n| n.to_string_lossy().into_owned());
        let text = match std::fs::read(experiment) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                warnings.push(format!("Could not read experiment file {display}: {e}"));
                continue;
            }
        };

        let refs = extract_refs(&text);
        for code in &refs.weather_stations {
            if !weather_present(&weather_files, code) {
                warnings.push(format!(
                    "Weather file {code}.WTH referenced by {display} was not found in Weather/"
                ));
            }
        }
        for id in &refs.soil_ids {
            if !soil_profile_present(&soil_dir, id) {
                warnings.push(format!(
                    "Soil profile {id} referenced by {display} was not found in any Soil/*.SOL file"
                ));
            }
        }
    }

    debug!(warnings = warnings.len(), "Precheck finished");
    warnings
}

/// Upper-cased names of the files in `dir` with the given extension.
fn list_upper(dir: &Path, extension: &str) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let suffix = format!(".{extension}");
    entries
        .filter_map(std::result::Result::ok)
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().to_ascii_uppercase())
        .filter(|name| name.ends_with(&suffix))
        .collect()
}

/// A station code matches `<CODE>.WTH`, or any `<CODE>*.WTH` for 4-letter codes.
fn weather_present(files: &[String], code: &str) -> bool {
    let exact = format!("{code}.WTH");
    files
        .iter()
        .any(|name| *name == exact || (code.len() == 4 && name.starts_with(code)))
}

fn soil_profile_present(dir: &Path, id: &str) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    entries
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("SOL"))
        })
        .filter_map(|p| std::fs::read(p).ok())
        .any(|bytes| {
            String::from_utf8_lossy(&bytes).lines().any(|line| {
                line.trim_start()
                    .strip_prefix('*')
                    .and_then(|rest| rest.split_whitespace().next())
                    .is_some_and(|profile| profile.eq_ignore_ascii_case(id))
            })
        })
}
