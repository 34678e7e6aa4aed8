//! Deflate zip archives for job input and output.
//!
//! Inputs are fully extracted into a flat directory before classification.
//! Outputs are written fresh with relative paths as the only entry names,
//! in insertion order.

use crate::errors::{AgrorunError, Result};
use std::io::{Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Extracts every file entry of an archive into `dest`, flattened to base names.
///
/// Directory components are dropped and entries with unsafe names are
/// skipped. Returns the extracted paths in archive entry order; a later
/// entry with the same base name overwrites an earlier one and is listed
/// only once.
pub fn extract_flat<R: Read + Seek>(reader: R, dest: &Path) -> Result<Vec<PathBuf>> {
    let mut archive = ZipArchive::new(reader)?;
    std::fs::create_dir_all(dest).map_err(|e| AgrorunError::workspace(dest, e))?;

    let mut extracted: Vec<PathBuf> = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let Some(name) = entry
            .enclosed_name()
            .and_then(|p| p.file_name().map(|n| n.to_os_string()))
        else {
            debug!(entry = entry.name(), "Skipping archive entry with unsafe name");
            continue;
        };

        let target = dest.join(&name);
        let mut content = Vec::new();
        entry
            .read_to_end(&mut content)
            .map_err(|e| corrupt_entry(entry.name(), &e))?;
        std::fs::write(&target, content).map_err(|e| AgrorunError::workspace(&target, e))?;

        if !extracted.contains(&target) {
            extracted.push(target);
        }
    }
    Ok(extracted)
}

fn corrupt_entry(name: &str, err: &std::io::Error) -> AgrorunError {
    AgrorunError::Archive(format!("cannot read entry {name}: {err}"))
}

/// Extracts an in-memory archive. See [`extract_flat`].
pub fn extract_bytes(bytes: &[u8], dest: &Path) -> Result<Vec<PathBuf>> {
    extract_flat(Cursor::new(bytes), dest)
}

/// Extracts an archive on disk. See [`extract_flat`].
pub fn extract_file(path: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    let file = std::fs::File::open(path)
        .map_err(|e| AgrorunError::Archive(format!("cannot open {}: {e}", path.display())))?;
    extract_flat(std::io::BufReader::new(file), dest)
}

/// Writes the files at `entries` (relative to `root`) into a new archive.
///
/// Entry names are the given relative paths; order is preserved.
pub fn write_archive(root: &Path, entries: &[String]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for name in entries {
        let content = std::fs::read(root.join(name))?;
        writer.start_file(name.as_str(), options)?;
        writer.write_all(&content)?;
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

/// Reads every file entry of an in-memory archive as `(name, content)` pairs.
pub fn read_entries(bytes: &[u8]) -> Result<Vec<(String, Vec<u8>)>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let mut content = Vec::new();
        entry
            .read_to_end(&mut content)
            .map_err(|e| corrupt_entry(entry.name(), &e))?;
        entries.push((entry.name().to_string(), content));
    }
    Ok(entries)
}

/// Builds an archive from in-memory `(name, content)` pairs.
pub fn archive_from_entries<N: AsRef<str>, C: AsRef<[u8]>>(entries: &[(N, C)]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, content) in entries {
        writer.start_file(name.as_ref(), options)?;
        writer.write_all(content.as_ref())?;
    }
    Ok(writer.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_flattens_directories() {
        let bytes = archive_from_entries(&[
            ("inputs/EXP.MZX", "x"),
            ("inputs/weather/UFGA.WTH", "w"),
            ("EXP.MZX", "second"),
        ])
        .unwrap();
        let tmp = tempfile::tempdir().unwrap();

        let files = extract_bytes(&bytes, tmp.path()).unwrap();

        assert_eq!(files, vec![tmp.path().join("EXP.MZX"), tmp.path().join("UFGA.WTH")]);
        assert_eq!(std::fs::read_to_string(tmp.path().join("EXP.MZX")).unwrap(), "second");
    }

    #[test]
    fn test_extract_skips_unsafe_names() {
        let bytes = archive_from_entries(&[("../escape.WTH", "w"), ("ok.SOL", "s")]).unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("pool");

        let files = extract_bytes(&bytes, &dest).unwrap();

        assert_eq!(files, vec![dest.join("ok.SOL")]);
        assert!(!tmp.path().join("escape.WTH").exists());
    }

    #[test]
    fn test_unreadable_archive_is_archive_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = extract_bytes(b"definitely not a zip", tmp.path()).unwrap_err();
        assert_eq!(err.kind(), "SETUP_ARCHIVE");
    }

    #[test]
    fn test_corrupt_entry_is_archive_error() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        writer.start_file("EXP.MZX", options).unwrap();
        writer.write_all(b"*EXP.DETAILS: UFGA8201MZ").unwrap();
        let mut bytes = writer.finish().unwrap().into_inner();
        let at = bytes.windows(12).position(|w| w == b"*EXP.DETAILS").unwrap();
        bytes[at] ^= 0xFF;
        let tmp = tempfile::tempdir().unwrap();

        let err = extract_bytes(&bytes, tmp.path()).unwrap_err();
        assert_eq!(err.kind(), "SETUP_ARCHIVE");
        assert!(err.to_string().contains("EXP.MZX"));

        let err = read_entries(&bytes).unwrap_err();
        assert_eq!(err.kind(), "SETUP_ARCHIVE");
    }

    #[test]
    fn test_write_preserves_order_and_relative_paths() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("sub")).unwrap();
        std::fs::write(tmp.path().join("b.OUT"), "bbb").unwrap();
        std::fs::write(tmp.path().join("sub/a.CSV"), "aaa").unwrap();

        let entries = vec!["b.OUT".to_string(), "sub/a.CSV".to_string()];
        let bytes = write_archive(tmp.path(), &entries).unwrap();

        let read = read_entries(&bytes).unwrap();
        assert_eq!(
            read,
            vec![
                ("b.OUT".to_string(), b"bbb".to_vec()),
                ("sub/a.CSV".to_string(), b"aaa".to_vec()),
            ]
        );
    }

    #[test]
    fn test_empty_archive_is_valid() {
        let tmp = tempfile::tempdir().unwrap();
        let bytes = write_archive(tmp.path(), &[]).unwrap();
        assert!(read_entries(&bytes).unwrap().is_empty());
    }
}
