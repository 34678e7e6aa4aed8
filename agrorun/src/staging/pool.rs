//! Materializing job inputs into a flat temporary pool.

use super::{InputFile, InputSource, Payload};
use crate::archive;
use crate::errors::{AgrorunError, Result};
use crate::storage::{ObjectLocation, ObjectStore};
use std::path::{Path, PathBuf};
use tracing::debug;

const POOL_FILES_DIR: &str = "files";
const DOWNLOADED_ARCHIVE: &str = "input.zip";

/// Writes every input file into `pool` and returns their paths in discovery order.
///
/// Archives are fully extracted first. Duplicate names are listed once; the
/// later content wins.
pub(crate) async fn materialize(
    source: &InputSource,
    pool: &Path,
    store: Option<&dyn ObjectStore>,
) -> Result<Vec<PathBuf>> {
    let files_dir = pool.join(POOL_FILES_DIR);
    std::fs::create_dir_all(&files_dir).map_err(|e| AgrorunError::workspace(&files_dir, e))?;

    let files = match source {
        InputSource::Archive(bytes) => archive::extract_bytes(bytes, &files_dir)?,
        InputSource::ArchivePath(path) => archive::extract_file(path, &files_dir)?,
        InputSource::StoredArchive(location) => {
            let local = pool.join(DOWNLOADED_ARCHIVE);
            download(store, location, &local).await?;
            archive::extract_file(&local, &files_dir)?
        }
        InputSource::Files(inputs) => write_files(inputs, &files_dir, store).await?,
    };

    debug!(source = source.label(), files = files.len(), "Materialized input pool");
    Ok(files)
}

async fn write_files(
    inputs: &[InputFile],
    dir: &Path,
    store: Option<&dyn ObjectStore>,
) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = Vec::with_capacity(inputs.len());
    for input in inputs {
        let target = dir.join(validate_name(&input.name)?);
        match &input.payload {
            Payload::Inline(content) => std::fs::write(&target, content)
                .map_err(|e| AgrorunError::workspace(&target, e))?,
            Payload::Stored(location) => download(store, location, &target).await?,
        }
        if !paths.contains(&target) {
            paths.push(target);
        }
    }
    Ok(paths)
}

async fn download(
    store: Option<&dyn ObjectStore>,
    location: &ObjectLocation,
    dest: &Path,
) -> Result<()> {
    let store = store.ok_or_else(|| {
        AgrorunError::invalid_input(format!(
            "input {location} references object storage, but no store is configured"
        ))
    })?;
    store.download(location, dest).await?;
    Ok(())
}

/// Accepts only plain file names, so inputs cannot escape the pool.
fn validate_name(name: &str) -> Result<&str> {
    let plain = Path::new(name)
        .file_name()
        .is_some_and(|n| n.to_str() == Some(name));
    if plain && name != "." && name != ".." {
        Ok(name)
    } else {
        Err(AgrorunError::invalid_input(format!(
            "input file name must be a plain file name: {name:?}"
        )))
    }
}
