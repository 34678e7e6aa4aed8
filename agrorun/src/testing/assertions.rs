//! Assertions over job responses and archives.

use crate::archive::read_entries;
use crate::job::{JobResponse, JobStatus};

/// Asserts the response status, showing the error on mismatch.
pub fn assert_job_status(response: &JobResponse, expected: JobStatus) {
    assert_eq!(
        response.status, expected,
        "Expected status {expected}, got {} (error: {:?})",
        response.status, response.error
    );
}

/// Asserts that an archive holds exactly `expected`, in order.
///
/// # Panics
///
/// Panics if the archive cannot be read.
pub fn assert_archive_entries(archive: &[u8], expected: &[&str]) {
    let names: Vec<String> = read_entries(archive)
        .expect("readable archive")
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, expected, "Archive entries differ");
}

/// Asserts that some warning mentions every fragment.
pub fn assert_warning_mentions(warnings: &[String], fragments: &[&str]) {
    assert!(
        warnings
            .iter()
            .any(|w| fragments.iter().all(|f| w.contains(f))),
        "No warning mentions all of {fragments:?}. Warnings: {warnings:?}"
    );
}
