//! Test support for agrorun jobs.
//!
//! This module provides:
//! - A minimal core dataset on disk
//! - A scripted engine that records invocations
//! - Experiment file text builders
//! - Assertions over responses and archives

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{
    assert_archive_entries, assert_job_status, assert_warning_mentions,
};
pub use fixtures::{cultivars_section, fields_section, CoreDataFixture, ExperimentText};
pub use mocks::ScriptedEngine;
