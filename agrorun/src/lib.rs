//! # Agrorun
//!
//! Job orchestration for a command-line crop simulation engine.
//!
//! A job arrives as a [`job::JobRequest`] and is carried through a fixed
//! sequence:
//!
//! - **Staging**: inputs are gathered from inline files, archives or object
//!   storage, laid over a fresh copy of the core dataset and classified into
//!   the directory layout the engine expects
//! - **Precheck**: experiment files are checked for weather stations and soil
//!   profiles that were not staged
//! - **Module resolution**: the crop model is chosen from the experiment file
//!   extension, its cultivar section, an override or a fallback
//! - **Execution**: the engine runs once in batch mode, once for a single
//!   experiment, or once per experiment
//! - **Collection**: outputs are selected, archived and delivered inline or to
//!   object storage
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use agrorun::prelude::*;
//!
//! let runner = JobRunner::new(RunnerConfig::default().with_env_overrides());
//! let request = JobRequest::from_json(&event)?;
//! let response = runner.handle(&request).await;
//! println!("{}", response.to_json());
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod archive;
pub mod collect;
pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod job;
pub mod resolve;
pub mod run;
pub mod staging;
pub mod storage;
pub mod testing;
pub mod utils;
pub mod workspace;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::collect::OutputCollector;
    pub use crate::config::RunnerConfig;
    pub use crate::core::{
        ArtifactBundle, ExecutionMode, ModeHint, ModuleCode, ModuleSource, ResolvedModule,
        RunOutcome, RunRecord, RunStatus,
    };
    pub use crate::errors::{AgrorunError, StorageError};
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::job::{FileSource, JobRequest, JobResponse, JobRunner, JobStatus, OutputFormat};
    pub use crate::resolve::ModuleResolver;
    pub use crate::run::{Engine, ExecutionPolicy, Invocation, Orchestrator, ProcessEngine};
    pub use crate::staging::{InputFile, InputSource, Stager, StagingResult};
    pub use crate::storage::{LocalObjectStore, ObjectLocation, ObjectStore};
    pub use crate::utils::{generate_simulation_id, iso_timestamp, Timestamp};
    pub use crate::workspace::{classify, CoreDataProvisioner, FileKind, WorkingDirectory};
}
