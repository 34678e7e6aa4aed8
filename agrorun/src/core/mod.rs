//! Core domain model types for agrorun.
//!
//! This module contains the fundamental types shared by every component:
//! - Mode hints, execution modes and run status
//! - Module codes and their resolution source
//! - Run records, run outcomes and artifact bundles

mod artifact;
mod module;
mod record;
mod status;

pub use artifact::{ArtifactBundle, InlineArtifact};
pub use module::{ModuleCode, ModuleSource, ResolvedModule};
pub use record::{RunOutcome, RunRecord};
pub use status::{ExecutionMode, ModeHint, RunStatus};
