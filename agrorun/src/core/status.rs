//! Execution mode and run status enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The execution hint derived while staging inputs.
///
/// `Batch` iff a batch-control file was staged, `Single` iff exactly one
/// experiment file and no batch-control file was staged. Anything else has
/// no hint and the caller iterates over experiment files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModeHint {
    /// One invocation over a single experiment file.
    Single,
    /// One invocation driven by a batch-control file.
    Batch,
}

impl fmt::Display for ModeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "SINGLE"),
            Self::Batch => write!(f, "BATCH"),
        }
    }
}

/// The execution policy actually used for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionMode {
    /// A single invocation with the batch-control file.
    Batch,
    /// A single invocation with the sole experiment file.
    Single,
    /// One invocation per experiment file, in discovery order.
    Multi,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Batch => write!(f, "BATCH"),
            Self::Single => write!(f, "SINGLE"),
            Self::Multi => write!(f, "MULTI"),
        }
    }
}

/// Aggregate status of all engine invocations of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    /// Every invocation exited with code zero (or there were none).
    #[default]
    Ok,
    /// At least one invocation exited with a non-zero code.
    NonzeroExit,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::NonzeroExit => write!(f, "NONZERO_EXIT"),
        }
    }
}

impl RunStatus {
    /// Returns the status for a single exit code.
    #[must_use]
    pub fn from_exit_code(code: i32) -> Self {
        if code == 0 {
            Self::Ok
        } else {
            Self::NonzeroExit
        }
    }

    /// Combines two statuses, keeping the worse of the two.
    #[must_use]
    pub fn worst(self, other: Self) -> Self {
        if self == Self::NonzeroExit || other == Self::NonzeroExit {
            Self::NonzeroExit
        } else {
            Self::Ok
        }
    }

    /// Returns true if the status indicates success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Ok)
    }
}
