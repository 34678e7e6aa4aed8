//! The structured job outcome returned to callers.

use crate::core::{ExecutionMode, InlineArtifact, ModuleCode, ModuleSource, RunStatus};
use crate::errors::AgrorunError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Overall job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Every engine run exited zero.
    Ok,
    /// At least one engine run exited non-zero.
    NonzeroExit,
    /// The job aborted with a setup error.
    Error,
}

impl From<RunStatus> for JobStatus {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Ok => Self::Ok,
            RunStatus::NonzeroExit => Self::NonzeroExit,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::NonzeroExit => write!(f, "NONZERO_EXIT"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// The outcome record of one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResponse {
    /// Overall status.
    pub status: JobStatus,
    /// Execution policy used; absent when the job never ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ExecutionMode>,
    /// Number of engine invocations.
    #[serde(default)]
    pub runs: usize,
    /// Exit code of the last invocation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// Number of invocations that exited non-zero.
    #[serde(default)]
    pub failed_runs: usize,
    /// Module passed to the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<ModuleCode>,
    /// How the module was resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_source: Option<ModuleSource>,
    /// Collected artifact paths.
    #[serde(default)]
    pub artifacts: Vec<String>,
    /// Advisory staging findings.
    #[serde(default)]
    pub precheck_warnings: Vec<String>,
    /// Standard output of the last invocation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_stdout: Option<String>,
    /// Standard error of the last invocation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_stderr: Option<String>,
    /// Simulation id.
    pub simulation_id: String,
    /// When the job started.
    pub timestamp: String,
    /// Wall time of the job.
    #[serde(default)]
    pub duration_ms: u64,
    /// URI of the uploaded archive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_results_zip: Option<String>,
    /// URI of the uploaded metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_metadata: Option<String>,
    /// URIs of individually uploaded artifacts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_files: Option<Vec<String>>,
    /// The archive as base64.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_zip_b64: Option<String>,
    /// Inline listing of every artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_files: Option<Vec<InlineArtifact>>,
    /// The setup error, for `ERROR` responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<HashMap<String, serde_json::Value>>,
}

impl JobResponse {
    /// An empty response with the given status.
    #[must_use]
    pub fn new(status: JobStatus, simulation_id: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            status,
            mode: None,
            runs: 0,
            exit_code: None,
            failed_runs: 0,
            module: None,
            module_source: None,
            artifacts: Vec::new(),
            precheck_warnings: Vec::new(),
            last_stdout: None,
            last_stderr: None,
            simulation_id: simulation_id.into(),
            timestamp: timestamp.into(),
            duration_ms: 0,
            s3_results_zip: None,
            s3_metadata: None,
            s3_files: None,
            results_zip_b64: None,
            output_files: None,
            error: None,
        }
    }

    /// An `ERROR` response describing a setup failure.
    #[must_use]
    pub fn failure(
        simulation_id: impl Into<String>,
        timestamp: impl Into<String>,
        duration_ms: u64,
        error: &AgrorunError,
    ) -> Self {
        let mut response = Self::new(JobStatus::Error, simulation_id, timestamp);
        response.duration_ms = duration_ms;
        response.error = Some(error.to_dict());
        response
    }

    /// Returns true if the job ran and every invocation exited zero.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == JobStatus::Ok
    }

    /// Serializes to a JSON value.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
