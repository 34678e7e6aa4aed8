//! Engine invocation records and the aggregate run outcome.

use super::{ExecutionMode, ModuleCode, RunStatus};
use serde::{Deserialize, Serialize};

/// The result of one engine invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// The file name passed to the engine.
    pub target: String,
    /// The process exit code (`-1` when terminated by a signal).
    pub exit_code: i32,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Wall time of the invocation in milliseconds.
    #[serde(default)]
    pub duration_ms: u64,
}

impl RunRecord {
    /// Creates a record with empty streams.
    #[must_use]
    pub fn new(target: impl Into<String>, exit_code: i32) -> Self {
        Self {
            target: target.into(),
            exit_code,
            stdout: String::new(),
            stderr: String::new(),
            duration_ms: 0,
        }
    }

    /// Sets the captured streams.
    #[must_use]
    pub fn with_streams(mut self, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self.stderr = stderr.into();
        self
    }

    /// Sets the duration.
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Returns the status of this single invocation.
    #[must_use]
    pub fn status(&self) -> RunStatus {
        RunStatus::from_exit_code(self.exit_code)
    }
}

/// Outcome of all engine invocations of one job.
///
/// Only the most recent invocation's exit code and streams are kept. The
/// aggregate `status` reflects the worst result across every invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// The execution policy used.
    pub mode: ExecutionMode,
    /// The module passed to every invocation.
    pub module: ModuleCode,
    /// Number of invocations attempted.
    pub runs: usize,
    /// Number of invocations that exited non-zero.
    pub failed_runs: usize,
    /// Exit code of the last invocation (0 when there were none).
    pub exit_code: i32,
    /// Worst status across all invocations.
    pub status: RunStatus,
    /// Standard output of the last invocation.
    pub last_stdout: Option<String>,
    /// Standard error of the last invocation.
    pub last_stderr: Option<String>,
}

impl RunOutcome {
    /// Creates an outcome with no invocations recorded.
    #[must_use]
    pub fn new(mode: ExecutionMode, module: ModuleCode) -> Self {
        Self {
            mode,
            module,
            runs: 0,
            failed_runs: 0,
            exit_code: 0,
            status: RunStatus::Ok,
            last_stdout: None,
            last_stderr: None,
        }
    }

    /// Folds one invocation into the outcome.
    pub fn record(&mut self, record: RunRecord) {
        let status = record.status();
        self.runs += 1;
        if !status.is_success() {
            self.failed_runs += 1;
        }
        self.status = self.status.worst(status);
        self.exit_code = record.exit_code;
        self.last_stdout = Some(record.stdout);
        self.last_stderr = Some(record.stderr);
    }

    /// Returns true if no invocation was attempted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs == 0
    }
}
