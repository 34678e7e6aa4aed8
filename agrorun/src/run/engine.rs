//! The engine seam: one positional-argument process call per invocation.

use crate::core::{ModuleCode, RunRecord};
use crate::errors::{AgrorunError, Result};
use crate::utils::SpanTimer;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Engine flag for running every treatment of one experiment file.
pub const SINGLE_FLAG: &str = "A";
/// Engine flag for running a batch-control file.
pub const BATCH_FLAG: &str = "B";

/// Arguments of one engine invocation: `(module, flag, target)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Module code passed first.
    pub module: ModuleCode,
    /// Run mode flag.
    pub flag: &'static str,
    /// File name (relative to the working directory) to run.
    pub target: String,
}

impl Invocation {
    /// An invocation over one experiment file.
    #[must_use]
    pub fn single(module: ModuleCode, experiment: impl Into<String>) -> Self {
        Self {
            module,
            flag: SINGLE_FLAG,
            target: experiment.into(),
        }
    }

    /// An invocation driven by a batch-control file.
    #[must_use]
    pub fn batch(module: ModuleCode, control_file: impl Into<String>) -> Self {
        Self {
            module,
            flag: BATCH_FLAG,
            target: control_file.into(),
        }
    }

    /// Returns the positional arguments in order.
    #[must_use]
    pub fn args(&self) -> [&str; 3] {
        [self.module.as_str(), self.flag, &self.target]
    }
}

/// Runs the simulation engine.
///
/// A non-zero exit is a normal result, not an error. Only failing to start
/// the engine at all is an error.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Runs one invocation with `cwd` as the current directory and waits for
    /// it to finish.
    async fn invoke(&self, invocation: &Invocation, cwd: &Path) -> Result<RunRecord>;
}

/// Runs the engine as a child process and captures its output.
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    executable: PathBuf,
}

impl ProcessEngine {
    /// Creates an engine that runs `executable`.
    #[must_use]
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Returns the executable path.
    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

#[async_trait]
impl Engine for ProcessEngine {
    async fn invoke(&self, invocation: &Invocation, cwd: &Path) -> Result<RunRecord> {
        let timer = SpanTimer::start("engine.invoke");
        let output = Command::new(&self.executable)
            .args(invocation.args())
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| AgrorunError::Launch {
                executable: self.executable.clone(),
                source,
            })?;

        // Signal-terminated processes have no code.
        let exit_code = output.status.code().unwrap_or(-1);
        debug!(
            executable = %self.executable.display(),
            file = %invocation.target,
            exit_code,
            "Engine process exited"
        );
        Ok(RunRecord::new(invocation.target.clone(), exit_code)
            .with_streams(
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr),
            )
            .with_duration_ms(timer.finish()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_invocation_args() {
        let single = Invocation::single(ModuleCode::new("MZCER048"), "UFGA8201.MZX");
        assert_eq!(single.args(), ["MZCER048", "A", "UFGA8201.MZX"]);

        let batch = Invocation::batch(ModuleCode::new("MZCER048"), "DSSBatch.v48");
        assert_eq!(batch.args(), ["MZCER048", "B", "DSSBatch.v48"]);
    }

    #[tokio::test]
    async fn test_missing_executable_is_launch_error() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = ProcessEngine::new(tmp.path().join("no-such-engine"));
        let invocation = Invocation::single(ModuleCode::new("MZCER048"), "A.MZX");

        let err = engine.invoke(&invocation, tmp.path()).await.unwrap_err();

        assert_eq!(err.kind(), "SETUP_LAUNCH");
        assert!(err.is_setup());
    }

    #[cfg(unix)]
    fn write_script(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("engine.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_engine_passes_args_and_cwd() {
        let bin = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let script = write_script(
            bin.path(),
            "echo \"$1 $2 $3\"\necho oops >&2\ntouch ran.marker\nexit 3",
        );
        let engine = ProcessEngine::new(script);
        let invocation = Invocation::single(ModuleCode::new("MZCER048"), "UFGA8201.MZX");

        let record = engine.invoke(&invocation, work.path()).await.unwrap();

        assert_eq!(record.exit_code, 3);
        assert_eq!(record.target, "UFGA8201.MZX");
        assert_eq!(record.stdout.trim(), "MZCER048 A UFGA8201.MZX");
        assert_eq!(record.stderr.trim(), "oops");
        assert!(work.path().join("ran.marker").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_signal_termination_records_minus_one() {
        let bin = tempfile::tempdir().unwrap();
        let script = write_script(bin.path(), "kill -9 $$");
        let engine = ProcessEngine::new(script);
        let invocation = Invocation::batch(ModuleCode::new("MZCER048"), "DSSBatch.v48");

        let record = engine.invoke(&invocation, bin.path()).await.unwrap();

        assert_eq!(record.exit_code, -1);
    }
}
