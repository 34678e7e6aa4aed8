//! A scripted stand-in for the simulation engine.

use crate::core::RunRecord;
use crate::errors::{AgrorunError, Result};
use crate::run::{Engine, Invocation};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// An [`Engine`] that records every invocation and answers from a script.
///
/// Unscripted targets exit zero with empty output. Scripted output files are
/// written into the working directory on every invocation.
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    exit_codes: HashMap<String, i32>,
    streams: HashMap<String, (String, String)>,
    outputs: Vec<(String, String)>,
    launch_failure: bool,
    calls: Mutex<Vec<(Invocation, PathBuf)>>,
}

impl ScriptedEngine {
    /// Creates an engine where every run succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the exit code for `target`.
    #[must_use]
    pub fn with_exit_code(mut self, target: impl Into<String>, code: i32) -> Self {
        self.exit_codes.insert(target.into(), code);
        self
    }

    /// Scripts the captured streams for `target`.
    #[must_use]
    pub fn with_output(
        mut self,
        target: impl Into<String>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        self.streams.insert(target.into(), (stdout.into(), stderr.into()));
        self
    }

    /// Writes `content` to `rel` under the working directory on each run.
    #[must_use]
    pub fn writes_file(mut self, rel: impl Into<String>, content: impl Into<String>) -> Self {
        self.outputs.push((rel.into(), content.into()));
        self
    }

    /// Makes every invocation fail to launch.
    #[must_use]
    pub fn with_launch_failure(mut self) -> Self {
        self.launch_failure = true;
        self
    }

    /// Returns the positional arguments of every invocation, in order.
    #[must_use]
    pub fn invocation_args(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .iter()
            .map(|(inv, _)| inv.args().iter().map(ToString::to_string).collect())
            .collect()
    }

    /// Returns the target of every invocation, in order.
    #[must_use]
    pub fn targets(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(inv, _)| inv.target.clone()).collect()
    }

    /// Returns the working directory of every invocation, in order.
    #[must_use]
    pub fn working_dirs(&self) -> Vec<PathBuf> {
        self.calls.lock().iter().map(|(_, cwd)| cwd.clone()).collect()
    }

    /// Returns the number of invocations.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Engine for ScriptedEngine {
    async fn invoke(&self, invocation: &Invocation, cwd: &Path) -> Result<RunRecord> {
        self.calls.lock().push((invocation.clone(), cwd.to_path_buf()));
        if self.launch_failure {
            return Err(AgrorunError::Launch {
                executable: PathBuf::from("scripted-engine"),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "scripted launch failure"),
            });
        }

        for (rel, content) in &self.outputs {
            let path = cwd.join(rel);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)?;
        }

        let exit_code = self.exit_codes.get(&invocation.target).copied().unwrap_or(0);
        let (stdout, stderr) = self
            .streams
            .get(&invocation.target)
            .cloned()
            .unwrap_or_default();
        Ok(RunRecord::new(invocation.target.clone(), exit_code).with_streams(stdout, stderr))
    }
}
