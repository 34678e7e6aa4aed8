//! Driving the engine over a staged working directory.

use super::{Engine, ExecutionPolicy, Invocation};
use crate::core::{ExecutionMode, ModuleCode, RunOutcome};
use crate::errors::Result;
use crate::events::{EventSink, NoOpEventSink, ENGINE_COMPLETED, ENGINE_INVOKED};
use crate::staging::StagingResult;
use crate::workspace::WorkingDirectory;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Runs the engine according to the job's execution policy.
///
/// Invocations are strictly sequential: the engine depends on its current
/// directory and shared support files.
#[derive(Clone)]
pub struct Orchestrator {
    engine: Arc<dyn Engine>,
    events: Arc<dyn EventSink>,
    simulation_id: Option<String>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("simulation_id", &self.simulation_id)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Creates an orchestrator that emits no events.
    #[must_use]
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self {
            engine,
            events: Arc::new(NoOpEventSink),
            simulation_id: None,
        }
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Tags emitted events with a simulation id.
    #[must_use]
    pub fn with_simulation_id(mut self, simulation_id: impl Into<String>) -> Self {
        self.simulation_id = Some(simulation_id.into());
        self
    }

    /// Selects the policy for `staged` and runs it.
    ///
    /// Only a launch failure is an error; non-zero exits are recorded on the
    /// returned outcome.
    pub async fn execute(
        &self,
        work: &WorkingDirectory,
        staged: &StagingResult,
        module: &ModuleCode,
    ) -> Result<RunOutcome> {
        let policy = ExecutionPolicy::select(staged);
        info!(mode = %policy.mode(), module = %module, "Executing engine policy");

        let outcome = match policy {
            ExecutionPolicy::Batch { control_file } => {
                self.run_batch(work, module, control_file).await?
            }
            ExecutionPolicy::Single { experiment } => {
                self.run_single(work, module, experiment).await?
            }
            ExecutionPolicy::Multi { experiments } => {
                self.run_multi(work, module, experiments).await?
            }
        };

        info!(
            mode = %outcome.mode,
            runs = outcome.runs,
            failed_runs = outcome.failed_runs,
            exit_code = outcome.exit_code,
            status = %outcome.status,
            "Engine runs finished"
        );
        Ok(outcome)
    }

    async fn run_batch(
        &self,
        work: &WorkingDirectory,
        module: &ModuleCode,
        control_file: String,
    ) -> Result<RunOutcome> {
        let mut outcome = RunOutcome::new(ExecutionMode::Batch, module.clone());
        self.invoke_into(&mut outcome, work, Invocation::batch(module.clone(), control_file))
            .await?;
        Ok(outcome)
    }

    async fn run_single(
        &self,
        work: &WorkingDirectory,
        module: &ModuleCode,
        experiment: String,
    ) -> Result<RunOutcome> {
        let mut outcome = RunOutcome::new(ExecutionMode::Single, module.clone());
        self.invoke_into(&mut outcome, work, Invocation::single(module.clone(), experiment))
            .await?;
        Ok(outcome)
    }

    async fn run_multi(
        &self,
        work: &WorkingDirectory,
        module: &ModuleCode,
        experiments: Vec<String>,
    ) -> Result<RunOutcome> {
        let mut outcome = RunOutcome::new(ExecutionMode::Multi, module.clone());
        for experiment in experiments {
            self.invoke_into(&mut outcome, work, Invocation::single(module.clone(), experiment))
                .await?;
        }
        Ok(outcome)
    }

    async fn invoke_into(
        &self,
        outcome: &mut RunOutcome,
        work: &WorkingDirectory,
        invocation: Invocation,
    ) -> Result<()> {
        self.events
            .emit(
                ENGINE_INVOKED,
                Some(json!({
                    "simulation_id": self.simulation_id,
                    "module": invocation.module,
                    "flag": invocation.flag,
                    "target": invocation.target,
                })),
            )
            .await;

        let record = self.engine.invoke(&invocation, work.root()).await?;
        if record.status().is_success() {
            info!(file = %record.target, duration_ms = record.duration_ms, "Engine invocation succeeded");
        } else {
            warn!(
                file = %record.target,
                exit_code = record.exit_code,
                "Engine invocation exited non-zero"
            );
        }

        self.events
            .emit(
                ENGINE_COMPLETED,
                Some(json!({
                    "simulation_id": self.simulation_id,
                    "target": record.target,
                    "exit_code": record.exit_code,
                    "duration_ms": record.duration_ms,
                })),
            )
            .await;

        outcome.record(record);
        Ok(())
    }
}
