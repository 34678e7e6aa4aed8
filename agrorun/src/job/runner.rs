//! End-to-end job execution: stage, resolve, run, collect, deliver.

use super::{JobRequest, JobResponse, JobStatus, OutputFormat};
use crate::collect::{inline_artifacts, OutputCollector};
use crate::config::RunnerConfig;
use crate::core::{ArtifactBundle, ResolvedModule, RunOutcome};
use crate::errors::{AgrorunError, Result};
use crate::events::{
    EventSink, NoOpEventSink, JOB_COLLECTED, JOB_COMPLETED, JOB_FAILED, JOB_STAGED, JOB_STARTED,
    MODULE_RESOLVED,
};
use crate::resolve::ModuleResolver;
use crate::run::{Engine, Orchestrator, ProcessEngine};
use crate::staging::{InputSource, Stager, StagingResult};
use crate::storage::{ObjectLocation, ObjectStore};
use crate::utils::{generate_simulation_id, iso_timestamp, SpanTimer};
use crate::workspace::{CoreDataProvisioner, WorkingDirectory};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, info_span, Instrument};

const RESULTS_ARCHIVE: &str = "results.zip";
const METADATA_FILE: &str = "metadata.json";

/// Identity and clock of one job.
struct JobContext {
    simulation_id: String,
    timestamp: String,
    timer: SpanTimer,
}

impl JobContext {
    fn start(request: &JobRequest) -> Self {
        let simulation_id = request
            .simulation_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(generate_simulation_id);
        Self {
            timer: SpanTimer::start(format!("job {simulation_id}")),
            simulation_id,
            timestamp: iso_timestamp(),
        }
    }
}

/// Runs simulation jobs.
///
/// Every job gets its own working directory under the configured scratch
/// directory, removed when the job ends. A runner may be shared across
/// concurrent jobs.
#[derive(Clone)]
pub struct JobRunner {
    config: RunnerConfig,
    engine: Arc<dyn Engine>,
    store: Option<Arc<dyn ObjectStore>>,
    events: Arc<dyn EventSink>,
}

impl std::fmt::Debug for JobRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRunner")
            .field("config", &self.config)
            .field("store", &self.store.is_some())
            .finish_non_exhaustive()
    }
}

impl JobRunner {
    /// Creates a runner using the configured engine executable.
    #[must_use]
    pub fn new(config: RunnerConfig) -> Self {
        let engine = Arc::new(ProcessEngine::new(&config.engine_executable));
        Self {
            config,
            engine,
            store: None,
            events: Arc::new(NoOpEventSink),
        }
    }

    /// Replaces the engine.
    #[must_use]
    pub fn with_engine(mut self, engine: Arc<dyn Engine>) -> Self {
        self.engine = engine;
        self
    }

    /// Sets the object store for stored inputs and storage output.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Runs one job. Setup failures are returned as errors; engine failures
    /// are reported on the response.
    pub async fn run(&self, request: &JobRequest) -> Result<JobResponse> {
        let job = JobContext::start(request);
        self.run_job(request, &job).await
    }

    /// Runs one job and always returns a response; setup failures become
    /// `ERROR` responses.
    pub async fn handle(&self, request: &JobRequest) -> JobResponse {
        let job = JobContext::start(request);
        match self.run_job(request, &job).await {
            Ok(response) => response,
            Err(e) => JobResponse::failure(
                job.simulation_id.clone(),
                job.timestamp.clone(),
                job.timer.elapsed_ms(),
                &e,
            ),
        }
    }

    async fn run_job(&self, request: &JobRequest, job: &JobContext) -> Result<JobResponse> {
        let span = info_span!("job", simulation_id = %job.simulation_id);
        let result = self.execute(request, job).instrument(span).await;
        match &result {
            Ok(response) => {
                info!(
                    simulation_id = %job.simulation_id,
                    status = %response.status,
                    runs = response.runs,
                    duration_ms = response.duration_ms,
                    "Job completed"
                );
                self.events
                    .emit(
                        JOB_COMPLETED,
                        Some(json!({
                            "simulation_id": job.simulation_id,
                            "status": response.status,
                            "runs": response.runs,
                            "artifacts": response.artifacts.len(),
                            "duration_ms": response.duration_ms,
                        })),
                    )
                    .await;
            }
            Err(e) => {
                error!(simulation_id = %job.simulation_id, kind = e.kind(), error = %e, "Job failed");
                self.events
                    .emit(
                        JOB_FAILED,
                        Some(json!({
                            "simulation_id": job.simulation_id,
                            "error": e.to_dict(),
                        })),
                    )
                    .await;
            }
        }
        result
    }

    async fn execute(&self, request: &JobRequest, job: &JobContext) -> Result<JobResponse> {
        self.events
            .emit(
                JOB_STARTED,
                Some(json!({"simulation_id": job.simulation_id, "timestamp": job.timestamp})),
            )
            .await;

        let source = request.input_source()?;
        if request.storage_output().is_some() && self.store.is_none() {
            return Err(AgrorunError::invalid_input(
                "storage output requested, but no object store is configured",
            ));
        }

        let work = WorkingDirectory::ephemeral_in(&self.config.scratch_dir)
            .map_err(|e| AgrorunError::workspace(&self.config.scratch_dir, e))?;
        let staged = self.stage(&source, &work).await?;
        self.events
            .emit(
                JOB_STAGED,
                Some(json!({
                    "simulation_id": job.simulation_id,
                    "input": source.label(),
                    "experiments": staged.experiment_names(),
                    "batch_file": staged.batch_name(),
                    "mode_hint": staged.mode_hint,
                    "precheck_warnings": staged.precheck_warnings.len(),
                })),
            )
            .await;

        let resolved = self.resolve(request, &staged);
        self.events
            .emit(
                MODULE_RESOLVED,
                Some(json!({
                    "simulation_id": job.simulation_id,
                    "module": resolved.code,
                    "source": resolved.source,
                })),
            )
            .await;

        let outcome = Orchestrator::new(Arc::clone(&self.engine))
            .with_events(Arc::clone(&self.events))
            .with_simulation_id(job.simulation_id.clone())
            .execute(&work, &staged, &resolved.code)
            .await?;

        let priority = request
            .return_outputs
            .clone()
            .unwrap_or_else(|| self.config.default_outputs.clone());
        let bundle = OutputCollector::new().collect(&work, &priority)?;
        self.events
            .emit(
                JOB_COLLECTED,
                Some(json!({
                    "simulation_id": job.simulation_id,
                    "artifacts": bundle.artifacts,
                    "archive_bytes": bundle.archive.len(),
                })),
            )
            .await;

        let mut response = build_response(job, &staged, &resolved, outcome, &bundle);
        self.deliver(request, job, &work, &source, &bundle, &mut response)
            .await?;
        response.duration_ms = job.timer.elapsed_ms();
        Ok(response)
    }

    async fn stage(&self, source: &InputSource, work: &WorkingDirectory) -> Result<StagingResult> {
        let mut stager = Stager::new(CoreDataProvisioner::new(&self.config.core_data_dir));
        if let Some(store) = &self.store {
            stager = stager.with_store(Arc::clone(store));
        }
        stager.stage(source, work).await
    }

    fn resolve(&self, request: &JobRequest, staged: &StagingResult) -> ResolvedModule {
        let override_code = request
            .module_override()
            .or(self.config.module_override.as_deref());
        ModuleResolver::new()
            .with_fallback(self.config.fallback_module.clone())
            .with_sniff_line_limit(self.config.sniff_line_limit)
            .resolve(staged.experiment_files.first().map(PathBuf::as_path), override_code)
    }

    /// Uploads results, inlines the archive and the listing as requested.
    async fn deliver(
        &self,
        request: &JobRequest,
        job: &JobContext,
        work: &WorkingDirectory,
        source: &InputSource,
        bundle: &ArtifactBundle,
        response: &mut JobResponse,
    ) -> Result<()> {
        if let (Some((bucket, prefix)), Some(store)) = (request.storage_output(), self.store.as_deref()) {
            let staging = tempfile::Builder::new()
                .prefix(".deliver-")
                .tempdir_in(work.root())?;

            let zip_path = staging.path().join(RESULTS_ARCHIVE);
            bundle.write_archive(&zip_path)?;
            response.s3_results_zip =
                Some(upload(store, &zip_path, bucket, prefix, RESULTS_ARCHIVE).await?);

            if request.unzip_outputs {
                let mut uris = Vec::with_capacity(bundle.len());
                for artifact in &bundle.artifacts {
                    let path = work.join(artifact);
                    if path.is_file() {
                        uris.push(upload(store, &path, bucket, prefix, artifact).await?);
                    }
                }
                response.s3_files = Some(uris);
            }

            let metadata_path = staging.path().join(METADATA_FILE);
            let metadata = metadata(job, response, source);
            std::fs::write(&metadata_path, serde_json::to_vec_pretty(&metadata)?)?;
            response.s3_metadata =
                Some(upload(store, &metadata_path, bucket, prefix, METADATA_FILE).await?);
        }

        if request
            .return_zip_b64
            .unwrap_or(response.s3_results_zip.is_none())
        {
            response.results_zip_b64 = Some(STANDARD.encode(&bundle.archive));
        }

        if request.output_format == OutputFormat::IndividualFiles {
            response.output_files = Some(inline_artifacts(work, &bundle.artifacts)?);
        }
        Ok(())
    }
}

/// The one upload routine for archives, metadata and single artifacts.
async fn upload(
    store: &dyn ObjectStore,
    src: &Path,
    bucket: &str,
    prefix: &str,
    name: &str,
) -> Result<String> {
    let location = ObjectLocation::under_prefix(bucket, prefix, name);
    let uri = store.upload(src, &location).await?;
    info!(uri = %uri, "Uploaded result object");
    Ok(uri)
}

fn build_response(
    job: &JobContext,
    staged: &StagingResult,
    resolved: &ResolvedModule,
    outcome: RunOutcome,
    bundle: &ArtifactBundle,
) -> JobResponse {
    let mut response = JobResponse::new(
        JobStatus::from(outcome.status),
        job.simulation_id.clone(),
        job.timestamp.clone(),
    );
    response.mode = Some(outcome.mode);
    response.runs = outcome.runs;
    response.exit_code = Some(outcome.exit_code);
    response.failed_runs = outcome.failed_runs;
    response.module = Some(resolved.code.clone());
    response.module_source = Some(resolved.source);
    response.artifacts = bundle.artifacts.clone();
    response.precheck_warnings = staged.precheck_warnings.clone();
    response.last_stdout = outcome.last_stdout;
    response.last_stderr = outcome.last_stderr;
    response
}

fn metadata(job: &JobContext, response: &JobResponse, source: &InputSource) -> serde_json::Value {
    let mut metadata = json!({
        "simulation_id": job.simulation_id,
        "timestamp": job.timestamp,
        "status": response.status,
        "mode": response.mode,
        "runs": response.runs,
        "exit_code": response.exit_code,
        "module": response.module,
        "artifacts": response.artifacts,
        "input_source": if matches!(source, InputSource::StoredArchive(_)) { "s3" } else { "base64" },
    });
    if let InputSource::StoredArchive(location) = source {
        metadata["input_s3"] = json!(location.to_string());
    }
    metadata
}
