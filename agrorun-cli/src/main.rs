mod logging;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use agrorun::config::RunnerConfig;
use agrorun::events::LoggingEventSink;
use agrorun::job::{JobRequest, JobRunner, JobStatus};
use agrorun::resolve::ModuleResolver;
use agrorun::staging::precheck;
use agrorun::storage::LocalObjectStore;
use agrorun::workspace::{is_experiment, WorkingDirectory};
use anyhow::Context;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "agrorun",
    version,
    about = "Stage, run and collect crop simulation engine jobs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one job from a JSON event
    Run {
        /// Event file, or `-` for stdin
        #[arg(long)]
        event: String,
        /// Runner configuration JSON
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write the response here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Serve stored inputs and outputs from this directory (`bucket/key`)
        #[arg(long)]
        store_root: Option<PathBuf>,
    },
    /// Print the module an experiment file resolves to
    Resolve {
        /// Experiment file
        file: PathBuf,
        /// Module code used when the file gives no answer
        #[arg(long)]
        module_override: Option<String>,
    },
    /// Print precheck warnings for a staged directory
    Precheck {
        /// Working directory with experiment files at its root
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    logging::init(cli.log_json);

    match cli.command {
        Commands::Run {
            event,
            config,
            output,
            store_root,
        } => run(&event, config.as_deref(), output.as_deref(), store_root).await,
        Commands::Resolve {
            file,
            module_override,
        } => {
            let config = RunnerConfig::default().with_env_overrides();
            let resolved = ModuleResolver::new()
                .with_fallback(config.fallback_module)
                .with_sniff_line_limit(config.sniff_line_limit)
                .resolve(
                    Some(&file),
                    module_override.as_deref().or(config.module_override.as_deref()),
                );
            println!("{} ({})", resolved.code, resolved.source);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Precheck { dir } => {
            let warnings = precheck_dir(&dir)?;
            for warning in &warnings {
                println!("{warning}");
            }
            Ok(if warnings.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
    }
}

async fn run(
    event: &str,
    config: Option<&Path>,
    output: Option<&Path>,
    store_root: Option<PathBuf>,
) -> anyhow::Result<ExitCode> {
    let config = match config {
        Some(path) => RunnerConfig::from_json_file(path)?,
        None => RunnerConfig::default(),
    }
    .with_env_overrides();

    let text = if event == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read event from stdin")?;
        text
    } else {
        std::fs::read_to_string(event).with_context(|| format!("failed to read event {event}"))?
    };
    let request = JobRequest::from_json(&text).context("invalid job event")?;

    let mut runner = JobRunner::new(config).with_events(Arc::new(LoggingEventSink::debug()));
    if let Some(root) = store_root {
        runner = runner.with_store(Arc::new(LocalObjectStore::new(root)));
    }

    let response = runner.handle(&request).await;
    let rendered = serde_json::to_string_pretty(&response.to_json())?;
    match output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{rendered}"),
    }

    Ok(match response.status {
        JobStatus::Ok => ExitCode::SUCCESS,
        JobStatus::NonzeroExit => ExitCode::from(1),
        JobStatus::Error => ExitCode::from(2),
    })
}

fn precheck_dir(dir: &Path) -> anyhow::Result<Vec<String>> {
    anyhow::ensure!(dir.is_dir(), "{} is not a directory", dir.display());

    let mut experiments = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_match = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(is_experiment);
        if path.is_file() && is_match {
            experiments.push(path);
        }
    }
    experiments.sort();

    let work = WorkingDirectory::at(dir)?;
    Ok(precheck(&work, &experiments))
}
