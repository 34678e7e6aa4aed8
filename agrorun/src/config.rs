//! Runner configuration.

use crate::collect::DEFAULT_OUTPUTS;
use crate::errors::{AgrorunError, Result};
use crate::resolve::{DEFAULT_FALLBACK_MODULE, DEFAULT_SNIFF_LINE_LIMIT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding [`RunnerConfig::engine_executable`].
pub const ENV_ENGINE: &str = "AGRORUN_ENGINE";
/// Environment variable overriding [`RunnerConfig::core_data_dir`].
pub const ENV_CORE_DATA: &str = "AGRORUN_CORE_DATA";
/// Environment variable overriding [`RunnerConfig::scratch_dir`].
pub const ENV_SCRATCH_DIR: &str = "AGRORUN_SCRATCH_DIR";
/// Environment variable overriding [`RunnerConfig::fallback_module`].
pub const ENV_FALLBACK_MODULE: &str = "AGRORUN_FALLBACK_MODULE";
/// Environment variable supplying [`RunnerConfig::module_override`].
pub const ENV_MODULE_OVERRIDE: &str = "DSSAT_MODULE";

/// Deployment settings for a job runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// The engine binary.
    #[serde(default = "default_engine_executable")]
    pub engine_executable: PathBuf,
    /// The read-only core dataset.
    #[serde(default = "default_core_data_dir")]
    pub core_data_dir: PathBuf,
    /// Parent of per-job working directories.
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,
    /// Outputs returned when a job names none.
    #[serde(default = "default_outputs")]
    pub default_outputs: Vec<String>,
    /// Module used when the experiment file gives no answer.
    #[serde(default)]
    pub module_override: Option<String>,
    /// Module used when nothing else resolves.
    #[serde(default = "default_fallback_module")]
    pub fallback_module: String,
    /// Lines scanned after the cultivar header.
    #[serde(default = "default_sniff_line_limit")]
    pub sniff_line_limit: usize,
}

fn default_engine_executable() -> PathBuf {
    PathBuf::from("/var/task/bin/dscsm048")
}

fn default_core_data_dir() -> PathBuf {
    PathBuf::from("/var/task/Data")
}

fn default_scratch_dir() -> PathBuf {
    std::env::temp_dir()
}

fn default_outputs() -> Vec<String> {
    DEFAULT_OUTPUTS.iter().map(ToString::to_string).collect()
}

fn default_fallback_module() -> String {
    DEFAULT_FALLBACK_MODULE.to_string()
}

fn default_sniff_line_limit() -> usize {
    DEFAULT_SNIFF_LINE_LIMIT
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            engine_executable: default_engine_executable(),
            core_data_dir: default_core_data_dir(),
            scratch_dir: default_scratch_dir(),
            default_outputs: default_outputs(),
            module_override: None,
            fallback_module: default_fallback_module(),
            sniff_line_limit: default_sniff_line_limit(),
        }
    }
}

impl RunnerConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a JSON configuration file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AgrorunError::invalid_input(format!("cannot read config {}: {e}", path.display()))
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Overlays values from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Overlays values from `lookup`. Empty values are ignored.
    #[must_use]
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = get(ENV_ENGINE) {
            self.engine_executable = PathBuf::from(v);
        }
        if let Some(v) = get(ENV_CORE_DATA) {
            self.core_data_dir = PathBuf::from(v);
        }
        if let Some(v) = get(ENV_SCRATCH_DIR) {
            self.scratch_dir = PathBuf::from(v);
        }
        if let Some(v) = get(ENV_FALLBACK_MODULE) {
            self.fallback_module = v.trim().to_string();
        }
        if let Some(v) = get(ENV_MODULE_OVERRIDE) {
            self.module_override = Some(v.trim().to_string());
        }
        self
    }

    /// Sets the engine executable.
    #[must_use]
    pub fn with_engine_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.engine_executable = path.into();
        self
    }

    /// Sets the core data directory.
    #[must_use]
    pub fn with_core_data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.core_data_dir = path.into();
        self
    }

    /// Sets the scratch directory.
    #[must_use]
    pub fn with_scratch_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.scratch_dir = path.into();
        self
    }

    /// Sets the default output list.
    #[must_use]
    pub fn with_default_outputs(mut self, outputs: Vec<String>) -> Self {
        self.default_outputs = outputs;
        self
    }

    /// Sets the module override.
    #[must_use]
    pub fn with_module_override(mut self, module: impl Into<String>) -> Self {
        self.module_override = Some(module.into());
        self
    }

    /// Sets the fallback module.
    #[must_use]
    pub fn with_fallback_module(mut self, module: impl Into<String>) -> Self {
        self.fallback_module = module.into();
        self
    }

    /// Sets the sniff line limit.
    #[must_use]
    pub fn with_sniff_line_limit(mut self, limit: usize) -> Self {
        self.sniff_line_limit = limit;
        self
    }
}
