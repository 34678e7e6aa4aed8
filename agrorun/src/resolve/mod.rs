//! Module resolution: which engine variant to run for a job.
//!
//! Resolution short-circuits in a fixed order: the crop code in the
//! experiment file extension, a crop code sniffed from the file's cultivar
//! section, a caller-supplied override, and finally a generic fallback.
//! Resolution never fails.

mod crops;
mod sniff;

pub use crops::{crop_from_extension, module_for_crop, CROP_MODULES};
pub use sniff::sniff_crop_code;

use crate::core::{ModuleSource, ResolvedModule};
use std::path::Path;
use tracing::{debug, info};

/// Generic module used when nothing else resolves.
pub const DEFAULT_FALLBACK_MODULE: &str = "CRGRO048";

/// Lines scanned after the cultivar header before giving up.
pub const DEFAULT_SNIFF_LINE_LIMIT: usize = 50;

/// Infers the engine module for an experiment file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleResolver {
    fallback: String,
    sniff_line_limit: usize,
}

impl Default for ModuleResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleResolver {
    /// Creates a resolver with the default fallback and sniff limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fallback: DEFAULT_FALLBACK_MODULE.to_string(),
            sniff_line_limit: DEFAULT_SNIFF_LINE_LIMIT,
        }
    }

    /// Sets the fallback module code.
    #[must_use]
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    /// Sets how many lines after the cultivar header are scanned.
    #[must_use]
    pub fn with_sniff_line_limit(mut self, limit: usize) -> Self {
        self.sniff_line_limit = limit;
        self
    }

    /// Resolves the module for `experiment` (the first staged experiment
    /// file, if any), honoring `override_code` only when the file itself
    /// gives no answer.
    ///
    /// The override is trimmed; a blank override counts as absent.
    #[must_use]
    pub fn resolve(&self, experiment: Option<&Path>, override_code: Option<&str>) -> ResolvedModule {
        let resolved = self.resolve_inner(experiment, override_code);
        info!(
            module = %resolved.code,
            source = %resolved.source,
            experiment = experiment.map(|p| p.display().to_string()),
            "Resolved engine module"
        );
        resolved
    }

    fn resolve_inner(&self, experiment: Option<&Path>, override_code: Option<&str>) -> ResolvedModule {
        if let Some(path) = experiment {
            let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            if let Some(module) = crop_from_extension(&name).and_then(|crop| module_for_crop(&crop)) {
                return ResolvedModule::new(module, ModuleSource::Extension);
            }

            match std::fs::read(path) {
                Ok(bytes) => {
                    let text = String::from_utf8_lossy(&bytes);
                    if let Some(module) = sniff_crop_code(&text, self.sniff_line_limit)
                        .and_then(|crop| module_for_crop(&crop))
                    {
                        return ResolvedModule::new(module, ModuleSource::Content);
                    }
                }
                Err(e) => debug!(path = %path.display(), error = %e, "Experiment file unreadable for sniffing"),
            }
        }

        if let Some(code) = override_code.map(str::trim).filter(|c| !c.is_empty()) {
            return ResolvedModule::new(code, ModuleSource::Override);
        }

        ResolvedModule::new(self.fallback.clone(), ModuleSource::Fallback)
    }
}
