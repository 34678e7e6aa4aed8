//! Job lifecycle events.
//!
//! Sinks are passed explicitly to the components that emit; there is no
//! process-wide sink.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

/// A job was accepted.
pub const JOB_STARTED: &str = "job.started";
/// Inputs were staged and prechecked.
pub const JOB_STAGED: &str = "job.staged";
/// The engine module was resolved.
pub const MODULE_RESOLVED: &str = "module.resolved";
/// An engine invocation is about to start.
pub const ENGINE_INVOKED: &str = "engine.invoked";
/// An engine invocation finished (any exit code).
pub const ENGINE_COMPLETED: &str = "engine.completed";
/// Output artifacts were selected and archived.
pub const JOB_COLLECTED: &str = "job.collected";
/// The job produced a response record.
pub const JOB_COMPLETED: &str = "job.completed";
/// The job aborted with a setup error.
pub const JOB_FAILED: &str = "job.failed";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_namespaced() {
        for name in [
            JOB_STARTED,
            JOB_STAGED,
            MODULE_RESOLVED,
            ENGINE_INVOKED,
            ENGINE_COMPLETED,
            JOB_COLLECTED,
            JOB_COMPLETED,
            JOB_FAILED,
        ] {
            let (scope, action) = name.split_once('.').unwrap();
            assert!(["job", "module", "engine"].contains(&scope), "{name}");
            assert!(!action.is_empty());
        }
    }
}
