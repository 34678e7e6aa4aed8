//! Engine execution: the process seam, policy selection and orchestration.

mod engine;
mod orchestrator;
mod policy;

pub use engine::{Engine, Invocation, ProcessEngine, BATCH_FLAG, SINGLE_FLAG};
pub use orchestrator::Orchestrator;
pub use policy::ExecutionPolicy;
