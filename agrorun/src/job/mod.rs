//! The job adapter: JSON request in, structured response out.

mod request;
mod response;
mod runner;


pub use request::{FileSource, JobRequest, OutputFormat};
pub use response::{JobResponse, JobStatus};
pub use runner::JobRunner;
