//! Input staging: materialize, provision, place, precheck.

mod input;
mod pool;
mod precheck;
mod stager;

pub use input::{InputFile, InputSource, Payload};
pub use precheck::{extract_refs, precheck, ExperimentRefs};
pub use stager::{derive_mode_hint, Stager, StagingResult};

pub(crate) use stager::file_name;
