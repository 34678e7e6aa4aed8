//! Identifiers, timestamps and timing.

mod ids;
mod timer;
pub mod timestamps;

pub use ids::{generate_simulation_id, is_simulation_id, SIMULATION_ID_PREFIX};
pub use timer::SpanTimer;
pub use timestamps::{format_iso8601, iso_timestamp, Timestamp};
