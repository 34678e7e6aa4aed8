//! Simulation identifiers.

use uuid::Uuid;

/// Prefix of generated simulation ids.
pub const SIMULATION_ID_PREFIX: &str = "sim-";

/// Generates a fresh simulation id: `sim-` followed by 8 lowercase hex
/// characters of a random UUID.
#[must_use]
pub fn generate_simulation_id() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    format!("{SIMULATION_ID_PREFIX}{}", &simple[..8])
}

/// Returns true if `id` has the shape of a generated simulation id.
#[must_use]
pub fn is_simulation_id(id: &str) -> bool {
    id.strip_prefix(SIMULATION_ID_PREFIX)
        .is_some_and(|hex| hex.len() == 8 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
