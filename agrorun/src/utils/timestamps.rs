//! UTC timestamps for response records.

use chrono::{DateTime, Utc};

/// A UTC timestamp.
pub type Timestamp = DateTime<Utc>;

/// Format of every timestamp the crate emits:
/// `YYYY-MM-DDTHH:MM:SS.ffffff+00:00`.
const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f+00:00";

/// Returns the current UTC time as an ISO 8601 string.
///
/// # Examples
///
/// ```
/// use agrorun::utils::iso_timestamp;
///
/// let ts = iso_timestamp();
/// assert!(ts.contains('T'));
/// assert!(ts.ends_with("+00:00"));
/// ```
#[must_use]
pub fn iso_timestamp() -> String {
    format_iso8601(&Utc::now())
}

/// Formats a timestamp the same way as [`iso_timestamp`].
#[must_use]
pub fn format_iso8601(dt: &Timestamp) -> String {
    dt.format(ISO_FORMAT).to_string()
}
