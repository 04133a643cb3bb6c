//! Utility functions and helpers.

mod distance;
mod logging;

pub use distance::{hostname_levenshtein_distance, hostname_prefix_distance, strip_port};
pub use logging::init_logging;

/// Name of the local machine, used by hostname-proximity policies.
///
/// Falls back to `localhost` when the hostname cannot be determined or is
/// not valid UTF-8.
pub fn local_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_else(|| "localhost".to_string())
}
