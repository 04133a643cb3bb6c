//! Logging initialization.

use crate::config::{GlobalConfig, LogFormat};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging system from the global configuration.
///
/// An explicit `level_override` (typically from the command line) beats
/// the configured level, and the `RUST_LOG` environment variable beats
/// both.
pub fn init_logging(global: &GlobalConfig, level_override: Option<&str>) {
    let level = effective_level(global, level_override);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    match global.log_format {
        LogFormat::Json => subscriber.with(fmt::layer().json()).init(),
        LogFormat::Pretty => subscriber.with(fmt::layer().pretty()).init(),
    }
}

fn effective_level<'a>(global: &'a GlobalConfig, level_override: Option<&'a str>) -> &'a str {
    level_override.unwrap_or(&global.log_level)
}
