//! Configuration data types.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub global: GlobalConfig,

    /// Coordination cluster definitions
    #[serde(default)]
    pub clusters: Vec<ClusterConfig>,
}

/// Global configuration settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GlobalConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: json or pretty
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Json,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// One coordination cluster: an ordered host list plus balancing policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClusterConfig {
    /// Unique name for this cluster
    pub name: String,

    /// Ordered list of endpoints, `host:port` or `secure://host:port`.
    /// Order is meaningful for the in_order and first_or_random policies.
    pub hosts: Vec<String>,

    /// Load balancing policy
    #[serde(default)]
    pub policy: Policy,

    /// Session lifetime bounds applied when connected to a sub-optimal host
    #[serde(default)]
    pub fallback_session_lifetime: FallbackSessionLifetime,

    /// Connection timeout for the built-in TCP connectivity checker
    #[serde(default = "default_connect_timeout", with = "humantime_serde")]
    pub connect_timeout: Duration,
}

/// Load balancing policy.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    #[default]
    Random,
    NearestHostname,
    HostnameLevenshteinDistance,
    InOrder,
    FirstOrRandom,
    RoundRobin,
}

/// Bounds for the shortened session deadline used on sub-optimal hosts.
///
/// A session bound to a sub-optimal endpoint is given a deadline sampled
/// uniformly from `[min, max]` so the balancer is re-consulted sooner.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FallbackSessionLifetime {
    #[serde(default = "default_fallback_min", with = "humantime_serde")]
    pub min: Duration,

    #[serde(default = "default_fallback_max", with = "humantime_serde")]
    pub max: Duration,
}

impl FallbackSessionLifetime {
    /// Lower bound in whole seconds.
    pub fn min_secs(&self) -> u64 {
        self.min.as_secs()
    }

    /// Upper bound in whole seconds.
    pub fn max_secs(&self) -> u64 {
        self.max.as_secs()
    }
}

impl Default for FallbackSessionLifetime {
    fn default() -> Self {
        Self {
            min: default_fallback_min(),
            max: default_fallback_max(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_fallback_min() -> Duration {
    Duration::from_secs(3 * 3600)
}

fn default_fallback_max() -> Duration {
    Duration::from_secs(6 * 3600)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

/// Custom serde module for humantime durations.
mod humantime_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = humantime::format_duration(*duration).to_string();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
