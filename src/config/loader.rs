//! Configuration file loading.

use crate::config::{validate_config, Config};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors raised while loading a cluster configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read cluster configuration '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed cluster configuration '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid cluster configuration: {0}")]
    Invalid(String),
}

/// Load and validate a cluster configuration from a YAML file.
///
/// Every cluster is validated up front, so a bad host list or inverted
/// lifetime bounds fail here rather than when a balancer is first built
/// from them.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let config: Config = serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_config(&config).map_err(ConfigError::Invalid)?;

    for cluster in &config.clusters {
        debug!(
            cluster = %cluster.name,
            hosts = cluster.hosts.len(),
            policy = ?cluster.policy,
            "loaded cluster definition"
        );
    }

    Ok(config)
}
