//! Configuration validation.

use crate::config::Config;
use std::collections::HashSet;

/// Validate the configuration.
///
/// Checks for:
/// - At least one cluster
/// - Unique, non-empty cluster names
/// - At least one host per cluster, no empty host strings
/// - Fallback session lifetime bounds ordered
/// - Valid log level
///
/// Returns `Ok(())` if valid, or an error message describing the problems.
pub fn validate_config(config: &Config) -> Result<(), String> {
    let mut errors = Vec::new();

    if config.clusters.is_empty() {
        errors.push("at least one cluster must be defined".to_string());
    }

    let mut cluster_names = HashSet::new();

    for cluster in &config.clusters {
        if cluster.name.is_empty() {
            errors.push("cluster name cannot be empty".to_string());
        }

        if !cluster_names.insert(&cluster.name) {
            errors.push(format!("duplicate cluster name: {}", cluster.name));
        }

        if cluster.hosts.is_empty() {
            errors.push(format!(
                "cluster '{}' must have at least one host",
                cluster.name
            ));
        }

        for host in &cluster.hosts {
            if host.trim().is_empty() {
                errors.push(format!("cluster '{}' contains an empty host", cluster.name));
            }
        }

        let lifetime = &cluster.fallback_session_lifetime;
        if lifetime.min > lifetime.max {
            errors.push(format!(
                "cluster '{}' fallback_session_lifetime min ({:?}) exceeds max ({:?})",
                cluster.name, lifetime.min, lifetime.max
            ));
        }
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.global.log_level.to_lowercase().as_str()) {
        errors.push(format!(
            "invalid log level '{}', must be one of: {}",
            config.global.log_level,
            valid_levels.join(", ")
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}
