//! keeperlb - coordination cluster connectivity checker
//!
//! Usage:
//!     keeperlb --config <path>
//!
//! Loads a cluster configuration, builds the per-cluster balancers, and
//! attempts to establish one connection per cluster, reporting which
//! endpoint the active policy settled on.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use keeperlb::balancer::BalancerTable;
use keeperlb::config::{load_config, ClusterConfig};
use keeperlb::connect::{SystemDns, TcpConnector};
use keeperlb::metrics::ConnectMetrics;
use keeperlb::util::init_logging;

/// Connectivity checker for ZooKeeper-style coordination clusters.
#[derive(Parser, Debug)]
#[command(name = "keeperlb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Check only this cluster
    #[arg(long, value_name = "NAME")]
    cluster: Option<String>,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli.config).with_context(|| {
        format!(
            "failed to load configuration from '{}'",
            cli.config.display()
        )
    })?;

    init_logging(&config.global, cli.log_level.as_deref());

    if cli.validate {
        info!("Configuration is valid");
        println!("Configuration is valid.");
        println!("  Clusters: {}", config.clusters.len());
        for cluster in &config.clusters {
            println!(
                "    - {} ({} hosts) [{:?}]",
                cluster.name,
                cluster.hosts.len(),
                cluster.policy
            );
        }
        return Ok(());
    }

    if let Some(name) = &cli.cluster {
        if !config.clusters.iter().any(|c| &c.name == name) {
            anyhow::bail!("cluster '{name}' is not defined in the configuration");
        }
    }

    info!(
        config_path = %cli.config.display(),
        clusters = config.clusters.len(),
        "keeperlb starting"
    );

    let metrics = ConnectMetrics::new();
    let table = BalancerTable::from_config(&config, metrics.clone(), build_cluster_stack)
        .context("failed to build balancer table")?;

    let mut failures = 0usize;
    for name in table.names() {
        if cli.cluster.as_deref().is_some_and(|only| only != name) {
            continue;
        }

        let factory = table
            .get(name)
            .context("cluster disappeared from the table")?;

        info!(
            cluster = %name,
            endpoints = factory.total_count(),
            "checking cluster"
        );

        match factory.create_client() {
            Ok(session) => {
                println!("cluster '{}': connected to {}", name, session.peer_addr());
                if let Some(deadline) = session.deadline_secs() {
                    println!("  sub-optimal endpoint, session deadline {deadline}s");
                }
                for candidate in factory.worth_checking(Some(session.original_index())) {
                    println!("  worth probing later: {}", candidate.address);
                }
            }
            Err(err) => {
                failures += 1;
                error!(cluster = %name, error = %err, "cluster check failed");
                println!("cluster '{name}': FAILED ({err})");
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} cluster check(s) failed");
    }
    Ok(())
}

/// Connector and DNS probe used to check one cluster.
fn build_cluster_stack(cluster: &ClusterConfig) -> (TcpConnector, SystemDns) {
    (TcpConnector::new(cluster.connect_timeout), SystemDns)
}
