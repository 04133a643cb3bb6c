//! Per-cluster balancer table.

use crate::config::{ClusterConfig, Config};
use crate::connect::{ClientFactory, ConnectError, DnsProbe, SessionConnector};
use crate::metrics::ConnectMetrics;
use std::collections::HashMap;
use std::sync::Arc;

/// Process-wide set of connection factories, one per configured cluster,
/// keyed by cluster name.
///
/// The table is built eagerly at startup, so there is no first-use
/// initialization to race on; after construction it is read-only and each
/// factory serializes access to its own balancer internally.
pub struct BalancerTable<C, D> {
    factories: HashMap<String, Arc<ClientFactory<C, D>>>,
}

impl<C, D> BalancerTable<C, D>
where
    C: SessionConnector,
    D: DnsProbe,
{
    /// Build a factory for every configured cluster.
    ///
    /// `build` supplies the connector and DNS probe for each cluster; all
    /// factories share the given metrics collector.
    pub fn from_config(
        config: &Config,
        metrics: ConnectMetrics,
        mut build: impl FnMut(&ClusterConfig) -> (C, D),
    ) -> Result<Self, ConnectError> {
        let mut factories = HashMap::new();
        for cluster in &config.clusters {
            let (connector, dns) = build(cluster);
            let factory =
                ClientFactory::new(cluster, connector, dns)?.with_metrics(metrics.clone());
            factories.insert(cluster.name.clone(), Arc::new(factory));
        }
        Ok(Self { factories })
    }

    /// Factory for a cluster, if configured.
    pub fn get(&self, name: &str) -> Option<Arc<ClientFactory<C, D>>> {
        self.factories.get(name).cloned()
    }

    /// Configured cluster names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of configured clusters.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether the table holds no clusters.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
