//! Metrics collector using prometheus-client.
//!
//! Tracks connection attempts, their outcomes, and per-endpoint liveness.
//! The registry is exposed for the embedding application to encode; this
//! crate does not serve an exposition endpoint itself.

use prometheus_client::encoding::{EncodeLabelSet, EncodeLabelValue};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;
use std::sync::Arc;

/// Labels for connection attempt metrics.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct AttemptLabels {
    pub cluster: String,
    pub outcome: AttemptOutcome,
}

/// Outcome of a single connection attempt.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum AttemptOutcome {
    Connected,
    ConnectFailed,
    HostNotFound,
    DnsError,
}

/// Labels for per-cluster metrics.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ClusterLabels {
    pub cluster: String,
}

/// Labels for per-endpoint metrics.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct EndpointLabels {
    pub cluster: String,
    pub address: String,
}

/// Collects and stores all metrics.
#[derive(Clone)]
pub struct ConnectMetrics {
    inner: Arc<ConnectMetricsInner>,
}

struct ConnectMetricsInner {
    /// Connection attempts by outcome.
    attempts_total: Family<AttemptLabels, Counter>,
    /// Time to establish a session (in seconds).
    connect_duration_seconds: Family<ClusterLabels, Histogram>,
    /// Endpoint liveness as last observed (1 = online, 0 = offline).
    endpoint_online: Family<EndpointLabels, Gauge>,
    /// The prometheus registry.
    registry: Registry,
}

impl ConnectMetrics {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let attempts_total = Family::<AttemptLabels, Counter>::default();
        let connect_duration_seconds = Family::<ClusterLabels, Histogram>::new_with_constructor(
            || {
                // Buckets: 1ms up to ~16s
                Histogram::new(exponential_buckets(0.001, 2.5, 12))
            },
        );
        let endpoint_online = Family::<EndpointLabels, Gauge>::default();

        registry.register(
            "keeperlb_connect_attempts",
            "Total number of connection attempts by outcome",
            attempts_total.clone(),
        );
        registry.register(
            "keeperlb_connect_duration_seconds",
            "Time taken to establish a session",
            connect_duration_seconds.clone(),
        );
        registry.register(
            "keeperlb_endpoint_online",
            "Endpoint liveness as last observed (1=online, 0=offline)",
            endpoint_online.clone(),
        );

        Self {
            inner: Arc::new(ConnectMetricsInner {
                attempts_total,
                connect_duration_seconds,
                endpoint_online,
                registry,
            }),
        }
    }

    /// Get the prometheus registry for encoding.
    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    /// Record the outcome of one connection attempt.
    pub fn record_attempt(&self, cluster: &str, outcome: AttemptOutcome) {
        let labels = AttemptLabels {
            cluster: cluster.to_string(),
            outcome,
        };
        self.inner.attempts_total.get_or_create(&labels).inc();
    }

    /// Record how long a successful session establishment took.
    pub fn observe_connect_duration(&self, cluster: &str, duration: std::time::Duration) {
        let labels = ClusterLabels {
            cluster: cluster.to_string(),
        };
        self.inner
            .connect_duration_seconds
            .get_or_create(&labels)
            .observe(duration.as_secs_f64());
    }

    /// Update an endpoint's observed liveness.
    pub fn set_endpoint_online(&self, cluster: &str, address: &str, online: bool) {
        let labels = EndpointLabels {
            cluster: cluster.to_string(),
            address: address.to_string(),
        };
        self.inner
            .endpoint_online
            .get_or_create(&labels)
            .set(i64::from(online));
    }
}

impl Default for ConnectMetrics {
    fn default() -> Self {
        Self::new()
    }
}
