//! The connection-establishment loop.

use crate::balancer::{create_balancer, ConnectionBalancer, EndpointInfo, SelectError};
use crate::config::{ClusterConfig, FallbackSessionLifetime};
use crate::connect::dns::{DnsOutcome, DnsProbe};
use crate::connect::session::{Session, SessionConnector, SessionNode};
use crate::metrics::{AttemptOutcome, ConnectMetrics};
use crate::util::local_hostname;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use thiserror::Error;
use tracing::{error, info, warn};

/// Errors surfaced by [`ClientFactory::create_client`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConnectError {
    /// Every endpoint failed and at least one failure was a transient
    /// DNS error.
    #[error("Cannot resolve any of provided ZooKeeper hosts due to DNS error")]
    DnsConnectionLoss,

    /// Every endpoint failed to accept a connection.
    #[error("Cannot use any of provided ZooKeeper nodes")]
    ConnectionLoss,

    /// The cluster was configured without hosts.
    #[error("no hosts specified for cluster '{cluster}'")]
    BadArguments { cluster: String },
}

/// Builds sessions for one cluster, consulting its balancer on every
/// attempt.
///
/// The balancer sits behind a single mutex taken per operation, so
/// background probes may mark endpoints online or offline while a
/// `create_client` call is blocked in DNS or session construction.
pub struct ClientFactory<C, D> {
    cluster: String,
    balancer: Mutex<Box<dyn ConnectionBalancer>>,
    connector: C,
    dns: D,
    fallback_lifetime: FallbackSessionLifetime,
    metrics: ConnectMetrics,
}

impl<C, D> ClientFactory<C, D>
where
    C: SessionConnector,
    D: DnsProbe,
{
    /// Create a factory for a cluster configuration.
    ///
    /// Fails with [`ConnectError::BadArguments`] when the host list is
    /// empty.
    pub fn new(config: &ClusterConfig, connector: C, dns: D) -> Result<Self, ConnectError> {
        if config.hosts.is_empty() {
            return Err(ConnectError::BadArguments {
                cluster: config.name.clone(),
            });
        }

        let balancer = create_balancer(config.policy, &config.hosts, &local_hostname());

        Ok(Self {
            cluster: config.name.clone(),
            balancer: Mutex::new(balancer),
            connector,
            dns,
            fallback_lifetime: config.fallback_session_lifetime.clone(),
            metrics: ConnectMetrics::new(),
        })
    }

    /// Share a metrics collector instead of the factory's private one.
    pub fn with_metrics(mut self, metrics: ConnectMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Name of the cluster this factory serves.
    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    /// The connector sessions are built with.
    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Number of configured endpoints.
    pub fn total_count(&self) -> usize {
        self.balancer().total_count()
    }

    /// Number of endpoints currently online or untried.
    pub fn available_count(&self) -> usize {
        self.balancer().available_count()
    }

    /// Endpoints worth probing speculatively, per the active policy.
    pub fn worth_checking(&self, current: Option<usize>) -> Vec<EndpointInfo> {
        self.balancer().worth_checking(current)
    }

    /// Record that a background probe found the endpoint healthy.
    pub fn mark_online(&self, id: usize) {
        self.balancer().mark_online(id);
    }

    /// Record that a background probe found the endpoint unreachable.
    pub fn mark_offline(&self, id: usize) {
        self.balancer().mark_offline(id);
    }

    /// Give every failed endpoint another chance.
    pub fn reset_offline(&self) {
        self.balancer().reset_offline();
    }

    /// Establish a session, walking endpoints in policy order.
    ///
    /// Each iteration selects an endpoint, pre-checks DNS, attempts
    /// session construction, and feeds the outcome back into the
    /// balancer. A fresh session is discarded and the search continues
    /// when a strictly preferred endpoint is online. Exhaustion of all
    /// endpoints surfaces as a connection-loss error, DNS-flavored if a
    /// transient resolver failure was seen along the way; the balancer
    /// stays usable afterwards because offline statuses were reset.
    pub fn create_client(&self) -> Result<C::Session, ConnectError> {
        let mut dns_error_occurred = false;
        let mut attempts = 0usize;

        loop {
            let endpoint = match self.balancer().select_next() {
                Ok(endpoint) => endpoint,
                Err(SelectError::AllTriesFailed { total }) => {
                    warn!(
                        cluster = %self.cluster,
                        total,
                        dns_error_occurred,
                        "all connection tries failed"
                    );
                    return Err(if dns_error_occurred {
                        ConnectError::DnsConnectionLoss
                    } else {
                        ConnectError::ConnectionLoss
                    });
                }
            };
            attempts += 1;

            match self.dns.probe(&endpoint.address) {
                DnsOutcome::Resolved => {}
                DnsOutcome::HostNotFound => {
                    error!(
                        cluster = %self.cluster,
                        address = %endpoint.address,
                        "cannot use host, address does not resolve"
                    );
                    self.record_failure(&endpoint, AttemptOutcome::HostNotFound);
                    continue;
                }
                DnsOutcome::TransientError => {
                    dns_error_occurred = true;
                    error!(
                        cluster = %self.cluster,
                        address = %endpoint.address,
                        "cannot use host due to DNS error"
                    );
                    self.record_failure(&endpoint, AttemptOutcome::DnsError);
                    continue;
                }
            }

            info!(
                cluster = %self.cluster,
                address = %endpoint.address,
                attempt = attempts,
                endpoints = self.total_count(),
                "connecting to coordination host"
            );

            let node = SessionNode {
                address: endpoint.address.clone(),
                original_index: endpoint.id,
                secure: endpoint.secure,
            };
            let started = Instant::now();

            match self.connector.connect(&node) {
                Ok(mut session) => {
                    if endpoint.settings.use_fallback_session_lifetime {
                        let granted = session.set_client_session_deadline(
                            self.fallback_lifetime.min_secs(),
                            self.fallback_lifetime.max_secs(),
                        );
                        info!(
                            cluster = %self.cluster,
                            address = %endpoint.address,
                            deadline_secs = granted,
                            "connected to a sub-optimal host, session deadline shortened"
                        );
                    }

                    // The endpoint is marked online before the better-host
                    // check under one guard, so the check always sees the
                    // endpoint that just succeeded.
                    let has_better = {
                        let mut balancer = self.balancer();
                        balancer.mark_online(endpoint.id);
                        balancer.has_better(endpoint.id)
                    };
                    self.metrics
                        .record_attempt(&self.cluster, AttemptOutcome::Connected);
                    self.metrics
                        .observe_connect_duration(&self.cluster, started.elapsed());
                    self.metrics
                        .set_endpoint_online(&self.cluster, &endpoint.address, true);

                    if has_better {
                        // The fresh session is dropped in favor of a
                        // strictly preferred endpoint that is online.
                        info!(
                            cluster = %self.cluster,
                            address = %endpoint.address,
                            "better host available, continuing search"
                        );
                        continue;
                    }

                    info!(
                        cluster = %self.cluster,
                        address = %endpoint.address,
                        "connected"
                    );
                    return Ok(session);
                }
                Err(err) => {
                    error!(
                        cluster = %self.cluster,
                        address = %endpoint.address,
                        error = %err,
                        "failed to connect"
                    );
                    self.record_failure(&endpoint, AttemptOutcome::ConnectFailed);
                }
            }
        }
    }

    fn record_failure(&self, endpoint: &EndpointInfo, outcome: AttemptOutcome) {
        self.balancer().mark_offline(endpoint.id);
        self.metrics.record_attempt(&self.cluster, outcome);
        self.metrics
            .set_endpoint_online(&self.cluster, &endpoint.address, false);
    }

    fn balancer(&self) -> MutexGuard<'_, Box<dyn ConnectionBalancer>> {
        self.balancer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
