//! Endpoint registry: the shared substrate of every balancing policy.

use tracing::debug;

/// Scheme prefix marking an endpoint that requires a secure transport.
const SECURE_PREFIX: &str = "secure://";

/// Liveness status of an endpoint.
///
/// Every endpoint starts as `Undef` and moves to `Online` or `Offline`
/// as connection attempts succeed or fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointStatus {
    Undef,
    Online,
    Offline,
}

/// One configured coordination node.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Address suitable for DNS resolution, typically `host:port`.
    pub address: String,
    /// Whether the host was configured with the `secure://` prefix.
    pub secure: bool,
    /// Dense id equal to the endpoint's registration index.
    pub id: usize,
    /// Current liveness status.
    pub status: EndpointStatus,
}

/// Hints passed along with a selected endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientSettings {
    /// When set, the caller should shorten the session deadline so the
    /// balancer is re-consulted sooner.
    pub use_fallback_session_lifetime: bool,
}

/// A selected endpoint as handed to the connection loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointInfo {
    pub address: String,
    pub secure: bool,
    pub id: usize,
    pub settings: ClientSettings,
}

/// Split a configured host string into its address and security flag.
///
/// The `secure://` prefix is stripped from the stored address.
pub fn parse_host(raw: &str) -> (String, bool) {
    match raw.strip_prefix(SECURE_PREFIX) {
        Some(address) => (address.to_string(), true),
        None => (raw.to_string(), false),
    }
}

/// Stores every configured endpoint and its mutable liveness status.
///
/// The registry is agnostic to policy; ids are dense and assigned in
/// registration order.
#[derive(Debug, Default)]
pub struct EndpointRegistry {
    endpoints: Vec<Endpoint>,
}

impl EndpointRegistry {
    /// Build a registry from an ordered host list, parsing `secure://`
    /// prefixes.
    pub fn from_hosts(hosts: &[String]) -> Self {
        let mut registry = Self::default();
        for host in hosts {
            let (address, secure) = parse_host(host);
            registry.add(address, secure);
        }
        registry
    }

    /// Append an endpoint with status `Undef`, returning its assigned id.
    pub fn add(&mut self, address: String, secure: bool) -> usize {
        let id = self.endpoints.len();
        self.endpoints.push(Endpoint {
            address,
            secure,
            id,
            status: EndpointStatus::Undef,
        });
        id
    }

    /// Constant-time lookup by id.
    pub fn get(&self, id: usize) -> &Endpoint {
        &self.endpoints[id]
    }

    /// Number of registered endpoints.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Whether the registry holds no endpoints.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// All ids with the given status, in ascending id order.
    pub fn ids_with_status(&self, status: EndpointStatus) -> Vec<usize> {
        self.endpoints
            .iter()
            .filter(|e| e.status == status)
            .map(|e| e.id)
            .collect()
    }

    pub fn mark_online(&mut self, id: usize) {
        self.endpoints[id].status = EndpointStatus::Online;
    }

    pub fn mark_offline(&mut self, id: usize) {
        self.endpoints[id].status = EndpointStatus::Offline;
    }

    /// Promote every `Offline` endpoint back to `Undef`, giving failed
    /// endpoints another chance. `Online` and `Undef` are untouched.
    pub fn reset_offline(&mut self) {
        for endpoint in &mut self.endpoints {
            if endpoint.status == EndpointStatus::Offline {
                endpoint.status = EndpointStatus::Undef;
            }
        }
    }

    /// Number of endpoints that are `Online` or `Undef`.
    pub fn available_count(&self) -> usize {
        self.endpoints
            .iter()
            .filter(|e| matches!(e.status, EndpointStatus::Online | EndpointStatus::Undef))
            .count()
    }

    /// The given endpoint wrapped as an optimal selection.
    pub fn as_optimal(&self, id: usize) -> EndpointInfo {
        let endpoint = self.get(id);
        EndpointInfo {
            address: endpoint.address.clone(),
            secure: endpoint.secure,
            id,
            settings: ClientSettings {
                use_fallback_session_lifetime: false,
            },
        }
    }

    /// The given endpoint wrapped as a sub-optimal selection that should
    /// use the fallback session lifetime.
    pub fn as_fallback(&self, id: usize) -> EndpointInfo {
        let endpoint = self.get(id);
        EndpointInfo {
            address: endpoint.address.clone(),
            secure: endpoint.secure,
            id,
            settings: ClientSettings {
                use_fallback_session_lifetime: true,
            },
        }
    }

    /// Dump every endpoint's status at debug level.
    pub fn log_endpoints(&self) {
        for endpoint in &self.endpoints {
            debug!(
                id = endpoint.id,
                address = %endpoint.address,
                status = ?endpoint.status,
                "endpoint status"
            );
        }
    }
}
