//! Priority-ordered balancing policy.

use crate::balancer::endpoint::{Endpoint, EndpointInfo, EndpointRegistry, EndpointStatus};
use crate::balancer::policies::{ConnectionBalancer, SelectError};
use crate::util::{hostname_levenshtein_distance, hostname_prefix_distance};

/// Ranks endpoints by a per-endpoint integer priority fixed at
/// construction; lower values rank higher, ties broken by lowest id.
///
/// Backs the in-order, nearest-hostname, and Levenshtein-distance
/// policies, which differ only in the priority function.
pub struct PriorityBalancer {
    registry: EndpointRegistry,
    priorities: Vec<usize>,
    /// Global minimum over `priorities`, fixed at construction. A selected
    /// endpoint is optimal iff its priority equals this minimum.
    min_priority: usize,
}

impl PriorityBalancer {
    /// Registration order is the ranking.
    pub fn in_order(hosts: &[String]) -> Self {
        Self::with_priority_fn(hosts, |endpoint| endpoint.id)
    }

    /// Rank by shared-prefix proximity to the local hostname.
    pub fn nearest_hostname(hosts: &[String], local_hostname: &str) -> Self {
        Self::with_priority_fn(hosts, |endpoint| {
            hostname_prefix_distance(local_hostname, &endpoint.address)
        })
    }

    /// Rank by Levenshtein distance to the local hostname.
    pub fn levenshtein(hosts: &[String], local_hostname: &str) -> Self {
        Self::with_priority_fn(hosts, |endpoint| {
            hostname_levenshtein_distance(local_hostname, &endpoint.address)
        })
    }

    /// Build the balancer, computing each endpoint's priority exactly once.
    pub fn with_priority_fn(hosts: &[String], priority: impl Fn(&Endpoint) -> usize) -> Self {
        let registry = EndpointRegistry::from_hosts(hosts);
        let priorities: Vec<usize> = (0..registry.len())
            .map(|id| priority(registry.get(id)))
            .collect();
        let min_priority = priorities.iter().copied().min().unwrap_or(0);
        Self {
            registry,
            priorities,
            min_priority,
        }
    }

    /// Priority assigned to an endpoint.
    pub fn priority(&self, id: usize) -> usize {
        self.priorities[id]
    }

    /// Highest-ranked id with the given status: minimum priority, ties
    /// broken by lowest id.
    fn most_priority(&self, status: EndpointStatus) -> Option<usize> {
        let mut best: Option<usize> = None;
        for id in self.registry.ids_with_status(status) {
            match best {
                Some(current) if self.priorities[id] >= self.priorities[current] => {}
                _ => best = Some(id),
            }
        }
        best
    }

    fn endpoint_info(&self, id: usize) -> EndpointInfo {
        if self.priorities[id] == self.min_priority {
            self.registry.as_optimal(id)
        } else {
            self.registry.as_fallback(id)
        }
    }
}

impl ConnectionBalancer for PriorityBalancer {
    fn select_next(&mut self) -> Result<EndpointInfo, SelectError> {
        self.registry.log_endpoints();

        if let Some(id) = self.most_priority(EndpointStatus::Online) {
            return Ok(self.endpoint_info(id));
        }

        if let Some(id) = self.most_priority(EndpointStatus::Undef) {
            return Ok(self.endpoint_info(id));
        }

        self.registry.reset_offline();
        Err(SelectError::AllTriesFailed {
            total: self.registry.len(),
        })
    }

    fn mark_online(&mut self, id: usize) {
        self.registry.mark_online(id);
    }

    fn mark_offline(&mut self, id: usize) {
        self.registry.mark_offline(id);
    }

    fn reset_offline(&mut self) {
        self.registry.reset_offline();
    }

    fn total_count(&self) -> usize {
        self.registry.len()
    }

    fn available_count(&self) -> usize {
        self.registry.available_count()
    }

    fn worth_checking(&self, current: Option<usize>) -> Vec<EndpointInfo> {
        let outranks_current =
            |id: usize| current.map_or(true, |c| self.priorities[id] < self.priorities[c]);

        let mut candidates = Vec::new();
        for id in self.registry.ids_with_status(EndpointStatus::Undef) {
            if outranks_current(id) {
                candidates.push(self.endpoint_info(id));
            }
        }
        for id in self.registry.ids_with_status(EndpointStatus::Offline) {
            if outranks_current(id) {
                candidates.push(self.endpoint_info(id));
            }
        }
        candidates
    }

    fn has_better(&self, current: usize) -> bool {
        matches!(self.most_priority(EndpointStatus::Online), Some(best) if best != current)
    }
}
