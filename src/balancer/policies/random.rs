//! Uniform random balancing policy.

use crate::balancer::endpoint::{EndpointInfo, EndpointRegistry, EndpointStatus};
use crate::balancer::policies::{ConnectionBalancer, SelectError};
use rand::Rng;

/// Picks uniformly among online endpoints, falling back to untried ones.
///
/// Every selection is considered optimal; there is no ranking to upgrade
/// towards.
pub struct Random {
    registry: EndpointRegistry,
}

impl Random {
    /// Create a random balancer over an ordered host list.
    pub fn new(hosts: &[String]) -> Self {
        Self {
            registry: EndpointRegistry::from_hosts(hosts),
        }
    }

    fn pick_from(&self, ids: &[usize]) -> EndpointInfo {
        let chosen = rand::thread_rng().gen_range(0..ids.len());
        self.registry.as_optimal(ids[chosen])
    }
}

impl ConnectionBalancer for Random {
    fn select_next(&mut self) -> Result<EndpointInfo, SelectError> {
        let online = self.registry.ids_with_status(EndpointStatus::Online);
        if !online.is_empty() {
            return Ok(self.pick_from(&online));
        }

        let undef = self.registry.ids_with_status(EndpointStatus::Undef);
        if !undef.is_empty() {
            return Ok(self.pick_from(&undef));
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

    fn worth_checking(&self, _current: Option<usize>) -> Vec<EndpointInfo> {
        Vec::new()
    }

    fn has_better(&self, _current: usize) -> bool {
        false
    }
}
