//! First-or-random balancing policy.

use crate::balancer::endpoint::{EndpointInfo, EndpointRegistry, EndpointStatus};
use crate::balancer::policies::{ConnectionBalancer, SelectError};
use rand::Rng;

/// Strongly prefers the first configured endpoint, falling back to a
/// uniformly random pick among the rest.
///
/// Fallback picks carry the shortened session lifetime hint so the caller
/// returns to the primary endpoint sooner.
pub struct FirstOrRandom {
    registry: EndpointRegistry,
}

impl FirstOrRandom {
    /// Create a first-or-random balancer over an ordered host list.
    pub fn new(hosts: &[String]) -> Self {
        Self {
            registry: EndpointRegistry::from_hosts(hosts),
        }
    }

    fn pick_fallback_from(&self, ids: &[usize]) -> EndpointInfo {
        let chosen = rand::thread_rng().gen_range(0..ids.len());
        self.registry.as_fallback(ids[chosen])
    }
}

impl ConnectionBalancer for FirstOrRandom {
    fn select_next(&mut self) -> Result<EndpointInfo, SelectError> {
        if self.registry.is_empty() {
            return Err(SelectError::AllTriesFailed { total: 0 });
        }

        let first_status = self.registry.get(0).status;

        if first_status == EndpointStatus::Online {
            return Ok(self.registry.as_optimal(0));
        }

        let online = self.registry.ids_with_status(EndpointStatus::Online);
        if !online.is_empty() {
            return Ok(self.pick_fallback_from(&online));
        }

        if first_status == EndpointStatus::Undef {
            return Ok(self.registry.as_optimal(0));
        }

        let undef = self.registry.ids_with_status(EndpointStatus::Undef);
        if !undef.is_empty() {
            return Ok(self.pick_fallback_from(&undef));
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
        if current == Some(0) || self.registry.is_empty() {
            return Vec::new();
        }
        vec![self.registry.as_optimal(0)]
    }

    fn has_better(&self, current: usize) -> bool {
        self.registry.get(0).status == EndpointStatus::Online && current != 0
    }
}
