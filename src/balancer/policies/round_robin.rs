//! Round-robin balancing policy.

use crate::balancer::endpoint::{EndpointInfo, EndpointRegistry, EndpointStatus};
use crate::balancer::policies::{ConnectionBalancer, SelectError};

/// Rotates through endpoints, preferring the cursor position when healthy.
///
/// The cursor only advances when the pick is online or when selection had
/// to move past it; picking the cursor while it is still untried keeps the
/// cursor in place until that endpoint settles, so endpoints that have
/// never been tried are not skipped.
pub struct RoundRobin {
    registry: EndpointRegistry,
    cursor: usize,
}

impl RoundRobin {
    /// Create a round-robin balancer over an ordered host list.
    pub fn new(hosts: &[String]) -> Self {
        Self {
            registry: EndpointRegistry::from_hosts(hosts),
            cursor: 0,
        }
    }

    fn select_and_advance(&mut self, id: usize) -> EndpointInfo {
        self.cursor = (id + 1) % self.registry.len();
        self.registry.as_optimal(id)
    }
}

impl ConnectionBalancer for RoundRobin {
    fn select_next(&mut self) -> Result<EndpointInfo, SelectError> {
        if self.registry.is_empty() {
            return Err(SelectError::AllTriesFailed { total: 0 });
        }

        self.registry.log_endpoints();

        let cursor_status = self.registry.get(self.cursor).status;
        if cursor_status == EndpointStatus::Online {
            return Ok(self.select_and_advance(self.cursor));
        }

        let online = self.registry.ids_with_status(EndpointStatus::Online);
        if let Some(&id) = online.first() {
            return Ok(self.select_and_advance(id));
        }

        // An untried cursor is retried in place until it settles.
        if cursor_status == EndpointStatus::Undef {
            return Ok(self.registry.as_optimal(self.cursor));
        }

        let undef = self.registry.ids_with_status(EndpointStatus::Undef);
        if let Some(&id) = undef.first() {
            return Ok(self.select_and_advance(id));
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
