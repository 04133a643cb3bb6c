//! Connection balancing policies.

mod first_or_random;
mod priority;
mod random;
mod round_robin;

pub use first_or_random::FirstOrRandom;
pub use priority::PriorityBalancer;
pub use random::Random;
pub use round_robin::RoundRobin;

use crate::balancer::endpoint::EndpointInfo;
use crate::config::Policy;
use thiserror::Error;

/// Raised by `select_next` when every endpoint has been tried and failed.
///
/// The balancer resets its offline statuses before raising, so the next
/// selection starts over with every failed endpoint back in play.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    #[error("no available endpoints left out of {total}; offline endpoints reset to undefined status")]
    AllTriesFailed { total: usize },
}

/// Uniform interface over the balancing policies, as used by the
/// connection loop.
pub trait ConnectionBalancer: Send {
    /// Pick the endpoint for the next connection attempt.
    ///
    /// Fails with [`SelectError::AllTriesFailed`] after resetting offline
    /// statuses when no endpoint is online or untried.
    fn select_next(&mut self) -> Result<EndpointInfo, SelectError>;

    fn mark_online(&mut self, id: usize);

    fn mark_offline(&mut self, id: usize);

    fn reset_offline(&mut self);

    /// Number of registered endpoints.
    fn total_count(&self) -> usize;

    /// Number of endpoints that are online or untried.
    fn available_count(&self) -> usize;

    /// Endpoints the caller might speculatively probe in the background.
    ///
    /// Empty for policies with no notion of "better than current". With
    /// `current` set, restricted to endpoints strictly preferred over it.
    fn worth_checking(&self, current: Option<usize>) -> Vec<EndpointInfo>;

    /// True iff an endpoint strictly preferred over `current` is online.
    fn has_better(&self, current: usize) -> bool;
}

/// Build the balancer for a policy over an ordered host list.
///
/// `local_hostname` feeds the hostname-proximity priority functions; it is
/// ignored by the other policies.
pub fn create_balancer(
    policy: Policy,
    hosts: &[String],
    local_hostname: &str,
) -> Box<dyn ConnectionBalancer> {
    match policy {
        Policy::Random => Box::new(Random::new(hosts)),
        Policy::NearestHostname => {
            Box::new(PriorityBalancer::nearest_hostname(hosts, local_hostname))
        }
        Policy::HostnameLevenshteinDistance => {
            Box::new(PriorityBalancer::levenshtein(hosts, local_hostname))
        }
        Policy::InOrder => Box::new(PriorityBalancer::in_order(hosts)),
        Policy::FirstOrRandom => Box::new(FirstOrRandom::new(hosts)),
        Policy::RoundRobin => Box::new(RoundRobin::new(hosts)),
    }
}
