//! keeperlb - a client-side connection balancer for ZooKeeper-style
//! coordination services
//!
//! This crate provides:
//! - An endpoint registry tracking per-endpoint liveness
//! - Six load balancing policies (random, round-robin, first-or-random,
//!   and three priority orderings: in-order, nearest hostname,
//!   hostname Levenshtein distance)
//! - A connection-establishment loop with DNS pre-checks, failover, and
//!   a "keep looking for a better host" heuristic
//! - A per-cluster factory table built from YAML configuration
//! - Prometheus metrics for connection attempts

pub mod balancer;
pub mod config;
pub mod connect;
pub mod metrics;
pub mod util;

pub use config::Config;
