//! Metrics collection.

mod collector;

pub use collector::{AttemptOutcome, ConnectMetrics};
