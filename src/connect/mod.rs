//! Connection establishment against a balanced endpoint set.

mod dns;
mod factory;
mod session;

pub use dns::{DnsOutcome, DnsProbe, SystemDns};
pub use factory::{ClientFactory, ConnectError};
pub use session::{Session, SessionConnector, SessionNode, TcpConnector, TcpSession};
