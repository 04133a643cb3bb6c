//! DNS pre-checks for endpoint addresses.

use std::net::ToSocketAddrs;

/// Outcome of a DNS probe, distinguishing misconfiguration from a
/// resolver that is temporarily unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnsOutcome {
    /// The address resolved to at least one socket address.
    Resolved,
    /// The host does not exist; most likely a wrong hostname was
    /// configured.
    HostNotFound,
    /// The resolver failed transiently; DNS may be unavailable right now.
    TransientError,
}

/// Probes an endpoint address ahead of a connection attempt.
///
/// Implementations must not serve the probe from a cache: any cached
/// resolution for the address is purged or bypassed so the result
/// reflects current DNS state.
pub trait DnsProbe {
    fn probe(&self, address: &str) -> DnsOutcome;
}

/// Resolver backed by the standard library.
///
/// `std` performs no caching of its own, so every probe is a fresh
/// lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDns;

impl DnsProbe for SystemDns {
    fn probe(&self, address: &str) -> DnsOutcome {
        match address.to_socket_addrs() {
            Ok(mut addrs) => {
                if addrs.next().is_some() {
                    DnsOutcome::Resolved
                } else {
                    DnsOutcome::HostNotFound
                }
            }
            Err(err) => classify_resolver_error(&err),
        }
    }
}

/// The standard library folds every getaddrinfo failure into an opaque
/// `io::Error`, so transient resolver failures (EAI_AGAIN) can only be
/// told apart by message.
fn classify_resolver_error(err: &std::io::Error) -> DnsOutcome {
    let message = err.to_string().to_lowercase();
    if message.contains("temporary failure") || message.contains("try again") {
        DnsOutcome::TransientError
    } else {
        DnsOutcome::HostNotFound
    }
}
