//! Session construction traits and the built-in TCP connectivity checker.

use rand::Rng;
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Connection target handed to a session constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionNode {
    /// Resolvable address, typically `host:port`.
    pub address: String,
    /// The endpoint's id in the balancer's registry.
    pub original_index: usize,
    /// Whether a secure transport is required.
    pub secure: bool,
}

/// A live coordination session.
pub trait Session {
    /// Shorten the session deadline to a value sampled uniformly from
    /// `[min_secs, max_secs]`, returning the granted deadline in seconds.
    ///
    /// Used when the session is bound to a sub-optimal endpoint so the
    /// balancer is re-consulted sooner.
    fn set_client_session_deadline(&mut self, min_secs: u64, max_secs: u64) -> u64;
}

/// Constructs sessions against a chosen endpoint.
///
/// The coordination wire protocol lives behind this seam; the balancer
/// only observes whether construction succeeded.
pub trait SessionConnector {
    type Session: Session;
    type Error: std::fmt::Display;

    fn connect(&self, node: &SessionNode) -> Result<Self::Session, Self::Error>;
}

/// Connectivity checker that stands in for a real protocol client: a
/// completed TCP handshake counts as a constructed session.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    connect_timeout: Duration,
}

impl TcpConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl SessionConnector for TcpConnector {
    type Session = TcpSession;
    type Error = io::Error;

    fn connect(&self, node: &SessionNode) -> Result<TcpSession, io::Error> {
        let addr = node.address.to_socket_addrs()?.next().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "address resolved to nothing")
        })?;

        let stream = TcpStream::connect_timeout(&addr, self.connect_timeout)?;
        Ok(TcpSession {
            peer: addr,
            original_index: node.original_index,
            _stream: stream,
            deadline_secs: None,
        })
    }
}

/// Session produced by [`TcpConnector`].
#[derive(Debug)]
pub struct TcpSession {
    peer: SocketAddr,
    original_index: usize,
    _stream: TcpStream,
    deadline_secs: Option<u64>,
}

impl TcpSession {
    /// Address of the connected peer.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Registry id of the endpoint this session is bound to.
    pub fn original_index(&self) -> usize {
        self.original_index
    }

    /// The shortened deadline, if one was applied.
    pub fn deadline_secs(&self) -> Option<u64> {
        self.deadline_secs
    }
}

impl Session for TcpSession {
    fn set_client_session_deadline(&mut self, min_secs: u64, max_secs: u64) -> u64 {
        let granted = if max_secs > min_secs {
            rand::thread_rng().gen_range(min_secs..=max_secs)
        } else {
            min_secs
        };
        self.deadline_secs = Some(granted);
        granted
    }
}
