//! Integration tests for keeperlb.
//!
//! These drive the full connection loop against scripted connectors and
//! DNS probes.

use keeperlb::config::{ClusterConfig, FallbackSessionLifetime, Policy};
use keeperlb::connect::{
    ClientFactory, ConnectError, DnsOutcome, DnsProbe, Session, SessionConnector, SessionNode,
};
use std::collections::HashMap;
use std::sync::{mpsc, Mutex};
use std::time::Duration;

/// Session stub that records whether its deadline was shortened.
#[derive(Debug)]
struct ScriptedSession {
    address: String,
    deadline: Option<u64>,
}

impl Session for ScriptedSession {
    fn set_client_session_deadline(&mut self, min_secs: u64, max_secs: u64) -> u64 {
        assert!(min_secs <= max_secs);
        self.deadline = Some(min_secs);
        min_secs
    }
}

/// Connector scripted with per-address verdicts; unknown addresses fail.
struct ScriptedConnector {
    reachable: Mutex<HashMap<String, bool>>,
    attempted: Mutex<Vec<String>>,
}

impl ScriptedConnector {
    fn new(reachable: &[(&str, bool)]) -> Self {
        Self {
            reachable: Mutex::new(
                reachable
                    .iter()
                    .map(|(address, up)| (address.to_string(), *up))
                    .collect(),
            ),
            attempted: Mutex::new(Vec::new()),
        }
    }

    fn set_reachable(&self, address: &str, up: bool) {
        self.reachable
            .lock()
            .unwrap()
            .insert(address.to_string(), up);
    }

    fn attempted(&self) -> Vec<String> {
        self.attempted.lock().unwrap().clone()
    }
}

impl SessionConnector for ScriptedConnector {
    type Session = ScriptedSession;
    type Error = String;

    fn connect(&self, node: &SessionNode) -> Result<ScriptedSession, String> {
        self.attempted.lock().unwrap().push(node.address.clone());
        let up = self
            .reachable
            .lock()
            .unwrap()
            .get(&node.address)
            .copied()
            .unwrap_or(false);
        if up {
            Ok(ScriptedSession {
                address: node.address.clone(),
                deadline: None,
            })
        } else {
            Err(format!("connection refused: {}", node.address))
        }
    }
}

/// DNS probe scripted with per-address outcomes; the default resolves.
#[derive(Default)]
struct ScriptedDns {
    outcomes: HashMap<String, DnsOutcome>,
}

impl ScriptedDns {
    fn with(mut self, address: &str, outcome: DnsOutcome) -> Self {
        self.outcomes.insert(address.to_string(), outcome);
        self
    }
}

impl DnsProbe for ScriptedDns {
    fn probe(&self, address: &str) -> DnsOutcome {
        self.outcomes
            .get(address)
            .copied()
            .unwrap_or(DnsOutcome::Resolved)
    }
}

fn cluster(hosts: &[&str], policy: Policy) -> ClusterConfig {
    ClusterConfig {
        name: "it".to_string(),
        hosts: hosts.iter().map(|h| h.to_string()).collect(),
        policy,
        fallback_session_lifetime: FallbackSessionLifetime {
            min: Duration::from_secs(60),
            max: Duration::from_secs(120),
        },
        connect_timeout: Duration::from_secs(1),
    }
}

#[test]
fn all_healthy_in_order_connects_to_first_host() {
    // Scenario: every host is up; the in-order policy settles on the
    // first host with an optimal session after a single attempt.
    let connector =
        ScriptedConnector::new(&[("a:2181", true), ("b:2181", true), ("c:2181", true)]);
    let factory = ClientFactory::new(
        &cluster(&["a:2181", "b:2181", "c:2181"], Policy::InOrder),
        connector,
        ScriptedDns::default(),
    )
    .unwrap();

    let session = factory.create_client().unwrap();
    assert_eq!(session.address, "a:2181");
    assert_eq!(session.deadline, None);
}

#[test]
fn first_or_random_falls_back_with_shortened_deadline() {
    // Scenario: the primary does not resolve; a fallback host is picked
    // with the fallback session lifetime applied.
    let connector = ScriptedConnector::new(&[("b:2181", true), ("c:2181", true)]);
    let dns = ScriptedDns::default().with("a:2181", DnsOutcome::HostNotFound);
    let factory = ClientFactory::new(
        &cluster(&["a:2181", "b:2181", "c:2181"], Policy::FirstOrRandom),
        connector,
        dns,
    )
    .unwrap();

    let session = factory.create_client().unwrap();
    assert_ne!(session.address, "a:2181");
    // set_client_session_deadline was invoked with the configured bounds.
    assert_eq!(session.deadline, Some(60));
}

#[test]
fn priority_settles_on_lesser_host_while_better_is_untried() {
    // Scenario: the preferred host fails once, so the loop lands on the
    // lesser host; the preferred host is still only untried when the
    // session succeeds, so the session is kept, not discarded.
    let connector = ScriptedConnector::new(&[("a:2181", false), ("b:2181", true)]);
    let factory = ClientFactory::new(
        &cluster(&["a:2181", "b:2181"], Policy::InOrder),
        connector,
        ScriptedDns::default(),
    )
    .unwrap();

    let session = factory.create_client().unwrap();
    assert_eq!(session.address, "b:2181");
    assert_eq!(session.deadline, Some(60));
    assert_eq!(factory.connector().attempted(), vec!["a:2181", "b:2181"]);

    // A background probe later finds the preferred host healthy; the
    // next client goes straight to it with an optimal session.
    factory.connector().set_reachable("a:2181", true);
    factory.mark_online(0);
    let session = factory.create_client().unwrap();
    assert_eq!(session.address, "a:2181");
    assert_eq!(session.deadline, None);
}

#[test]
fn better_online_host_discards_fresh_session() {
    // A strictly preferred endpoint comes online while a connection to
    // the lesser one is in flight: the fresh session is discarded and
    // the loop retries the better endpoint.
    struct BlockingConnector {
        started_tx: Mutex<mpsc::Sender<()>>,
        go_rx: Mutex<mpsc::Receiver<()>>,
        attempted: Mutex<Vec<String>>,
    }

    impl SessionConnector for BlockingConnector {
        type Session = ScriptedSession;
        type Error = String;

        fn connect(&self, node: &SessionNode) -> Result<ScriptedSession, String> {
            self.attempted.lock().unwrap().push(node.address.clone());
            if node.address == "b:2181" {
                self.started_tx.lock().unwrap().send(()).unwrap();
                self.go_rx.lock().unwrap().recv().unwrap();
            }
            Ok(ScriptedSession {
                address: node.address.clone(),
                deadline: None,
            })
        }
    }

    let (started_tx, started_rx) = mpsc::channel();
    let (go_tx, go_rx) = mpsc::channel();
    let connector = BlockingConnector {
        started_tx: Mutex::new(started_tx),
        go_rx: Mutex::new(go_rx),
        attempted: Mutex::new(Vec::new()),
    };
    let factory = ClientFactory::new(
        &cluster(&["a:2181", "b:2181"], Policy::InOrder),
        connector,
        ScriptedDns::default(),
    )
    .unwrap();

    // The preferred host starts out offline, steering selection to b.
    factory.mark_offline(0);

    std::thread::scope(|scope| {
        let handle = scope.spawn(|| factory.create_client());

        // While the connection to b is in flight, a probe finds a
        // healthy again.
        started_rx.recv().unwrap();
        factory.mark_online(0);
        go_tx.send(()).unwrap();

        let session = handle.join().unwrap().unwrap();
        assert_eq!(session.address, "a:2181");
    });

    assert_eq!(
        factory.connector().attempted.lock().unwrap().as_slice(),
        ["b:2181", "a:2181"]
    );
}

#[test]
fn exhaustion_resets_statuses_and_surfaces_connection_loss() {
    // Scenario: every attempt fails; the error surfaces once and the
    // balancer is usable again afterwards.
    let connector = ScriptedConnector::new(&[("a:2181", false), ("b:2181", false)]);
    let factory = ClientFactory::new(
        &cluster(&["a:2181", "b:2181"], Policy::RoundRobin),
        connector,
        ScriptedDns::default(),
    )
    .unwrap();

    assert_eq!(
        factory.create_client().unwrap_err(),
        ConnectError::ConnectionLoss
    );
    assert_eq!(factory.available_count(), 2);

    factory.connector().set_reachable("a:2181", true);
    let session = factory.create_client().unwrap();
    assert_eq!(session.address, "a:2181");
}

#[test]
fn transient_dns_failures_surface_dns_flavored_error() {
    // Scenario: all hosts fail DNS transiently; the DNS-flavored
    // connection loss is surfaced with its exact message.
    let dns = ScriptedDns::default()
        .with("a:2181", DnsOutcome::TransientError)
        .with("b:2181", DnsOutcome::TransientError);
    let factory = ClientFactory::new(
        &cluster(&["a:2181", "b:2181"], Policy::Random),
        ScriptedConnector::new(&[]),
        dns,
    )
    .unwrap();

    let err = factory.create_client().unwrap_err();
    assert_eq!(err, ConnectError::DnsConnectionLoss);
    assert_eq!(
        err.to_string(),
        "Cannot resolve any of provided ZooKeeper hosts due to DNS error"
    );
}

#[test]
fn mixed_dns_failures_keep_the_dns_flavor() {
    // One host-not-found mixed with a transient failure still yields the
    // DNS-flavored message because the sticky flag was set.
    let dns = ScriptedDns::default()
        .with("a:2181", DnsOutcome::HostNotFound)
        .with("b:2181", DnsOutcome::TransientError);
    let factory = ClientFactory::new(
        &cluster(&["a:2181", "b:2181"], Policy::Random),
        ScriptedConnector::new(&[]),
        dns,
    )
    .unwrap();

    assert_eq!(
        factory.create_client().unwrap_err(),
        ConnectError::DnsConnectionLoss
    );
}

#[test]
fn plain_failures_surface_generic_connection_loss_message() {
    let dns = ScriptedDns::default()
        .with("a:2181", DnsOutcome::HostNotFound)
        .with("b:2181", DnsOutcome::HostNotFound);
    let factory = ClientFactory::new(
        &cluster(&["a:2181", "b:2181"], Policy::Random),
        ScriptedConnector::new(&[]),
        dns,
    )
    .unwrap();

    let err = factory.create_client().unwrap_err();
    assert_eq!(err, ConnectError::ConnectionLoss);
    assert_eq!(err.to_string(), "Cannot use any of provided ZooKeeper nodes");
}

#[test]
fn round_robin_rotates_across_online_hosts() {
    let connector =
        ScriptedConnector::new(&[("a:2181", true), ("b:2181", true), ("c:2181", true)]);
    let factory = ClientFactory::new(
        &cluster(&["a:2181", "b:2181", "c:2181"], Policy::RoundRobin),
        connector,
        ScriptedDns::default(),
    )
    .unwrap();

    // Probes have already seen every host healthy.
    for id in 0..3 {
        factory.mark_online(id);
    }

    let mut addresses = Vec::new();
    for _ in 0..6 {
        addresses.push(factory.create_client().unwrap().address);
    }
    assert_eq!(
        addresses,
        vec!["a:2181", "b:2181", "c:2181", "a:2181", "b:2181", "c:2181"]
    );
}

#[test]
fn empty_host_list_is_rejected_at_construction() {
    let result = ClientFactory::new(
        &cluster(&[], Policy::Random),
        ScriptedConnector::new(&[]),
        ScriptedDns::default(),
    );
    assert!(matches!(
        result.err(),
        Some(ConnectError::BadArguments { .. })
    ));
}

#[test]
fn secure_prefix_reaches_the_connector() {
    struct CaptureConnector {
        seen: Mutex<Vec<SessionNode>>,
    }

    impl SessionConnector for CaptureConnector {
        type Session = ScriptedSession;
        type Error = String;

        fn connect(&self, node: &SessionNode) -> Result<ScriptedSession, String> {
            self.seen.lock().unwrap().push(node.clone());
            Ok(ScriptedSession {
                address: node.address.clone(),
                deadline: None,
            })
        }
    }

    let factory = ClientFactory::new(
        &cluster(&["secure://a:2281"], Policy::InOrder),
        CaptureConnector {
            seen: Mutex::new(Vec::new()),
        },
        ScriptedDns::default(),
    )
    .unwrap();

    let session = factory.create_client().unwrap();
    assert_eq!(session.address, "a:2281");

    let seen = factory.connector().seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].secure);
    assert_eq!(seen[0].address, "a:2281");
    assert_eq!(seen[0].original_index, 0);
}

#[test]
fn worth_checking_reflects_the_active_policy() {
    let factory = ClientFactory::new(
        &cluster(&["a:2181", "b:2181", "c:2181"], Policy::InOrder),
        ScriptedConnector::new(&[("c:2181", true)]),
        ScriptedDns::default(),
    )
    .unwrap();

    let session = factory.create_client().unwrap();
    assert_eq!(session.address, "c:2181");

    // Both failed hosts outrank c, so both are worth probing.
    let candidates: Vec<String> = factory
        .worth_checking(Some(2))
        .into_iter()
        .map(|e| e.address)
        .collect();
    assert_eq!(candidates, vec!["a:2181", "b:2181"]);
}
