//! Provides the concurrent scan workers and their controlling run loop
//!
//! This includes:
//! - Probe sending across one or more scan ranges
//! - Sniffing and decoding of incoming ARP traffic
//! - The run loop that folds observations into the result table

use pnet::{packet::arp, util::MacAddr};
use std::{
    fmt::Display,
    net::Ipv4Addr,
    sync::{Condvar, Mutex, PoisonError},
    time::Duration,
};

use crate::{error::RArpLibError, targets::ranges::ScanRange};

/// How long a worker waits before retrying a blocked send or receive
pub const BACKOFF_INTERVAL: Duration = Duration::from_millis(100);

/// The cadence at which the controller drains observations and renders
pub const RENDER_TICK: Duration = Duration::from_millis(25);

/// How long the controller waits for a worker to stop before giving up
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// The ARP opcode classes this scanner distinguishes
///
/// Anything that is not a request is counted as a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// ARP request (opcode 1)
    Request,
    /// ARP reply (any other opcode)
    Reply,
}

impl From<arp::ArpOperation> for Opcode {
    fn from(value: arp::ArpOperation) -> Self {
        if value == arp::ArpOperations::Request {
            Self::Request
        } else {
            Self::Reply
        }
    }
}

/// A decoded inbound ARP packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    /// Source MAC of the enclosing Ethernet frame
    pub eth_source: MacAddr,
    /// The ARP opcode class
    pub opcode: Opcode,
    /// Sender hardware address from the ARP header
    pub sender_mac: MacAddr,
    /// Sender protocol address from the ARP header
    pub sender_ip: Ipv4Addr,
}

/// Progress of the send worker, readable by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendStatus {
    /// The worker has not started (or was started in passive mode)
    #[default]
    NotStarted,
    /// The worker is currently probing this target
    InProgress(Ipv4Addr),
    /// The worker has probed every host in every range
    Finished,
}

impl Display for SendStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not started"),
            Self::InProgress(ip) => write!(f, "sending {}", ip),
            Self::Finished => write!(f, "finished"),
        }
    }
}

/// Failure reports workers publish instead of raising across threads
#[derive(Debug)]
pub enum WorkerEvent {
    /// The worker cannot continue; the scan must stop
    Fatal(RArpLibError),
    /// The worker recovered locally; surfaced as a user-visible note
    Transient(RArpLibError),
}

/// Cooperative cancellation shared between the controller and its workers
///
/// Workers poll [`CancelToken::is_cancelled`] before each loop iteration and
/// use [`CancelToken::wait`] for every sleep so shutdown wakes them early.
#[derive(Debug, Default)]
pub struct CancelToken {
    cancelled: Mutex<bool>,
    signal: Condvar,
}

impl CancelToken {
    /// Returns a new, uncancelled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the token cancelled and wakes every waiter
    pub fn cancel(&self) {
        let mut cancelled = self
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *cancelled = true;
        self.signal.notify_all();
    }

    /// Returns true once [`CancelToken::cancel`] has been called
    pub fn is_cancelled(&self) -> bool {
        *self
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleeps for at most `timeout`, waking early on cancellation.
    /// Returns true when the token was cancelled.
    pub fn wait(&self, timeout: Duration) -> bool {
        let cancelled = self
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if *cancelled {
            return true;
        }

        let (cancelled, _) = self
            .signal
            .wait_timeout_while(cancelled, timeout, |c| !*c)
            .unwrap_or_else(PoisonError::into_inner);

        *cancelled
    }
}

/// Scan parameters, constructed once and shared by reference with the
/// controller and both workers
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Number of times to probe each target
    pub count: u16,
    /// Last octet used as the prober's synthetic sender address
    pub node: u8,
    /// Time to sleep between probe repeats
    pub probe_sleep: Duration,
    /// Wall-clock limit for the whole scan
    pub timeout: Duration,
    /// Sniff without sending any packets
    pub passive: bool,
    /// Only record hosts whose sender IP falls within a scan range
    pub filter: bool,
    /// The networks to probe and (optionally) filter against
    pub ranges: Vec<ScanRange>,
}

pub mod controller;
pub mod send_worker;
pub mod sniff_worker;

#[cfg(test)]
#[path = "./scanners_tests.rs"]
mod tests;
