//! Emits ARP probes across the configured scan ranges

use derive_builder::Builder;
use std::{
    net::Ipv4Addr,
    sync::{Arc, Mutex, mpsc},
    thread::{self, JoinHandle},
};

use crate::{
    error::{RArpLibError, Result},
    network::NetworkInterface,
    packet::{Sender, arp},
    scanners::{
        BACKOFF_INTERVAL, CancelToken, ScanConfig, SendStatus, WorkerEvent,
    },
};

/// Worker that probes every host of every configured range
///
/// Each target is probed `count` times with a cancellable sleep between
/// repeats. Kernel backpressure retries the same probe after a fixed
/// backoff; it is never counted as a probe failure.
#[derive(Clone, Builder)]
#[builder(setter(into))]
pub struct SendWorker {
    /// Network interface whose MAC sources every probe
    interface: Arc<NetworkInterface>,
    /// Write half of the wire
    packet_sender: Arc<Mutex<dyn Sender>>,
    /// Scan parameters (ranges, count, node, sleep)
    config: Arc<ScanConfig>,
    /// Cancellation shared with the controller
    cancel: Arc<CancelToken>,
    /// Progress published for the presentation layer
    status: Arc<Mutex<SendStatus>>,
    /// Channel for reporting failures to the controller
    events: mpsc::Sender<WorkerEvent>,
}

impl SendWorker {
    /// Returns builder for SendWorker
    pub fn builder() -> SendWorkerBuilder {
        SendWorkerBuilder::default()
    }

    /// Runs the worker on its own thread
    pub fn spawn(self) -> JoinHandle<()> {
        thread::spawn(move || {
            log::debug!("send worker started");
            if let Err(e) = self.run() {
                log::error!("send worker failed: {}", e);
                let _ = self.events.send(WorkerEvent::Fatal(e));
            }
        })
    }

    fn run(&self) -> Result<()> {
        for range in &self.config.ranges {
            log::debug!("probing range: {}", range);

            for target in range.hosts() {
                if self.cancel.is_cancelled() {
                    return Ok(());
                }

                self.set_status(SendStatus::InProgress(target))?;

                for _ in 0..self.config.count {
                    if self.cancel.is_cancelled() {
                        return Ok(());
                    }

                    self.probe(target)?;

                    if self.cancel.wait(self.config.probe_sleep) {
                        return Ok(());
                    }
                }
            }
        }

        log::debug!("send worker finished all ranges");
        self.set_status(SendStatus::Finished)
    }

    // Sends one probe, absorbing kernel backpressure by retrying the same
    // frame after a backoff. The retry wait doubles as a cancellation point.
    fn probe(&self, target: Ipv4Addr) -> Result<()> {
        let sender_ip = probe_sender_ip(target, self.config.node);
        let frame = arp::build_request(self.interface.mac, sender_ip, target);

        loop {
            let result = self.packet_sender.lock()?.send(&frame);

            match result {
                Ok(()) => return Ok(()),
                Err(RArpLibError::WouldBlock) => {
                    log::debug!("send queue full, retrying {}", target);
                    if self.cancel.wait(BACKOFF_INTERVAL) {
                        return Ok(());
                    }
                }
                Err(e @ RArpLibError::NetworkDown(_)) => {
                    let _ = self.events.send(WorkerEvent::Transient(e));
                    if self.cancel.wait(BACKOFF_INTERVAL) {
                        return Ok(());
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn set_status(&self, status: SendStatus) -> Result<()> {
        *self.status.lock()? = status;
        Ok(())
    }
}

/// Returns the synthetic sender IP for a probe
///
/// The sender address is the target's subnet with the configured node as the
/// last octet. When the target itself sits on the node octet the sender is
/// forced to `.0` of that subnet to avoid emitting a gratuitous ARP request.
pub fn probe_sender_ip(target: Ipv4Addr, node: u8) -> Ipv4Addr {
    let [a, b, c, d] = target.octets();
    if d == node {
        Ipv4Addr::new(a, b, c, 0)
    } else {
        Ipv4Addr::new(a, b, c, node)
    }
}

#[cfg(test)]
#[path = "./send_worker_tests.rs"]
mod tests;
