//! Captures and decodes incoming ARP traffic

use derive_builder::Builder;
use std::{
    sync::{Arc, Mutex, mpsc},
    thread::{self, JoinHandle},
};

use crate::{
    error::{RArpLibError, Result},
    network::NetworkInterface,
    packet::{Reader, arp},
    scanners::{BACKOFF_INTERVAL, CancelToken, Observation, ScanConfig, WorkerEvent},
    targets::ranges,
};

/// Worker that reads frames off the wire and publishes decoded observations
///
/// Runs until cancelled; there is no natural finished state. Frames that
/// fail to decode (wrong EtherType, our own probes, short reads) are
/// silently skipped, as is anything outside the scan ranges when filtering
/// is enabled.
#[derive(Clone, Builder)]
#[builder(setter(into))]
pub struct SniffWorker {
    /// Network interface whose MAC identifies our own probes
    interface: Arc<NetworkInterface>,
    /// Read half of the wire
    packet_reader: Arc<Mutex<dyn Reader>>,
    /// Scan parameters (filter flag, ranges)
    config: Arc<ScanConfig>,
    /// Cancellation shared with the controller
    cancel: Arc<CancelToken>,
    /// Queue of decoded observations, consumed by the controller
    observations: mpsc::Sender<Observation>,
    /// Channel for reporting failures to the controller
    events: mpsc::Sender<WorkerEvent>,
}

impl SniffWorker {
    /// Returns builder for SniffWorker
    pub fn builder() -> SniffWorkerBuilder {
        SniffWorkerBuilder::default()
    }

    /// Runs the worker on its own thread
    pub fn spawn(self) -> JoinHandle<()> {
        thread::spawn(move || {
            log::debug!("sniff worker started");
            if let Err(e) = self.run() {
                log::error!("sniff worker failed: {}", e);
                let _ = self.events.send(WorkerEvent::Fatal(e));
            }
        })
    }

    fn run(&self) -> Result<()> {
        // the reader is ours alone for the lifetime of the scan
        let mut reader = self.packet_reader.lock()?;

        loop {
            if self.cancel.is_cancelled() {
                return Ok(());
            }

            let observation = match reader.next_packet() {
                Ok(pkt) => arp::parse(pkt, self.interface.mac),
                Err(RArpLibError::WouldBlock) => {
                    if self.cancel.wait(BACKOFF_INTERVAL) {
                        return Ok(());
                    }
                    continue;
                }
                Err(e @ RArpLibError::NetworkDown(_)) => {
                    let _ = self.events.send(WorkerEvent::Transient(e));
                    if self.cancel.wait(BACKOFF_INTERVAL) {
                        return Ok(());
                    }
                    continue;
                }
                Err(e) => return Err(e),
            };

            let Some(observation) = observation else {
                continue;
            };

            if self.config.filter
                && !ranges::contain(&self.config.ranges, &observation.sender_ip)
            {
                continue;
            }

            self.observations.send(observation)?;
        }
    }
}

#[cfg(test)]
#[path = "./sniff_worker_tests.rs"]
mod tests;
