//! The run loop that owns worker lifecycles and the result table

#[cfg(test)]
use mockall::automock;

use derive_builder::Builder;
use std::{
    collections::BTreeSet,
    fmt::Display,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use crate::{
    error::{RArpLibError, Result},
    network::NetworkInterface,
    results::{HostRecord, ResultTable, Totals, VendorResolver},
    scanners::{
        CancelToken, RENDER_TICK, SHUTDOWN_GRACE, ScanConfig, SendStatus,
        WorkerEvent, send_worker::SendWorker, sniff_worker::SniffWorker,
    },
    wire::Wire,
};

// How often the bounded join re-checks a stopping worker
const JOIN_POLL: Duration = Duration::from_millis(25);

/// Everything the presentation layer needs for one render tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanView {
    /// Current rows of the result table in discovery order
    pub hosts: Vec<HostRecord>,
    /// Progress of the send worker
    pub send_status: SendStatus,
    /// Aggregate counters over the rows
    pub totals: Totals,
    /// De-duplicated transient error notes
    pub notes: Vec<String>,
    /// Wall-clock time since the scan started
    pub elapsed: Duration,
}

/// Trait implemented by the presentation collaborator
///
/// Called once per render tick from the controller's thread.
#[cfg_attr(test, automock)]
pub trait Presenter {
    /// Should render the given view of the scan
    fn render(&mut self, view: &ScanView) -> Result<()>;
}

/// Why a scan stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A termination signal (or interrupt key) was caught
    Signal,
    /// The configured scan timeout elapsed
    Timeout,
}

impl Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Signal => write!(f, "received signal"),
            Self::Timeout => write!(f, "timed out"),
        }
    }
}

/// The final state of a completed scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    /// Why the scan stopped
    pub stop: StopReason,
    /// Final rows of the result table in discovery order
    pub hosts: Vec<HostRecord>,
    /// Aggregate counters over the rows
    pub totals: Totals,
    /// Where the send worker ended up
    pub send_status: SendStatus,
    /// Total scan duration
    pub elapsed: Duration,
}

/// Owns the scan lifecycle: workers, observation queue, result table,
/// render cadence, and the shutdown protocol
#[derive(Builder)]
#[builder(setter(into))]
pub struct ScanController {
    /// The interface both workers operate on
    interface: Arc<NetworkInterface>,
    /// The opened wire shared by both workers
    wire: Wire,
    /// Scan parameters
    config: Arc<ScanConfig>,
    /// Resolves vendor labels for newly observed hosts
    vendors: Arc<dyn VendorResolver>,
    /// Set by the signal collaborator to request a stop
    interrupted: Arc<AtomicBool>,
}

impl ScanController {
    /// Returns builder for ScanController
    pub fn builder() -> ScanControllerBuilder {
        ScanControllerBuilder::default()
    }

    /// Runs the scan to completion
    ///
    /// Spawns the sniff worker (and the send worker unless passive), then
    /// loops at the render cadence: drain observations into the table,
    /// drain worker events, render, and evaluate stop conditions. Only this
    /// loop looks at the wall clock; workers respond solely to cancellation.
    ///
    /// # Errors
    ///
    /// Returns the first fatal worker or presenter error, or
    /// [`RArpLibError::ShutdownTimeout`] when a worker refuses to stop
    /// within the grace period.
    pub fn run(&self, presenter: &mut dyn Presenter) -> Result<ScanReport> {
        let cancel = Arc::new(CancelToken::new());
        let status = Arc::new(Mutex::new(SendStatus::default()));
        let (observations_tx, observations_rx) = mpsc::channel();
        let (events_tx, events_rx) = mpsc::channel();

        let mut table = ResultTable::new(Arc::clone(&self.vendors));
        let mut notes: BTreeSet<String> = BTreeSet::new();

        let sniffer = SniffWorker::builder()
            .interface(Arc::clone(&self.interface))
            .packet_reader(Arc::clone(&self.wire.1))
            .config(Arc::clone(&self.config))
            .cancel(Arc::clone(&cancel))
            .observations(observations_tx)
            .events(events_tx.clone())
            .build()?;

        let mut handles: Vec<(&'static str, JoinHandle<()>)> =
            vec![("sniff", sniffer.spawn())];

        if !self.config.passive {
            let sender = SendWorker::builder()
                .interface(Arc::clone(&self.interface))
                .packet_sender(Arc::clone(&self.wire.0))
                .config(Arc::clone(&self.config))
                .cancel(Arc::clone(&cancel))
                .status(Arc::clone(&status))
                .events(events_tx.clone())
                .build()?;
            handles.push(("send", sender.spawn()));
        }

        let started = Instant::now();
        let mut stop: Option<StopReason> = None;
        let mut fatal: Option<RArpLibError> = None;

        loop {
            while let Ok(observation) = observations_rx.try_recv() {
                table.apply(&observation);
            }

            while let Ok(event) = events_rx.try_recv() {
                match event {
                    WorkerEvent::Fatal(e) => {
                        fatal.get_or_insert(e);
                    }
                    WorkerEvent::Transient(e) => {
                        notes.insert(e.to_string());
                    }
                }
            }

            if fatal.is_some() {
                break;
            }

            let view = ScanView {
                hosts: table.snapshot(),
                send_status: read_status(&status),
                totals: table.totals(),
                notes: notes.iter().cloned().collect(),
                elapsed: started.elapsed(),
            };

            if let Err(e) = presenter.render(&view) {
                fatal.get_or_insert(e);
                break;
            }

            if self.interrupted.load(Ordering::SeqCst) {
                stop = Some(StopReason::Signal);
                break;
            }

            if started.elapsed() >= self.config.timeout {
                stop = Some(StopReason::Timeout);
                break;
            }

            thread::sleep(RENDER_TICK);
        }

        cancel.cancel();

        let mut shutdown_fault: Option<RArpLibError> = None;
        for (name, handle) in handles {
            if let Err(e) = join_with_grace(name, handle) {
                shutdown_fault.get_or_insert(e);
            }
        }

        // late observations that arrived during shutdown still count
        while let Ok(observation) = observations_rx.try_recv() {
            table.apply(&observation);
        }

        if let Some(e) = shutdown_fault {
            if let Some(f) = fatal {
                log::error!("fatal scan error before hard stop: {}", f);
            }
            return Err(e);
        }

        if let Some(e) = fatal {
            return Err(e);
        }

        Ok(ScanReport {
            stop: stop.unwrap_or(StopReason::Signal),
            hosts: table.snapshot(),
            totals: table.totals(),
            send_status: read_status(&status),
            elapsed: started.elapsed(),
        })
    }
}

// The status is a Copy enum; a poisoned lock still holds a readable value
fn read_status(status: &Mutex<SendStatus>) -> SendStatus {
    *status.lock().unwrap_or_else(PoisonError::into_inner)
}

// Joins a worker, bailing out with a hard-stop error once the grace period
// expires. The stuck thread is abandoned, never joined.
fn join_with_grace(
    name: &'static str,
    handle: JoinHandle<()>,
) -> Result<()> {
    let deadline = Instant::now() + SHUTDOWN_GRACE;

    while !handle.is_finished() {
        if Instant::now() >= deadline {
            log::error!(
                "{} worker did not stop within {:?}",
                name,
                SHUTDOWN_GRACE
            );
            return Err(RArpLibError::ShutdownTimeout(name));
        }
        thread::sleep(JOIN_POLL);
    }

    handle.join().map_err(RArpLibError::from)
}

#[cfg(test)]
#[path = "./controller_tests.rs"]
mod tests;
