//! Custom Error and Result types for this library

use std::{
    any::Any,
    sync::{MutexGuard, PoisonError, mpsc::SendError},
};
use thiserror::Error;

use crate::{
    packet::{Reader, Sender},
    scanners::{
        Observation, SendStatus, controller::ScanControllerBuilderError,
        send_worker::SendWorkerBuilderError,
        sniff_worker::SniffWorkerBuilderError,
    },
};

/// Custom Error type for this library
#[derive(Error, Debug)]
pub enum RArpLibError {
    /// Raw socket operations require elevated privileges
    #[error("operation not permitted: {_0}")]
    Permission(String),

    /// The requested interface does not resolve to a usable device
    #[error("no such interface: {_0}")]
    NoSuchInterface(String),

    /// The underlying link dropped; transient, retried by the owning worker
    #[error("network is down: {_0}")]
    NetworkDown(String),

    /// The kernel queue has nothing to give (receive) or no room (send)
    #[error("socket operation would block")]
    WouldBlock,

    /// Error coming directly off the wire
    #[error("wire error: {_0}")]
    Wire(String),

    /// A scan range that is not a whole-octet IPv4 network
    #[error("invalid scan range {range}: {reason}")]
    InvalidRange {
        /// The range as given
        range: String,
        /// Why it was rejected
        reason: String,
    },

    /// Errors resulting from the observation queue
    #[error("failed to publish observation: {:#?}", _0)]
    ObservationSend(#[from] SendError<Observation>),

    /// Error obtaining lock on packet reader
    #[error("failed to get lock on packet reader: {_0}")]
    PacketReaderLock(String),

    /// Error obtaining lock on packet sender
    #[error("failed to get lock on packet sender: {_0}")]
    PacketSenderLock(String),

    /// Error obtaining lock on the shared send status
    #[error("failed to get lock on send status: {_0}")]
    StatusLock(String),

    /// Generic thread error
    #[error("thread error: {_0}")]
    ThreadError(String),

    /// Error reported by the presentation layer
    #[error("terminal error: {_0}")]
    Terminal(String),

    /// A worker failed to stop within the shutdown grace period
    #[error("{_0} worker failed to stop within the shutdown grace period")]
    ShutdownTimeout(&'static str),

    /// Error resulting from failure to build a send worker
    #[error("failed to build send worker: {_0}")]
    SendWorkerBuild(#[from] SendWorkerBuilderError),

    /// Error resulting from failure to build a sniff worker
    #[error("failed to build sniff worker: {_0}")]
    SniffWorkerBuild(#[from] SniffWorkerBuilderError),

    /// Error resulting from failure to build a scan controller
    #[error("failed to build scan controller: {_0}")]
    ControllerBuild(#[from] ScanControllerBuilderError),
}

impl From<Box<dyn Any + Send>> for RArpLibError {
    fn from(value: Box<dyn Any + Send>) -> Self {
        if let Some(s) = value.downcast_ref::<&'static str>() {
            Self::ThreadError(format!("Thread panicked with: {}", s))
        } else if let Some(s) = value.downcast_ref::<String>() {
            Self::ThreadError(format!("Thread panicked with: {}", s))
        } else {
            Self::ThreadError("Thread panicked with an unknown type".into())
        }
    }
}

impl<'a> From<PoisonError<MutexGuard<'a, dyn Reader + 'static>>>
    for RArpLibError
{
    fn from(value: PoisonError<MutexGuard<'a, dyn Reader + 'static>>) -> Self {
        Self::PacketReaderLock(value.to_string())
    }
}

impl<'a> From<PoisonError<MutexGuard<'a, dyn Sender + 'static>>>
    for RArpLibError
{
    fn from(value: PoisonError<MutexGuard<'a, dyn Sender + 'static>>) -> Self {
        Self::PacketSenderLock(value.to_string())
    }
}

impl<'a> From<PoisonError<MutexGuard<'a, SendStatus>>> for RArpLibError {
    fn from(value: PoisonError<MutexGuard<'a, SendStatus>>) -> Self {
        Self::StatusLock(value.to_string())
    }
}

/// Custom Result type for this library. All Errors exposed by this library
/// will be returned as [`RArpLibError`]
pub type Result<T> = std::result::Result<T, RArpLibError>;
