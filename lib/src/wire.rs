//! Implements a default Wire using pnet

use pnet::datalink;
use std::{
    io,
    sync::{Arc, Mutex},
    time::Duration,
};

use crate::{
    error::{RArpLibError, Result},
    network::NetworkInterface,
    packet::{Reader, Sender},
};

// Bounds every receive so workers can poll their cancellation token
const READ_TIMEOUT: Duration = Duration::from_millis(250);

/// Represents a packet Sender and packet Reader tuple
#[derive(Clone)]
pub struct Wire(pub Arc<Mutex<dyn Sender>>, pub Arc<Mutex<dyn Reader>>);

/// A PNetReader implementation of packet Reader
pub struct PNetReader {
    receiver: Box<dyn datalink::DataLinkReceiver>,
}

// Implements the Reader trait for our PNet implementation
impl Reader for PNetReader {
    fn next_packet(&mut self) -> Result<&[u8]> {
        self.receiver.next().map_err(map_io_error)
    }
}

/// A PNetSender implementation of packet Sender
pub struct PNetSender {
    sender: Box<dyn datalink::DataLinkSender>,
}

// Implements the Sender trait for our PNet implementation
impl Sender for PNetSender {
    fn send(&mut self, packet: &[u8]) -> Result<()> {
        let opt = self.sender.send_to(packet, None);
        match opt {
            Some(res) => res.map_err(map_io_error),
            None => Err(RArpLibError::Wire("failed to send packet".into())),
        }
    }
}

fn map_io_error(e: io::Error) -> RArpLibError {
    match e.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => {
            RArpLibError::WouldBlock
        }
        io::ErrorKind::PermissionDenied => {
            RArpLibError::Permission(e.to_string())
        }
        // 100: ENETDOWN
        _ if e.raw_os_error() == Some(100) => {
            RArpLibError::NetworkDown(e.to_string())
        }
        _ => RArpLibError::Wire(e.to_string()),
    }
}

/// Returns the default wire for the given interface
///
/// The underlying channel listens for all EtherTypes; filtering to ARP
/// happens at decode time. Receives time out after a fixed interval and
/// surface as [`RArpLibError::WouldBlock`] so reads stay bounded.
///
/// Example
/// ```no_run
/// # use r_arplib::network;
/// # use r_arplib::wire;
/// let interface = network::get_default_interface().unwrap();
/// let packet_wire = wire::default(&interface).unwrap();
/// ```
pub fn default(interface: &NetworkInterface) -> Result<Wire> {
    let cfg = datalink::Config {
        read_timeout: Some(READ_TIMEOUT),
        ..datalink::Config::default()
    };

    let channel = match datalink::channel(&interface.into(), cfg) {
        Ok(datalink::Channel::Ethernet(tx, rx)) => Ok((tx, rx)),
        Ok(_) => {
            Err(RArpLibError::Wire("failed to create packet reader".into()))
        }
        Err(e) => Err(map_io_error(e)),
    }?;

    Ok(Wire(
        Arc::new(Mutex::new(PNetSender { sender: channel.0 })),
        Arc::new(Mutex::new(PNetReader {
            receiver: channel.1,
        })),
    ))
}

#[cfg(test)]
#[path = "./wire_tests.rs"]
mod tests;
