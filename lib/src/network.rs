//! Provides helpers for retrieving information about network interfaces

use pnet::{
    datalink::NetworkInterface as PNetNetworkInterface, ipnetwork::IpNetwork,
    util::MacAddr,
};
use std::net::Ipv4Addr;

use crate::error::{RArpLibError, Result};

/// Represents a network interface on the current host
#[derive(Debug, Clone)]
pub struct NetworkInterface {
    /// System name of the interface i.e. eth0, en0 etc.
    pub name: String,
    /// Description of the interface if provided by the OS
    pub description: String,
    /// The IPv4 network of the interface in CIDR notation
    pub cidr: String,
    /// The IPv4 address assigned to the interface
    pub ipv4: Ipv4Addr,
    /// All networks assigned to the interface
    pub ips: Vec<IpNetwork>,
    /// MAC address of the interface
    pub mac: MacAddr,
    /// OS specific interface flags
    pub flags: u32,
    /// OS specific interface index
    pub index: u32,
}

impl TryFrom<PNetNetworkInterface> for NetworkInterface {
    type Error = RArpLibError;

    fn try_from(value: PNetNetworkInterface) -> Result<Self> {
        let mac = value.mac.ok_or_else(|| {
            RArpLibError::NoSuchInterface(format!(
                "no mac address for interface {}",
                value.name
            ))
        })?;

        let (ipv4, cidr) =
            get_interface_ipv4_and_cidr(&value).ok_or_else(|| {
                RArpLibError::NoSuchInterface(format!(
                    "no ipv4 network for interface {}",
                    value.name
                ))
            })?;

        Ok(Self {
            name: value.name,
            description: value.description,
            flags: value.flags,
            index: value.index,
            mac,
            ips: value.ips,
            cidr,
            ipv4,
        })
    }
}

impl From<&NetworkInterface> for PNetNetworkInterface {
    fn from(value: &NetworkInterface) -> Self {
        Self {
            name: value.name.clone(),
            flags: value.flags,
            description: value.description.clone(),
            index: value.index,
            ips: value.ips.clone(),
            mac: Some(value.mac),
        }
    }
}

/// Returns the named interface
///
/// # Errors
///
/// Returns [`RArpLibError::NoSuchInterface`] if the name does not resolve to
/// a device with a MAC address and an IPv4 network
pub fn get_interface(name: &str) -> Result<NetworkInterface> {
    let iface = pnet::datalink::interfaces()
        .into_iter()
        .find(|i| i.name == name)
        .ok_or_else(|| RArpLibError::NoSuchInterface(name.to_string()))?;
    NetworkInterface::try_from(iface)
}

/// Returns the first interface that is up, not a loopback, and has an
/// IPv4 network assigned
pub fn get_default_interface() -> Result<NetworkInterface> {
    let iface = pnet::datalink::interfaces()
        .into_iter()
        .find(|e| {
            e.is_up() && !e.is_loopback() && e.ips.iter().any(|i| i.is_ipv4())
        })
        .ok_or_else(|| {
            RArpLibError::NoSuchInterface("no usable interface found".into())
        })?;
    NetworkInterface::try_from(iface)
}

fn get_interface_ipv4_and_cidr(
    interface: &PNetNetworkInterface,
) -> Option<(Ipv4Addr, String)> {
    let ipnet = interface.ips.iter().find(|i| i.is_ipv4())?;
    let ipv4 = match ipnet.ip() {
        std::net::IpAddr::V4(ip) => ip,
        std::net::IpAddr::V6(_) => return None,
    };
    let cidr = format!("{}/{}", ipnet.network(), ipnet.prefix());
    Some((ipv4, cidr))
}

#[cfg(test)]
#[path = "./network_tests.rs"]
mod tests;
