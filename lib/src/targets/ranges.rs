//! IPv4 scan ranges with whole-octet prefixes

use std::{fmt, net, str::FromStr};

use crate::error::{RArpLibError, Result};

/// The prefix lengths a [`ScanRange`] accepts
pub const VALID_PREFIXES: [u8; 3] = [8, 16, 24];

/// Represents one IPv4 network to scan
///
/// Ranges are restricted to whole-octet prefixes so iteration and
/// containment both reduce to leading-octet comparisons. Rather than storing
/// every address in a block, the underlying CIDR is kept and hosts are
/// produced lazily when iterated.
///
/// # Examples
///
/// ```
/// # use r_arplib::targets::ranges::ScanRange;
/// let range: ScanRange = "192.168.1.1/24".parse().unwrap();
/// assert_eq!(range.len(), 254);
/// assert!(range.contains(&"192.168.1.77".parse().unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRange(ipnet::Ipv4Net);

impl ScanRange {
    /// Returns a new ScanRange for the given network
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix length is not one of
    /// [`VALID_PREFIXES`]
    pub fn new(net: ipnet::Ipv4Net) -> Result<Self> {
        if !VALID_PREFIXES.contains(&net.prefix_len()) {
            return Err(invalid(
                &net.to_string(),
                "prefix must be /8, /16, or /24",
            ));
        }
        Ok(Self(net))
    }

    /// Returns the prefix length of the range
    pub fn prefix_len(&self) -> u8 {
        self.0.prefix_len()
    }

    /// Returns the network address of the range
    pub fn network(&self) -> net::Ipv4Addr {
        self.0.network()
    }

    /// Returns true when the address falls within the range
    /// (prefix-masked comparison of the leading octets)
    pub fn contains(&self, ip: &net::Ipv4Addr) -> bool {
        self.0.contains(ip)
    }

    /// Returns an iterator over every probeable host in the range,
    /// excluding the network and broadcast addresses
    pub fn hosts(&self) -> impl Iterator<Item = net::Ipv4Addr> {
        self.0.hosts()
    }

    /// Returns the number of probeable hosts in the range
    pub fn len(&self) -> usize {
        (1usize << (32 - self.0.prefix_len())) - 2
    }

    /// Returns true if the range contains no probeable hosts
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for ScanRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ScanRange {
    type Err = RArpLibError;

    fn from_str(s: &str) -> Result<Self> {
        let net = ipnet::Ipv4Net::from_str(s)
            .map_err(|e| invalid(s, &e.to_string()))?;
        Self::new(net)
    }
}

/// Returns true when the address falls within any of the given ranges
pub fn contain(ranges: &[ScanRange], ip: &net::Ipv4Addr) -> bool {
    ranges.iter().any(|r| r.contains(ip))
}

fn invalid(range: &str, reason: &str) -> RArpLibError {
    RArpLibError::InvalidRange {
        range: range.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
#[path = "./ranges_tests.rs"]
mod tests;
