//! Aggregates scan observations into a deduplicated host table

#[cfg(test)]
use mockall::automock;

use pnet::util::MacAddr;
use serde::{Deserialize, Serialize};
use std::{net::Ipv4Addr, sync::Arc};

use crate::scanners::{Observation, Opcode};

fn serialize_to_string<S, T>(
    val: &T,
    s: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
    T: std::fmt::Display,
{
    s.serialize_str(&val.to_string())
}

fn deserialize_from_str<'de, D, T>(d: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let s = String::deserialize(d)?;
    s.parse::<T>().map_err(serde::de::Error::custom)
}

/// Trait used to resolve a vendor label for a newly observed host
#[cfg_attr(test, automock)]
pub trait VendorResolver: Send + Sync {
    /// Should return a display label for the MAC's vendor, or an empty
    /// string when the vendor is unknown
    fn lookup(&self, mac: &MacAddr) -> String;
}

/// A [`VendorResolver`] backed by the bundled IEEE OUI registry
#[derive(Debug, Default)]
pub struct OuiVendorResolver;

impl VendorResolver for OuiVendorResolver {
    fn lookup(&self, mac: &MacAddr) -> String {
        oui_data::lookup(&mac.to_string())
            .map(|v| v.organization().to_owned())
            .unwrap_or_default()
    }
}

/// One row of the result table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRecord {
    /// Sender IP of the first matching observation
    pub ip: Ipv4Addr,
    /// Source MAC of the enclosing Ethernet frame
    #[serde(
        serialize_with = "serialize_to_string",
        deserialize_with = "deserialize_from_str"
    )]
    pub eth_mac: MacAddr,
    /// Sender MAC from the ARP header
    #[serde(
        serialize_with = "serialize_to_string",
        deserialize_with = "deserialize_from_str"
    )]
    pub arp_mac: MacAddr,
    /// How many ARP requests this host has been seen sending
    pub requests: u64,
    /// How many ARP replies this host has been seen sending
    pub replies: u64,
    /// Vendor label resolved when the host was first observed
    pub vendor: String,
}

impl HostRecord {
    /// A mismatch between the Ethernet and ARP MACs suggests spoofing;
    /// both values are retained and the row is only flagged
    pub fn is_suspicious(&self) -> bool {
        self.eth_mac != self.arp_mac
    }
}

/// Aggregate counters over the whole table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    /// Number of distinct host records
    pub hosts: usize,
    /// Total ARP requests seen
    pub requests: u64,
    /// Total ARP replies seen
    pub replies: u64,
}

/// An append/update table of observed hosts
///
/// Keyed by the exact (IP, Ethernet MAC, ARP MAC) triple. Records are never
/// removed; the table has exactly one writer (the scan controller) so no
/// locking is involved.
pub struct ResultTable {
    records: Vec<HostRecord>,
    vendors: Arc<dyn VendorResolver>,
}

impl ResultTable {
    /// Returns a new, empty table using the given vendor resolver
    pub fn new(vendors: Arc<dyn VendorResolver>) -> Self {
        Self {
            records: Vec::new(),
            vendors,
        }
    }

    /// Folds one observation into the table
    ///
    /// An existing record with the same (IP, Ethernet MAC, ARP MAC) triple
    /// has its matching counter incremented; otherwise a new record is
    /// appended with its vendor label resolved once.
    pub fn apply(&mut self, observation: &Observation) {
        let existing = self.records.iter_mut().find(|r| {
            r.ip == observation.sender_ip
                && r.eth_mac == observation.eth_source
                && r.arp_mac == observation.sender_mac
        });

        if let Some(record) = existing {
            match observation.opcode {
                Opcode::Request => record.requests += 1,
                Opcode::Reply => record.replies += 1,
            }
            return;
        }

        let vendor = self.vendors.lookup(&observation.eth_source);

        self.records.push(HostRecord {
            ip: observation.sender_ip,
            eth_mac: observation.eth_source,
            arp_mac: observation.sender_mac,
            requests: (observation.opcode == Opcode::Request) as u64,
            replies: (observation.opcode == Opcode::Reply) as u64,
            vendor,
        });
    }

    /// Returns the current rows in discovery order
    ///
    /// The rows are copied out so the presentation layer never aliases the
    /// live table.
    pub fn snapshot(&self) -> Vec<HostRecord> {
        self.records.clone()
    }

    /// Returns aggregate counters over the current rows
    pub fn totals(&self) -> Totals {
        Totals {
            hosts: self.records.len(),
            requests: self.records.iter().map(|r| r.requests).sum(),
            replies: self.records.iter().map(|r| r.replies).sum(),
        }
    }
}

#[cfg(test)]
#[path = "./results_tests.rs"]
mod tests;
