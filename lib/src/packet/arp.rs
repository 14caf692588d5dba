//! Frame codec for ARP probe and response packets

use pnet::{
    packet::{MutablePacket, Packet, arp, ethernet},
    util,
};
use std::net;

use crate::scanners::{Observation, Opcode};

// Constants used to help locate our nested packets
const PKT_ETH_SIZE: usize = ethernet::EthernetPacket::minimum_packet_size();
const PKT_ARP_SIZE: usize = arp::ArpPacket::minimum_packet_size();

/// Total size in bytes of an Ethernet + ARP probe frame
pub const PKT_TOTAL_SIZE: usize = PKT_ETH_SIZE + PKT_ARP_SIZE;

/// Builds a new ARP request frame based on provided information
///
/// This is what the send worker puts on the wire for every probed target.
/// The Ethernet destination and the ARP target hardware address are both the
/// broadcast address; the sender IP is the caller's synthetic probe address.
pub fn build_request(
    source_mac: util::MacAddr,
    sender_ipv4: net::Ipv4Addr,
    target_ipv4: net::Ipv4Addr,
) -> [u8; PKT_TOTAL_SIZE] {
    let mut pkt_buf = [0u8; PKT_TOTAL_SIZE];

    // Build our base ethernet frame
    let mut pkt_eth = ethernet::MutableEthernetPacket::new(&mut pkt_buf)
        .expect("failed to generate ethernet packet");

    let mut arp_buffer = [0u8; PKT_ARP_SIZE];

    let mut pkt_arp = arp::MutableArpPacket::new(&mut arp_buffer)
        .expect("failed to generate arp packet");

    pkt_eth.set_destination(util::MacAddr::broadcast());
    pkt_eth.set_source(source_mac);
    pkt_eth.set_ethertype(ethernet::EtherTypes::Arp);

    pkt_arp.set_hardware_type(arp::ArpHardwareTypes::Ethernet);
    pkt_arp.set_protocol_type(ethernet::EtherTypes::Ipv4);
    pkt_arp.set_hw_addr_len(6);
    pkt_arp.set_proto_addr_len(4);
    pkt_arp.set_operation(arp::ArpOperations::Request);
    pkt_arp.set_sender_hw_addr(source_mac);
    pkt_arp.set_sender_proto_addr(sender_ipv4);
    pkt_arp.set_target_hw_addr(util::MacAddr::broadcast());
    pkt_arp.set_target_proto_addr(target_ipv4);

    pkt_eth.set_payload(pkt_arp.packet_mut());

    pkt_buf
}

/// Decodes a captured frame into an [`Observation`]
///
/// Returns `None` when fewer than [`PKT_TOTAL_SIZE`] bytes are available,
/// when the EtherType is not ARP, or when the Ethernet source equals
/// `own_mac` (loopback of one of our own probes).
pub fn parse(pkt: &[u8], own_mac: util::MacAddr) -> Option<Observation> {
    if pkt.len() < PKT_TOTAL_SIZE {
        return None;
    }

    let eth = ethernet::EthernetPacket::new(pkt)?;

    if eth.get_source() == own_mac {
        return None;
    }

    if eth.get_ethertype() != ethernet::EtherTypes::Arp {
        return None;
    }

    let header = arp::ArpPacket::new(eth.payload())?;

    Some(Observation {
        eth_source: eth.get_source(),
        opcode: Opcode::from(header.get_operation()),
        sender_mac: header.get_sender_hw_addr(),
        sender_ip: header.get_sender_proto_addr(),
    })
}

#[cfg(test)]
#[doc(hidden)]
pub fn build_reply(
    from_mac: util::MacAddr,
    from_ip: net::Ipv4Addr,
    to_mac: util::MacAddr,
    to_ip: net::Ipv4Addr,
) -> [u8; PKT_TOTAL_SIZE] {
    let mut pkt_buf = [0u8; PKT_TOTAL_SIZE];

    let mut pkt_eth = ethernet::MutableEthernetPacket::new(&mut pkt_buf)
        .expect("failed to generate ethernet packet");

    let mut arp_buffer = [0u8; PKT_ARP_SIZE];

    let mut pkt_arp = arp::MutableArpPacket::new(&mut arp_buffer)
        .expect("failed to generate arp packet");

    pkt_eth.set_destination(to_mac);
    pkt_eth.set_source(from_mac);
    pkt_eth.set_ethertype(ethernet::EtherTypes::Arp);

    pkt_arp.set_hardware_type(arp::ArpHardwareTypes::Ethernet);
    pkt_arp.set_protocol_type(ethernet::EtherTypes::Ipv4);
    pkt_arp.set_hw_addr_len(6);
    pkt_arp.set_proto_addr_len(4);
    pkt_arp.set_operation(arp::ArpOperations::Reply);
    pkt_arp.set_sender_hw_addr(from_mac);
    pkt_arp.set_sender_proto_addr(from_ip);
    pkt_arp.set_target_hw_addr(to_mac);
    pkt_arp.set_target_proto_addr(to_ip);

    pkt_eth.set_payload(pkt_arp.packet_mut());

    pkt_buf
}

#[cfg(test)]
#[path = "./arp_tests.rs"]
mod tests;
