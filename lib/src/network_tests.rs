use super::*;
use pnet::ipnetwork::Ipv4Network;
use std::net::IpAddr;

fn pnet_interface(mac: Option<MacAddr>, ips: Vec<IpNetwork>) -> PNetNetworkInterface {
    PNetNetworkInterface {
        name: "test0".to_string(),
        description: "test interface".to_string(),
        index: 3,
        mac,
        ips,
        flags: 0,
    }
}

#[test]
fn converts_pnet_interface() {
    let net = IpNetwork::V4(
        Ipv4Network::new(Ipv4Addr::new(192, 168, 1, 2), 24).unwrap(),
    );
    let iface = pnet_interface(Some(MacAddr::new(0, 1, 2, 3, 4, 5)), vec![net]);

    let converted = NetworkInterface::try_from(iface).unwrap();

    assert_eq!(converted.name, "test0");
    assert_eq!(converted.ipv4, Ipv4Addr::new(192, 168, 1, 2));
    assert_eq!(converted.cidr, "192.168.1.0/24");
    assert_eq!(converted.mac, MacAddr::new(0, 1, 2, 3, 4, 5));
    assert_eq!(converted.index, 3);
}

#[test]
fn fails_conversion_without_mac() {
    let net = IpNetwork::V4(
        Ipv4Network::new(Ipv4Addr::new(192, 168, 1, 2), 24).unwrap(),
    );
    let iface = pnet_interface(None, vec![net]);

    let result = NetworkInterface::try_from(iface);

    assert!(matches!(result, Err(RArpLibError::NoSuchInterface(_))));
}

#[test]
fn fails_conversion_without_ipv4() {
    let iface = pnet_interface(Some(MacAddr::new(0, 1, 2, 3, 4, 5)), vec![]);

    let result = NetworkInterface::try_from(iface);

    assert!(matches!(result, Err(RArpLibError::NoSuchInterface(_))));
}

#[test]
fn converts_back_to_pnet_interface() {
    let net = IpNetwork::V4(
        Ipv4Network::new(Ipv4Addr::new(10, 0, 0, 7), 16).unwrap(),
    );
    let iface = pnet_interface(Some(MacAddr::new(9, 8, 7, 6, 5, 4)), vec![net]);
    let converted = NetworkInterface::try_from(iface).unwrap();

    let back = PNetNetworkInterface::from(&converted);

    assert_eq!(back.name, "test0");
    assert_eq!(back.mac, Some(MacAddr::new(9, 8, 7, 6, 5, 4)));
    assert_eq!(back.ips.len(), 1);
    assert_eq!(back.ips[0].ip(), IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7)));
}

#[test]
fn get_interface_fails_for_unknown_name() {
    let result = get_interface("definitely-not-a-real-interface0");
    assert!(matches!(result, Err(RArpLibError::NoSuchInterface(_))));
}
