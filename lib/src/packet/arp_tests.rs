use super::*;
use std::str::FromStr;

fn own_mac() -> util::MacAddr {
    util::MacAddr::new(0xaa, 0xbb, 0xcc, 0x11, 0x22, 0x33)
}

#[test]
fn round_trips_probe_frames() {
    let sender_ip = net::Ipv4Addr::from_str("192.168.1.43").unwrap();
    let target_ip = net::Ipv4Addr::from_str("192.168.1.7").unwrap();

    let frame = build_request(own_mac(), sender_ip, target_ip);

    // decode as a different host would see it
    let observation =
        parse(&frame, util::MacAddr::new(1, 2, 3, 4, 5, 6)).unwrap();

    assert_eq!(observation.eth_source, own_mac());
    assert_eq!(observation.opcode, Opcode::Request);
    assert_eq!(observation.sender_mac, own_mac());
    assert_eq!(observation.sender_ip, sender_ip);
}

#[test]
fn probe_frames_are_byte_exact() {
    let sender_ip = net::Ipv4Addr::new(10, 0, 0, 43);
    let target_ip = net::Ipv4Addr::new(10, 0, 0, 200);

    let frame = build_request(own_mac(), sender_ip, target_ip);

    assert_eq!(frame.len(), 42);
    // ethernet destination: broadcast
    assert_eq!(&frame[0..6], &[0xff; 6]);
    // ethernet source
    assert_eq!(&frame[6..12], &[0xaa, 0xbb, 0xcc, 0x11, 0x22, 0x33]);
    // ethertype: ARP
    assert_eq!(&frame[12..14], &[0x08, 0x06]);
    // hardware type: ethernet, protocol type: ipv4
    assert_eq!(&frame[14..16], &[0x00, 0x01]);
    assert_eq!(&frame[16..18], &[0x08, 0x00]);
    // hardware size, protocol size
    assert_eq!(frame[18], 0x06);
    assert_eq!(frame[19], 0x04);
    // opcode: request
    assert_eq!(&frame[20..22], &[0x00, 0x01]);
    // sender mac + ip
    assert_eq!(&frame[22..28], &[0xaa, 0xbb, 0xcc, 0x11, 0x22, 0x33]);
    assert_eq!(&frame[28..32], &[10, 0, 0, 43]);
    // target mac (broadcast) + ip
    assert_eq!(&frame[32..38], &[0xff; 6]);
    assert_eq!(&frame[38..42], &[10, 0, 0, 200]);
}

#[test]
fn parses_replies() {
    let device_mac = util::MacAddr::new(0xde, 0xad, 0xbe, 0xef, 0x00, 0x01);
    let device_ip = net::Ipv4Addr::new(192, 168, 1, 9);

    let frame = build_reply(
        device_mac,
        device_ip,
        own_mac(),
        net::Ipv4Addr::new(192, 168, 1, 43),
    );

    let observation = parse(&frame, own_mac()).unwrap();

    assert_eq!(observation.opcode, Opcode::Reply);
    assert_eq!(observation.eth_source, device_mac);
    assert_eq!(observation.sender_mac, device_mac);
    assert_eq!(observation.sender_ip, device_ip);
}

#[test]
fn ignores_own_frames() {
    let frame = build_request(
        own_mac(),
        net::Ipv4Addr::new(192, 168, 1, 43),
        net::Ipv4Addr::new(192, 168, 1, 7),
    );

    assert!(parse(&frame, own_mac()).is_none());
}

#[test]
fn ignores_short_buffers() {
    let frame = build_request(
        own_mac(),
        net::Ipv4Addr::new(192, 168, 1, 43),
        net::Ipv4Addr::new(192, 168, 1, 7),
    );

    assert!(parse(&frame[0..41], util::MacAddr::zero()).is_none());
    assert!(parse(&[], util::MacAddr::zero()).is_none());
}

#[test]
fn ignores_non_arp_frames() {
    let mut frame = build_request(
        own_mac(),
        net::Ipv4Addr::new(192, 168, 1, 43),
        net::Ipv4Addr::new(192, 168, 1, 7),
    );
    // rewrite the ethertype to ipv4
    frame[12] = 0x08;
    frame[13] = 0x00;

    assert!(parse(&frame, util::MacAddr::zero()).is_none());
}
