use super::*;

fn observation(opcode: Opcode) -> Observation {
    Observation {
        eth_source: MacAddr::new(0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa),
        opcode,
        sender_mac: MacAddr::new(0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa),
        sender_ip: Ipv4Addr::new(10, 0, 0, 5),
    }
}

fn resolver(vendor: &'static str) -> Arc<MockVendorResolver> {
    let mut mock = MockVendorResolver::new();
    mock.expect_lookup().returning(move |_| vendor.to_string());
    Arc::new(mock)
}

#[test]
fn aggregates_repeat_observations_into_one_record() {
    let mut table = ResultTable::new(resolver("ACME"));

    for _ in 0..5 {
        table.apply(&observation(Opcode::Request));
    }

    let rows = table.snapshot();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].requests, 5);
    assert_eq!(rows[0].replies, 0);
    assert_eq!(rows[0].vendor, "ACME");
}

#[test]
fn splits_counters_by_opcode() {
    let mut table = ResultTable::new(resolver(""));

    table.apply(&observation(Opcode::Request));
    table.apply(&observation(Opcode::Reply));

    let rows = table.snapshot();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].requests, 1);
    assert_eq!(rows[0].replies, 1);
}

#[test]
fn resolves_vendor_once_per_record() {
    let mut mock = MockVendorResolver::new();
    mock.expect_lookup()
        .times(1)
        .returning(|_| "ACME".to_string());
    let mut table = ResultTable::new(Arc::new(mock));

    table.apply(&observation(Opcode::Reply));
    table.apply(&observation(Opcode::Reply));
    table.apply(&observation(Opcode::Request));
}

#[test]
fn distinguishes_hosts_by_full_triple() {
    let mut table = ResultTable::new(resolver(""));

    let mut spoofed = observation(Opcode::Reply);
    spoofed.sender_mac = MacAddr::new(0xbb, 0xbb, 0xbb, 0xbb, 0xbb, 0xbb);

    table.apply(&observation(Opcode::Reply));
    table.apply(&spoofed);

    let rows = table.snapshot();
    assert_eq!(rows.len(), 2);
    assert!(!rows[0].is_suspicious());
    assert!(rows[1].is_suspicious());
}

#[test]
fn keeps_discovery_order() {
    let mut table = ResultTable::new(resolver(""));

    let mut second = observation(Opcode::Reply);
    second.sender_ip = Ipv4Addr::new(10, 0, 0, 200);

    table.apply(&observation(Opcode::Reply));
    table.apply(&second);
    // a repeat of the first host must not reorder anything
    table.apply(&observation(Opcode::Request));

    let rows = table.snapshot();
    assert_eq!(rows[0].ip, Ipv4Addr::new(10, 0, 0, 5));
    assert_eq!(rows[1].ip, Ipv4Addr::new(10, 0, 0, 200));
}

#[test]
fn sums_totals_over_all_rows() {
    let mut table = ResultTable::new(resolver(""));

    let mut other = observation(Opcode::Reply);
    other.sender_ip = Ipv4Addr::new(10, 0, 0, 6);

    table.apply(&observation(Opcode::Request));
    table.apply(&observation(Opcode::Request));
    table.apply(&other);

    let totals = table.totals();
    assert_eq!(totals.hosts, 2);
    assert_eq!(totals.requests, 2);
    assert_eq!(totals.replies, 1);
}

#[test]
fn serializes_macs_as_strings() {
    let record = HostRecord {
        ip: Ipv4Addr::new(10, 0, 0, 5),
        eth_mac: MacAddr::new(0xaa, 0xbb, 0xcc, 0, 0, 1),
        arp_mac: MacAddr::new(0xaa, 0xbb, 0xcc, 0, 0, 1),
        requests: 1,
        replies: 0,
        vendor: "ACME".to_string(),
    };

    let json = serde_json::to_string(&record).unwrap();
    assert!(json.contains("aa:bb:cc:00:00:01"));

    let back: HostRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back, record);
}
