use super::*;
use clap::Parser;

fn parse(argv: &[&str]) -> Args {
    Args::try_parse_from(argv).unwrap()
}

#[test]
fn applies_defaults() {
    let args = parse(&["r-arpcli", "-r", "192.168.1.0/24"]);

    assert_eq!(args.count, 1);
    assert_eq!(args.node, 43);
    assert_eq!(args.sleep_ms, 3);
    assert_eq!(args.timeout, Duration::from_secs(30 * 60));
    assert!(!args.passive);
    assert!(!args.filter);
    assert!(!args.json);
    assert!(!args.debug);
}

#[test]
fn requires_ranges() {
    assert!(Args::try_parse_from(["r-arpcli"]).is_err());
}

#[test]
fn splits_comma_separated_ranges() {
    let args = parse(&["r-arpcli", "-r", "192.168.1.0/24,10.0.0.0/16"]);
    assert_eq!(args.ranges.len(), 2);

    let config = build_config(&args).unwrap();
    assert_eq!(config.ranges.len(), 2);
}

#[test]
fn builds_config_from_args() {
    let args = parse(&[
        "r-arpcli",
        "-r",
        "192.168.1.0/24",
        "-c",
        "2",
        "-n",
        "99",
        "-s",
        "10",
        "-t",
        "90s",
        "--passive",
        "--filter",
    ]);

    let config = build_config(&args).unwrap();

    assert_eq!(config.count, 2);
    assert_eq!(config.node, 99);
    assert_eq!(config.probe_sleep, Duration::from_millis(10));
    assert_eq!(config.timeout, Duration::from_secs(90));
    assert!(config.passive);
    assert!(config.filter);
}

#[test]
fn rejects_zero_count() {
    let args = parse(&["r-arpcli", "-r", "192.168.1.0/24", "-c", "0"]);
    assert!(build_config(&args).is_err());
}

#[test]
fn rejects_out_of_bounds_nodes() {
    for node in ["1", "254"] {
        let args = parse(&["r-arpcli", "-r", "192.168.1.0/24", "-n", node]);
        assert!(build_config(&args).is_err(), "accepted node {}", node);
    }
}

#[test]
fn rejects_out_of_bounds_sleeps() {
    for sleep in ["2", "1001"] {
        let args = parse(&["r-arpcli", "-r", "192.168.1.0/24", "-s", sleep]);
        assert!(build_config(&args).is_err(), "accepted sleep {}", sleep);
    }
}

#[test]
fn rejects_short_timeouts() {
    let args = parse(&["r-arpcli", "-r", "192.168.1.0/24", "-t", "5s"]);
    assert!(build_config(&args).is_err());
}

#[test]
fn rejects_invalid_range_prefixes() {
    let args = parse(&["r-arpcli", "-r", "192.168.1.0/12"]);
    assert!(build_config(&args).is_err());
}
