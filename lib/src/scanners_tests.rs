use super::*;
use std::{sync::Arc, thread, time::Instant};

#[test]
fn token_starts_uncancelled() {
    let token = CancelToken::new();
    assert!(!token.is_cancelled());
}

#[test]
fn wait_times_out_when_not_cancelled() {
    let token = CancelToken::new();
    let started = Instant::now();

    assert!(!token.wait(Duration::from_millis(50)));
    assert!(started.elapsed() >= Duration::from_millis(50));
}

#[test]
fn wait_returns_immediately_when_already_cancelled() {
    let token = CancelToken::new();
    token.cancel();

    let started = Instant::now();
    assert!(token.wait(Duration::from_secs(60)));
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[test]
fn wait_wakes_early_on_cancellation() {
    let token = Arc::new(CancelToken::new());
    let token_clone = Arc::clone(&token);

    thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        token_clone.cancel();
    });

    let started = Instant::now();
    assert!(token.wait(Duration::from_secs(60)));
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[test]
fn classifies_arp_opcodes() {
    assert_eq!(Opcode::from(arp::ArpOperations::Request), Opcode::Request);
    assert_eq!(Opcode::from(arp::ArpOperations::Reply), Opcode::Reply);
    // anything that is not a request counts as a reply
    assert_eq!(Opcode::from(arp::ArpOperation::new(7)), Opcode::Reply);
}

#[test]
fn displays_send_status() {
    assert_eq!(SendStatus::NotStarted.to_string(), "not started");
    assert_eq!(
        SendStatus::InProgress(Ipv4Addr::new(10, 0, 0, 7)).to_string(),
        "sending 10.0.0.7"
    );
    assert_eq!(SendStatus::Finished.to_string(), "finished");
}
