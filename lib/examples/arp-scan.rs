use std::{
    env,
    sync::{Arc, atomic::AtomicBool},
    time::Duration,
};

use r_arplib::{
    error::Result as LibResult,
    network,
    results::{OuiVendorResolver, VendorResolver},
    scanners::{
        ScanConfig,
        controller::{Presenter, ScanController, ScanView},
    },
    wire,
};

fn is_root() -> bool {
    match env::var("USER") {
        Ok(val) => val == "root",
        Err(_e) => false,
    }
}

struct StdoutPresenter {
    seen: usize,
}

impl Presenter for StdoutPresenter {
    fn render(&mut self, view: &ScanView) -> LibResult<()> {
        for host in &view.hosts[self.seen..] {
            println!("{}\t{}\t{}", host.ip, host.eth_mac, host.vendor);
        }
        self.seen = view.hosts.len();
        Ok(())
    }
}

fn main() {
    if !is_root() {
        panic!("permission denied: must run with root privileges");
    }

    let interface =
        network::get_default_interface().expect("cannot find interface");

    let packet_wire = wire::default(&interface).expect("failed to create wire");

    let range = interface
        .cidr
        .parse()
        .expect("interface network must be /8, /16, or /24");

    let config = Arc::new(ScanConfig {
        count: 1,
        node: 43,
        probe_sleep: Duration::from_millis(3),
        timeout: Duration::from_secs(10),
        passive: false,
        filter: true,
        ranges: vec![range],
    });

    let vendors: Arc<dyn VendorResolver> = Arc::new(OuiVendorResolver);

    let controller = ScanController::builder()
        .interface(Arc::new(interface))
        .wire(packet_wire)
        .config(config)
        .vendors(vendors)
        .interrupted(Arc::new(AtomicBool::new(false)))
        .build()
        .expect("failed to build scan controller");

    let report = controller
        .run(&mut StdoutPresenter { seen: 0 })
        .expect("scan failed");

    println!(
        "discovered {} hosts ({} requests, {} replies) in {:?}",
        report.totals.hosts,
        report.totals.requests,
        report.totals.replies,
        report.elapsed
    );
}
