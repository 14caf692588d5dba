//! CLI dashboard for active/passive ARP discovery scanning
//!
//! # Examples
//!
//! ```bash
//! # help menu
//! sudo r-arpcli --help
//!
//! # scan a /24
//! sudo r-arpcli -r 192.168.1.0/24
//!
//! # passive sniffing only, filtered to the scan range
//! sudo r-arpcli -r 192.168.1.0/24 --passive --filter
//! ```
use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use itertools::Itertools;
use log::*;
use prettytable::{Table, row};
use r_arplib::{
    error::RArpLibError,
    network::{self, NetworkInterface},
    results::{OuiVendorResolver, VendorResolver},
    scanners::{
        ScanConfig,
        controller::{Presenter, ScanController, ScanReport},
    },
    targets::ranges::ScanRange,
    wire,
};
use std::{
    process,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

mod ui;

// Exit codes: generic fatal errors vs the hard-stop escape valve for a
// worker that refused to shut down
const EXIT_FATAL: i32 = 1;
const EXIT_HUNG_WORKER: i32 = 2;

// Argument bounds
const NODE_MIN: u8 = 2;
const NODE_MAX: u8 = 253;
const SLEEP_MIN_MS: u64 = 3;
const SLEEP_MAX_MS: u64 = 1000;
const TIMEOUT_MIN: Duration = Duration::from_secs(10);

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
/// CLI dashboard for active/passive ARP discovery scanning
struct Args {
    /// Comma separated list of CIDR ranges to scan (valid: /8, /16, /24)
    #[arg(short, long, required = true, use_value_delimiter = true)]
    ranges: Vec<String>,

    /// Number of times to send each ARP probe
    #[arg(short, long, default_value_t = 1)]
    count: u16,

    /// Choose a specific network interface (default: first usable)
    #[arg(short, long)]
    interface: Option<String>,

    /// Last IP octet used as the synthetic sender address for probes
    #[arg(short, long, default_value_t = 43)]
    node: u8,

    /// Passive mode, sniff without sending any packets
    #[arg(short, long, default_value_t = false)]
    passive: bool,

    /// Only record hosts whose sender IP falls within the scan ranges
    #[arg(short, long, default_value_t = false)]
    filter: bool,

    /// Time to sleep between each probe in milliseconds
    #[arg(short, long, default_value_t = 3)]
    sleep_ms: u64,

    /// Stop scanning after this much wall-clock time e.g. 90s, 30m
    #[arg(
        short,
        long,
        default_value = "30m",
        value_parser = humantime::parse_duration
    )]
    timeout: Duration,

    /// Output final report in json instead of table text
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Print debug logs instead of the dashboard
    #[arg(long, default_value_t = false)]
    debug: bool,
}

#[doc(hidden)]
fn initialize_logger(args: &Args) -> Result<()> {
    let filter = if args.debug {
        simplelog::LevelFilter::Debug
    } else {
        // logs would tear the dashboard
        simplelog::LevelFilter::Off
    };

    simplelog::TermLogger::init(
        filter,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

#[doc(hidden)]
fn ensure_root() -> Result<()> {
    if !nix::unistd::Uid::effective().is_root() {
        return Err(eyre!(
            "r-arpcli requires root privileges to open raw sockets"
        ));
    }
    Ok(())
}

#[doc(hidden)]
fn build_config(args: &Args) -> Result<ScanConfig> {
    if args.count < 1 {
        return Err(eyre!("count must be at least 1"));
    }

    if !(NODE_MIN..=NODE_MAX).contains(&args.node) {
        return Err(eyre!(
            "node must be between {} and {}",
            NODE_MIN,
            NODE_MAX
        ));
    }

    if !(SLEEP_MIN_MS..=SLEEP_MAX_MS).contains(&args.sleep_ms) {
        return Err(eyre!(
            "sleep must be between {}ms and {}ms",
            SLEEP_MIN_MS,
            SLEEP_MAX_MS
        ));
    }

    if args.timeout < TIMEOUT_MIN {
        return Err(eyre!("timeout must be at least {:?}", TIMEOUT_MIN));
    }

    let ranges = args
        .ranges
        .iter()
        .map(|r| r.parse::<ScanRange>())
        .collect::<std::result::Result<Vec<ScanRange>, RArpLibError>>()?;

    Ok(ScanConfig {
        count: args.count,
        node: args.node,
        probe_sleep: Duration::from_millis(args.sleep_ms),
        timeout: args.timeout,
        passive: args.passive,
        filter: args.filter,
        ranges,
    })
}

#[doc(hidden)]
fn print_args(args: &Args, interface: &NetworkInterface) {
    info!("configuration:");
    info!("ranges:    {:?}", args.ranges);
    info!("count:     {}", args.count);
    info!("node:      {}", args.node);
    info!("passive:   {}", args.passive);
    info!("filter:    {}", args.filter);
    info!("sleep_ms:  {}", args.sleep_ms);
    info!("timeout:   {:?}", args.timeout);
    info!(
        "interface: {}",
        args.interface.as_deref().unwrap_or(&interface.name)
    );
    info!("cidr:      {}", interface.cidr);
    info!("mac:       {}", interface.mac);
}

#[doc(hidden)]
fn print_report(args: &Args, report: &ScanReport) -> Result<()> {
    let hosts = report
        .hosts
        .iter()
        .sorted_by_key(|h| h.ip)
        .collect::<Vec<_>>();

    if args.json {
        let out = serde_json::json!({
            "hosts": hosts,
            "totals": report.totals,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        let mut table = Table::new();
        table.add_row(row![
            "IP ADDRESS",
            "ETH MAC ADDRESS",
            "ARP MAC ADDRESS",
            "REQ.",
            "REP.",
            "VENDOR"
        ]);

        for host in hosts {
            table.add_row(row![
                host.ip,
                host.eth_mac,
                host.arp_mac,
                host.requests,
                host.replies,
                host.vendor
            ]);
        }

        table.printstd();
        println!(
            "{} hosts, {} requests, {} replies ({} after {})",
            report.totals.hosts,
            report.totals.requests,
            report.totals.replies,
            report.stop,
            humantime::format_duration(Duration::from_secs(
                report.elapsed.as_secs()
            ))
        );
    }

    Ok(())
}

#[doc(hidden)]
fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    initialize_logger(&args)?;
    ensure_root()?;

    let config = Arc::new(build_config(&args)?);

    let interface = match &args.interface {
        Some(name) => network::get_interface(name),
        None => network::get_default_interface(),
    }?;

    print_args(&args, &interface);

    let packet_wire = wire::default(&interface)?;

    let interrupted = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::SeqCst);
    })?;

    let vendors: Arc<dyn VendorResolver> = Arc::new(OuiVendorResolver);

    let controller = ScanController::builder()
        .interface(Arc::new(interface))
        .wire(packet_wire)
        .config(config)
        .vendors(vendors)
        .interrupted(Arc::clone(&interrupted))
        .build()?;

    let result = {
        let mut presenter: Box<dyn Presenter> = if args.debug {
            Box::new(ui::LogPresenter::default())
        } else {
            Box::new(
                ui::Dashboard::new(Arc::clone(&interrupted))
                    .map_err(|e| eyre!("failed to initialize terminal: {}", e))?,
            )
        };

        let result = controller.run(presenter.as_mut());
        // the presenter restores the terminal on drop, before any printing
        drop(presenter);
        result
    };

    match result {
        Ok(report) => print_report(&args, &report),
        Err(e @ RArpLibError::ShutdownTimeout(_)) => {
            eprintln!("r-arpcli: fault: {}", e);
            process::exit(EXIT_HUNG_WORKER);
        }
        Err(e) => {
            eprintln!("r-arpcli: error: {}", e);
            process::exit(EXIT_FATAL);
        }
    }
}

#[cfg(test)]
#[path = "./main_tests.rs"]
mod tests;
