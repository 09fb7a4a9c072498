//! Scan the local PCI bus once and send the device list to the collector.

use anyhow::{Context, Result};
use lab_core::LabConfig;
use pci_probe::{BusScanner, WinIo};
use pci_report::encode_records;
use tracing::info;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let config = LabConfig::load()?;

    info!(
        collector = %format!("{}:{}", config.report_host, config.report_port),
        winio_dir = %config.winio_dir.display(),
        config_file = ?config.source,
        "pci-scanner started"
    );

    let io = WinIo::load(&config.winio_dir).context("port I/O driver unavailable")?;
    let scanner = BusScanner::new(io);
    let (records, stats) = scanner.scan_with_stats().context("PCI scan failed")?;
    // Unload the driver before touching the network.
    drop(scanner);

    info!(
        devices = stats.devices_found,
        buses = stats.buses_scanned,
        slots_probed = stats.slots_probed,
        functions_probed = stats.functions_probed,
        "scan finished"
    );

    let payload = encode_records(&records).context("failed encoding device list")?;
    let report = config
        .report_sender()
        .send(&config.report_host, config.report_port, &payload)
        .with_context(|| {
            format!(
                "failed sending report to {}:{}",
                config.report_host, config.report_port
            )
        })?;

    info!(peer = %report.peer, bytes = report.bytes_sent, "report delivered");
    Ok(())
}
