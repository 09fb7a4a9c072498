//! Collect PCI reports from scanners and print each new device list.

use anyhow::{Context, Result};
use lab_core::LabConfig;
use pci_report::{DeviceCatalog, ReportListener};
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let config = LabConfig::load()?;

    let (handle, task) = ReportListener::spawn(config.listener_config());
    let bound = handle
        .start()
        .await
        .context("failed starting report listener")?;
    info!(
        %bound,
        local_ip = %handle.local_ip(),
        config_file = ?config.source,
        "pci-listener started"
    );

    let mut catalog = handle.subscribe_catalog();
    let mut status = handle.subscribe_status();
    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
            changed = catalog.changed() => {
                if changed.is_err() {
                    warn!("listener task ended unexpectedly");
                    break;
                }
                let snapshot = catalog.borrow_and_update().snapshot();
                print_catalog(&snapshot);
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = status.borrow_and_update().clone();
                info!(state = ?current.state, client = ?current.client_ip(), "{}", current.message);
            }
        }
    }

    if let Err(err) = handle.stop().await {
        warn!(error = %err, "listener did not stop cleanly");
    }
    drop(handle);
    if let Err(err) = task.await {
        warn!(error = %err, "listener task panicked");
    }

    info!("pci-listener stopped");
    Ok(())
}

fn print_catalog(catalog: &DeviceCatalog) {
    info!(devices = catalog.device_count(), "device list changed");
    for entry in catalog.entries() {
        info!(
            "{:02x}:{:02x}.{}  {}:{}  {}",
            entry.bus, entry.device, entry.function, entry.vendor_id, entry.device_id, entry.vendor_name
        );
    }
}
