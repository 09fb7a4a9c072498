//! Brute-force bus enumeration.

use tracing::{debug, info};

use crate::address::{PciAddress, MAX_DEVICE, MAX_FUNCTION};
use crate::config_space::{ConfigSpaceReader, NO_RESPONSE};
use crate::errors::ProbeResult;
use crate::port_io::{PortIo, PortIoGuard};
use crate::record::DeviceRecord;

const BUS_COUNT: u16 = 256;
const PROGRESS_EVERY_BUSES: u16 = 16;

/// Probe counters for one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub buses_scanned: u32,
    pub slots_probed: u32,
    pub functions_probed: u32,
    pub devices_found: u32,
}

/// Sweeps every bus/device/function through an injected port I/O capability.
pub struct BusScanner<P: PortIo> {
    io: P,
}

impl<P: PortIo> BusScanner<P> {
    pub fn new(io: P) -> Self {
        Self { io }
    }

    pub fn io(&self) -> &P {
        &self.io
    }

    pub fn into_inner(self) -> P {
        self.io
    }

    /// Run a full sweep. Fails only when the capability cannot be initialized.
    pub fn scan(&self) -> ProbeResult<Vec<DeviceRecord>> {
        self.scan_with_stats().map(|(records, _)| records)
    }

    pub fn scan_with_stats(&self) -> ProbeResult<(Vec<DeviceRecord>, ScanStats)> {
        let guard = PortIoGuard::acquire(&self.io)?;
        let reader = ConfigSpaceReader::new(guard.io());

        let mut records = Vec::new();
        let mut stats = ScanStats::default();

        for bus in 0..BUS_COUNT {
            let bus = bus as u8;
            for device in 0..=MAX_DEVICE {
                stats.slots_probed += 1;
                let Some(base) = PciAddress::new(bus, device, 0) else {
                    continue;
                };
                // Presence is decided once per slot, at function 0; the
                // header's multi-function bit is not consulted.
                if reader.read(base, 0) == NO_RESPONSE {
                    continue;
                }

                for function in 0..=MAX_FUNCTION {
                    let Some(addr) = base.with_function(function) else {
                        continue;
                    };
                    stats.functions_probed += 1;
                    let word = reader.read(addr, 0);
                    if let Some(record) = DeviceRecord::from_id_word(addr, word) {
                        info!(device = %record, "found PCI device");
                        records.push(record);
                    }
                }
            }

            stats.buses_scanned += 1;
            if u16::from(bus) % PROGRESS_EVERY_BUSES == 0 {
                debug!(bus, total = BUS_COUNT, "scanned bus");
            }
        }

        stats.devices_found = records.len() as u32;
        info!(
            devices = stats.devices_found,
            slots_probed = stats.slots_probed,
            functions_probed = stats.functions_probed,
            "PCI scan complete"
        );
        Ok((records, stats))
    }
}
