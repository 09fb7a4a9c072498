//! The collector's current view of the remote bus.

use std::sync::Arc;

use pci_probe::DeviceRecord;

use crate::vendor::VendorResolver;

/// Device set from the most recent complete report.
///
/// Contents sit behind an `Arc`, so cloning hands out an immutable snapshot
/// that later replacements never touch.
#[derive(Debug, Clone)]
pub struct DeviceCatalog {
    records: Arc<[DeviceRecord]>,
}

/// A catalog row with its manufacturer resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub bus: u8,
    pub device: u8,
    pub function: u8,
    pub vendor_id: String,
    pub device_id: String,
    pub vendor_name: &'static str,
}

impl Default for DeviceCatalog {
    fn default() -> Self {
        Self {
            records: Arc::from(Vec::new()),
        }
    }
}

impl DeviceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a whole new device set. Nothing from the previous set survives.
    pub fn replace(&mut self, records: Vec<DeviceRecord>) {
        self.records = records.into();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn device_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[DeviceRecord] {
        &self.records
    }

    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    pub fn vendor_name(&self, vendor_id: &str) -> &'static str {
        VendorResolver::global().name(vendor_id)
    }

    pub fn entries(&self) -> Vec<CatalogEntry> {
        let resolver = VendorResolver::global();
        self.records
            .iter()
            .map(|record| CatalogEntry {
                bus: record.bus(),
                device: record.device(),
                function: record.function(),
                vendor_id: format!("{:04X}", record.vendor_id()),
                device_id: format!("{:04X}", record.device_id()),
                vendor_name: resolver.name_for(record.vendor_id()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pci_probe::{DeviceRecord, PciAddress};

    use super::DeviceCatalog;

    fn record(bus: u8, vendor: u16) -> DeviceRecord {
        let addr = PciAddress::new(bus, 0, 0).expect("valid address");
        DeviceRecord::new(addr, vendor, 0x0001).expect("present vendor")
    }

    #[test]
    fn replace_discards_previous_report() {
        let mut catalog = DeviceCatalog::new();
        catalog.replace(vec![record(0, 0x8086), record(1, 0x8086), record(2, 0x10DE)]);
        catalog.replace(vec![record(7, 0x1022)]);

        assert_eq!(catalog.device_count(), 1);
        assert_eq!(catalog.records(), &[record(7, 0x1022)]);
    }

    #[test]
    fn snapshot_is_unaffected_by_later_replacement() {
        let mut catalog = DeviceCatalog::new();
        catalog.replace(vec![record(0, 0x8086)]);
        let snapshot = catalog.snapshot();

        catalog.clear();
        assert!(catalog.is_empty());
        assert_eq!(snapshot.device_count(), 1);
    }

    #[test]
    fn entries_carry_vendor_names() {
        let mut catalog = DeviceCatalog::new();
        catalog.replace(vec![record(0, 0x1022), record(1, 0xABCD)]);

        let entries = catalog.entries();
        assert_eq!(entries[0].vendor_id, "1022");
        assert_eq!(entries[0].vendor_name, "AMD");
        assert_eq!(entries[1].vendor_name, "Unknown manufacturer");
        assert_eq!(catalog.vendor_name("1022"), "AMD");
    }
}
