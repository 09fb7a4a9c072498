//! PCI vendor id to manufacturer name.

use std::collections::HashMap;
use std::sync::OnceLock;

pub const UNKNOWN_VENDOR: &str = "Unknown manufacturer";

const KNOWN_VENDORS: &[(&str, &str)] = &[
    ("8086", "Intel Corporation"),
    ("1022", "AMD"),
    ("10DE", "NVIDIA Corporation"),
    ("1002", "AMD/ATI"),
    ("14E4", "Broadcom"),
    ("10EC", "Realtek Semiconductor"),
    ("1B21", "ASMedia Technology"),
    ("8087", "Intel Corporation"),
    ("1033", "NEC Corporation"),
    ("1106", "VIA Technologies"),
    ("10B5", "PLX Technology"),
    ("1039", "Silicon Integrated Systems"),
    ("1000", "LSI Logic"),
    ("15AD", "VMware"),
    ("80EE", "VirtualBox"),
    ("1D6B", "Linux Foundation"),
    ("1AF4", "Red Hat (Virtio)"),
];

/// Read-only vendor table, built once on first use.
#[derive(Debug)]
pub struct VendorResolver {
    table: HashMap<&'static str, &'static str>,
}

impl VendorResolver {
    pub fn global() -> &'static Self {
        static RESOLVER: OnceLock<VendorResolver> = OnceLock::new();
        RESOLVER.get_or_init(|| Self {
            table: KNOWN_VENDORS.iter().copied().collect(),
        })
    }

    /// Case-insensitive lookup by 4-hex-digit id.
    pub fn name(&self, vendor_id: &str) -> &'static str {
        let key = vendor_id.trim().to_ascii_uppercase();
        self.table.get(key.as_str()).copied().unwrap_or(UNKNOWN_VENDOR)
    }

    pub fn name_for(&self, vendor_id: u16) -> &'static str {
        self.name(&format!("{vendor_id:04X}"))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

pub fn vendor_name(vendor_id: &str) -> &'static str {
    VendorResolver::global().name(vendor_id)
}
