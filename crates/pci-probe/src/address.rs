//! Bus/device/function addressing.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const MAX_BUS: u8 = 255;
pub const MAX_DEVICE: u8 = 31;
pub const MAX_FUNCTION: u8 = 7;

/// Location of one PCI function on the bus hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPciAddress")]
pub struct PciAddress {
    bus: u8,
    device: u8,
    function: u8,
}

impl PciAddress {
    /// Returns `None` when `device > 31` or `function > 7`.
    pub fn new(bus: u8, device: u8, function: u8) -> Option<Self> {
        if device > MAX_DEVICE || function > MAX_FUNCTION {
            return None;
        }
        Some(Self {
            bus,
            device,
            function,
        })
    }

    pub fn bus(&self) -> u8 {
        self.bus
    }

    pub fn device(&self) -> u8 {
        self.device
    }

    pub fn function(&self) -> u8 {
        self.function
    }

    /// Same slot, different function.
    pub fn with_function(&self, function: u8) -> Option<Self> {
        Self::new(self.bus, self.device, function)
    }

    /// Value written to `CONFIG_ADDRESS` to select `offset` of this function.
    ///
    /// Bit 31 enables the access; the low two bits of `offset` are dropped so
    /// every access selects a whole dword.
    pub fn config_address(&self, offset: u8) -> u32 {
        (1u32 << 31)
            | (u32::from(self.bus) << 16)
            | (u32::from(self.device) << 11)
            | (u32::from(self.function) << 8)
            | u32::from(offset & 0xFC)
    }
}

/// Unchecked shape used only to route deserialization through [`PciAddress::new`].
#[derive(Deserialize)]
struct RawPciAddress {
    bus: u8,
    device: u8,
    function: u8,
}

impl TryFrom<RawPciAddress> for PciAddress {
    type Error = String;

    fn try_from(raw: RawPciAddress) -> Result<Self, Self::Error> {
        Self::new(raw.bus, raw.device, raw.function).ok_or_else(|| {
            format!(
                "PCI address {}/{}/{} out of range (device <= {MAX_DEVICE}, function <= {MAX_FUNCTION})",
                raw.bus, raw.device, raw.function
            )
        })
    }
}

impl fmt::Display for PciAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}:{:02x}.{}", self.bus, self.device, self.function)
    }
}
