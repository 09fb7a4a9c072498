use std::fmt;

use crate::address::PciAddress;
use crate::config_space::{split_id_word, ConfigWord};

/// A function that answered the id probe with a real vendor id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceRecord {
    address: PciAddress,
    vendor_id: u16,
    device_id: u16,
}

impl DeviceRecord {
    /// Returns `None` for the vendor ids that mean "nothing here" (0x0000, 0xFFFF).
    pub fn new(address: PciAddress, vendor_id: u16, device_id: u16) -> Option<Self> {
        if !is_present_vendor(vendor_id) {
            return None;
        }
        Some(Self {
            address,
            vendor_id,
            device_id,
        })
    }

    pub fn from_id_word(address: PciAddress, word: ConfigWord) -> Option<Self> {
        let (vendor_id, device_id) = split_id_word(word);
        Self::new(address, vendor_id, device_id)
    }

    pub fn address(&self) -> PciAddress {
        self.address
    }

    pub fn bus(&self) -> u8 {
        self.address.bus()
    }

    pub fn device(&self) -> u8 {
        self.address.device()
    }

    pub fn function(&self) -> u8 {
        self.address.function()
    }

    pub fn vendor_id(&self) -> u16 {
        self.vendor_id
    }

    pub fn device_id(&self) -> u16 {
        self.device_id
    }
}

impl fmt::Display for DeviceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{:04X}:{:04X}]",
            self.address, self.vendor_id, self.device_id
        )
    }
}

pub fn is_present_vendor(vendor_id: u16) -> bool {
    vendor_id != 0x0000 && vendor_id != 0xFFFF
}
