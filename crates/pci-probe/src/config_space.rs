//! Configuration mechanism #1 reads.

use crate::address::PciAddress;
use crate::port_io::{PortIo, PortWidth};

pub const CONFIG_ADDRESS: u16 = 0xCF8;
pub const CONFIG_DATA: u16 = 0xCFC;

/// What an unpopulated slot (or a failed port access) reads back as.
pub const NO_RESPONSE: ConfigWord = 0xFFFF_FFFF;

pub type ConfigWord = u32;

/// Issues single-dword configuration reads through a [`PortIo`] capability.
///
/// Port failures are folded into [`NO_RESPONSE`]: a probe that could not be
/// performed is indistinguishable from an empty slot, and is never retried.
pub struct ConfigSpaceReader<'a, P: PortIo + ?Sized> {
    io: &'a P,
}

impl<'a, P: PortIo + ?Sized> ConfigSpaceReader<'a, P> {
    pub fn new(io: &'a P) -> Self {
        Self { io }
    }

    pub fn read(&self, addr: PciAddress, offset: u8) -> ConfigWord {
        if !self
            .io
            .write_port(CONFIG_ADDRESS, addr.config_address(offset), PortWidth::Dword)
        {
            return NO_RESPONSE;
        }
        self.io
            .read_port(CONFIG_DATA, PortWidth::Dword)
            .unwrap_or(NO_RESPONSE)
    }

    /// `(vendor_id, device_id)` from the first dword of the header.
    pub fn vendor_device(&self, addr: PciAddress) -> (u16, u16) {
        split_id_word(self.read(addr, 0))
    }
}

/// Vendor id lives in the low half of dword 0, device id in the high half.
pub fn split_id_word(word: ConfigWord) -> (u16, u16) {
    ((word & 0xFFFF) as u16, (word >> 16) as u16)
}
