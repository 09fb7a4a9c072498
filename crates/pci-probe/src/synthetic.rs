//! In-memory configuration space behind the [`PortIo`] trait.
//!
//! Emulates mechanism #1 faithfully enough for the scanner: a dword written to
//! `CONFIG_ADDRESS` selects a register, a dword read from `CONFIG_DATA`
//! returns it. Registers that were never populated read as all ones.

use std::cell::Cell;
use std::collections::HashMap;

use crate::address::PciAddress;
use crate::config_space::{ConfigWord, CONFIG_ADDRESS, CONFIG_DATA, NO_RESPONSE};
use crate::errors::{ProbeError, ProbeResult};
use crate::port_io::{PortIo, PortWidth};

#[derive(Debug, Default)]
pub struct SyntheticConfigSpace {
    words: HashMap<(PciAddress, u8), ConfigWord>,
    fail_init: bool,
    fail_writes: bool,
    fail_reads: bool,
    selected: Cell<Option<u32>>,
    initialized: Cell<bool>,
    init_calls: Cell<u32>,
    shutdown_calls: Cell<u32>,
    address_writes: Cell<u64>,
    data_reads: Cell<u64>,
}

impl SyntheticConfigSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate the dword containing `offset`.
    pub fn with_word(mut self, addr: PciAddress, offset: u8, value: ConfigWord) -> Self {
        self.words.insert((addr, offset & 0xFC), value);
        self
    }

    /// Populate the id dword (offset 0) of a function.
    pub fn with_device(self, addr: PciAddress, vendor_id: u16, device_id: u16) -> Self {
        let word = (u32::from(device_id) << 16) | u32::from(vendor_id);
        self.with_word(addr, 0, word)
    }

    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn last_selected(&self) -> Option<u32> {
        self.selected.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.get()
    }

    pub fn init_calls(&self) -> u32 {
        self.init_calls.get()
    }

    pub fn shutdown_calls(&self) -> u32 {
        self.shutdown_calls.get()
    }

    pub fn address_writes(&self) -> u64 {
        self.address_writes.get()
    }

    pub fn data_reads(&self) -> u64 {
        self.data_reads.get()
    }

    fn lookup(&self, selected: u32) -> ConfigWord {
        if selected & (1 << 31) == 0 {
            return NO_RESPONSE;
        }
        let bus = ((selected >> 16) & 0xFF) as u8;
        let device = ((selected >> 11) & 0x1F) as u8;
        let function = ((selected >> 8) & 0x07) as u8;
        let offset = (selected & 0xFC) as u8;

        PciAddress::new(bus, device, function)
            .and_then(|addr| self.words.get(&(addr, offset)).copied())
            .unwrap_or(NO_RESPONSE)
    }
}

impl PortIo for SyntheticConfigSpace {
    fn init(&self) -> ProbeResult<()> {
        self.init_calls.set(self.init_calls.get() + 1);
        if self.fail_init {
            return Err(ProbeError::CapabilityUnavailable(
                "synthetic driver configured to fail".to_string(),
            ));
        }
        self.initialized.set(true);
        Ok(())
    }

    fn shutdown(&self) {
        self.shutdown_calls.set(self.shutdown_calls.get() + 1);
        self.initialized.set(false);
    }

    fn write_port(&self, port: u16, value: u32, width: PortWidth) -> bool {
        if self.fail_writes || port != CONFIG_ADDRESS || width != PortWidth::Dword {
            return false;
        }
        self.address_writes.set(self.address_writes.get() + 1);
        self.selected.set(Some(value));
        true
    }

    fn read_port(&self, port: u16, width: PortWidth) -> Option<u32> {
        if self.fail_reads || port != CONFIG_DATA || width != PortWidth::Dword {
            return None;
        }
        self.data_reads.set(self.data_reads.get() + 1);
        Some(self.selected.get().map_or(NO_RESPONSE, |sel| self.lookup(sel)))
    }
}
