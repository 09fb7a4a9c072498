//! JSON wire format.
//!
//! ```text
//! [{"bus":0,"device":1,"function":0,"vendorID":"10DE","deviceID":"1180"}, ...]
//! ```
//!
//! Ids are four uppercase hex digits without a `0x` prefix. Decoding accepts
//! either case.

use pci_probe::{DeviceRecord, PciAddress};
use serde::{Deserialize, Serialize};

use crate::errors::DecodeError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct WireDevice {
    bus: u8,
    device: u8,
    function: u8,
    #[serde(rename = "vendorID", with = "hex_id")]
    vendor_id: u16,
    #[serde(rename = "deviceID", with = "hex_id")]
    device_id: u16,
}

impl From<&DeviceRecord> for WireDevice {
    fn from(record: &DeviceRecord) -> Self {
        Self {
            bus: record.bus(),
            device: record.device(),
            function: record.function(),
            vendor_id: record.vendor_id(),
            device_id: record.device_id(),
        }
    }
}

impl WireDevice {
    fn into_record(self, index: usize) -> Result<DeviceRecord, DecodeError> {
        let address = PciAddress::new(self.bus, self.device, self.function).ok_or_else(|| {
            DecodeError::InvalidRecord {
                index,
                reason: format!(
                    "address {}/{}/{} out of range",
                    self.bus, self.device, self.function
                ),
            }
        })?;
        DeviceRecord::new(address, self.vendor_id, self.device_id).ok_or_else(|| {
            DecodeError::InvalidRecord {
                index,
                reason: format!("vendor id {:04X} means no device", self.vendor_id),
            }
        })
    }
}

pub fn encode_records(records: &[DeviceRecord]) -> serde_json::Result<Vec<u8>> {
    let wire: Vec<WireDevice> = records.iter().map(WireDevice::from).collect();
    serde_json::to_vec(&wire)
}

pub fn decode_records(payload: &[u8]) -> Result<Vec<DeviceRecord>, DecodeError> {
    let wire: Vec<WireDevice> = serde_json::from_slice(payload)?;
    wire.into_iter()
        .enumerate()
        .map(|(index, device)| device.into_record(index))
        .collect()
}

mod hex_id {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(id: &u16, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{id:04X}"))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let digits = raw.trim();
        if digits.is_empty() || digits.len() > 4 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(D::Error::custom(format!("expected 4 hex digits, got {raw:?}")));
        }
        u16::from_str_radix(digits, 16).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests;
