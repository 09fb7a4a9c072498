//! pci-probe: PCI bus enumeration through configuration mechanism #1.
//!
//! The configuration space is reached through two I/O ports
//! (`CONFIG_ADDRESS` at 0xCF8 and `CONFIG_DATA` at 0xCFC). Port access is a
//! privileged capability supplied by a [`PortIo`] implementation: the WinIo
//! driver on Windows, or an in-memory `SyntheticConfigSpace` in tests
//! (behind the `testing` feature).

pub mod address;
pub mod config_space;
pub mod errors;
pub mod port_io;
pub mod record;
pub mod scanner;
#[cfg(any(test, feature = "testing"))]
pub mod synthetic;

pub use address::{PciAddress, MAX_BUS, MAX_DEVICE, MAX_FUNCTION};
pub use config_space::{ConfigSpaceReader, ConfigWord, CONFIG_ADDRESS, CONFIG_DATA, NO_RESPONSE};
pub use errors::{ProbeError, ProbeResult};
pub use port_io::{PortIo, PortIoGuard, PortWidth, WinIo};
pub use record::DeviceRecord;
pub use scanner::{BusScanner, ScanStats};
#[cfg(any(test, feature = "testing"))]
pub use synthetic::SyntheticConfigSpace;
