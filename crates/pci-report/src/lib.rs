//! pci-report: moving PCI scan results from the scanner host to a collector.
//!
//! The wire format is a bare JSON array written once per TCP connection.
//! The collector side runs as a single tokio task ([`ReportListener`]) that
//! owns the active session and the [`DeviceCatalog`]; everything else talks
//! to it through a [`ListenerHandle`].

pub mod catalog;
pub mod errors;
pub mod framing;
pub mod listener;
pub mod net;
pub mod sender;
pub mod vendor;
pub mod wire;

pub use catalog::{CatalogEntry, DeviceCatalog};
pub use errors::{DecodeError, ListenerError, TransportError};
pub use framing::{FrameAssembler, FrameOutcome};
pub use listener::{
    ListenerConfig, ListenerHandle, ListenerState, ListenerStatus, ReportListener,
    DEFAULT_REPORT_PORT,
};
pub use net::local_ip;
pub use sender::{ReportSender, SendReport, DEFAULT_SEND_TIMEOUT};
pub use vendor::{vendor_name, VendorResolver, UNKNOWN_VENDOR};
pub use wire::{decode_records, encode_records};
