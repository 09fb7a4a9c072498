//! Shared plumbing for the `pci-scanner` and `pci-listener` binaries.

pub mod config;

pub use config::LabConfig;
