use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use pci_probe::port_io::DEFAULT_WINIO_DIR;
use pci_report::{ListenerConfig, ReportSender, DEFAULT_REPORT_PORT};

use super::constants::{DEFAULT_REPORT_HOST, DEFAULT_REPORT_TIMEOUT};

/// Settings for both binaries. Built as defaults, then the TOML file, then
/// `HWLAB_*` environment overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabConfig {
    pub report_host: String,
    pub report_port: u16,
    pub report_timeout: Duration,
    pub listen_bind: IpAddr,
    pub listen_port: u16,
    pub winio_dir: PathBuf,
    /// File the settings were read from, if any.
    pub source: Option<PathBuf>,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            report_host: DEFAULT_REPORT_HOST.to_string(),
            report_port: DEFAULT_REPORT_PORT,
            report_timeout: DEFAULT_REPORT_TIMEOUT,
            listen_bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            listen_port: DEFAULT_REPORT_PORT,
            winio_dir: PathBuf::from(DEFAULT_WINIO_DIR),
            source: None,
        }
    }
}

impl LabConfig {
    pub fn listener_config(&self) -> ListenerConfig {
        ListenerConfig {
            bind_addr: self.listen_bind,
            port: self.listen_port,
        }
    }

    pub fn report_sender(&self) -> ReportSender {
        ReportSender::new(self.report_timeout)
    }
}
