use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::paths::resolve_config_path;
use super::types::LabConfig;
use super::util::{non_empty, timeout_from_secs};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct FileConfig {
    #[serde(default)]
    report: Option<FileReportConfig>,
    #[serde(default)]
    listener: Option<FileListenerConfig>,
    #[serde(default)]
    winio: Option<FileWinIoConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileReportConfig {
    host: Option<String>,
    port: Option<u16>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileListenerConfig {
    bind: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileWinIoConfig {
    dir: Option<String>,
}

impl LabConfig {
    pub(super) fn apply_file_config(&mut self) -> Result<bool> {
        let Some(path) = resolve_config_path()? else {
            return Ok(false);
        };

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed reading config file {}", path.display()))?;
        let file_cfg: FileConfig = toml::from_str(&raw)
            .with_context(|| format!("failed parsing TOML config {}", path.display()))?;

        self.apply_file_report(file_cfg.report);
        self.apply_file_listener(file_cfg.listener)
            .with_context(|| format!("invalid [listener] section in {}", path.display()))?;
        self.apply_file_winio(file_cfg.winio);
        self.source = Some(path);

        Ok(true)
    }

    fn apply_file_report(&mut self, report: Option<FileReportConfig>) {
        let Some(report) = report else {
            return;
        };

        if let Some(v) = non_empty(report.host) {
            self.report_host = v;
        }
        if let Some(v) = report.port {
            self.report_port = v;
        }
        if let Some(v) = report.timeout_secs.and_then(timeout_from_secs) {
            self.report_timeout = v;
        }
    }

    fn apply_file_listener(&mut self, listener: Option<FileListenerConfig>) -> Result<()> {
        let Some(listener) = listener else {
            return Ok(());
        };

        if let Some(v) = non_empty(listener.bind) {
            self.listen_bind = v
                .parse::<IpAddr>()
                .with_context(|| format!("bind is not an IP address: {v}"))?;
        }
        if let Some(v) = listener.port {
            self.listen_port = v;
        }
        Ok(())
    }

    fn apply_file_winio(&mut self, winio: Option<FileWinIoConfig>) {
        if let Some(v) = winio.and_then(|w| non_empty(w.dir)) {
            self.winio_dir = PathBuf::from(v);
        }
    }
}
