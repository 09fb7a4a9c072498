use std::net::IpAddr;
use std::path::PathBuf;

use super::types::LabConfig;
use super::util::{env_non_empty, env_parse, timeout_from_secs};

impl LabConfig {
    /// Unparseable values are ignored and the earlier layer wins.
    pub(super) fn apply_env_overrides(&mut self) {
        if let Some(v) = env_non_empty("HWLAB_REPORT_HOST") {
            self.report_host = v;
        }
        if let Some(v) = env_parse::<u16>("HWLAB_REPORT_PORT") {
            self.report_port = v;
        }
        if let Some(v) = env_parse::<u64>("HWLAB_REPORT_TIMEOUT_SECS").and_then(timeout_from_secs) {
            self.report_timeout = v;
        }
        if let Some(v) = env_parse::<IpAddr>("HWLAB_LISTEN_BIND") {
            self.listen_bind = v;
        }
        if let Some(v) = env_parse::<u16>("HWLAB_LISTEN_PORT") {
            self.listen_port = v;
        }
        if let Some(v) = env_non_empty("HWLAB_WINIO_DIR") {
            self.winio_dir = PathBuf::from(v);
        }
    }
}
