use std::time::Duration;

pub(super) const DEFAULT_REPORT_HOST: &str = "127.0.0.1";
pub(super) const DEFAULT_REPORT_TIMEOUT: Duration = Duration::from_secs(5);

pub(super) const CONFIG_ENV: &str = "HWLAB_CONFIG";

#[cfg(target_os = "windows")]
pub(super) const CONFIG_CANDIDATES: [&str; 3] = [
    r"C:\ProgramData\hwlab\hwlab.conf",
    r".\conf\hwlab.conf",
    r".\hwlab.conf",
];

#[cfg(not(target_os = "windows"))]
pub(super) const CONFIG_CANDIDATES: [&str; 2] = ["./conf/hwlab.conf", "./hwlab.conf"];
