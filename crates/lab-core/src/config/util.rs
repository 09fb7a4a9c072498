use std::time::Duration;

pub(super) fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub(super) fn env_non_empty(name: &str) -> Option<String> {
    non_empty(std::env::var(name).ok())
}

pub(super) fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env_non_empty(name).and_then(|v| v.parse::<T>().ok())
}

/// Zero would make every connect fail immediately.
pub(super) fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
