use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ProbeError {
    /// The port I/O capability could not be brought up; no probe was issued.
    CapabilityUnavailable(String),
    MissingDriverFile(PathBuf),
    MissingEntryPoint(&'static str),
    Io(std::io::Error),
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapabilityUnavailable(msg) => write!(f, "port I/O unavailable: {msg}"),
            Self::MissingDriverFile(path) => {
                write!(f, "port I/O driver file not found: {}", path.display())
            }
            Self::MissingEntryPoint(name) => write!(f, "port I/O entry point missing: {name}"),
            Self::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for ProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ProbeError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

pub type ProbeResult<T> = std::result::Result<T, ProbeError>;
