use std::fmt;
use std::net::SocketAddr;

/// Client-side delivery failures. Every variant ends the attempt; nothing is retried.
#[derive(Debug)]
pub enum TransportError {
    InvalidAddress(String),
    EmptyPayload,
    Connect {
        peer: SocketAddr,
        source: std::io::Error,
    },
    Configure(std::io::Error),
    Write {
        sent: usize,
        total: usize,
        source: std::io::Error,
    },
    PeerClosed {
        sent: usize,
        total: usize,
    },
}

impl TransportError {
    /// Bytes that reached the socket before the failure.
    pub fn bytes_sent(&self) -> usize {
        match self {
            Self::Write { sent, .. } | Self::PeerClosed { sent, .. } => *sent,
            _ => 0,
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAddress(host) => write!(f, "invalid IPv4 address: {host}"),
            Self::EmptyPayload => write!(f, "nothing to send (empty payload)"),
            Self::Connect { peer, source } => write!(f, "connection to {peer} failed: {source}"),
            Self::Configure(err) => write!(f, "socket configuration failed: {err}"),
            Self::Write {
                sent,
                total,
                source,
            } => write!(f, "send failed after {sent} of {total} bytes: {source}"),
            Self::PeerClosed { sent, total } => {
                write!(f, "send returned 0 after {sent} of {total} bytes (peer closed?)")
            }
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Connect { source, .. } | Self::Write { source, .. } => Some(source),
            Self::Configure(err) => Some(err),
            _ => None,
        }
    }
}

/// Why an inbound payload could not become a device list.
#[derive(Debug)]
pub enum DecodeError {
    Json(serde_json::Error),
    InvalidRecord { index: usize, reason: String },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "payload is not a device array: {err}"),
            Self::InvalidRecord { index, reason } => {
                write!(f, "device entry {index} is invalid: {reason}")
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::InvalidRecord { .. } => None,
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug)]
pub enum ListenerError {
    AlreadyListening,
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    /// The reactor task has exited and can no longer take commands.
    ReactorGone,
}

impl fmt::Display for ListenerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyListening => write!(f, "server is already running"),
            Self::Bind { addr, source } => write!(f, "failed to listen on {addr}: {source}"),
            Self::ReactorGone => write!(f, "listener task is not running"),
        }
    }
}

impl std::error::Error for ListenerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bind { source, .. } => Some(source),
            _ => None,
        }
    }
}
