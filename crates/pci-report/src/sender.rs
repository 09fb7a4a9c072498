//! Blocking one-shot delivery of an encoded report.

use std::io::{ErrorKind, Write};
use std::net::{Ipv4Addr, Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use tracing::{info, warn};

use crate::errors::TransportError;

pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendReport {
    pub peer: SocketAddr,
    pub bytes_sent: usize,
}

/// Opens a fresh connection per report, writes it, and closes the connection.
#[derive(Debug, Clone)]
pub struct ReportSender {
    timeout: Duration,
}

impl Default for ReportSender {
    fn default() -> Self {
        Self::new(DEFAULT_SEND_TIMEOUT)
    }
}

impl ReportSender {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn send(&self, host: &str, port: u16, payload: &[u8]) -> Result<SendReport, TransportError> {
        let ip: Ipv4Addr = host
            .trim()
            .parse()
            .map_err(|_| TransportError::InvalidAddress(host.to_string()))?;
        let peer = SocketAddr::from((ip, port));
        if payload.is_empty() {
            return Err(TransportError::EmptyPayload);
        }

        info!(%peer, "connecting");
        let mut stream = TcpStream::connect_timeout(&peer, self.timeout)
            .map_err(|source| TransportError::Connect { peer, source })?;

        let result = self
            .configure(&stream)
            .and_then(|()| write_fully(&mut stream, payload));
        // Closed on every path; a failed shutdown changes nothing for the caller.
        let _ = stream.shutdown(Shutdown::Both);

        match result {
            Ok(bytes_sent) => {
                info!(%peer, bytes = bytes_sent, "report sent");
                Ok(SendReport { peer, bytes_sent })
            }
            Err(err) => {
                warn!(%peer, sent = err.bytes_sent(), total = payload.len(), error = %err, "report send failed");
                Err(err)
            }
        }
    }

    fn configure(&self, stream: &TcpStream) -> Result<(), TransportError> {
        stream
            .set_write_timeout(Some(self.timeout))
            .and_then(|()| stream.set_read_timeout(Some(self.timeout)))
            .map_err(TransportError::Configure)
    }
}

/// Write until everything is out, a write returns zero, or a write fails.
pub(crate) fn write_fully<W: Write>(writer: &mut W, payload: &[u8]) -> Result<usize, TransportError> {
    let total = payload.len();
    let mut sent = 0;
    while sent < total {
        match writer.write(&payload[sent..]) {
            Ok(0) => return Err(TransportError::PeerClosed { sent, total }),
            Ok(n) => sent += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(source) => return Err(TransportError::Write { sent, total, source }),
        }
    }
    writer.flush().map_err(|source| TransportError::Write { sent, total, source })?;
    Ok(sent)
}
