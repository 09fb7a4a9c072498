//! Single-session report listener.
//!
//! One tokio task owns the listening socket, the current session and the
//! catalog. Control requests reach it over a command queue and results leave
//! through `watch` channels, so nothing outside the task ever holds a
//! reference into its state.

use std::future;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use pci_probe::DeviceRecord;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::catalog::DeviceCatalog;
use crate::errors::ListenerError;
use crate::framing::{FrameAssembler, FrameOutcome};
use crate::vendor::VendorResolver;

pub const DEFAULT_REPORT_PORT: u16 = 12345;

const COMMAND_QUEUE_DEPTH: usize = 16;
const READ_CHUNK: usize = 4096;
/// Pause after a failed accept so a persistent error (EMFILE) cannot spin the task.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_REPORT_PORT,
        }
    }
}

impl ListenerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Stopped,
    Listening,
    ClientConnected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerStatus {
    pub state: ListenerState,
    pub message: String,
    pub local_addr: Option<SocketAddr>,
    pub client: Option<SocketAddr>,
}

impl ListenerStatus {
    fn stopped() -> Self {
        Self {
            state: ListenerState::Stopped,
            message: "server stopped".to_string(),
            local_addr: None,
            client: None,
        }
    }

    fn listening(local_addr: SocketAddr) -> Self {
        Self {
            state: ListenerState::Listening,
            message: format!("listening on port {}", local_addr.port()),
            local_addr: Some(local_addr),
            client: None,
        }
    }

    fn waiting(local_addr: Option<SocketAddr>) -> Self {
        Self {
            state: ListenerState::Listening,
            message: "waiting for connection...".to_string(),
            local_addr,
            client: None,
        }
    }

    fn connected(local_addr: Option<SocketAddr>, peer: SocketAddr) -> Self {
        Self {
            state: ListenerState::ClientConnected,
            message: format!("client connected: {}", peer.ip()),
            local_addr,
            client: Some(peer),
        }
    }

    pub fn client_ip(&self) -> Option<IpAddr> {
        self.client.map(|peer| peer.ip())
    }
}

enum Command {
    Start(oneshot::Sender<Result<SocketAddr, ListenerError>>),
    Stop(oneshot::Sender<()>),
    ClearDevices(oneshot::Sender<()>),
}

/// Cloneable front end for a running [`ReportListener`].
#[derive(Debug, Clone)]
pub struct ListenerHandle {
    commands: mpsc::Sender<Command>,
    status: watch::Receiver<ListenerStatus>,
    catalog: watch::Receiver<DeviceCatalog>,
}

impl ListenerHandle {
    /// Bind and begin accepting. Returns the bound address.
    pub async fn start(&self) -> Result<SocketAddr, ListenerError> {
        self.request(Command::Start).await?
    }

    pub async fn stop(&self) -> Result<(), ListenerError> {
        self.request(Command::Stop).await
    }

    pub async fn clear_devices(&self) -> Result<(), ListenerError> {
        self.request(Command::ClearDevices).await
    }

    pub fn status(&self) -> ListenerStatus {
        self.status.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.status.borrow().state != ListenerState::Stopped
    }

    pub fn catalog(&self) -> DeviceCatalog {
        self.catalog.borrow().snapshot()
    }

    pub fn device_count(&self) -> usize {
        self.catalog.borrow().device_count()
    }

    pub fn vendor_name(&self, vendor_id: &str) -> &'static str {
        VendorResolver::global().name(vendor_id)
    }

    /// Receiver that is marked changed on every catalog replacement or clear.
    pub fn subscribe_catalog(&self) -> watch::Receiver<DeviceCatalog> {
        self.catalog.clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<ListenerStatus> {
        self.status.clone()
    }

    pub fn local_ip(&self) -> Ipv4Addr {
        crate::net::local_ip()
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, ListenerError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(make(reply_tx))
            .await
            .map_err(|_| ListenerError::ReactorGone)?;
        reply_rx.await.map_err(|_| ListenerError::ReactorGone)
    }
}

struct Session {
    peer: SocketAddr,
    stream: TcpStream,
    frames: FrameAssembler,
}

pub struct ReportListener {
    config: ListenerConfig,
    commands: mpsc::Receiver<Command>,
    listener: Option<TcpListener>,
    local_addr: Option<SocketAddr>,
    session: Option<Session>,
    catalog: DeviceCatalog,
    status_tx: watch::Sender<ListenerStatus>,
    catalog_tx: watch::Sender<DeviceCatalog>,
}

impl ReportListener {
    pub fn new(config: ListenerConfig) -> (Self, ListenerHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let (status_tx, status_rx) = watch::channel(ListenerStatus::stopped());
        let (catalog_tx, catalog_rx) = watch::channel(DeviceCatalog::new());

        let listener = Self {
            config,
            commands: command_rx,
            listener: None,
            local_addr: None,
            session: None,
            catalog: DeviceCatalog::new(),
            status_tx,
            catalog_tx,
        };
        let handle = ListenerHandle {
            commands: command_tx,
            status: status_rx,
            catalog: catalog_rx,
        };
        (listener, handle)
    }

    /// Create the listener and run it on the current tokio runtime.
    pub fn spawn(config: ListenerConfig) -> (ListenerHandle, JoinHandle<()>) {
        let (listener, handle) = Self::new(config);
        let task = tokio::spawn(listener.run());
        (handle, task)
    }

    /// Serve until every handle has been dropped.
    pub async fn run(mut self) {
        let mut buf = vec![0u8; READ_CHUNK];
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                accepted = accept_next(self.listener.as_ref()) => self.on_accept(accepted).await,
                read = read_next(self.session.as_mut(), &mut buf) => match read {
                    Ok(0) => self.on_disconnect(None),
                    Ok(n) => self.on_data(&buf[..n]),
                    Err(err) => self.on_disconnect(Some(err)),
                },
            }
        }

        self.shutdown();
        debug!("report listener task exiting");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start(reply) => {
                let result = self.start().await;
                let _ = reply.send(result);
            }
            Command::Stop(reply) => {
                self.shutdown();
                let _ = reply.send(());
            }
            Command::ClearDevices(reply) => {
                self.catalog.clear();
                self.publish_catalog();
                let _ = reply.send(());
            }
        }
    }

    async fn start(&mut self) -> Result<SocketAddr, ListenerError> {
        if self.listener.is_some() {
            return Err(ListenerError::AlreadyListening);
        }

        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(addr).await.map_err(|source| {
            warn!(%addr, error = %source, "failed to start report listener");
            ListenerError::Bind { addr, source }
        })?;
        let local_addr = listener.local_addr().unwrap_or(addr);

        self.listener = Some(listener);
        self.local_addr = Some(local_addr);
        self.set_status(ListenerStatus::listening(local_addr));
        info!(%local_addr, "report listener started");
        Ok(local_addr)
    }

    fn shutdown(&mut self) {
        self.session = None;
        self.listener = None;
        self.local_addr = None;
        self.catalog.clear();
        self.publish_catalog();
        self.set_status(ListenerStatus::stopped());
    }

    async fn on_accept(&mut self, accepted: io::Result<(TcpStream, SocketAddr)>) {
        let (stream, peer) = match accepted {
            Ok(accepted) => accepted,
            Err(err) => {
                warn!(error = %err, backoff_ms = ACCEPT_BACKOFF.as_millis() as u64, "accept failed");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                return;
            }
        };

        if let Some(previous) = self.session.take() {
            info!(previous = %previous.peer, new = %peer, "dropping previous client for new connection");
        }
        self.session = Some(Session {
            peer,
            stream,
            frames: FrameAssembler::new(),
        });
        info!(%peer, "client connected");
        self.set_status(ListenerStatus::connected(self.local_addr, peer));
    }

    fn on_data(&mut self, chunk: &[u8]) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let peer = session.peer;
        match session.frames.push(chunk) {
            FrameOutcome::Incomplete => {}
            FrameOutcome::Decoded(records) => self.ingest(peer, records),
            FrameOutcome::Discarded(err) => {
                debug!(%peer, error = %err, "discarding undecodable report");
            }
        }
    }

    fn ingest(&mut self, peer: SocketAddr, records: Vec<DeviceRecord>) {
        info!(%peer, devices = records.len(), "device list updated");
        self.catalog.replace(records);
        self.publish_catalog();
    }

    fn on_disconnect(&mut self, error: Option<io::Error>) {
        let Some(session) = self.session.take() else {
            return;
        };
        match error {
            Some(err) => warn!(peer = %session.peer, error = %err, "client read failed"),
            None => info!(peer = %session.peer, "client disconnected"),
        }
        self.set_status(ListenerStatus::waiting(self.local_addr));
    }

    fn set_status(&self, status: ListenerStatus) {
        self.status_tx.send_replace(status);
    }

    fn publish_catalog(&self) {
        self.catalog_tx.send_replace(self.catalog.snapshot());
    }
}

async fn accept_next(listener: Option<&TcpListener>) -> io::Result<(TcpStream, SocketAddr)> {
    match listener {
        Some(listener) => listener.accept().await,
        None => future::pending().await,
    }
}

async fn read_next(session: Option<&mut Session>, buf: &mut [u8]) -> io::Result<usize> {
    match session {
        Some(session) => session.stream.read(buf).await,
        None => future::pending().await,
    }
}

#[cfg(test)]
mod tests;
