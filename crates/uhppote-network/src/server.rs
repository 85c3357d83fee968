//! Dispatcher and transport loop.
//!
//! # Lifecycle
//!
//! ```text
//!  Idle ──start()──> Listening ──stop()──> Stopping
//! ```
//!
//! `Stopping` is terminal: a stopped server hands its devices back and
//! cannot be restarted. Build a new [`UdpServer`] from them instead.
//!
//! # Tasks
//!
//! ```text
//!            ┌─────────── receive task ───────────┐
//! datagram ──> FrameCodec ──> Request ──> Device 1 ├──> mpsc ──> send task ──> socket
//!            │                           Device 2 │
//!            │                           ...      │
//!            └────────────────────────────────────┘
//! ```
//!
//! The receive task owns the devices and runs every handler synchronously in
//! receipt order. Replies and listener pushes are queued to the send task;
//! snapshots are saved after the reply is queued.

use bytes::BytesMut;
use futures::StreamExt;
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::codec::Encoder;
use tokio_util::udp::UdpFramed;
use tracing::{debug, error, info, warn};
use uhppote_core::constants::{DEFAULT_UDP_PORT, FRAME_SIZE};
use uhppote_emulator::Device;
use uhppote_protocol::{Frame, FrameCodec, Request, Response, validate_all};

/// Configuration for the UDP server.
///
/// # Example
///
/// ```
/// use uhppote_network::ServerConfig;
///
/// let config = ServerConfig {
///     bind_addr: "127.0.0.1:60000".parse().unwrap(),
///     debug: true,
/// };
/// assert_eq!(config.bind_addr.port(), 60000);
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the controller socket to
    pub bind_addr: SocketAddr,

    /// Log a hex dump of every datagram received and sent
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_UDP_PORT)),
            debug: false,
        }
    }
}

/// Where a server is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Created, socket not bound yet
    Idle,

    /// Socket bound and receive loop running
    Listening,

    /// Stop requested; terminal
    Stopping,
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            ServerState::Idle => "idle",
            ServerState::Listening => "listening",
            ServerState::Stopping => "stopping",
        };
        f.write_str(state)
    }
}

/// Errors that can occur while starting or stopping the server.
///
/// Nothing that arrives on the socket is an error at this level: malformed
/// or unaddressed datagrams are dropped inside the receive loop.
#[derive(Debug, Error)]
pub enum UdpServerError {
    /// Failed to bind to address
    #[error("Failed to bind to {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// A message layout failed validation at startup
    #[error("Invalid message layout: {0}")]
    Schema(#[from] uhppote_core::Error),

    /// Requested transition is not allowed from the current state
    #[error("Cannot {action} a server that is {state}")]
    InvalidState {
        action: &'static str,
        state: ServerState,
    },

    /// The receive task panicked or was cancelled
    #[error("Server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Low-level I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

type Outbound = (Frame, SocketAddr);

/// UDP server hosting a set of simulated controllers.
///
/// # Example
///
/// ```no_run
/// use uhppote_core::{MacAddress, SerialNumber};
/// use uhppote_emulator::{Device, Snapshot};
/// use uhppote_network::{ServerConfig, UdpServer};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let device = Device::new(Snapshot::new(
///     SerialNumber::new(405419896),
///     MacAddress::new([0x00, 0x12, 0x23, 0x34, 0x45, 0x56]),
/// ));
///
/// let mut server = UdpServer::new(ServerConfig::default(), vec![device]);
/// let addr = server.start().await?;
/// println!("listening on {addr}");
///
/// let devices = server.stop().await?;
/// assert_eq!(devices.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct UdpServer {
    config: ServerConfig,
    state: ServerState,
    devices: Vec<Device>,
    local_addr: Option<SocketAddr>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<Vec<Device>>>,
}

impl UdpServer {
    pub fn new(config: ServerConfig, devices: Vec<Device>) -> Self {
        Self {
            config,
            state: ServerState::Idle,
            devices,
            local_addr: None,
            shutdown: None,
            task: None,
        }
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    /// Address the socket is bound to, once listening.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Validate the message layouts, bind the socket and start the receive
    /// loop. Returns the bound address, which differs from the configured
    /// one when binding to port 0.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the server is not idle
    /// - a message layout is invalid
    /// - the socket cannot be bound
    ///
    /// The server stays idle on error.
    pub async fn start(&mut self) -> Result<SocketAddr, UdpServerError> {
        if self.state != ServerState::Idle {
            return Err(UdpServerError::InvalidState {
                action: "start",
                state: self.state,
            });
        }

        validate_all()?;

        let socket = UdpSocket::bind(self.config.bind_addr)
            .await
            .map_err(|source| UdpServerError::BindFailed {
                addr: self.config.bind_addr,
                source,
            })?;
        let local_addr = socket.local_addr()?;

        info!(
            addr = %local_addr,
            devices = self.devices.len(),
            debug = self.config.debug,
            "UDP server listening"
        );

        let codec = FrameCodec::new().with_debug(self.config.debug);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let devices = std::mem::take(&mut self.devices);

        self.task = Some(tokio::spawn(run(
            Arc::new(socket),
            codec,
            devices,
            shutdown_rx,
        )));
        self.shutdown = Some(shutdown_tx);
        self.local_addr = Some(local_addr);
        self.state = ServerState::Listening;

        Ok(local_addr)
    }

    /// Stop the receive loop and wait for it to exit.
    ///
    /// A datagram already being dispatched is finished first, including any
    /// snapshot save. Returns the devices with their final state.
    ///
    /// # Errors
    ///
    /// Returns `UdpServerError::InvalidState` unless listening, or
    /// `UdpServerError::Task` if the receive task panicked.
    pub async fn stop(&mut self) -> Result<Vec<Device>, UdpServerError> {
        let (Some(shutdown), Some(task)) = (self.shutdown.take(), self.task.take()) else {
            return Err(UdpServerError::InvalidState {
                action: "stop",
                state: self.state,
            });
        };

        self.state = ServerState::Stopping;
        info!("stopping UDP server");

        // The loop may already have exited on its own.
        let _ = shutdown.send(());
        let devices = task.await?;

        info!("UDP server stopped");
        Ok(devices)
    }
}

impl fmt::Debug for UdpServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UdpServer")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("local_addr", &self.local_addr)
            .finish_non_exhaustive()
    }
}

/// Receive loop. Returns the devices once stopped.
async fn run(
    socket: Arc<UdpSocket>,
    codec: FrameCodec,
    mut devices: Vec<Device>,
    mut shutdown: oneshot::Receiver<()>,
) -> Vec<Device> {
    let (tx, rx) = mpsc::unbounded_channel();
    let sender = tokio::spawn(send_loop(Arc::clone(&socket), codec.clone(), rx));
    let mut inbound = UdpFramed::new(socket, codec);

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => break,

            received = inbound.next() => match received {
                Some(Ok((frame, src))) => dispatch(&mut devices, &frame, src, &tx),
                Some(Err(uhppote_core::Error::Io(e))) => {
                    error!("receive failed: {e}");
                }
                Some(Err(e)) => {
                    debug!("dropped malformed datagram: {e}");
                }
                None => {
                    warn!("socket closed");
                    break;
                }
            },
        }
    }

    // Let queued replies drain before the socket goes away.
    drop(tx);
    if let Err(e) = sender.await {
        error!("send task failed: {e}");
    }

    devices
}

/// Offer one frame to every device.
///
/// A frame is decoded once; each device then applies its own serial number
/// filter, so discovery is answered by all of them.
fn dispatch(
    devices: &mut [Device],
    frame: &Frame,
    src: SocketAddr,
    tx: &mpsc::UnboundedSender<Outbound>,
) {
    let request = match Request::decode(frame) {
        Ok(request) => request,
        Err(e) => {
            debug!(addr = %src, "ignored frame: {e}");
            return;
        }
    };

    let mut answered = 0;
    for device in devices.iter_mut() {
        if let Some(reply) = device.handle(&request, src) {
            queue(tx, &reply, src);
            answered += 1;
        }

        for (push, listener) in device.take_outbox() {
            debug!(serial_number = %device.serial_number(), addr = %listener, "event push");
            queue(tx, &push, listener);
        }

        if let Err(e) = device.persist_if_dirty() {
            warn!(serial_number = %device.serial_number(), "snapshot not saved: {e}");
        }
    }

    if answered == 0 {
        debug!(addr = %src, msg_type = %request.msg_type(), "no device replied");
    }
}

fn queue(tx: &mpsc::UnboundedSender<Outbound>, response: &Response, dest: SocketAddr) {
    match response.encode() {
        Ok(frame) => {
            if tx.send((frame, dest)).is_err() {
                warn!(addr = %dest, "send task gone, reply dropped");
            }
        }
        Err(e) => error!(addr = %dest, "failed to encode {}: {e}", response.msg_type()),
    }
}

/// Send task.
///
/// Each frame goes out with its own `send_to` so a failed send is logged and
/// forgotten instead of being retried ahead of later frames.
async fn send_loop(
    socket: Arc<UdpSocket>,
    mut codec: FrameCodec,
    mut rx: mpsc::UnboundedReceiver<Outbound>,
) {
    let mut buffer = BytesMut::with_capacity(FRAME_SIZE);

    while let Some((frame, dest)) = rx.recv().await {
        buffer.clear();
        if let Err(e) = codec.encode(frame, &mut buffer) {
            error!(addr = %dest, "encode failed: {e}");
            continue;
        }
        if let Err(e) = socket.send_to(&buffer, dest).await {
            error!(addr = %dest, "send failed: {e}");
        }
    }
}
