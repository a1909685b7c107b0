//! WebSocket client for the bingo push channel
//!
//! Runs on a dedicated thread, forwards server messages as `PushEvent`s and
//! reopens the connection after every close following `ReconnectPolicy`.

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{connect, Message, WebSocket};

use crate::core::io_traits::{ConnectionStatus, PushChannel, PushEvent};
use crate::core::protocol::PushMessage;
use crate::core::reconnect::{CloseKind, ReconnectPolicy};

/// Status code reported when a close frame carries none
const NO_STATUS_CODE: u16 = 1005;

// =============================================================================
// TYPES
// =============================================================================

/// Outgoing messages (main thread -> WS thread)
#[derive(Debug)]
pub enum OutgoingMessage {
    Shutdown,
}

/// Derive the push URL from the HTTP base URL (`http` -> `ws`, `https` -> `wss`)
pub fn push_url(base: &str, push_path: &str) -> String {
    let base = base.trim_end_matches('/');
    let ws_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        base.to_string()
    };
    if push_path.starts_with('/') {
        format!("{}{}", ws_base, push_path)
    } else {
        format!("{}/{}", ws_base, push_path)
    }
}

/// Decode a text frame. Malformed frames are logged and skipped.
pub fn decode_frame(text: &str) -> Option<PushMessage> {
    match serde_json::from_str::<PushMessage>(text) {
        Ok(msg) => Some(msg),
        Err(e) => {
            warn!(error = %e, frame = %text, "[WS] Ignoring malformed message");
            None
        }
    }
}

// =============================================================================
// WEBSOCKET CLIENT
// =============================================================================

/// Thread-backed push channel client
pub struct PushClient {
    url: String,
    policy: ReconnectPolicy,
    tx: Option<Sender<OutgoingMessage>>,
    rx: Option<Receiver<PushEvent>>,
    thread_handle: Option<JoinHandle<()>>,
    shutdown_flag: Arc<AtomicBool>,
    current_status: ConnectionStatus,
}

impl PushClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_policy(url, ReconnectPolicy::default())
    }

    pub fn with_policy(url: impl Into<String>, policy: ReconnectPolicy) -> Self {
        Self {
            url: url.into(),
            policy,
            tx: None,
            rx: None,
            thread_handle: None,
            shutdown_flag: Arc::new(AtomicBool::new(false)),
            current_status: ConnectionStatus::Disconnected,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn disconnect(&mut self) {
        self.shutdown_flag.store(true, Ordering::SeqCst);
        if let Some(tx) = &self.tx {
            let _ = tx.send(OutgoingMessage::Shutdown);
        }
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
        self.tx = None;
        self.rx = None;
        self.current_status = ConnectionStatus::Disconnected;
    }

    pub fn is_connected(&self) -> bool {
        self.current_status == ConnectionStatus::Connected
    }
}

impl PushChannel for PushClient {
    fn connect(&mut self) {
        if self.thread_handle.is_some() {
            warn!("[WS] Already running");
            return;
        }

        let (outgoing_tx, outgoing_rx) = bounded::<OutgoingMessage>(16);
        let (incoming_tx, incoming_rx) = bounded::<PushEvent>(256);

        self.tx = Some(outgoing_tx);
        self.rx = Some(incoming_rx);
        self.shutdown_flag.store(false, Ordering::SeqCst);

        let shutdown_flag = Arc::clone(&self.shutdown_flag);
        let url = self.url.clone();
        let policy = self.policy;

        let handle = thread::spawn(move || {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                websocket_thread(&url, policy, outgoing_rx, incoming_tx.clone(), shutdown_flag);
            }));

            if let Err(panic_info) = result {
                let msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    format!("WS thread panic: {}", s)
                } else {
                    "WS thread panic".to_string()
                };
                error!("{}", msg);
                let _ = incoming_tx.send(PushEvent::Error(msg));
                let _ = incoming_tx.send(PushEvent::StatusChanged(ConnectionStatus::Disconnected));
            }
        });

        self.thread_handle = Some(handle);
        self.current_status = ConnectionStatus::Connecting;
    }

    fn poll_event(&mut self) -> Option<PushEvent> {
        let rx = self.rx.as_ref()?;
        match rx.try_recv() {
            Ok(event) => {
                if let PushEvent::StatusChanged(status) = &event {
                    self.current_status = *status;
                }
                Some(event)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.current_status = ConnectionStatus::Disconnected;
                None
            }
        }
    }

    fn status(&self) -> ConnectionStatus {
        self.current_status
    }
}

impl Drop for PushClient {
    fn drop(&mut self) {
        self.disconnect();
    }
}

// =============================================================================
// WEBSOCKET THREAD
// =============================================================================

fn websocket_thread(
    url: &str,
    policy: ReconnectPolicy,
    outgoing_rx: Receiver<OutgoingMessage>,
    incoming_tx: Sender<PushEvent>,
    shutdown_flag: Arc<AtomicBool>,
) {
    loop {
        if shutdown_flag.load(Ordering::SeqCst) {
            break;
        }

        info!(url = %url, "[WS] Connecting...");
        let _ = incoming_tx.send(PushEvent::StatusChanged(ConnectionStatus::Connecting));

        let close = match connect(url) {
            Ok((mut socket, _)) => {
                info!("[WS] Connected");
                let _ = incoming_tx.send(PushEvent::StatusChanged(ConnectionStatus::Connected));

                match message_loop(&mut socket, &outgoing_rx, &incoming_tx, &shutdown_flag) {
                    Ok(()) => {
                        let _ = socket.close(None);
                        break;
                    }
                    Err(close) => close,
                }
            }
            Err(e) => {
                error!(error = %e, "[WS] Connection failed");
                CloseKind::ConnectFailed(e.to_string())
            }
        };

        if shutdown_flag.load(Ordering::SeqCst) {
            break;
        }

        let schedule = policy.schedule(Instant::now(), &close);
        info!(
            reason = %close,
            delay_ms = policy.delay().as_millis() as u64,
            "[WS] Closed, reconnecting"
        );
        let _ = incoming_tx.send(PushEvent::Closed(close));
        let _ = incoming_tx.send(PushEvent::StatusChanged(ConnectionStatus::Reconnecting));

        // Wait for the scheduled attempt, staying responsive to shutdown
        while !schedule.is_due(Instant::now()) {
            if shutdown_flag.load(Ordering::SeqCst) {
                break;
            }
            match outgoing_rx.try_recv() {
                Ok(OutgoingMessage::Shutdown) | Err(TryRecvError::Disconnected) => {
                    shutdown_flag.store(true, Ordering::SeqCst);
                    break;
                }
                Err(TryRecvError::Empty) => {}
            }
            thread::sleep(schedule.remaining(Instant::now()).min(Duration::from_millis(50)));
        }
    }

    let _ = incoming_tx.send(PushEvent::StatusChanged(ConnectionStatus::Disconnected));
}

/// Pump the socket until shutdown (`Ok`) or the connection goes away (`Err`)
fn message_loop(
    socket: &mut WebSocket<MaybeTlsStream<TcpStream>>,
    outgoing_rx: &Receiver<OutgoingMessage>,
    incoming_tx: &Sender<PushEvent>,
    shutdown_flag: &Arc<AtomicBool>,
) -> Result<(), CloseKind> {
    // Set non-blocking
    match socket.get_ref() {
        MaybeTlsStream::Plain(tcp) => {
            let _ = tcp.set_nonblocking(true);
        }
        MaybeTlsStream::NativeTls(tls) => {
            let _ = tls.get_ref().set_nonblocking(true);
        }
        _ => {}
    }

    loop {
        if shutdown_flag.load(Ordering::SeqCst) {
            return Ok(());
        }

        match outgoing_rx.try_recv() {
            Ok(OutgoingMessage::Shutdown) => return Ok(()),
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => return Ok(()),
        }

        match socket.read() {
            Ok(Message::Text(text)) => {
                if let Some(msg) = decode_frame(&text) {
                    debug!(?msg, "[WS] Received");
                    let _ = incoming_tx.send(PushEvent::Message(msg));
                }
            }
            Ok(Message::Close(frame)) => {
                // Let tungstenite send the close reply
                let _ = socket.flush();
                let (code, reason) = match frame {
                    Some(frame) => (u16::from(frame.code), frame.reason.into_owned()),
                    None => (NO_STATUS_CODE, String::new()),
                };
                return Err(CloseKind::Clean { code, reason });
            }
            Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {}
            Err(tungstenite::Error::ConnectionClosed) => {
                return Err(CloseKind::Clean {
                    code: NO_STATUS_CODE,
                    reason: String::new(),
                });
            }
            Err(e) => return Err(CloseKind::Lost(e.to_string())),
            _ => {}
        }

        thread::sleep(Duration::from_millis(10));
    }
}

// =============================================================================
// TESTS
// =============================================================================
