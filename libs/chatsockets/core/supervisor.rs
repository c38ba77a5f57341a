//! Connection supervision: transport lifecycle, state tracking, and
//! bounded reconnection
//!
//! The supervisor owns the transport handle and is the single writer of the
//! connection phase and session snapshot. Inbound frames are parsed and
//! forwarded verbatim to the [`EventRouter`]; the only event the supervisor
//! synthesizes itself is `connection_change`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::{http, Message as WsMessage};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use crate::core::config::ClientConfig;
use crate::core::connection_state::{AtomicConnectionPhase, AtomicMetrics, ConnectionPhase};
use crate::core::router::EventRouter;
use crate::protocol::events::{ClientFrame, ServerEvent};
use crate::protocol::types::ConnectionState;
use crate::traits::{ChatSocketError, Result};

/// Internal command messages for supervisor control
#[derive(Debug)]
enum SupervisorCommand {
    /// Submit a frame to the transport
    Send(ClientFrame),
    /// Tear down the transport and exit
    Shutdown,
}

/// Counter snapshot plus the current connection state
#[derive(Debug, Clone)]
pub struct Metrics {
    pub frames_sent: u64,
    pub frames_received: u64,
    pub reconnect_count: u64,
    pub connection_state: ConnectionState,
}

/// Per-connection handle: one is created by each `connect()` generation
struct ActiveLink {
    command_tx: mpsc::UnboundedSender<SupervisorCommand>,
    shutdown_flag: Arc<AtomicBool>,
    task: tokio::task::JoinHandle<()>,
}

/// Everything the supervisor task needs, cloned out of the supervisor so
/// the task owns its context
struct SupervisorContext {
    config: Arc<ClientConfig>,
    phase: Arc<AtomicConnectionPhase>,
    session: Arc<RwLock<ConnectionState>>,
    metrics: Arc<AtomicMetrics>,
    router: EventRouter,
    pending_connect: Arc<Mutex<Option<oneshot::Sender<ConnectionState>>>>,
    shutdown_flag: Arc<AtomicBool>,
}

/// Supervises the persistent transport to the chat backend
///
/// - `connect()` races the server acknowledgment against a guard timer and
///   always resolves, never errs
/// - transport-level errors are retried per the configured
///   [`crate::traits::ReconnectionStrategy`]; once the ceiling is reached the
///   state settles at disconnected until an explicit new `connect()`
/// - `disconnect()` is idempotent and cancels any in-flight `connect()`
pub struct ConnectionSupervisor {
    config: Arc<ClientConfig>,
    phase: Arc<AtomicConnectionPhase>,
    session: Arc<RwLock<ConnectionState>>,
    metrics: Arc<AtomicMetrics>,
    router: EventRouter,
    link: Mutex<Option<ActiveLink>>,
    pending_connect: Arc<Mutex<Option<oneshot::Sender<ConnectionState>>>>,
}

impl ConnectionSupervisor {
    pub(crate) fn new(config: ClientConfig, router: EventRouter) -> Self {
        Self {
            config: Arc::new(config),
            phase: Arc::new(AtomicConnectionPhase::new(ConnectionPhase::Disconnected)),
            session: Arc::new(RwLock::new(ConnectionState::disconnected())),
            metrics: Arc::new(AtomicMetrics::new()),
            router,
            link: Mutex::new(None),
            pending_connect: Arc::new(Mutex::new(None)),
        }
    }

    /// Establish the transport and wait for the server acknowledgment
    ///
    /// Always resolves within the guard duration: either with the
    /// acknowledged session snapshot, or with `connected: false` when the
    /// guard fires first or the reconnection ceiling is exhausted. Callers
    /// are never left with a pending future and never see an error.
    pub async fn connect(&self) -> ConnectionState {
        let spawn = match self
            .phase
            .compare_exchange(ConnectionPhase::Disconnected, ConnectionPhase::Connecting)
        {
            Ok(_) => true,
            Err(ConnectionPhase::Connected) => return self.connection_state(),
            Err(ConnectionPhase::ShuttingDown) => return ConnectionState::disconnected(),
            Err(_) => {
                // An attempt is already in flight; wait on its resolution
                // instead of opening a second transport.
                debug!("connect() called while an attempt is in flight");
                false
            }
        };

        let (ack_tx, ack_rx) = oneshot::channel();
        *self.pending_connect.lock() = Some(ack_tx);

        if spawn {
            self.spawn_supervisor_task();
        }

        tokio::select! {
            resolution = ack_rx => resolution.unwrap_or_else(|_| ConnectionState::disconnected()),
            _ = tokio::time::sleep(self.config.connect_timeout) => {
                debug!("connect guard elapsed before server acknowledgment");
                ConnectionState::disconnected()
            }
        }
    }

    /// Tear down the transport; idempotent
    ///
    /// Any in-flight `connect()` is resolved with `connected: false`
    /// immediately rather than being left to its guard timer.
    pub async fn disconnect(&self) {
        if let Some(ack_tx) = self.pending_connect.lock().take() {
            let _ = ack_tx.send(ConnectionState::disconnected());
        }

        let link = self.link.lock().take();
        let Some(link) = link else {
            self.phase.set(ConnectionPhase::Disconnected);
            return;
        };

        info!("disconnecting chat transport");
        self.phase.set(ConnectionPhase::ShuttingDown);
        link.shutdown_flag.store(false, Ordering::Release);
        let _ = link.command_tx.send(SupervisorCommand::Shutdown);
        let _ = link.task.await;

        self.phase.set(ConnectionPhase::Disconnected);
        *self.session.write() = ConnectionState::disconnected();
        debug!("chat transport torn down");
    }

    /// Check if connected (server-acknowledged)
    #[inline]
    pub fn is_connected(&self) -> bool {
        self.phase.is_connected()
    }

    /// Current connection state snapshot; pure read
    pub fn connection_state(&self) -> ConnectionState {
        self.session.read().clone()
    }

    /// Submit a frame to the transport
    ///
    /// Fails with [`ChatSocketError::NotConnected`] unless the session is
    /// established; callers in the controllers translate that into their
    /// logged no-op contract.
    pub(crate) fn send_frame(&self, frame: ClientFrame) -> Result<()> {
        if !self.phase.is_connected() {
            return Err(ChatSocketError::NotConnected);
        }

        let guard = self.link.lock();
        let link = guard.as_ref().ok_or(ChatSocketError::NotConnected)?;
        link.command_tx
            .send(SupervisorCommand::Send(frame))
            .map_err(|e| ChatSocketError::ChannelSend(e.to_string()))
    }

    /// Get current metrics
    pub fn metrics(&self) -> Metrics {
        Metrics {
            frames_sent: self.metrics.frames_sent(),
            frames_received: self.metrics.frames_received(),
            reconnect_count: self.metrics.reconnect_count(),
            connection_state: self.connection_state(),
        }
    }

    fn spawn_supervisor_task(&self) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let shutdown_flag = Arc::new(AtomicBool::new(true));

        let ctx = SupervisorContext {
            config: Arc::clone(&self.config),
            phase: Arc::clone(&self.phase),
            session: Arc::clone(&self.session),
            metrics: Arc::clone(&self.metrics),
            router: self.router.clone(),
            pending_connect: Arc::clone(&self.pending_connect),
            shutdown_flag: Arc::clone(&shutdown_flag),
        };

        let task = tokio::spawn(async move {
            run_supervisor(ctx, command_rx).await;
        });

        // A previous generation can only be present here after it exhausted
        // its retries and exited; replacing the handle is safe.
        *self.link.lock() = Some(ActiveLink {
            command_tx,
            shutdown_flag,
            task,
        });
    }
}

/// Main supervisor task loop: connect, run the session, retry per strategy
async fn run_supervisor(
    ctx: SupervisorContext,
    mut command_rx: mpsc::UnboundedReceiver<SupervisorCommand>,
) {
    let mut attempt: usize = 0;

    loop {
        if !ctx.shutdown_flag.load(Ordering::Acquire) || ctx.phase.is_shutting_down() {
            break;
        }

        ctx.phase.set(if attempt == 0 {
            ConnectionPhase::Connecting
        } else {
            ConnectionPhase::Reconnecting
        });

        match open_transport(&ctx.config).await {
            Ok(ws_stream) => {
                info!(url = %ctx.config.url(), "transport established");

                let result = run_session(ws_stream, &ctx, &mut command_rx, &mut attempt).await;

                let was_connected = ctx.phase.is_connected();
                *ctx.session.write() = ConnectionState::disconnected();

                match result {
                    Ok(()) => break, // shutdown requested
                    Err(e) => {
                        error!("session ended: {}", e);
                        ctx.phase.set(ConnectionPhase::Reconnecting);
                        if was_connected {
                            ctx.router.dispatch(&ServerEvent::ConnectionChange(
                                ConnectionState::disconnected(),
                            ));
                        }
                    }
                }
            }
            Err(e) => {
                error!("failed to connect: {}", e);
            }
        }

        if !ctx.shutdown_flag.load(Ordering::Acquire) || ctx.phase.is_shutting_down() {
            break;
        }

        match ctx.config.reconnect_strategy.next_delay(attempt) {
            Some(delay) => {
                info!("reconnecting in {:?} (attempt {})", delay, attempt + 1);
                if !interruptible_sleep(delay, &ctx.shutdown_flag).await {
                    break;
                }
                attempt += 1;
                ctx.metrics.increment_reconnects();
            }
            None => {
                warn!("reconnection ceiling reached after {} attempts, giving up", attempt);
                ctx.phase.set(ConnectionPhase::Disconnected);
                if let Some(ack_tx) = ctx.pending_connect.lock().take() {
                    let _ = ack_tx.send(ConnectionState::disconnected());
                }
                break;
            }
        }
    }

    debug!("supervisor task exiting");
}

/// Open the WebSocket with the bearer credential attached two ways: an
/// Authorization header and a `token` query parameter. Some intermediaries
/// strip custom headers from upgrade requests; the query parameter survives.
async fn open_transport(
    config: &ClientConfig,
) -> Result<WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>> {
    let token = config
        .credentials
        .bearer_token()
        .await
        .map_err(|e| ChatSocketError::Credential(e.to_string()))?;

    let url = request_url(config.url(), &token);

    let mut request = url
        .as_str()
        .into_client_request()
        .map_err(|e| ChatSocketError::Configuration(e.to_string()))?;

    let header_value = format!("Bearer {}", token)
        .parse::<http::HeaderValue>()
        .map_err(|e| ChatSocketError::Configuration(e.to_string()))?;
    request
        .headers_mut()
        .insert(http::header::AUTHORIZATION, header_value);

    // Bound the handshake so a black-holed endpoint cannot stall the
    // supervisor past the guard duration.
    let (ws_stream, _) = tokio::time::timeout(config.connect_timeout, connect_async(request))
        .await
        .map_err(|_| ChatSocketError::Transport("handshake timed out".into()))?
        .map_err(|e| ChatSocketError::Transport(e.to_string()))?;

    Ok(ws_stream)
}

/// Process one established transport session
///
/// Returns `Ok(())` only when shutdown was requested; every other exit is a
/// transport-level error the caller retries.
async fn run_session(
    ws_stream: WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>,
    ctx: &SupervisorContext,
    command_rx: &mut mpsc::UnboundedReceiver<SupervisorCommand>,
    attempt: &mut usize,
) -> Result<()> {
    let (mut write, mut read) = ws_stream.split();

    let mut heartbeat = ctx.config.heartbeat.map(|interval| {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        ticker
    });
    if let Some(ticker) = heartbeat.as_mut() {
        // Swallow the immediate first tick; pings start one interval in.
        ticker.tick().await;
    }

    loop {
        if !ctx.shutdown_flag.load(Ordering::Acquire) || ctx.phase.is_shutting_down() {
            let _ = write.close().await;
            return Ok(());
        }

        tokio::select! {
            // Inbound frames
            msg = read.next() => {
                match msg {
                    Some(Ok(WsMessage::Text(text))) => {
                        ctx.metrics.increment_received();
                        match serde_json::from_str::<ServerEvent>(&text) {
                            Ok(event) => handle_event(ctx, event, attempt),
                            Err(e) => warn!("discarding unparseable frame: {}", e),
                        }
                    }
                    Some(Ok(WsMessage::Close(_))) => {
                        return Err(ChatSocketError::ConnectionClosed("server closed".into()));
                    }
                    Some(Ok(_)) => {
                        // Binary and control frames carry no chat events
                    }
                    Some(Err(e)) => {
                        return Err(ChatSocketError::Transport(e.to_string()));
                    }
                    None => {
                        return Err(ChatSocketError::ConnectionClosed("stream ended".into()));
                    }
                }
            }

            // Outbound commands. recv() is cancel-safe: a command is only
            // dequeued when this arm wins the select, so losing the race to
            // an inbound frame never drops a queued frame.
            cmd = command_rx.recv() => {
                match cmd {
                    Some(SupervisorCommand::Send(frame)) => {
                        let text = serde_json::to_string(&frame)?;
                        write
                            .send(WsMessage::Text(text))
                            .await
                            .map_err(|e| ChatSocketError::Transport(e.to_string()))?;
                        ctx.metrics.increment_sent();
                    }
                    Some(SupervisorCommand::Shutdown) => {
                        info!("received shutdown command");
                        ctx.phase.set(ConnectionPhase::ShuttingDown);
                        let _ = write.close().await;
                        return Ok(());
                    }
                    None => {
                        // Sender side gone; the link was dropped
                        let _ = write.close().await;
                        return Ok(());
                    }
                }
            }

            // Application-level heartbeat, when configured
            _ = heartbeat_tick(&mut heartbeat) => {
                let text = serde_json::to_string(&ClientFrame::Ping)?;
                write
                    .send(WsMessage::Text(text))
                    .await
                    .map_err(|e| ChatSocketError::Transport(e.to_string()))?;
                ctx.metrics.increment_sent();
            }
        }
    }
}

/// Bookkeeping for inbound events, then verbatim dispatch
fn handle_event(ctx: &SupervisorContext, event: ServerEvent, attempt: &mut usize) {
    if let ServerEvent::Connected(info) = &event {
        let snapshot = ConnectionState::established(info);
        ctx.phase.set(ConnectionPhase::Connected);
        *ctx.session.write() = snapshot.clone();
        *attempt = 0;
        info!(user_id = %info.user_id, session_id = %info.session_id, "session acknowledged");

        let pending = ctx.pending_connect.lock().take();
        let settled_late = match pending {
            Some(ack_tx) => ack_tx.send(snapshot.clone()).is_err(),
            None => true,
        };
        if settled_late {
            // The caller's connect() already resolved (guard fired, or this
            // is a transport recovery): the only way they learn about the
            // live session is the connection_change topic.
            ctx.router
                .dispatch(&ServerEvent::ConnectionChange(snapshot));
        }
    }

    ctx.router.dispatch(&event);
}

/// Build the connection URL with the token attached as a query parameter
///
/// Authority-only URLs get a `/` path first; an upgrade request line with
/// an empty path is rejected by servers.
fn request_url(base: &str, token: &str) -> String {
    let mut url = base.to_string();
    if let Some((scheme, rest)) = base.split_once("://") {
        let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
        if !rest[authority_end..].starts_with('/') {
            let (authority, tail) = rest.split_at(authority_end);
            url = format!("{}://{}/{}", scheme, authority, tail);
        }
    }

    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}token={}", url, separator, token)
}

async fn heartbeat_tick(heartbeat: &mut Option<tokio::time::Interval>) {
    match heartbeat {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Sleep in small steps so shutdown interrupts the wait; returns false if
/// shutdown was requested during the sleep
async fn interruptible_sleep(duration: Duration, shutdown_flag: &AtomicBool) -> bool {
    let check_interval = Duration::from_millis(50);
    let mut elapsed = Duration::ZERO;

    while elapsed < duration {
        if !shutdown_flag.load(Ordering::Acquire) {
            return false;
        }
        let step = check_interval.min(duration - elapsed);
        tokio::time::sleep(step).await;
        elapsed += step;
    }

    shutdown_flag.load(Ordering::Acquire)
}
