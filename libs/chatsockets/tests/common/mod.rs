//! Common test utilities for ChatSockets integration tests
//!
//! This module provides a scriptable mock chat backend for testing the
//! supervised client end to end over a real socket.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chatsockets::{ClientFrame, ServerEvent, SessionInfo, UserRole};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, Notify};

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

/// How the mock server responds to a fresh connection
#[derive(Clone)]
pub enum AckBehavior {
    /// Acknowledge the session immediately after the handshake
    Immediate(SessionInfo),
    /// Acknowledge after a delay (for exercising the connect guard)
    Delayed(SessionInfo, Duration),
    /// Accept the transport but never acknowledge the session
    Never,
}

/// A scriptable mock chat backend
///
/// Accepts WebSocket connections, acknowledges sessions per the configured
/// [`AckBehavior`], records every frame clients send, and can push events
/// to or drop all connected clients.
pub struct MockChatServer {
    pub addr: SocketAddr,
    shutdown: Arc<Notify>,
    kick: Arc<Notify>,
    push_tx: broadcast::Sender<String>,
    connections: Arc<AtomicUsize>,
    frames: Arc<Mutex<Vec<ClientFrame>>>,
}

impl MockChatServer {
    /// Create and start a new mock server
    pub async fn start(ack: AckBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let kick = Arc::new(Notify::new());
        let (push_tx, _) = broadcast::channel(1024);
        let connections = Arc::new(AtomicUsize::new(0));
        let frames = Arc::new(Mutex::new(Vec::new()));

        let shutdown_clone = shutdown.clone();
        let kick_clone = kick.clone();
        let push_tx_clone = push_tx.clone();
        let connections_clone = connections.clone();
        let frames_clone = frames.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, _)) => {
                                let ack = ack.clone();
                                let shutdown = shutdown_clone.clone();
                                let kick = kick_clone.clone();
                                let push_rx = push_tx_clone.subscribe();
                                let connections = connections_clone.clone();
                                let frames = frames_clone.clone();
                                tokio::spawn(async move {
                                    Self::handle_connection(
                                        stream, ack, shutdown, kick, push_rx, connections, frames,
                                    )
                                    .await;
                                });
                            }
                            Err(e) => {
                                eprintln!("Accept error: {}", e);
                                break;
                            }
                        }
                    }
                    _ = shutdown_clone.notified() => {
                        break;
                    }
                }
            }
        });

        Self {
            addr,
            shutdown,
            kick,
            push_tx,
            connections,
            frames,
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn handle_connection(
        stream: tokio::net::TcpStream,
        ack: AckBehavior,
        shutdown: Arc<Notify>,
        kick: Arc<Notify>,
        mut push_rx: broadcast::Receiver<String>,
        connections: Arc<AtomicUsize>,
        frames: Arc<Mutex<Vec<ClientFrame>>>,
    ) {
        use futures::{SinkExt, StreamExt};
        use tokio_tungstenite::accept_async;
        use tokio_tungstenite::tungstenite::Message;

        let ws_stream = match accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                eprintln!("WebSocket handshake failed: {}", e);
                return;
            }
        };

        connections.fetch_add(1, Ordering::SeqCst);
        let (mut write, mut read) = ws_stream.split();

        match ack {
            AckBehavior::Immediate(info) => {
                let frame = serde_json::to_string(&ServerEvent::Connected(info)).unwrap();
                if write.send(Message::Text(frame)).await.is_err() {
                    return;
                }
            }
            AckBehavior::Delayed(info, delay) => {
                tokio::time::sleep(delay).await;
                let frame = serde_json::to_string(&ServerEvent::Connected(info)).unwrap();
                if write.send(Message::Text(frame)).await.is_err() {
                    return;
                }
            }
            AckBehavior::Never => {}
        }

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            match serde_json::from_str::<ClientFrame>(&text) {
                                Ok(frame) => frames.lock().unwrap().push(frame),
                                Err(e) => eprintln!("Unparseable client frame: {}", e),
                            }
                        }
                        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                        Some(Ok(_)) => {}
                    }
                }
                pushed = push_rx.recv() => {
                    match pushed {
                        Ok(text) => {
                            if write.send(Message::Text(text)).await.is_err() {
                                break;
                            }
                        }
                        // Skipped pushes are fine; the connection stays up
                        Err(broadcast::error::RecvError::Lagged(_)) => {}
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
                _ = kick.notified() => {
                    break;
                }
                _ = shutdown.notified() => {
                    break;
                }
            }
        }
    }

    /// Get the WebSocket URL for this server
    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Push an event to every connected client
    pub fn push(&self, event: &ServerEvent) {
        let text = serde_json::to_string(event).unwrap();
        let _ = self.push_tx.send(text);
    }

    /// Drop every connected client without a close handshake
    pub fn drop_clients(&self) {
        self.kick.notify_waiters();
    }

    /// Number of handshakes completed so far
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Every frame clients have sent, in arrival order
    pub fn received_frames(&self) -> Vec<ClientFrame> {
        self.frames.lock().unwrap().clone()
    }

    /// Shutdown the server
    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}

impl Drop for MockChatServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// A session the mock server hands out by default
pub fn test_session() -> SessionInfo {
    SessionInfo {
        user_id: "u1".into(),
        role: UserRole::Developer,
        session_id: "s1".into(),
    }
}
