use crate::traits::*;
use std::sync::Arc;
use std::time::Duration;

/// How long `connect()` waits for the server acknowledgment before
/// resolving as disconnected
pub const CONNECT_GUARD: Duration = Duration::from_millis(3000);

/// Configuration for a [`crate::ChatClient`]
///
/// Built by the type-state builder; required fields are enforced at
/// compile time.
pub struct ClientConfig {
    /// WebSocket URL (wss:// or ws://)
    pub(crate) url: String,

    /// Source of the bearer token, consulted on every connection attempt
    pub(crate) credentials: Arc<dyn CredentialProvider>,

    /// Reconnection strategy consulted after every transport-level error
    pub(crate) reconnect_strategy: Box<dyn ReconnectionStrategy>,

    /// Guard timer bounding how long `connect()` waits for the server ack
    pub(crate) connect_timeout: Duration,

    /// Optional application-level heartbeat interval
    pub(crate) heartbeat: Option<Duration>,
}

impl ClientConfig {
    /// Get a reference to the URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Check if a heartbeat is configured
    pub fn has_heartbeat(&self) -> bool {
        self.heartbeat.is_some()
    }

    /// The configured guard duration
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}
