pub mod states;

use std::sync::Arc;
use std::time::Duration;

use states::*;

use crate::core::client::ChatClient;
use crate::core::config::{ClientConfig, CONNECT_GUARD};
use crate::traits::*;

/// Type-state builder for [`ChatClient`]
///
/// Uses the type system to enforce that the two required fields (URL and
/// credentials) are set before `build()` becomes available. Everything else
/// has a default.
///
/// ```rust,ignore
/// let client = ChatClient::builder()
///     .url("wss://chat.example.com/socket")
///     .token(std::env::var("CHAT_TOKEN")?)
///     .connect_timeout(Duration::from_millis(3000))
///     .reconnect_strategy(ExponentialBackoff::new(
///         Duration::from_secs(1),
///         Duration::from_secs(5),
///         Some(5),
///     ))
///     .build();
/// ```
pub struct ChatClientBuilder<U, C>
where
    U: UrlState,
    C: CredentialState,
{
    _state: TypeState<U, C>,
    url: Option<String>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    reconnect_strategy: Option<Box<dyn ReconnectionStrategy>>,
    connect_timeout: Duration,
    heartbeat: Option<Duration>,
}

impl ChatClientBuilder<NoUrl, NoCredentials> {
    /// Create a new builder instance
    pub fn new() -> Self {
        Self {
            _state: TypeState::new(),
            url: None,
            credentials: None,
            reconnect_strategy: None,
            connect_timeout: CONNECT_GUARD,
            heartbeat: None,
        }
    }
}

impl Default for ChatClientBuilder<NoUrl, NoCredentials> {
    fn default() -> Self {
        Self::new()
    }
}

// URL setting
impl<C> ChatClientBuilder<NoUrl, C>
where
    C: CredentialState,
{
    pub fn url(self, url: impl Into<String>) -> ChatClientBuilder<HasUrl, C> {
        ChatClientBuilder {
            _state: TypeState::new(),
            url: Some(url.into()),
            credentials: self.credentials,
            reconnect_strategy: self.reconnect_strategy,
            connect_timeout: self.connect_timeout,
            heartbeat: self.heartbeat,
        }
    }
}

// Credential setting
impl<U> ChatClientBuilder<U, NoCredentials>
where
    U: UrlState,
{
    /// Supply a credential source, consulted on every connection attempt
    pub fn credentials(
        self,
        provider: impl CredentialProvider + 'static,
    ) -> ChatClientBuilder<U, HasCredentials> {
        ChatClientBuilder {
            _state: TypeState::new(),
            url: self.url,
            credentials: Some(Arc::new(provider)),
            reconnect_strategy: self.reconnect_strategy,
            connect_timeout: self.connect_timeout,
            heartbeat: self.heartbeat,
        }
    }

    /// Shortcut for a fixed bearer token
    pub fn token(self, token: impl Into<String>) -> ChatClientBuilder<U, HasCredentials> {
        self.credentials(StaticToken::new(token))
    }
}

// Optional configuration methods
impl<U, C> ChatClientBuilder<U, C>
where
    U: UrlState,
    C: CredentialState,
{
    pub fn reconnect_strategy(mut self, strategy: impl ReconnectionStrategy + 'static) -> Self {
        self.reconnect_strategy = Some(Box::new(strategy));
        self
    }

    /// Bound how long `connect()` waits for the server acknowledgment
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Enable an application-level heartbeat at the given interval
    pub fn heartbeat(mut self, interval: Duration) -> Self {
        self.heartbeat = Some(interval);
        self
    }
}

// Build method - only available when all required fields are set
impl ChatClientBuilder<HasUrl, HasCredentials> {
    pub fn build(self) -> ChatClient {
        let url = self.url.expect("URL must be set");
        let credentials = self.credentials.expect("Credentials must be set");

        let reconnect_strategy = self.reconnect_strategy.unwrap_or_else(|| {
            Box::new(ExponentialBackoff::new(
                Duration::from_secs(1),
                Duration::from_secs(5),
                Some(5),
            ))
        });

        let config = ClientConfig {
            url,
            credentials,
            reconnect_strategy,
            connect_timeout: self.connect_timeout,
            heartbeat: self.heartbeat,
        };

        ChatClient::from_config(config)
    }
}
