use thiserror::Error;

/// Main error type for chatsockets
#[derive(Error, Debug)]
pub enum ChatSocketError {
    /// WebSocket transport error
    #[error("transport error: {0}")]
    Transport(String),

    /// Connection closed unexpectedly
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Operation requires an established connection
    #[error("not connected")]
    NotConnected,

    /// Credential source failed to produce a token
    #[error("credential error: {0}")]
    Credential(String),

    /// Frame encode/decode error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Channel send error
    #[error("channel send error: {0}")]
    ChannelSend(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result type for chatsockets operations
pub type Result<T> = std::result::Result<T, ChatSocketError>;
