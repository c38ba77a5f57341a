//! # ChatSockets Traits
//!
//! Core traits and types for the chatsockets client library:
//!
//! - **CredentialProvider**: supply the bearer token for the handshake
//! - **ReconnectionStrategy**: control reconnection behavior
//! - **ChatSocketError**: the library error taxonomy

pub mod credentials;
pub mod error;
pub mod reconnect;

// Re-export commonly used types
pub use credentials::{CredentialProvider, StaticToken};
pub use error::{ChatSocketError, Result};
pub use reconnect::{ExponentialBackoff, FixedDelay, NeverReconnect, ReconnectionStrategy};
