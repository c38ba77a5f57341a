use crate::error::Result;
use async_trait::async_trait;

/// Trait for supplying the bearer credential used by the handshake
///
/// The provider is called on every connection attempt (including
/// reconnections), so an implementation backed by a session store can hand
/// out a refreshed token each time the transport is reopened.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Get the current bearer token
    ///
    /// # Returns
    /// * `Ok(token)` - Attach this token to the connection request
    /// * `Err(ChatSocketError)` - Token acquisition failed; the attempt is
    ///   treated like any other transport-level connection error
    async fn bearer_token(&self) -> Result<String>;
}

/// A credential provider that always returns the same token
///
/// Suitable for tests and short-lived sessions where the token will not
/// expire before the connection does.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn bearer_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}
