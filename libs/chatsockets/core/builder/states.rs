//! Compile-time state tracking for [`super::ChatClientBuilder`]
//!
//! A client without an endpoint or a credential source cannot do anything
//! useful, so `build()` only exists once both have been supplied. The
//! marker types below encode that progress in the builder's type
//! parameters instead of leaving it to a runtime check.

use std::marker::PhantomData;

/// Whether the builder has been given an endpoint URL
pub trait UrlState {}

/// No endpoint yet; `url()` is the only way forward
pub struct NoUrl;
impl UrlState for NoUrl {}

/// Endpoint supplied
pub struct HasUrl;
impl UrlState for HasUrl {}

/// Whether the builder has been given a credential source
pub trait CredentialState {}

/// No credential source yet; supply one via `credentials()` or `token()`
pub struct NoCredentials;
impl CredentialState for NoCredentials {}

/// Credential source supplied
pub struct HasCredentials;
impl CredentialState for HasCredentials {}

/// Zero-sized carrier for the two state parameters
///
/// Private constructor, so builder states can only be reached through the
/// builder's own transitions.
#[derive(Debug, Clone, Copy)]
pub struct TypeState<U, C> {
    _url: PhantomData<U>,
    _credentials: PhantomData<C>,
}

impl<U, C> TypeState<U, C> {
    pub(crate) fn new() -> Self {
        Self {
            _url: PhantomData,
            _credentials: PhantomData,
        }
    }
}

impl<U, C> Default for TypeState<U, C> {
    fn default() -> Self {
        Self::new()
    }
}
