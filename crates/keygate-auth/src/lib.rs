//! Access token acquisition and renewal.
//!
//! This crate defines the [`TokenProvider`] contract the session depends on
//! and ships [`keycloak::KeycloakProvider`], which implements it against a
//! Keycloak realm:
//! - Interactive login through the OAuth 2.0 device authorization grant.
//! - In-memory storage of the current access/refresh token pair.
//! - Refresh on demand, skipped while the token is still valid long enough.
//!
//! Anything that needs a bearer token holds an `Arc<dyn TokenProvider>` so
//! tests can swap in a fake.

use std::time::Duration;

pub mod error;
pub mod keycloak;
pub mod token;

#[cfg(feature = "test-support")]
pub mod testing;

pub use error::AuthError;

/// Source of bearer tokens for an authenticated session.
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    /// Runs the interactive login.
    ///
    /// Resolves `Ok(false)` if the user did not authenticate and `Err` if the
    /// provider could not be used at all.
    async fn initialize(&self) -> Result<bool, AuthError>;

    /// Returns the current access token, if one was issued.
    fn current_token(&self) -> Option<String>;

    /// Refreshes the access token if it expires within `min_validity`.
    async fn refresh(&self, min_validity: Duration) -> Result<(), AuthError>;
}
