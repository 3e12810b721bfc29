//! Session state and its transitions.
//!
//! The session only remembers whether the last login or validation
//! succeeded. The token itself always lives in the `CredentialStore` and is
//! re-read on every access, so a logout is visible to the very next request.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::ApiError;

use super::credentials::{CredentialStore, StorageError, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

/// Authentication state as seen by navigation and request call sites
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated)
    }
}

/// Checks a stored access token against the server.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// Succeeds only if the server accepted the token (2xx).
    async fn validate_token(&self, token: &str) -> Result<(), ApiError>;
}

/// Owner of the authentication state.
///
/// Construct one per application and share it as `Arc<SessionManager>`.
pub struct SessionManager {
    store: Arc<dyn CredentialStore>,
    state: watch::Sender<SessionState>,
}

impl SessionManager {
    /// Create a session in the `Unauthenticated` state.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        let (state, _) = watch::channel(SessionState::Unauthenticated);
        Self { store, state }
    }

    /// Restore the session from a previously stored token.
    ///
    /// A stored token is checked with `validator`. Any failure leaves the
    /// session unauthenticated but does not delete the stored token.
    pub async fn initialize(
        &self,
        validator: &dyn TokenValidator,
    ) -> Result<SessionState, StorageError> {
        let token = match self.store.get(ACCESS_TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                self.transition(SessionState::Unauthenticated);
                return Err(e);
            }
        };

        let Some(token) = token else {
            debug!("No stored access token");
            self.transition(SessionState::Unauthenticated);
            return Ok(SessionState::Unauthenticated);
        };

        let next = match validator.validate_token(&token).await {
            Ok(()) => SessionState::Authenticated,
            Err(e) => {
                warn!(error = %e, "Stored token failed validation");
                SessionState::Unauthenticated
            }
        };
        self.transition(next);
        Ok(next)
    }

    /// Persist freshly issued tokens and mark the session authenticated.
    ///
    /// The two writes are not atomic: if the refresh token cannot be written
    /// the access token stays stored and the state is left unchanged.
    pub fn login(&self, access_token: &str, refresh_token: &str) -> Result<(), StorageError> {
        self.store.set(ACCESS_TOKEN_KEY, access_token)?;
        self.store.set(REFRESH_TOKEN_KEY, refresh_token)?;
        self.transition(SessionState::Authenticated);
        Ok(())
    }

    /// Remove both tokens and mark the session unauthenticated.
    ///
    /// The state always ends up `Unauthenticated`; the first storage error
    /// (if any) is returned after both removals were attempted.
    pub fn logout(&self) -> Result<(), StorageError> {
        let access = self.store.remove(ACCESS_TOKEN_KEY);
        let refresh = self.store.remove(REFRESH_TOKEN_KEY);
        self.transition(SessionState::Unauthenticated);
        access.and(refresh)
    }

    /// Mark the session unauthenticated without touching stored tokens.
    pub fn demote(&self) {
        self.transition(SessionState::Unauthenticated);
    }

    /// The access token to attach to the next request, read from the store.
    pub fn current_token(&self) -> Result<Option<String>, StorageError> {
        self.store.get(ACCESS_TOKEN_KEY)
    }

    /// The stored refresh token. Nothing renews tokens with it yet.
    pub fn refresh_token(&self) -> Result<Option<String>, StorageError> {
        self.store.get(REFRESH_TOKEN_KEY)
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    /// Receive every state change from now on.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    fn transition(&self, next: SessionState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            info!(from = ?previous, to = ?next, "Session state changed");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
