//! Authentication module for managing the user session and stored tokens.
//!
//! This module provides:
//! - `CredentialStore`: persisted key/value storage for the access and refresh tokens
//! - `SessionManager`: the authenticated/unauthenticated state and its transitions
//!
//! Token expiry is never tracked locally. A token is only known to be stale
//! once the server rejects it.

pub mod credentials;
pub mod session;

pub use credentials::{
    CredentialStore, FileStore, KeyringStore, MemoryStore, StorageError, ACCESS_TOKEN_KEY,
    REFRESH_TOKEN_KEY,
};
pub use session::{SessionManager, SessionState, TokenValidator};
