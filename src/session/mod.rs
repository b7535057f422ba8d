//! Session Store
//!
//! Persisted key/value state holding the authentication token and the user
//! descriptor. Written on login, read on every guarded entry and every
//! request, deleted on logout.
//!
//! There is no expiry tracking and no refresh flow: a stale token simply
//! makes the next request fail with `ApiError::Unauthorized`, which clears
//! the session.

mod store;

pub use store::{FileSessionStore, MemorySessionStore, SessionStore};

use crate::models::{Role, UserDescriptor};
use thiserror::Error;

/// Key holding the bearer token
pub const TOKEN_KEY: &str = "token";
/// Key holding the JSON user descriptor
pub const USER_KEY: &str = "user";

/// Errors from the session backing store
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Lock error: {0}")]
    Lock(String),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// An authenticated session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: UserDescriptor,
}

impl Session {
    pub fn new(token: impl Into<String>, user: UserDescriptor) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    /// Read the session from the store.
    ///
    /// A token without a readable user record is not a usable session.
    pub fn load(store: &dyn SessionStore) -> SessionResult<Option<Session>> {
        let Some(token) = store.get(TOKEN_KEY)?.filter(|t| !t.is_empty()) else {
            return Ok(None);
        };

        let Some(raw_user) = store.get(USER_KEY)? else {
            tracing::warn!("Session token present without user record");
            return Ok(None);
        };

        match serde_json::from_str::<UserDescriptor>(&raw_user) {
            Ok(user) => Ok(Some(Session { token, user })),
            Err(e) => {
                tracing::warn!(error = %e, "Stored user record is unreadable");
                Ok(None)
            }
        }
    }

    /// Persist both keys
    pub fn save(&self, store: &dyn SessionStore) -> SessionResult<()> {
        store.set(TOKEN_KEY, &self.token)?;
        store.set(USER_KEY, &serde_json::to_string(&self.user)?)?;
        tracing::debug!(email = %self.user.email, role = %self.user.role, "Session saved");
        Ok(())
    }

    /// Remove both keys
    pub fn clear(store: &dyn SessionStore) -> SessionResult<()> {
        store.remove(TOKEN_KEY)?;
        store.remove(USER_KEY)?;
        tracing::debug!("Session cleared");
        Ok(())
    }

    /// Whether any token is present, without validating it
    pub fn has_token(store: &dyn SessionStore) -> SessionResult<bool> {
        Ok(store.get(TOKEN_KEY)?.map(|t| !t.is_empty()).unwrap_or(false))
    }
}
