//! Session token handle.
//!
//! The bearer token returned by login/registration is held in memory as a
//! [`SecretString`] and mirrored to durable storage so the session survives
//! restarts. The HTTP adapter reads it per request and clears it when the
//! backend answers 401; the auth store clears it on logout.

use std::sync::{Arc, Mutex};

use secrecy::{ExposeSecret, SecretString};

use crate::storage::{KeyValueStorage, keys};

/// Shared handle to the persisted session token.
///
/// Cheaply cloneable; all clones observe the same token.
#[derive(Clone)]
pub struct SessionToken {
    inner: Arc<SessionTokenInner>,
}

struct SessionTokenInner {
    storage: Arc<dyn KeyValueStorage>,
    token: Mutex<Option<SecretString>>,
}

impl SessionToken {
    /// Load the token from storage, if one was persisted.
    #[must_use]
    pub fn load(storage: Arc<dyn KeyValueStorage>) -> Self {
        let token = storage.get(keys::SESSION_TOKEN).map(SecretString::from);
        Self {
            inner: Arc::new(SessionTokenInner {
                storage,
                token: Mutex::new(token),
            }),
        }
    }

    /// Whether a session token is present.
    #[must_use]
    pub fn is_present(&self) -> bool {
        lock(&self.inner.token).is_some()
    }

    /// Expose the current token for header injection.
    #[must_use]
    pub fn expose(&self) -> Option<String> {
        lock(&self.inner.token)
            .as_ref()
            .map(|t| t.expose_secret().to_owned())
    }

    /// Set and persist a new token.
    pub fn set(&self, token: &str) {
        *lock(&self.inner.token) = Some(SecretString::from(token));
        self.inner.storage.set(keys::SESSION_TOKEN, token);
    }

    /// Clear the token from memory and storage.
    pub fn clear(&self) {
        *lock(&self.inner.token) = None;
        self.inner.storage.remove(keys::SESSION_TOKEN);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}
