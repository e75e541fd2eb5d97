//! Auth state store.
//!
//! Owns the session lifecycle: anonymous -> authenticated on login or
//! registration, back to anonymous on logout or session expiry. On every
//! successful authentication the store publishes the event to the cart via
//! [`CartLink`] so the anonymous cart gets associated with the user -
//! exactly once, and only after the user id is actually known.
//!
//! Operations never return errors to the caller; failures resolve to a
//! notice and a `false` result.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::warn;

use marigold_core::UserRole;

use super::CartLink;
use crate::api::{ApiError, AuthApi};
use crate::notify::{Notice, Notifier};
use crate::session::SessionToken;
use crate::types::{Credentials, Registration, User};

/// Snapshot of the auth store's state.
///
/// Either fully anonymous (`user` is `None`) or fully authenticated; a
/// partially-authenticated state is never published.
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    /// The authenticated user, if any.
    pub user: Option<User>,
    /// Whether an auth operation is in flight.
    pub is_loading: bool,
}

impl AuthState {
    /// Whether a user is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Auth state store.
pub struct AuthStore<A, C> {
    api: A,
    cart: Arc<C>,
    session: SessionToken,
    notifier: Arc<dyn Notifier>,
    state: watch::Sender<AuthState>,
}

impl<A: AuthApi, C: CartLink> AuthStore<A, C> {
    /// Create an auth store.
    #[must_use]
    pub fn new(
        api: A,
        cart: Arc<C>,
        session: SessionToken,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self {
            api,
            cart,
            session,
            notifier,
            state,
        }
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    fn set_loading(&self, is_loading: bool) {
        self.state.send_modify(|s| s.is_loading = is_loading);
    }

    fn reset(&self) {
        self.state.send_replace(AuthState::default());
    }

    /// Authenticate with email and password.
    ///
    /// On success the session token is persisted, the profile is fetched,
    /// and only then is the cart association published. Returns whether the
    /// whole sequence succeeded; never panics or propagates an error.
    pub async fn login(&self, credentials: &Credentials) -> bool {
        self.set_loading(true);

        match self.api.login(credentials).await {
            Ok(session) => {
                self.session.set(&session.token);
                self.finish_sign_in().await
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.notify_failure(&e, "Invalid email or password");
                self.set_loading(false);
                false
            }
        }
    }

    /// Create an account, then run the same sequence as [`Self::login`].
    pub async fn register(&self, registration: &Registration) -> bool {
        self.set_loading(true);

        match self.api.register(registration).await {
            Ok(session) => {
                self.session.set(&session.token);
                self.finish_sign_in().await
            }
            Err(e) => {
                warn!(error = %e, "Registration failed");
                self.notify_failure(&e, "Could not create your account");
                self.set_loading(false);
                false
            }
        }
    }

    /// Shared tail of login/registration: fetch the profile, publish the
    /// authenticated state, then publish the cart association event.
    async fn finish_sign_in(&self) -> bool {
        match self.api.current_user().await {
            Ok(user) => {
                let user_id = user.id.clone();
                self.state.send_replace(AuthState {
                    user: Some(user),
                    is_loading: false,
                });
                // The user id is known now and only now.
                self.cart.on_user_authenticated(&user_id).await;
                true
            }
            Err(e) => {
                warn!(error = %e, "Profile fetch after sign-in failed");
                self.session.clear();
                self.reset();
                self.notify_failure(&e, "Could not sign you in");
                false
            }
        }
    }

    /// Restore the session at startup.
    ///
    /// Without a stored token this resets to anonymous with no network
    /// call. A 401 means the stored session is stale: the token is cleared
    /// and a session-expired notice is surfaced. Other failures reset to
    /// anonymous quietly - the state is never left partially authenticated.
    pub async fn fetch_user(&self) {
        if !self.session.is_present() {
            self.reset();
            return;
        }

        self.set_loading(true);

        match self.api.current_user().await {
            Ok(user) => {
                self.state.send_replace(AuthState {
                    user: Some(user),
                    is_loading: false,
                });
            }
            Err(ApiError::Unauthorized) => {
                self.session.clear();
                self.reset();
                self.notifier.notify(Notice::info(
                    "Your session has expired. Please sign in again.",
                ));
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch user profile");
                self.reset();
            }
        }
    }

    /// Clear the session and reset to anonymous.
    ///
    /// The cart is intentionally left alone: it persists across logout,
    /// associated with whichever identity last owned it.
    pub fn logout(&self) {
        self.session.clear();
        self.reset();
    }

    /// Role-based capability check.
    ///
    /// Pure predicate: `true` when no roles are required, `false` when
    /// unauthenticated, otherwise a membership test against the user's
    /// single role.
    #[must_use]
    pub fn has_role(&self, required: &[UserRole]) -> bool {
        if required.is_empty() {
            return true;
        }
        self.state
            .borrow()
            .user
            .as_ref()
            .is_some_and(|user| required.contains(&user.role))
    }

    fn notify_failure(&self, error: &ApiError, fallback: &str) {
        let message = error.server_message().unwrap_or(fallback).to_owned();
        self.notifier.notify(Notice::error(message));
    }
}
