//! Client-side state stores.
//!
//! Each store owns one slice of UI state and publishes it through a
//! `tokio::sync::watch` channel: the UI subscribes, triggers store actions,
//! the store calls the backend, and the backend's canonical response
//! replaces the local mirror wholesale. No store performs local arithmetic
//! that must stay consistent with the server.
//!
//! Cross-store coupling is explicit: the auth and order stores are handed a
//! [`CartLink`] collaborator at construction instead of reaching for an
//! ambient cart singleton, so tests can wire an isolated store graph per
//! case.

mod auth;
mod cart;
mod order;

pub use auth::{AuthState, AuthStore};
pub use cart::{CartState, CartStore};
pub use order::{OrderState, OrderStore};

use marigold_core::UserId;

/// Cart-side reactions to events published by the other stores.
///
/// Implemented by [`CartStore`]; the auth store publishes the
/// authentication event and the order store publishes the order-created
/// event. Both reactions are best-effort from the publisher's point of
/// view: they never fail the operation that triggered them.
pub trait CartLink {
    /// A user identity just became known. Associate the anonymous cart with
    /// it so later sessions under that identity recover the same cart.
    fn on_user_authenticated(&self, user_id: &UserId) -> impl Future<Output = ()>;

    /// An order was just created from the cart. Dispose of the cart, both
    /// the server-side record and the local identifier.
    fn on_order_created(&self) -> impl Future<Output = ()>;
}
