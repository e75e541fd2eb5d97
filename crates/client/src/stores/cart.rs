//! Cart state store.
//!
//! Single authoritative in-memory mirror of the current cart, with the
//! server as ground truth after every mutation. The cart identifier is
//! created lazily on the first item addition and persisted in client-local
//! storage so the cart survives restarts.
//!
//! Two invariants hold throughout:
//!
//! - At most one cart identifier is authoritative at any time; a stale
//!   identifier (404 on fetch) is discarded, never retried.
//! - Every mutation **replaces** the local item collection with the full
//!   server response, never patches it, so quantity/price/attribute drift
//!   cannot outlive a single round trip.
//!
//! Mutations are serialized through an internal async mutex: two rapid
//! quantity updates are applied in call order, so the final state is the
//! response to the last issued request.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::{debug, warn};

use marigold_core::{CartItemId, UserId};

use super::CartLink;
use crate::api::{ApiError, CartApi};
use crate::notify::{Notice, Notifier};
use crate::storage::{KeyValueStorage, keys};
use crate::types::{Cart, NewCartItem, Product, Variant};

/// Snapshot of the cart store's state.
#[derive(Debug, Clone, Default)]
pub struct CartState {
    /// The last cart the server returned, if any.
    pub cart: Option<Cart>,
    /// Whether a cart operation is in flight (UI disables action buttons).
    pub is_loading: bool,
}

impl CartState {
    /// Total quantity across all items, for the cart badge.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.cart.as_ref().map_or(0, Cart::item_count)
    }

    /// Whether the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.as_ref().is_none_or(|c| c.items.is_empty())
    }
}

/// Cart state store.
pub struct CartStore<A> {
    api: A,
    storage: Arc<dyn KeyValueStorage>,
    notifier: Arc<dyn Notifier>,
    state: watch::Sender<CartState>,
    /// Serializes cart mutations; held across the whole round trip.
    mutation: Mutex<()>,
}

impl<A: CartApi> CartStore<A> {
    /// Create a cart store. No network call is made until an operation
    /// needs one.
    #[must_use]
    pub fn new(api: A, storage: Arc<dyn KeyValueStorage>, notifier: Arc<dyn Notifier>) -> Self {
        let (state, _) = watch::channel(CartState::default());
        Self {
            api,
            storage,
            notifier,
            state,
            mutation: Mutex::new(()),
        }
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> CartState {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.state.subscribe()
    }

    /// The durable cart identifier, if one is stored.
    #[must_use]
    pub fn cart_id(&self) -> Option<marigold_core::CartId> {
        self.storage.get(keys::CART_ID).map(marigold_core::CartId::new)
    }

    fn set_loading(&self, is_loading: bool) {
        self.state.send_modify(|s| s.is_loading = is_loading);
    }

    /// Replace the whole state with a server response (or the empty cart).
    fn replace(&self, cart: Option<Cart>) {
        self.state.send_replace(CartState {
            cart,
            is_loading: false,
        });
    }

    fn notify_failure(&self, error: &ApiError, fallback: &str) {
        let message = error.server_message().unwrap_or(fallback).to_owned();
        self.notifier.notify(Notice::error(message));
    }

    /// Load the cart at startup.
    ///
    /// With no stored identifier this resolves to the empty cart without a
    /// network call - a cart is not created until needed. A stored
    /// identifier that the server no longer knows (404) is discarded
    /// silently; any other failure surfaces a notice and falls back to the
    /// empty cart.
    pub async fn initialize(&self) {
        let Some(cart_id) = self.cart_id() else {
            self.replace(None);
            return;
        };

        let _guard = self.mutation.lock().await;
        self.set_loading(true);

        match self.api.fetch_cart(&cart_id).await {
            Ok(cart) => self.replace(Some(cart)),
            Err(e) if e.is_not_found() => {
                debug!(cart_id = %cart_id, "Stored cart no longer exists, starting fresh");
                self.storage.remove(keys::CART_ID);
                self.replace(None);
            }
            Err(e) => {
                warn!(error = %e, "Failed to load cart");
                self.notify_failure(&e, "Could not load your cart");
                self.replace(None);
            }
        }
    }

    /// Add a variant to the cart, creating the cart first if none exists.
    ///
    /// The payload carries a price snapshot, the display name, an image,
    /// and the variant's attribute map - the attributes are
    /// correctness-critical for downstream size/color rendering, not
    /// cosmetic. On failure the prior state is left untouched.
    pub async fn add_item(&self, product: &Product, variant: &Variant, quantity: u32) {
        if quantity < 1 {
            return;
        }

        let item = NewCartItem {
            product_id: product.id.clone(),
            variant_id: variant.id.clone(),
            quantity,
            price: variant.price,
            name: product.name.clone(),
            image_url: variant
                .image_url
                .clone()
                .or_else(|| product.primary_image().map(ToOwned::to_owned)),
            attributes: variant.attributes.clone(),
        };

        let _guard = self.mutation.lock().await;
        self.set_loading(true);

        let result = async {
            let cart_id = match self.cart_id() {
                Some(id) => id,
                None => {
                    let cart = self.api.create_cart().await?;
                    self.storage.set(keys::CART_ID, cart.id.as_str());
                    cart.id
                }
            };
            self.api.add_cart_item(&cart_id, &item).await
        }
        .await;

        match result {
            Ok(cart) => self.replace(Some(cart)),
            Err(e) => {
                warn!(error = %e, "Failed to add item to cart");
                self.notify_failure(&e, "Could not add the item to your cart");
                self.set_loading(false);
            }
        }
    }

    /// Update an item's quantity.
    ///
    /// A no-op (no network call, no state change) when there is no active
    /// cart or when `quantity < 1`.
    pub async fn update_item_quantity(&self, item_id: &CartItemId, quantity: u32) {
        if quantity < 1 {
            return;
        }
        let Some(cart_id) = self.cart_id() else {
            return;
        };

        let _guard = self.mutation.lock().await;
        self.set_loading(true);

        match self.api.update_cart_item(&cart_id, item_id, quantity).await {
            Ok(cart) => self.replace(Some(cart)),
            Err(e) => {
                warn!(error = %e, "Failed to update cart item");
                self.notify_failure(&e, "Could not update your cart");
                self.set_loading(false);
            }
        }
    }

    /// Remove an item from the cart. A no-op without an active cart.
    pub async fn remove_item(&self, item_id: &CartItemId) {
        let Some(cart_id) = self.cart_id() else {
            return;
        };

        let _guard = self.mutation.lock().await;
        self.set_loading(true);

        match self.api.remove_cart_item(&cart_id, item_id).await {
            Ok(cart) => self.replace(Some(cart)),
            Err(e) => {
                warn!(error = %e, "Failed to remove cart item");
                self.notify_failure(&e, "Could not update your cart");
                self.set_loading(false);
            }
        }
    }

    /// Dispose of the cart after a successful order.
    ///
    /// The server-side delete is fire-and-forget: the order already
    /// succeeded, so a failure here is logged, not surfaced. Local state
    /// and the stored identifier are cleared unconditionally.
    pub async fn clear_on_order(&self) {
        let _guard = self.mutation.lock().await;

        if let Some(cart_id) = self.cart_id()
            && let Err(e) = self.api.delete_cart(&cart_id).await
        {
            warn!(cart_id = %cart_id, error = %e, "Failed to delete server-side cart after order");
        }

        self.storage.remove(keys::CART_ID);
        self.replace(None);
    }

    /// Attach the current cart to a now-known user.
    ///
    /// Invoked once per successful authentication event. Errors are
    /// non-fatal to login; the cart simply stays anonymous.
    pub async fn associate_user(&self, user_id: &UserId) {
        let Some(cart_id) = self.cart_id() else {
            return;
        };

        if let Err(e) = self.api.associate_cart(&cart_id, user_id).await {
            warn!(cart_id = %cart_id, user_id = %user_id, error = %e, "Failed to associate cart with user");
        }
    }
}

impl<A: CartApi> CartLink for CartStore<A> {
    async fn on_user_authenticated(&self, user_id: &UserId) {
        self.associate_user(user_id).await;
    }

    async fn on_order_created(&self) {
        self.clear_on_order().await;
    }
}
