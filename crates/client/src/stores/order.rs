//! Order state store.
//!
//! Owns order creation, guest order recovery, cancellation, and return
//! requests. A successful order publishes the order-created event to the
//! cart via [`CartLink`], which disposes of the cart that produced it.
//!
//! Every failure is caught locally, translated to a notice, and the
//! loading/submitting flags are reset on both paths so the UI can never get
//! stuck in a permanent loading state.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::warn;

use marigold_core::{CartItemId, OrderId, ReturnRequestId};

use super::CartLink;
use crate::api::{ApiError, OrderApi};
use crate::notify::{Notice, Notifier};
use crate::types::{CommentDraft, GuestOrderLookup, Order, OrderDraft, ReturnDraft};

/// Snapshot of the order store's state.
#[derive(Debug, Clone, Default)]
pub struct OrderState {
    /// The order currently being viewed (confirmation or guest lookup).
    pub current: Option<Order>,
    /// The authenticated user's order history.
    pub my_orders: Vec<Order>,
    /// Whether a read operation is in flight.
    pub is_loading: bool,
    /// Whether a checkout/return submission is in flight (disables the
    /// submit button against double-checkout).
    pub is_submitting: bool,
}

/// Order state store.
pub struct OrderStore<A, C> {
    api: A,
    cart: Arc<C>,
    notifier: Arc<dyn Notifier>,
    state: watch::Sender<OrderState>,
}

impl<A: OrderApi, C: CartLink> OrderStore<A, C> {
    /// Create an order store.
    #[must_use]
    pub fn new(api: A, cart: Arc<C>, notifier: Arc<dyn Notifier>) -> Self {
        let (state, _) = watch::channel(OrderState::default());
        Self {
            api,
            cart,
            notifier,
            state,
        }
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> OrderState {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<OrderState> {
        self.state.subscribe()
    }

    fn notify_failure(&self, error: &ApiError, fallback: &str) {
        let message = error.server_message().unwrap_or(fallback).to_owned();
        self.notifier.notify(Notice::error(message));
    }

    /// Create an order from the current cart snapshot.
    ///
    /// On success the cart is disposed of and the new order's id is
    /// returned for redirect to the confirmation view. On failure the
    /// server's message is surfaced verbatim when present and the cart is
    /// left untouched.
    pub async fn create_order(&self, draft: &OrderDraft) -> Option<OrderId> {
        if self.state.borrow().is_submitting {
            return None;
        }
        self.state.send_modify(|s| s.is_submitting = true);

        match self.api.create_order(draft).await {
            Ok(order) => {
                self.cart.on_order_created().await;
                let order_id = order.id.clone();
                self.state.send_modify(|s| {
                    s.current = Some(order);
                    s.is_submitting = false;
                });
                self.notifier.notify(Notice::success("Order placed"));
                Some(order_id)
            }
            Err(e) => {
                warn!(error = %e, "Order creation failed");
                self.notify_failure(&e, "Could not place your order");
                self.state.send_modify(|s| s.is_submitting = false);
                None
            }
        }
    }

    /// Load the authenticated user's order history.
    pub async fn fetch_my_orders(&self) {
        self.state.send_modify(|s| s.is_loading = true);

        match self.api.my_orders().await {
            Ok(orders) => self.state.send_modify(|s| {
                s.my_orders = orders;
                s.is_loading = false;
            }),
            Err(e) => {
                warn!(error = %e, "Failed to fetch orders");
                self.notify_failure(&e, "Could not load your orders");
                self.state.send_modify(|s| s.is_loading = false);
            }
        }
    }

    /// Look up an order without authentication using an id+token pair.
    ///
    /// Fails closed: a missing or invalid id or token resolves to no order
    /// shown, never to a partial record.
    pub async fn fetch_guest_order(&self, order_id: &OrderId, token: &str) {
        if order_id.as_str().trim().is_empty() || token.trim().is_empty() {
            self.state.send_modify(|s| s.current = None);
            self.notifier.notify(Notice::error("Order not found"));
            return;
        }

        self.state.send_modify(|s| s.is_loading = true);

        let lookup = GuestOrderLookup {
            order_id: order_id.clone(),
            token: token.to_owned(),
        };

        match self.api.guest_order(&lookup).await {
            Ok(order) => self.state.send_modify(|s| {
                s.current = Some(order);
                s.is_loading = false;
            }),
            Err(e) => {
                warn!(error = %e, "Guest order lookup failed");
                self.state.send_modify(|s| {
                    s.current = None;
                    s.is_loading = false;
                });
                self.notifier.notify(Notice::error("Order not found"));
            }
        }
    }

    /// Cancel an order.
    ///
    /// Guarded client-side by the order's server-computed `is_cancellable`
    /// flag when the order is known locally; the server still has the final
    /// say. The local record is replaced with the server's updated one.
    pub async fn cancel_order(&self, order_id: &OrderId, guest_token: Option<&str>) {
        if self.local_order(order_id).is_some_and(|o| !o.is_cancellable) {
            self.notifier
                .notify(Notice::info("This order can no longer be cancelled"));
            return;
        }

        self.state.send_modify(|s| s.is_loading = true);

        match self.api.cancel_order(order_id, guest_token).await {
            Ok(updated) => {
                self.state.send_modify(|s| {
                    if s.current.as_ref().is_some_and(|o| o.id == updated.id) {
                        s.current = Some(updated.clone());
                    }
                    if let Some(entry) = s.my_orders.iter_mut().find(|o| o.id == updated.id) {
                        *entry = updated.clone();
                    }
                    s.is_loading = false;
                });
                self.notifier.notify(Notice::success("Order cancelled"));
            }
            Err(e) => {
                warn!(error = %e, "Order cancellation failed");
                self.notify_failure(&e, "Could not cancel this order");
                self.state.send_modify(|s| s.is_loading = false);
            }
        }
    }

    /// Open a return request for an order.
    ///
    /// Requires at least one selected line item and a non-empty reason;
    /// both are validated before anything reaches the network. On success
    /// the new return request shows up locally: a guest order is
    /// re-fetched (the token is the only way to read it back), while an
    /// authenticated order gets the created request appended to the
    /// matching local record directly.
    pub async fn create_return_request(
        &self,
        order_id: &OrderId,
        reason: &str,
        item_ids: &[CartItemId],
        image_urls: Vec<String>,
        guest_token: Option<&str>,
    ) -> bool {
        if item_ids.is_empty() {
            self.notifier
                .notify(Notice::error("Select at least one item to return"));
            return false;
        }
        if reason.trim().is_empty() {
            self.notifier
                .notify(Notice::error("Please provide a reason for the return"));
            return false;
        }

        self.state.send_modify(|s| s.is_submitting = true);

        let draft = ReturnDraft {
            order_id: order_id.clone(),
            reason: reason.to_owned(),
            item_ids: item_ids.to_vec(),
            image_urls,
            guest_token: guest_token.map(ToOwned::to_owned),
        };

        match self.api.create_return(&draft).await {
            Ok(request) => {
                self.state.send_modify(|s| s.is_submitting = false);
                if let Some(token) = guest_token {
                    self.fetch_guest_order(order_id, token).await;
                } else {
                    self.state.send_modify(|s| {
                        if let Some(order) =
                            s.current.as_mut().filter(|o| &o.id == order_id)
                        {
                            order.return_requests.push(request.clone());
                        }
                        if let Some(order) =
                            s.my_orders.iter_mut().find(|o| &o.id == order_id)
                        {
                            order.return_requests.push(request.clone());
                        }
                    });
                }
                self.notifier.notify(Notice::success("Return request submitted"));
                true
            }
            Err(e) => {
                warn!(error = %e, "Return request failed");
                self.notify_failure(&e, "Could not submit your return request");
                self.state.send_modify(|s| s.is_submitting = false);
                false
            }
        }
    }

    /// Append a comment to a return request.
    ///
    /// On success the comment is appended to the matching return request in
    /// local state by id - no full re-fetch.
    pub async fn create_return_comment(
        &self,
        return_id: &ReturnRequestId,
        text: Option<&str>,
        image_url: Option<String>,
        guest_token: Option<&str>,
    ) {
        let text = text.map(str::trim).filter(|t| !t.is_empty());
        if text.is_none() && image_url.is_none() {
            self.notifier
                .notify(Notice::error("A comment needs text or an image"));
            return;
        }

        let draft = CommentDraft {
            text: text.map(ToOwned::to_owned),
            image_url,
            guest_token: guest_token.map(ToOwned::to_owned),
        };

        match self.api.create_return_comment(return_id, &draft).await {
            Ok(comment) => {
                self.state.send_modify(|s| {
                    if let Some(order) = s.current.as_mut()
                        && let Some(request) = order
                            .return_requests
                            .iter_mut()
                            .find(|r| &r.id == return_id)
                    {
                        request.comments.push(comment);
                    }
                });
            }
            Err(e) => {
                warn!(error = %e, "Return comment failed");
                self.notify_failure(&e, "Could not post your comment");
            }
        }
    }

    fn local_order(&self, order_id: &OrderId) -> Option<Order> {
        let state = self.state.borrow();
        state
            .current
            .as_ref()
            .filter(|o| &o.id == order_id)
            .or_else(|| state.my_orders.iter().find(|o| &o.id == order_id))
            .cloned()
    }
}
