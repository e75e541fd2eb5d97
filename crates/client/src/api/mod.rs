//! HTTP client adapter for the Marigold REST backend.
//!
//! # Architecture
//!
//! - The backend is the source of truth - every mutation returns the full
//!   updated record and the caller replaces its local mirror with it.
//! - Every outbound request carries `Accept-Language` (persisted locale),
//!   `X-Currency` (persisted currency), and a bearer `Authorization` header
//!   when a session token is present.
//! - 401 responses are intercepted globally: the session token is cleared
//!   before [`ApiError::Unauthorized`] is returned.
//! - Catalog reads are cached in-memory via `moka` (5-minute TTL); cart,
//!   order, and auth calls are never cached.
//!
//! The state stores depend on the [`CartApi`], [`AuthApi`], and [`OrderApi`]
//! traits rather than on [`ApiClient`] directly, so tests can inject
//! scripted fakes.

mod client;

pub use client::ApiClient;

use thiserror::Error;

use marigold_core::{CartId, CartItemId, OrderId, ReturnRequestId, UserId};

use crate::types::{
    AuthSession, Cart, CommentDraft, Credentials, GuestOrderLookup, NewCartItem, Order,
    OrderDraft, Registration, ReturnDraft, ReturnRequest, ReturnComment, User,
};

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failure (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The session is not (or no longer) valid. The token has already been
    /// cleared by the time this is returned.
    #[error("unauthorized")]
    Unauthorized,

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-success response from the server.
    #[error("server error ({status}): {}", message.as_deref().unwrap_or("no details"))]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message from the server's error envelope, when present.
        message: Option<String>,
    },

    /// Response body could not be decoded.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// The server-provided message, when the response carried one.
    ///
    /// Stores surface this verbatim to the user and fall back to a generic
    /// string otherwise.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Whether this error is a not-found response.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

// =============================================================================
// Store-facing API traits
// =============================================================================

/// Cart endpoints used by the cart store.
pub trait CartApi {
    /// Create a new empty cart. `POST /carts`
    fn create_cart(&self) -> impl Future<Output = Result<Cart, ApiError>>;

    /// Fetch an existing cart. `GET /carts/{id}`
    fn fetch_cart(&self, cart_id: &CartId) -> impl Future<Output = Result<Cart, ApiError>>;

    /// Add an item; returns the full updated cart. `POST /carts/{id}/items`
    fn add_cart_item(
        &self,
        cart_id: &CartId,
        item: &NewCartItem,
    ) -> impl Future<Output = Result<Cart, ApiError>>;

    /// Update an item's quantity; returns the full updated cart.
    /// `PUT /carts/{id}/items/{itemId}`
    fn update_cart_item(
        &self,
        cart_id: &CartId,
        item_id: &CartItemId,
        quantity: u32,
    ) -> impl Future<Output = Result<Cart, ApiError>>;

    /// Remove an item; returns the full updated cart.
    /// `DELETE /carts/{id}/items/{itemId}`
    fn remove_cart_item(
        &self,
        cart_id: &CartId,
        item_id: &CartItemId,
    ) -> impl Future<Output = Result<Cart, ApiError>>;

    /// Delete the server-side cart record. `DELETE /carts/{id}`
    fn delete_cart(&self, cart_id: &CartId) -> impl Future<Output = Result<(), ApiError>>;

    /// Attach the cart to a user so later sessions under that identity can
    /// recover it. `POST /carts/{id}/associate`
    fn associate_cart(
        &self,
        cart_id: &CartId,
        user_id: &UserId,
    ) -> impl Future<Output = Result<(), ApiError>>;
}

/// Auth endpoints used by the auth store.
pub trait AuthApi {
    /// Authenticate with credentials. `POST /auth/login`
    fn login(&self, credentials: &Credentials)
    -> impl Future<Output = Result<AuthSession, ApiError>>;

    /// Create an account. `POST /auth/register`
    fn register(
        &self,
        registration: &Registration,
    ) -> impl Future<Output = Result<AuthSession, ApiError>>;

    /// Fetch the profile of the session's user. `GET /auth/me`
    fn current_user(&self) -> impl Future<Output = Result<User, ApiError>>;
}

/// Order endpoints used by the order store.
pub trait OrderApi {
    /// Create an order from a cart snapshot. `POST /orders`
    fn create_order(&self, draft: &OrderDraft) -> impl Future<Output = Result<Order, ApiError>>;

    /// List the authenticated user's orders. `GET /orders/my-orders`
    fn my_orders(&self) -> impl Future<Output = Result<Vec<Order>, ApiError>>;

    /// Token-gated lookup of an order placed without authentication.
    /// `POST /orders/guest-lookup`
    fn guest_order(
        &self,
        lookup: &GuestOrderLookup,
    ) -> impl Future<Output = Result<Order, ApiError>>;

    /// Cancel an order; returns the server's updated record.
    /// `POST /orders/{id}/cancel`
    fn cancel_order(
        &self,
        order_id: &OrderId,
        guest_token: Option<&str>,
    ) -> impl Future<Output = Result<Order, ApiError>>;

    /// Open a return request. `POST /orders/returns`
    fn create_return(
        &self,
        draft: &ReturnDraft,
    ) -> impl Future<Output = Result<ReturnRequest, ApiError>>;

    /// Append a comment to a return request.
    /// `POST /orders/returns/{id}/comments`
    fn create_return_comment(
        &self,
        return_id: &ReturnRequestId,
        draft: &CommentDraft,
    ) -> impl Future<Output = Result<ReturnComment, ApiError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("/carts/crt_1".to_string());
        assert_eq!(err.to_string(), "not found: /carts/crt_1");

        let err = ApiError::Status {
            status: 422,
            message: Some("quantity exceeds stock".to_string()),
        };
        assert_eq!(err.to_string(), "server error (422): quantity exceeds stock");

        let err = ApiError::Status {
            status: 500,
            message: None,
        };
        assert_eq!(err.to_string(), "server error (500): no details");
    }

    #[test]
    fn test_server_message() {
        let err = ApiError::Status {
            status: 400,
            message: Some("invalid cart".to_string()),
        };
        assert_eq!(err.server_message(), Some("invalid cart"));
        assert_eq!(ApiError::Unauthorized.server_message(), None);
    }

    #[test]
    fn test_is_not_found() {
        assert!(ApiError::NotFound(String::new()).is_not_found());
        assert!(!ApiError::Unauthorized.is_not_found());
    }
}
