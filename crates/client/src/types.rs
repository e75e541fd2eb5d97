//! Domain types for the Marigold REST API.
//!
//! These mirror the backend's JSON representations. The server is the
//! source of truth for all cart and order contents; the client never derives
//! totals or statuses locally.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use marigold_core::{
    CartId, CartItemId, CategoryId, CommentId, Email, OrderId, OrderStatus, Price, ProductId,
    ReturnRequestId, ReturnStatus, ReviewId, UserId, UserRole, VariantId,
};

// =============================================================================
// Cart Types
// =============================================================================

/// A server-side cart, mirrored locally between mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    /// Server-assigned cart identifier.
    pub id: CartId,
    /// Ordered collection of items, as the server last returned them.
    pub items: Vec<CartItem>,
    /// Server-computed subtotal.
    pub subtotal: Price,
}

impl Cart {
    /// Total quantity across all items.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// A single line in a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Server-assigned item identifier, unique within the cart.
    pub id: CartItemId,
    pub product_id: ProductId,
    pub variant_id: VariantId,
    /// Always >= 1; the client rejects smaller updates before they reach
    /// the network.
    pub quantity: u32,
    /// Price snapshot taken when the item was added.
    pub price: Price,
    pub name: String,
    pub image_url: Option<String>,
    /// Variant attributes (e.g., color/size). Required for rendering; the
    /// add-item payload must always carry them.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// Payload for adding an item to a cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCartItem {
    pub product_id: ProductId,
    pub variant_id: VariantId,
    pub quantity: u32,
    /// Price snapshot at add-time.
    pub price: Price,
    pub name: String,
    pub image_url: Option<String>,
    pub attributes: BTreeMap<String, String>,
}

// =============================================================================
// Auth Types
// =============================================================================

/// Login payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Registration payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Session issued by login or registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    /// Bearer token for subsequent requests.
    pub token: String,
}

/// An authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub role: UserRole,
}

// =============================================================================
// Order Types
// =============================================================================

/// An order, always replaced wholesale with the server's record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub total: Price,
    /// Server-computed cancellation eligibility; the client only reads it.
    pub is_cancellable: bool,
    /// Present on orders created without authentication; enables token-gated
    /// lookup without login.
    pub guest_token: Option<String>,
    pub shipping: ShippingDetails,
    #[serde(default)]
    pub return_requests: Vec<ReturnRequest>,
    pub created_at: DateTime<Utc>,
}

/// A line item snapshotted from the cart at checkout time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub variant_id: VariantId,
    pub quantity: u32,
    pub price: Price,
    pub name: String,
    pub image_url: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// Shipping details submitted at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingDetails {
    pub name: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub phone: Option<String>,
}

/// Payment method selected at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Card,
    Paypal,
    CashOnDelivery,
}

/// Checkout payload: cart snapshot reference plus shipping/payment/guest
/// identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
    pub cart_id: CartId,
    pub shipping: ShippingDetails,
    pub payment_method: PaymentMethod,
    /// Required when checking out without a session.
    pub guest_email: Option<Email>,
}

/// Token-gated guest order lookup payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestOrderLookup {
    pub order_id: OrderId,
    pub token: String,
}

// =============================================================================
// Return Types
// =============================================================================

/// A return request attached to an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnRequest {
    pub id: ReturnRequestId,
    pub order_id: OrderId,
    pub status: ReturnStatus,
    pub reason: String,
    /// Order line items covered by the return.
    pub item_ids: Vec<CartItemId>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    /// Ordered conversation between customer and support.
    #[serde(default)]
    pub comments: Vec<ReturnComment>,
    pub created_at: DateTime<Utc>,
}

/// Payload for opening a return request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnDraft {
    pub order_id: OrderId,
    pub reason: String,
    pub item_ids: Vec<CartItemId>,
    pub image_urls: Vec<String>,
    pub guest_token: Option<String>,
}

/// A comment on a return request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnComment {
    pub id: CommentId,
    pub author: String,
    pub text: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for appending a comment to a return request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentDraft {
    pub text: Option<String>,
    pub image_url: Option<String>,
    pub guest_token: Option<String>,
}

// =============================================================================
// Catalog Types
// =============================================================================

/// A product with its purchasable variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category_id: Option<CategoryId>,
    /// Base price; variants may override it.
    pub price: Price,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl Product {
    /// First product image, used as the cart thumbnail fallback.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.image_urls.first().map(String::as_str)
    }
}

/// A purchasable variant of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub price: Price,
    /// Attribute map (e.g., `{"color": "Blue", "size": "M"}`).
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    pub image_url: Option<String>,
    pub in_stock: bool,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

/// A page of results from a listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

/// Query parameters for product listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub category: Option<CategoryId>,
}

/// Query parameters for product search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub min_price: Option<rust_decimal::Decimal>,
    pub max_price: Option<rust_decimal::Decimal>,
    pub page: Option<u32>,
}

// =============================================================================
// Review Types
// =============================================================================

/// A product review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub author: String,
    /// 1-5 stars.
    pub rating: u8,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating or updating a review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewDraft {
    pub product_id: ProductId,
    pub rating: u8,
    pub text: String,
}

// =============================================================================
// Image Types
// =============================================================================

/// Result of a multipart image upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub url: String,
}
