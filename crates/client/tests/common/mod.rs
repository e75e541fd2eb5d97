//! Shared test support: scripted API fakes, a recording notifier, and
//! builders for wire types.
//!
//! The fakes are `Clone` with shared interiors: tests keep one handle for
//! scripting and inspection and move the other into the store under test.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};

use marigold_client::api::{ApiError, AuthApi, CartApi, OrderApi};
use marigold_client::notify::{Notice, Notifier};
use marigold_client::types::{
    AuthSession, Cart, CartItem, CommentDraft, Credentials, GuestOrderLookup, NewCartItem, Order,
    OrderDraft, Product, Registration, ReturnComment, ReturnDraft, ReturnRequest, ShippingDetails,
    User, Variant,
};
use marigold_core::{
    CartId, CartItemId, CommentId, CurrencyCode, Email, OrderId, OrderStatus, Price, ProductId,
    ReturnRequestId, ReturnStatus, UserId, UserRole, VariantId,
};

/// Shared, ordered journal of API calls across fakes, so tests can assert
/// cross-store sequencing.
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

fn record(journal: &Journal, entry: impl Into<String>) {
    journal.lock().unwrap().push(entry.into());
}

// =============================================================================
// Recording notifier
// =============================================================================

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notices().into_iter().map(|n| n.message).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

// =============================================================================
// Builders
// =============================================================================

pub fn usd(cents: i64) -> Price {
    Price::from_cents(cents, CurrencyCode::USD)
}

pub fn cart_item(id: &str, quantity: u32) -> CartItem {
    CartItem {
        id: CartItemId::new(id),
        product_id: ProductId::new("prd_1"),
        variant_id: VariantId::new("var_1"),
        quantity,
        price: usd(1999),
        name: "Linen Shirt".to_string(),
        image_url: None,
        attributes: BTreeMap::from([("size".to_string(), "M".to_string())]),
    }
}

pub fn cart(id: &str, items: Vec<CartItem>) -> Cart {
    let subtotal = items
        .iter()
        .map(|i| i64::from(i.quantity) * 1999)
        .sum::<i64>();
    Cart {
        id: CartId::new(id),
        items,
        subtotal: usd(subtotal),
    }
}

pub fn product() -> Product {
    Product {
        id: ProductId::new("prd_1"),
        name: "Linen Shirt".to_string(),
        description: "A shirt".to_string(),
        category_id: None,
        price: usd(1999),
        image_urls: vec!["https://img.example/shirt.jpg".to_string()],
        variants: vec![variant()],
    }
}

pub fn variant() -> Variant {
    Variant {
        id: VariantId::new("var_1"),
        price: usd(1999),
        attributes: BTreeMap::from([
            ("color".to_string(), "Blue".to_string()),
            ("size".to_string(), "M".to_string()),
        ]),
        image_url: None,
        in_stock: true,
    }
}

pub fn user(id: &str, role: UserRole) -> User {
    User {
        id: UserId::new(id),
        email: Email::parse("shopper@example.com").unwrap(),
        name: "Shopper".to_string(),
        role,
    }
}

pub fn order(id: &str, is_cancellable: bool) -> Order {
    Order {
        id: OrderId::new(id),
        status: OrderStatus::Pending,
        items: vec![],
        total: usd(1999),
        is_cancellable,
        guest_token: Some("gt_1".to_string()),
        shipping: shipping(),
        return_requests: vec![],
        created_at: Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap(),
    }
}

pub fn shipping() -> ShippingDetails {
    ShippingDetails {
        name: "Shopper".to_string(),
        line1: "1 Main St".to_string(),
        line2: None,
        city: "Springfield".to_string(),
        postal_code: "12345".to_string(),
        country: "US".to_string(),
        phone: None,
    }
}

pub fn order_draft() -> OrderDraft {
    OrderDraft {
        cart_id: CartId::new("crt_1"),
        shipping: shipping(),
        payment_method: marigold_client::types::PaymentMethod::Card,
        guest_email: None,
    }
}

pub fn return_request(id: &str) -> ReturnRequest {
    ReturnRequest {
        id: ReturnRequestId::new(id),
        order_id: OrderId::new("ord_1"),
        status: ReturnStatus::Requested,
        reason: "Damaged".to_string(),
        item_ids: vec![CartItemId::new("itm_1")],
        image_urls: vec![],
        comments: vec![],
        created_at: Utc.with_ymd_and_hms(2026, 8, 2, 9, 0, 0).unwrap(),
    }
}

pub fn return_comment(id: &str, text: &str) -> ReturnComment {
    ReturnComment {
        id: CommentId::new(id),
        author: "Shopper".to_string(),
        text: Some(text.to_string()),
        image_url: None,
        created_at: Utc.with_ymd_and_hms(2026, 8, 3, 9, 0, 0).unwrap(),
    }
}

pub fn server_error(message: &str) -> ApiError {
    ApiError::Status {
        status: 500,
        message: Some(message.to_string()),
    }
}

// =============================================================================
// FakeCartApi
// =============================================================================

/// Scripted cart API. Responses for cart-returning calls are popped in
/// order; running out of scripted responses is a test bug.
#[derive(Clone)]
pub struct FakeCartApi {
    journal: Journal,
    responses: Arc<Mutex<VecDeque<Result<Cart, ApiError>>>>,
    delete_fails: bool,
    pub last_added: Arc<Mutex<Option<NewCartItem>>>,
    pub associations: Arc<Mutex<Vec<(CartId, UserId)>>>,
}

impl FakeCartApi {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            responses: Arc::new(Mutex::new(VecDeque::new())),
            delete_fails: false,
            last_added: Arc::new(Mutex::new(None)),
            associations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make `delete_cart` fail. Set before handing a clone to the store.
    #[must_use]
    pub fn with_failing_delete(mut self) -> Self {
        self.delete_fails = true;
        self
    }

    pub fn script(&self, response: Result<Cart, ApiError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    fn pop(&self) -> Result<Cart, ApiError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("fake cart api: no scripted response left")
    }
}

impl CartApi for FakeCartApi {
    async fn create_cart(&self) -> Result<Cart, ApiError> {
        record(&self.journal, "create_cart");
        self.pop()
    }

    async fn fetch_cart(&self, cart_id: &CartId) -> Result<Cart, ApiError> {
        record(&self.journal, format!("fetch_cart:{cart_id}"));
        self.pop()
    }

    async fn add_cart_item(&self, cart_id: &CartId, item: &NewCartItem) -> Result<Cart, ApiError> {
        record(&self.journal, format!("add_item:{cart_id}"));
        *self.last_added.lock().unwrap() = Some(item.clone());
        self.pop()
    }

    async fn update_cart_item(
        &self,
        cart_id: &CartId,
        item_id: &CartItemId,
        quantity: u32,
    ) -> Result<Cart, ApiError> {
        record(
            &self.journal,
            format!("update_item:{cart_id}:{item_id}:{quantity}"),
        );
        self.pop()
    }

    async fn remove_cart_item(
        &self,
        cart_id: &CartId,
        item_id: &CartItemId,
    ) -> Result<Cart, ApiError> {
        record(&self.journal, format!("remove_item:{cart_id}:{item_id}"));
        self.pop()
    }

    async fn delete_cart(&self, cart_id: &CartId) -> Result<(), ApiError> {
        record(&self.journal, format!("delete_cart:{cart_id}"));
        if self.delete_fails {
            Err(server_error("delete failed"))
        } else {
            Ok(())
        }
    }

    async fn associate_cart(&self, cart_id: &CartId, user_id: &UserId) -> Result<(), ApiError> {
        record(&self.journal, format!("associate:{cart_id}:{user_id}"));
        self.associations
            .lock()
            .unwrap()
            .push((cart_id.clone(), user_id.clone()));
        Ok(())
    }
}

// =============================================================================
// FakeAuthApi
// =============================================================================

#[derive(Clone)]
pub struct FakeAuthApi {
    journal: Journal,
    login_response: Arc<Mutex<Option<Result<AuthSession, ApiError>>>>,
    register_response: Arc<Mutex<Option<Result<AuthSession, ApiError>>>>,
    user_responses: Arc<Mutex<VecDeque<Result<User, ApiError>>>>,
}

impl FakeAuthApi {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            login_response: Arc::new(Mutex::new(None)),
            register_response: Arc::new(Mutex::new(None)),
            user_responses: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    pub fn script_login(&self, response: Result<AuthSession, ApiError>) {
        *self.login_response.lock().unwrap() = Some(response);
    }

    pub fn script_register(&self, response: Result<AuthSession, ApiError>) {
        *self.register_response.lock().unwrap() = Some(response);
    }

    pub fn script_user(&self, response: Result<User, ApiError>) {
        self.user_responses.lock().unwrap().push_back(response);
    }
}

impl AuthApi for FakeAuthApi {
    async fn login(&self, _credentials: &Credentials) -> Result<AuthSession, ApiError> {
        record(&self.journal, "login");
        self.login_response
            .lock()
            .unwrap()
            .take()
            .expect("fake auth api: login not scripted")
    }

    async fn register(&self, _registration: &Registration) -> Result<AuthSession, ApiError> {
        record(&self.journal, "register");
        self.register_response
            .lock()
            .unwrap()
            .take()
            .expect("fake auth api: register not scripted")
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        record(&self.journal, "me");
        self.user_responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("fake auth api: current_user not scripted")
    }
}

// =============================================================================
// FakeOrderApi
// =============================================================================

#[derive(Clone)]
pub struct FakeOrderApi {
    journal: Journal,
    create_response: Arc<Mutex<Option<Result<Order, ApiError>>>>,
    my_orders_response: Arc<Mutex<Option<Result<Vec<Order>, ApiError>>>>,
    guest_responses: Arc<Mutex<VecDeque<Result<Order, ApiError>>>>,
    cancel_response: Arc<Mutex<Option<Result<Order, ApiError>>>>,
    return_response: Arc<Mutex<Option<Result<ReturnRequest, ApiError>>>>,
    comment_response: Arc<Mutex<Option<Result<ReturnComment, ApiError>>>>,
}

impl FakeOrderApi {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            create_response: Arc::new(Mutex::new(None)),
            my_orders_response: Arc::new(Mutex::new(None)),
            guest_responses: Arc::new(Mutex::new(VecDeque::new())),
            cancel_response: Arc::new(Mutex::new(None)),
            return_response: Arc::new(Mutex::new(None)),
            comment_response: Arc::new(Mutex::new(None)),
        }
    }

    pub fn script_create(&self, response: Result<Order, ApiError>) {
        *self.create_response.lock().unwrap() = Some(response);
    }

    pub fn script_my_orders(&self, response: Result<Vec<Order>, ApiError>) {
        *self.my_orders_response.lock().unwrap() = Some(response);
    }

    pub fn script_guest(&self, response: Result<Order, ApiError>) {
        self.guest_responses.lock().unwrap().push_back(response);
    }

    pub fn script_cancel(&self, response: Result<Order, ApiError>) {
        *self.cancel_response.lock().unwrap() = Some(response);
    }

    pub fn script_return(&self, response: Result<ReturnRequest, ApiError>) {
        *self.return_response.lock().unwrap() = Some(response);
    }

    pub fn script_comment(&self, response: Result<ReturnComment, ApiError>) {
        *self.comment_response.lock().unwrap() = Some(response);
    }
}

impl OrderApi for FakeOrderApi {
    async fn create_order(&self, _draft: &OrderDraft) -> Result<Order, ApiError> {
        record(&self.journal, "create_order");
        self.create_response
            .lock()
            .unwrap()
            .take()
            .expect("fake order api: create_order not scripted")
    }

    async fn my_orders(&self) -> Result<Vec<Order>, ApiError> {
        record(&self.journal, "my_orders");
        self.my_orders_response
            .lock()
            .unwrap()
            .take()
            .expect("fake order api: my_orders not scripted")
    }

    async fn guest_order(&self, lookup: &GuestOrderLookup) -> Result<Order, ApiError> {
        record(&self.journal, format!("guest_order:{}", lookup.order_id));
        self.guest_responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("fake order api: guest_order not scripted")
    }

    async fn cancel_order(
        &self,
        order_id: &OrderId,
        _guest_token: Option<&str>,
    ) -> Result<Order, ApiError> {
        record(&self.journal, format!("cancel:{order_id}"));
        self.cancel_response
            .lock()
            .unwrap()
            .take()
            .expect("fake order api: cancel_order not scripted")
    }

    async fn create_return(&self, _draft: &ReturnDraft) -> Result<ReturnRequest, ApiError> {
        record(&self.journal, "create_return");
        self.return_response
            .lock()
            .unwrap()
            .take()
            .expect("fake order api: create_return not scripted")
    }

    async fn create_return_comment(
        &self,
        return_id: &ReturnRequestId,
        _draft: &CommentDraft,
    ) -> Result<ReturnComment, ApiError> {
        record(&self.journal, format!("return_comment:{return_id}"));
        self.comment_response
            .lock()
            .unwrap()
            .take()
            .expect("fake order api: create_return_comment not scripted")
    }
}
