//! `reqwest`-backed implementation of the backend API.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use marigold_core::{CartId, CartItemId, OrderId, ProductId, ReturnRequestId, ReviewId, UserId};

use super::{ApiError, AuthApi, CartApi, OrderApi};
use crate::config::ClientConfig;
use crate::prefs::Preferences;
use crate::session::SessionToken;
use crate::storage::KeyValueStorage;
use crate::types::{
    AuthSession, Cart, Category, CommentDraft, Credentials, GuestOrderLookup, NewCartItem, Order,
    OrderDraft, Page, Product, ProductQuery, Registration, ReturnComment, ReturnDraft,
    ReturnRequest, Review, ReviewDraft, SearchQuery, UploadedImage, User,
};

/// Catalog cache TTL.
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Product(ProductId),
    Products {
        page: Option<u32>,
        per_page: Option<u32>,
        category: Option<String>,
    },
    Categories,
    Promotions,
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Product(Box<Product>),
    Products(Page<Product>),
    Categories(Vec<Category>),
    Promotions(Vec<Product>),
}

/// Error envelope the backend uses for non-success responses.
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Body for `PUT /carts/{id}/items/{itemId}`.
#[derive(Debug, Serialize)]
struct QuantityUpdate {
    quantity: u32,
}

/// Body for `POST /carts/{id}/associate`.
#[derive(Debug, Serialize)]
struct CartAssociation<'a> {
    user_id: &'a UserId,
}

/// Body for `POST /orders/{id}/cancel`.
#[derive(Debug, Serialize)]
struct Cancellation<'a> {
    guest_token: Option<&'a str>,
}

/// Client for the Marigold REST API.
///
/// Cheaply cloneable; clones share the HTTP connection pool, the catalog
/// cache, and the session/preference handles.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: String,
    prefs: Preferences,
    session: SessionToken,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// Loads the session token and locale/currency preferences from the
    /// given storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(
        config: &ClientConfig,
        storage: Arc<dyn KeyValueStorage>,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(CACHE_TTL)
            .build();

        let prefs = Preferences::load(
            storage.clone(),
            &config.default_locale,
            config.default_currency,
        );
        let session = SessionToken::load(storage);

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.api_url.as_str().trim_end_matches('/').to_owned(),
                prefs,
                session,
                cache,
            }),
        })
    }

    /// Handle to the persisted locale/currency preferences.
    #[must_use]
    pub fn prefs(&self) -> &Preferences {
        &self.inner.prefs
    }

    /// Handle to the persisted session token.
    #[must_use]
    pub fn session(&self) -> &SessionToken {
        &self.inner.session
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.base_url)
    }

    /// Send a request with the storefront headers attached and map
    /// non-success statuses to [`ApiError`].
    ///
    /// Any 401 clears the session token before returning - the global
    /// interception point for expired or invalidated sessions.
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let mut req = req
            .header(reqwest::header::ACCEPT_LANGUAGE, self.inner.prefs.locale())
            .header("X-Currency", self.inner.prefs.currency().code());

        if let Some(token) = self.inner.session.expose() {
            req = req.bearer_auth(token);
        }

        let response = req.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            debug!("Received 401, invalidating session token");
            self.inner.session.clear();
            return Err(ApiError::Unauthorized);
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(response.url().path().to_owned()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message);

            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );

            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.inner.http.get(self.endpoint(path))).await?;
        Self::decode(response).await
    }

    async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self
            .send(self.inner.http.get(self.endpoint(path)).query(query))
            .await?;
        Self::decode(response).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .send(self.inner.http.post(self.endpoint(path)).json(body))
            .await?;
        Self::decode(response).await
    }

    /// POST where only the status matters.
    async fn post_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        self.send(self.inner.http.post(self.endpoint(path)).json(body))
            .await?;
        Ok(())
    }

    async fn put_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .send(self.inner.http.put(self.endpoint(path)).json(body))
            .await?;
        Self::decode(response).await
    }

    async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .send(self.inner.http.delete(self.endpoint(path)))
            .await?;
        Self::decode(response).await
    }

    async fn delete_unit(&self, path: &str) -> Result<(), ApiError> {
        self.send(self.inner.http.delete(self.endpoint(path)))
            .await?;
        Ok(())
    }

    // =========================================================================
    // Catalog Methods (cached)
    // =========================================================================

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: &ProductId) -> Result<Product, ApiError> {
        let cache_key = CacheKey::Product(product_id.clone());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self
            .get_json(&format!("products/id/{product_id}"))
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get a paginated product listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<Page<Product>, ApiError> {
        let cache_key = CacheKey::Products {
            page: query.page,
            per_page: query.per_page,
            category: query.category.as_ref().map(ToString::to_string),
        };

        if let Some(CacheValue::Products(page)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(page);
        }

        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(page) = query.page {
            params.push(("page", page.to_string()));
        }
        if let Some(per_page) = query.per_page {
            params.push(("per_page", per_page.to_string()));
        }
        if let Some(category) = &query.category {
            params.push(("category", category.to_string()));
        }

        let page: Page<Product> = self.get_json_with_query("products", &params).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(page.clone()))
            .await;

        Ok(page)
    }

    /// List all product categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = self.get_json("products/categories").await?;

        self.inner
            .cache
            .insert(CacheKey::Categories, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// List currently promoted products.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_promotions(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Promotions(products)) =
            self.inner.cache.get(&CacheKey::Promotions).await
        {
            debug!("Cache hit for promotions");
            return Ok(products);
        }

        let products: Vec<Product> = self.get_json("products/promotions").await?;

        self.inner
            .cache
            .insert(CacheKey::Promotions, CacheValue::Promotions(products.clone()))
            .await;

        Ok(products)
    }

    /// Full-text product search. Never cached; the backend owns the index.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(q = %query.q))]
    pub async fn search_products(&self, query: &SearchQuery) -> Result<Page<Product>, ApiError> {
        let mut params: Vec<(&str, String)> = vec![("q", query.q.clone())];
        if let Some(min) = query.min_price {
            params.push(("min_price", min.to_string()));
        }
        if let Some(max) = query.max_price {
            params.push(("max_price", max.to_string()));
        }
        if let Some(page) = query.page {
            params.push(("page", page.to_string()));
        }

        self.get_json_with_query("search/products", &params).await
    }

    /// Drop all cached catalog data.
    pub async fn invalidate_catalog_cache(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }

    // =========================================================================
    // Review Methods
    // =========================================================================

    /// List reviews for a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn product_reviews(&self, product_id: &ProductId) -> Result<Vec<Review>, ApiError> {
        self.get_json(&format!("reviews/product/{product_id}")).await
    }

    /// Create a review.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the caller is not signed in.
    #[instrument(skip(self, draft))]
    pub async fn create_review(&self, draft: &ReviewDraft) -> Result<Review, ApiError> {
        self.post_json("reviews", draft).await
    }

    /// Update an existing review.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the review is not the
    /// caller's.
    #[instrument(skip(self, draft), fields(review_id = %review_id))]
    pub async fn update_review(
        &self,
        review_id: &ReviewId,
        draft: &ReviewDraft,
    ) -> Result<Review, ApiError> {
        self.put_json(&format!("reviews/{review_id}"), draft).await
    }

    /// Delete a review.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(review_id = %review_id))]
    pub async fn delete_review(&self, review_id: &ReviewId) -> Result<(), ApiError> {
        self.delete_unit(&format!("reviews/{review_id}")).await
    }

    // =========================================================================
    // Image Upload
    // =========================================================================

    /// Upload an image and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload fails.
    #[instrument(skip(self, bytes), fields(file_name = %file_name, size = bytes.len()))]
    pub async fn upload_image(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedImage, ApiError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_owned());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .send(
                self.inner
                    .http
                    .post(self.endpoint("images/upload"))
                    .multipart(form),
            )
            .await?;

        Self::decode(response).await
    }
}

// =============================================================================
// Cart endpoints (not cached - mutable state)
// =============================================================================

impl CartApi for ApiClient {
    async fn create_cart(&self) -> Result<Cart, ApiError> {
        debug!("Creating cart");
        self.post_json("carts", &serde_json::json!({})).await
    }

    async fn fetch_cart(&self, cart_id: &CartId) -> Result<Cart, ApiError> {
        self.get_json(&format!("carts/{cart_id}")).await
    }

    async fn add_cart_item(&self, cart_id: &CartId, item: &NewCartItem) -> Result<Cart, ApiError> {
        debug!(cart_id = %cart_id, variant_id = %item.variant_id, "Adding cart item");
        self.post_json(&format!("carts/{cart_id}/items"), item).await
    }

    async fn update_cart_item(
        &self,
        cart_id: &CartId,
        item_id: &CartItemId,
        quantity: u32,
    ) -> Result<Cart, ApiError> {
        self.put_json(
            &format!("carts/{cart_id}/items/{item_id}"),
            &QuantityUpdate { quantity },
        )
        .await
    }

    async fn remove_cart_item(
        &self,
        cart_id: &CartId,
        item_id: &CartItemId,
    ) -> Result<Cart, ApiError> {
        self.delete_json(&format!("carts/{cart_id}/items/{item_id}"))
            .await
    }

    async fn delete_cart(&self, cart_id: &CartId) -> Result<(), ApiError> {
        self.delete_unit(&format!("carts/{cart_id}")).await
    }

    async fn associate_cart(&self, cart_id: &CartId, user_id: &UserId) -> Result<(), ApiError> {
        debug!(cart_id = %cart_id, user_id = %user_id, "Associating cart with user");
        self.post_unit(
            &format!("carts/{cart_id}/associate"),
            &CartAssociation { user_id },
        )
        .await
    }
}

// =============================================================================
// Auth endpoints
// =============================================================================

impl AuthApi for ApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<AuthSession, ApiError> {
        self.post_json("auth/login", credentials).await
    }

    async fn register(&self, registration: &Registration) -> Result<AuthSession, ApiError> {
        self.post_json("auth/register", registration).await
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.get_json("auth/me").await
    }
}

// =============================================================================
// Order endpoints
// =============================================================================

impl OrderApi for ApiClient {
    async fn create_order(&self, draft: &OrderDraft) -> Result<Order, ApiError> {
        debug!(cart_id = %draft.cart_id, "Creating order");
        self.post_json("orders", draft).await
    }

    async fn my_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get_json("orders/my-orders").await
    }

    async fn guest_order(&self, lookup: &GuestOrderLookup) -> Result<Order, ApiError> {
        self.post_json("orders/guest-lookup", lookup).await
    }

    async fn cancel_order(
        &self,
        order_id: &OrderId,
        guest_token: Option<&str>,
    ) -> Result<Order, ApiError> {
        self.post_json(
            &format!("orders/{order_id}/cancel"),
            &Cancellation { guest_token },
        )
        .await
    }

    async fn create_return(&self, draft: &ReturnDraft) -> Result<ReturnRequest, ApiError> {
        self.post_json("orders/returns", draft).await
    }

    async fn create_return_comment(
        &self,
        return_id: &ReturnRequestId,
        draft: &CommentDraft,
    ) -> Result<ReturnComment, ApiError> {
        self.post_json(&format!("orders/returns/{return_id}/comments"), draft)
            .await
    }
}
