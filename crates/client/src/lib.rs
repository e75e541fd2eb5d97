//! Marigold storefront client SDK.
//!
//! A state-synchronization layer over the Marigold REST backend. The server
//! is the source of truth for cart and order contents; this crate owns the
//! client-side mirrors, the durable identifiers that survive restarts, and
//! the rules for reconciling an anonymous cart with a user identity.
//!
//! # Architecture
//!
//! - [`api::ApiClient`] - HTTP adapter over the backend REST surface. Injects
//!   locale/currency/auth headers on every request and intercepts 401
//!   responses to invalidate the session.
//! - [`stores`] - Cart, auth, and order state stores. Each store publishes
//!   its state through a `tokio::sync::watch` channel; UIs subscribe and
//!   re-render on change. Every mutation replaces local state with the full
//!   server response, never patches it.
//! - [`storage`] - Durable client-local key-value storage (session token,
//!   cart identifier, locale and currency preferences).
//! - [`notify`] - Notification surface for user-visible messages (toasts).
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use marigold_client::{api::ApiClient, config::ClientConfig};
//! use marigold_client::notify::LogNotifier;
//! use marigold_client::storage::FileStorage;
//! use marigold_client::stores::CartStore;
//!
//! let config = ClientConfig::from_env()?;
//! let storage = Arc::new(FileStorage::open("state.json")?);
//! let notifier = Arc::new(LogNotifier);
//! let client = ApiClient::new(&config, storage.clone())?;
//!
//! let cart = CartStore::new(client.clone(), storage, notifier);
//! cart.initialize().await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod notify;
pub mod prefs;
pub mod session;
pub mod storage;
pub mod stores;
pub mod types;
