//! Shared command context: configuration, storage, client, and stores.

use std::sync::Arc;

use marigold_client::api::ApiClient;
use marigold_client::config::ClientConfig;
use marigold_client::notify::{Notice, NoticeLevel, Notifier};
use marigold_client::storage::{FileStorage, KeyValueStorage};
use marigold_client::stores::{AuthStore, CartStore, OrderStore};

use super::CliError;

/// Prints notices to stderr so they interleave with command output without
/// corrupting it.
struct TermNotifier;

impl Notifier for TermNotifier {
    fn notify(&self, notice: Notice) {
        let tag = match notice.level {
            NoticeLevel::Info => "·",
            NoticeLevel::Success => "✓",
            NoticeLevel::Error => "✗",
        };
        eprintln!("{tag} {}", notice.message);
    }
}

/// Everything a command needs, wired once per invocation.
pub struct Context {
    pub client: ApiClient,
    pub cart: Arc<CartStore<ApiClient>>,
    pub auth: AuthStore<ApiClient, CartStore<ApiClient>>,
    pub orders: OrderStore<ApiClient, CartStore<ApiClient>>,
}

impl Context {
    /// Load configuration, open the state file, and build the store graph.
    pub fn load() -> Result<Self, CliError> {
        let config = ClientConfig::from_env()?;
        let storage: Arc<dyn KeyValueStorage> = Arc::new(FileStorage::open(&config.state_file)?);
        let notifier: Arc<dyn Notifier> = Arc::new(TermNotifier);

        let client = ApiClient::new(&config, storage.clone())?;

        let cart = Arc::new(CartStore::new(
            client.clone(),
            storage,
            notifier.clone(),
        ));
        // The auth store must share the client's own session handle: a
        // second `SessionToken::load` over the same storage would not see
        // tokens set in memory by the other, so the profile fetch right
        // after login would go out unauthenticated.
        let auth = AuthStore::new(
            client.clone(),
            cart.clone(),
            client.session().clone(),
            notifier.clone(),
        );
        let orders = OrderStore::new(client.clone(), cart.clone(), notifier);

        Ok(Self {
            client,
            cart,
            auth,
            orders,
        })
    }
}
