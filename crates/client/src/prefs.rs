//! Persisted locale and currency preferences.
//!
//! Preferences are read from storage at startup and written back on change.
//! The HTTP adapter reads them on every request to build the
//! `Accept-Language` and `X-Currency` headers.

use std::sync::{Arc, Mutex};

use marigold_core::CurrencyCode;

use crate::storage::{KeyValueStorage, keys};

/// Shared handle to the persisted locale and currency preferences.
///
/// Cheaply cloneable; all clones observe the same values.
#[derive(Clone)]
pub struct Preferences {
    inner: Arc<PreferencesInner>,
}

struct PreferencesInner {
    storage: Arc<dyn KeyValueStorage>,
    locale: Mutex<String>,
    currency: Mutex<CurrencyCode>,
}

impl Preferences {
    /// Load preferences from storage, falling back to the given defaults
    /// when a key is absent or unparsable.
    #[must_use]
    pub fn load(
        storage: Arc<dyn KeyValueStorage>,
        default_locale: &str,
        default_currency: CurrencyCode,
    ) -> Self {
        let locale = storage
            .get(keys::LOCALE)
            .unwrap_or_else(|| default_locale.to_owned());
        let currency = storage
            .get(keys::CURRENCY)
            .and_then(|s| s.parse().ok())
            .unwrap_or(default_currency);

        Self {
            inner: Arc::new(PreferencesInner {
                storage,
                locale: Mutex::new(locale),
                currency: Mutex::new(currency),
            }),
        }
    }

    /// Current locale (BCP 47 tag, e.g. `en-US`).
    #[must_use]
    pub fn locale(&self) -> String {
        lock(&self.inner.locale).clone()
    }

    /// Set and persist the locale.
    pub fn set_locale(&self, locale: &str) {
        *lock(&self.inner.locale) = locale.to_owned();
        self.inner.storage.set(keys::LOCALE, locale);
    }

    /// Current currency.
    #[must_use]
    pub fn currency(&self) -> CurrencyCode {
        *lock(&self.inner.currency)
    }

    /// Set and persist the currency.
    pub fn set_currency(&self, currency: CurrencyCode) {
        *lock(&self.inner.currency) = currency;
        self.inner.storage.set(keys::CURRENCY, currency.code());
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}
