//! Shared storefront resources.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::addresses::AddressBook;
use crate::api::ApiClient;
use crate::auth::SessionService;
use crate::cart::CartService;
use crate::checkout::{CheckoutService, ReadinessGate};
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::orders::OrderService;
use crate::store::StateStore;
use crate::wishlist::WishlistService;

/// The storefront client: configuration, persisted state, and the API
/// client, bundled behind an `Arc` so it clones cheaply.
///
/// Services are constructed on demand and borrow these shared resources.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    store: StateStore,
    api: ApiClient,
    submission_in_flight: AtomicBool,
}

impl Storefront {
    /// Initialize the storefront client.
    ///
    /// Opens (and migrates, if needed) the state file, builds the API
    /// client, and restores the bearer token from a persisted session.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file is unreadable or the HTTP client
    /// cannot be built.
    pub fn init(config: StorefrontConfig) -> Result<Self> {
        let store = StateStore::open(config.state_path.clone())?;
        let api = ApiClient::new(&config)?;

        let storefront = Self {
            inner: Arc::new(StorefrontInner {
                config,
                store,
                api,
                submission_in_flight: AtomicBool::new(false),
            }),
        };

        storefront.sessions().restore();
        Ok(storefront)
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the state store.
    #[must_use]
    pub fn store(&self) -> &StateStore {
        &self.inner.store
    }

    /// Get a reference to the API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Cart operations.
    #[must_use]
    pub fn cart(&self) -> CartService<'_> {
        CartService::new(&self.inner.store)
    }

    /// Wishlist operations.
    #[must_use]
    pub fn wishlist(&self) -> WishlistService<'_> {
        WishlistService::new(&self.inner.store)
    }

    /// Session operations.
    #[must_use]
    pub fn sessions(&self) -> SessionService<'_> {
        SessionService::new(&self.inner.store, &self.inner.api)
    }

    /// Address book operations.
    #[must_use]
    pub fn addresses(&self) -> AddressBook<'_> {
        AddressBook::new(&self.inner.store, &self.inner.api)
    }

    /// Order history operations.
    #[must_use]
    pub fn orders(&self) -> OrderService<'_> {
        OrderService::new(&self.inner.api)
    }

    /// The checkout readiness gate.
    #[must_use]
    pub fn gate(&self) -> ReadinessGate<'_> {
        ReadinessGate::new(&self.inner.store, &self.inner.api)
    }

    /// The checkout flow.
    #[must_use]
    pub fn checkout(&self) -> CheckoutService<'_> {
        CheckoutService::new(
            &self.inner.store,
            &self.inner.api,
            &self.inner.submission_in_flight,
        )
    }
}
