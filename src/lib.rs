//! Ottica storefront client
//!
//! Client-side state for the Ottica storefront: the customer session, the
//! shopping cart, the product catalog and the store locator. All network
//! traffic goes through a shared [`Gateway`] that refreshes expired access
//! tokens transparently.
//!
//! ```no_run
//! use ottica_storefront::prelude::*;
//!
//! # async fn run() -> ottica_storefront::error::Result<()> {
//! let storefront = Storefront::new(ClientOptions::default())?;
//! storefront
//!     .session()
//!     .login(&LoginCredentials::new("mario", "segreta"))
//!     .await?;
//! storefront.catalog_controller().apply_filters(FilterUpdate::category("occhiali-sole")).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod store;
pub mod stores;

use std::sync::{Arc, Weak};

use ottica_storefront_gateway::{Gateway, GatewayEvent};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::auth::SessionStore;
use crate::cart::CartStore;
use crate::catalog::{CatalogController, CatalogStore};
use crate::config::ClientOptions;
use crate::error::{Error, Result};
use crate::stores::StoreLocator;

/// The storefront client: one gateway shared by every store
pub struct Storefront {
    gateway: Arc<Gateway>,
    session: Arc<SessionStore>,
    cart: CartStore,
    catalog: Arc<CatalogStore>,
    locator: StoreLocator,
    options: ClientOptions,
}

impl Storefront {
    /// Create a client.
    ///
    /// When called inside a tokio runtime, a background task is started
    /// that resets the session whenever the gateway gives up on refreshing
    /// it. Outside a runtime call [`Storefront::spawn_session_watcher`]
    /// once one is available.
    pub fn new(options: ClientOptions) -> Result<Self> {
        url::Url::parse(&options.api_url)?;
        let gateway = Gateway::new(&options.api_url, options.gateway_options())
            .map_err(Error::from)?;
        let storefront = Self::with_gateway(Arc::new(gateway), options);

        if tokio::runtime::Handle::try_current().is_ok() {
            storefront.spawn_session_watcher();
        }
        Ok(storefront)
    }

    /// Create a client configured from the environment
    pub fn from_env() -> Result<Self> {
        Self::new(ClientOptions::from_env()?)
    }

    /// Build the stores around an existing gateway
    pub fn with_gateway(gateway: Arc<Gateway>, options: ClientOptions) -> Self {
        Self {
            session: Arc::new(SessionStore::new(gateway.clone())),
            cart: CartStore::default(),
            catalog: Arc::new(CatalogStore::new(gateway.clone())),
            locator: StoreLocator::new(gateway.clone(), options.map_config),
            gateway,
            options,
        }
    }

    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn catalog_controller(&self) -> CatalogController {
        CatalogController::new(self.catalog.clone())
    }

    pub fn locator(&self) -> &StoreLocator {
        &self.locator
    }

    /// Forward gateway session invalidations to the session store.
    ///
    /// The task ends when either the gateway or the session store is
    /// dropped.
    pub fn spawn_session_watcher(&self) -> JoinHandle<()> {
        let events = self.gateway.subscribe();
        let session = Arc::downgrade(&self.session);
        tokio::spawn(watch_session(events, session))
    }
}

async fn watch_session(mut events: broadcast::Receiver<GatewayEvent>, session: Weak<SessionStore>) {
    loop {
        match events.recv().await {
            Ok(event) => match session.upgrade() {
                Some(session) => session.handle_event(&event),
                None => break,
            },
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "session watcher lagged behind gateway events");
            }
            Err(RecvError::Closed) => break,
        }
    }
    debug!("session watcher stopped");
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("gateway", &self.gateway)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

pub mod prelude {
    pub use crate::auth::{
        LoginCredentials, RegistrationData, SessionState, SessionStatus, SessionStore,
    };
    pub use crate::cart::CartStore;
    pub use crate::catalog::{CatalogController, CatalogState, CatalogStore, ProductQuery};
    pub use crate::config::ClientOptions;
    pub use crate::error::{Error, ErrorKind};
    pub use crate::stores::{LocatorState, MapSurface, MapView, StoreLocator};
    pub use crate::Storefront;
    pub use ottica_storefront_core::{
        Brand, Cart, Category, FilterUpdate, Product, ProductFilters, Store, User, Variant,
    };
    pub use ottica_storefront_gateway::GatewayEvent;
}
