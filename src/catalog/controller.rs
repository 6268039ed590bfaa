//! Criteria changes that reload the product list

use std::sync::Arc;

use ottica_storefront_core::{FilterUpdate, Product};
use tracing::debug;

use super::{CatalogStore, ProductQuery};
use crate::error::Error;

/// Couples filter and page changes to a product list reload.
///
/// Each method mutates the criteria first and then fetches from the state
/// that results, so the request always matches what the store shows.
#[derive(Debug, Clone)]
pub struct CatalogController {
    store: Arc<CatalogStore>,
}

impl CatalogController {
    pub fn new(store: Arc<CatalogStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<CatalogStore> {
        &self.store
    }

    /// Merge `update` into the filters and reload from the first page.
    pub async fn apply_filters(&self, update: FilterUpdate) -> Result<Vec<Product>, Error> {
        debug!(?update, "applying filters");
        self.store.update_filters(update);
        self.store.set_page(1);
        self.refresh().await
    }

    pub async fn reset_filters(&self) -> Result<Vec<Product>, Error> {
        self.store.clear_filters();
        self.store.set_page(1);
        self.refresh().await
    }

    pub async fn go_to_page(&self, page: u32) -> Result<Vec<Product>, Error> {
        self.store.set_page(page);
        self.refresh().await
    }

    /// Reload with the current criteria and page
    pub async fn refresh(&self) -> Result<Vec<Product>, Error> {
        let query = ProductQuery::new(self.store.filters()).page(self.store.current_page());
        self.store.fetch_products(&query).await
    }
}
