//! Product catalog
//!
//! [`CatalogStore`] fetches products, categories and brands and keeps the
//! active filter criteria. Filter changes alone never hit the network; use
//! [`CatalogController`] to change criteria and reload in one step.

mod controller;
mod state;

use std::sync::Arc;

use ottica_storefront_core::{
    Brand, Category, FilterUpdate, Paginated, Product, ProductFilters,
};
use ottica_storefront_gateway::Gateway;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::Error;
use crate::store::StateStore;

pub use controller::CatalogController;
pub use state::{CatalogAction, CatalogState, ProductQuery};

const PRODUCTS_PATH: &str = "/products/";
const CATEGORIES_PATH: &str = "/products/categories/";
const BRANDS_PATH: &str = "/products/brands/";

pub struct CatalogStore {
    gateway: Arc<Gateway>,
    state: StateStore<CatalogState>,
}

impl CatalogStore {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self {
            gateway,
            state: StateStore::default(),
        }
    }

    pub fn state(&self) -> CatalogState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<CatalogState> {
        self.state.subscribe()
    }

    pub fn filters(&self) -> ProductFilters {
        self.state.read(|s| s.filters.clone())
    }

    pub fn current_page(&self) -> u32 {
        self.state.read(|s| s.current_page)
    }

    /// Load a page of products. Accepts both the paginated and the bare list
    /// response.
    pub async fn fetch_products(&self, query: &ProductQuery) -> Result<Vec<Product>, Error> {
        let params = query.to_params();
        debug!(?params, "fetching products");
        self.state.dispatch(CatalogAction::ProductsRequested);

        match self
            .gateway
            .get::<Paginated<Product>>(PRODUCTS_PATH, &params)
            .await
        {
            Ok(page) => {
                let (products, total) = page.into_parts();
                self.state.dispatch(CatalogAction::ProductsLoaded {
                    products: products.clone(),
                    total,
                    page: query.page.unwrap_or(1),
                });
                Ok(products)
            }
            Err(err) => {
                warn!(error = %err, "product list failed");
                self.state.dispatch(CatalogAction::ProductsFailed(
                    err.describe("Errore nel caricamento prodotti"),
                ));
                Err(err.into())
            }
        }
    }

    pub async fn fetch_product_detail(&self, slug: &str) -> Result<Product, Error> {
        self.state.dispatch(CatalogAction::ProductRequested);

        let path = match product_path(slug) {
            Some(path) => path,
            None => {
                warn!(slug, "rejected product slug");
                self.state.dispatch(CatalogAction::ProductFailed(
                    "Errore nel caricamento prodotto".to_string(),
                ));
                return Err(Error::InvalidSlug(slug.to_string()));
            }
        };
        match self.gateway.get::<Product>(&path, &[]).await {
            Ok(product) => {
                self.state
                    .dispatch(CatalogAction::ProductLoaded(product.clone()));
                Ok(product)
            }
            Err(err) => {
                warn!(slug, error = %err, "product detail failed");
                self.state.dispatch(CatalogAction::ProductFailed(
                    err.describe("Errore nel caricamento prodotto"),
                ));
                Err(err.into())
            }
        }
    }

    pub fn clear_product_detail(&self) {
        self.state.dispatch(CatalogAction::ClearProduct);
    }

    pub async fn fetch_categories(&self) -> Result<Vec<Category>, Error> {
        self.state.dispatch(CatalogAction::CategoriesRequested);

        match self
            .gateway
            .get::<Paginated<Category>>(CATEGORIES_PATH, &[])
            .await
        {
            Ok(page) => {
                let categories = page.into_items();
                self.state
                    .dispatch(CatalogAction::CategoriesLoaded(categories.clone()));
                Ok(categories)
            }
            Err(err) => {
                warn!(error = %err, "categories failed");
                self.state.dispatch(CatalogAction::CategoriesFailed(
                    "Errore nel caricamento categorie".to_string(),
                ));
                Err(err.into())
            }
        }
    }

    pub async fn fetch_brands(&self) -> Result<Vec<Brand>, Error> {
        self.state.dispatch(CatalogAction::BrandsRequested);

        match self.gateway.get::<Paginated<Brand>>(BRANDS_PATH, &[]).await {
            Ok(page) => {
                let brands = page.into_items();
                self.state.dispatch(CatalogAction::BrandsLoaded(brands.clone()));
                Ok(brands)
            }
            Err(err) => {
                warn!(error = %err, "brands failed");
                self.state.dispatch(CatalogAction::BrandsFailed(
                    "Errore nel caricamento marchi".to_string(),
                ));
                Err(err.into())
            }
        }
    }

    /// Merge into the current criteria. Does not fetch.
    pub fn update_filters(&self, update: FilterUpdate) {
        self.state.dispatch(CatalogAction::UpdateFilters(update));
    }

    /// Restore the default criteria. Does not fetch.
    pub fn clear_filters(&self) {
        self.state.dispatch(CatalogAction::ClearFilters);
    }

    pub(crate) fn set_page(&self, page: u32) {
        self.state.dispatch(CatalogAction::SetPage(page));
    }
}

/// Detail path for a slug, encoded as a single path segment.
fn product_path(slug: &str) -> Option<String> {
    if matches!(slug.trim(), "" | "." | "..") {
        return None;
    }
    Some(format!("{}{}/", PRODUCTS_PATH, urlencoding::encode(slug)))
}

impl std::fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogStore")
            .field("gateway", &self.gateway)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_path_encodes_one_segment() {
        assert_eq!(product_path("aviator").as_deref(), Some("/products/aviator/"));
        assert_eq!(
            product_path("../auth/profile").as_deref(),
            Some("/products/..%2Fauth%2Fprofile/")
        );
        assert_eq!(
            product_path("lenti?page=2#top").as_deref(),
            Some("/products/lenti%3Fpage%3D2%23top/")
        );
        assert!(product_path("..").is_none());
        assert!(product_path(".").is_none());
        assert!(product_path("").is_none());
    }
}
