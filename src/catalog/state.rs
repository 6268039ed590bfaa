//! Catalog state and its reducer

use ottica_storefront_core::{
    Brand, Category, FilterUpdate, Product, ProductFilters, Reducer, Resource,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogState {
    pub products: Resource<Vec<Product>>,
    pub total_products: u64,
    pub current_page: u32,
    /// Product shown on the detail page
    pub product: Resource<Option<Product>>,
    pub categories: Resource<Vec<Category>>,
    pub brands: Resource<Vec<Brand>>,
    pub filters: ProductFilters,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self {
            products: Resource::default(),
            total_products: 0,
            current_page: 1,
            product: Resource::default(),
            categories: Resource::default(),
            brands: Resource::default(),
            filters: ProductFilters::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum CatalogAction {
    ProductsRequested,
    ProductsLoaded {
        products: Vec<Product>,
        total: u64,
        page: u32,
    },
    ProductsFailed(String),
    ProductRequested,
    ProductLoaded(Product),
    ProductFailed(String),
    /// Navigation away from the detail page
    ClearProduct,
    CategoriesRequested,
    CategoriesLoaded(Vec<Category>),
    CategoriesFailed(String),
    BrandsRequested,
    BrandsLoaded(Vec<Brand>),
    BrandsFailed(String),
    UpdateFilters(FilterUpdate),
    ClearFilters,
    SetPage(u32),
}

impl Reducer for CatalogState {
    type Action = CatalogAction;

    fn reduce(&mut self, action: CatalogAction) {
        match action {
            CatalogAction::ProductsRequested => self.products.start(),
            CatalogAction::ProductsLoaded {
                products,
                total,
                page,
            } => {
                self.products.resolve(products);
                self.total_products = total;
                self.current_page = page;
            }
            CatalogAction::ProductsFailed(message) => self.products.reject(message),
            CatalogAction::ProductRequested => self.product.start(),
            CatalogAction::ProductLoaded(product) => self.product.resolve(Some(product)),
            CatalogAction::ProductFailed(message) => self.product.reject(message),
            CatalogAction::ClearProduct => {
                self.product.data = None;
                self.product.error = None;
            }
            CatalogAction::CategoriesRequested => self.categories.start(),
            CatalogAction::CategoriesLoaded(categories) => self.categories.resolve(categories),
            CatalogAction::CategoriesFailed(message) => self.categories.reject(message),
            CatalogAction::BrandsRequested => self.brands.start(),
            CatalogAction::BrandsLoaded(brands) => self.brands.resolve(brands),
            CatalogAction::BrandsFailed(message) => self.brands.reject(message),
            CatalogAction::UpdateFilters(update) => self.filters.merge(update),
            CatalogAction::ClearFilters => self.filters.clear(),
            CatalogAction::SetPage(page) => self.current_page = page.max(1),
        }
    }
}

/// Parameters of a product list request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    pub filters: ProductFilters,
    pub page: Option<u32>,
    pub ordering: Option<String>,
}

impl ProductQuery {
    pub fn new(filters: ProductFilters) -> Self {
        Self {
            filters,
            ..Default::default()
        }
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn ordering(mut self, ordering: impl Into<String>) -> Self {
        self.ordering = Some(ordering.into());
        self
    }

    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = self.filters.to_query();
        if let Some(page) = self.page {
            params.push(("page".to_string(), page.to_string()));
        }
        if let Some(ordering) = self.ordering.as_deref().filter(|o| !o.is_empty()) {
            params.push(("ordering".to_string(), ordering.to_string()));
        }
        params
    }
}
