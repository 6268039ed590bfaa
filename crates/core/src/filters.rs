//! Product list filter criteria

use serde::{Deserialize, Serialize};

/// Inclusive price bounds selected in the catalog sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: u32,
    pub max: u32,
}

impl Default for PriceRange {
    fn default() -> Self {
        Self { min: 0, max: 1000 }
    }
}

/// Active filter criteria of the product list.
///
/// Empty strings mean "no filter" for category, brand and search.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilters {
    pub category: String,
    pub brand: String,
    pub price_range: PriceRange,
    pub search: String,
}

/// Partial update merged into [`ProductFilters`]; `None` keeps the current
/// value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterUpdate {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price_range: Option<PriceRange>,
    pub search: Option<String>,
}

impl FilterUpdate {
    pub fn category(slug: impl Into<String>) -> Self {
        Self {
            category: Some(slug.into()),
            ..Default::default()
        }
    }

    pub fn brand(slug: impl Into<String>) -> Self {
        Self {
            brand: Some(slug.into()),
            ..Default::default()
        }
    }

    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Default::default()
        }
    }

    pub fn price_range(min: u32, max: u32) -> Self {
        Self {
            price_range: Some(PriceRange { min, max }),
            ..Default::default()
        }
    }
}

impl ProductFilters {
    pub fn merge(&mut self, update: FilterUpdate) {
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(brand) = update.brand {
            self.brand = brand;
        }
        if let Some(price_range) = update.price_range {
            self.price_range = price_range;
        }
        if let Some(search) = update.search {
            self.search = search;
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Query parameters understood by `GET /products/`.
    ///
    /// The price range is not forwarded; the product endpoint has no price
    /// filter.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        let search = self.search.trim();
        if !search.is_empty() {
            params.push(("search".to_string(), search.to_string()));
        }
        if !self.category.is_empty() {
            params.push(("category__slug".to_string(), self.category.clone()));
        }
        if !self.brand.is_empty() {
            params.push(("brand__slug".to_string(), self.brand.clone()));
        }
        params
    }
}
