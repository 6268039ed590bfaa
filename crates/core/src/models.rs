//! Catalog, store and account models as served by the storefront API

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type ProductId = i64;
pub type VariantId = i64;
pub type StoreId = i64;

/// Product category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub parent: Option<i64>,
    #[serde(default)]
    pub sort_order: i32,
}

/// Product brand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

/// Product image in the detail gallery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: i64,
    pub image: String,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}

/// A purchasable variant of a product (size, colour, lens option...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Variant-specific price, overriding the product base price when set
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Product as returned by both the list and the detail endpoints.
///
/// The list endpoint omits the gallery and variants, so those default to
/// empty collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub sku: Option<String>,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub brand: Option<Brand>,
    pub base_price: Decimal,
    #[serde(default)]
    pub main_image: Option<String>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_prescription_required: bool,
    #[serde(default)]
    pub requires_measurement: bool,
}

impl Product {
    pub fn variant(&self, id: VariantId) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == id)
    }

    /// Unit price for this product, optionally in a given variant.
    pub fn unit_price(&self, variant: Option<&Variant>) -> Decimal {
        variant.and_then(|v| v.price).unwrap_or(self.base_price)
    }
}

/// Physical shop shown on the store locator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub latitude: Option<Decimal>,
    #[serde(default)]
    pub longitude: Option<Decimal>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub optician_name: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<serde_json::Value>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Store {
    /// Coordinates of the store, if both latitude and longitude are known.
    pub fn position(&self) -> Option<LatLng> {
        let lat = self.latitude?.to_f64()?;
        let lng = self.longitude?.to_f64()?;
        Some(LatLng { lat, lng })
    }
}

/// Geographic coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Initial viewport for the store map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    pub center: LatLng,
    pub zoom: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        // Palermo
        Self {
            center: LatLng {
                lat: 38.1157,
                lng: 13.3613,
            },
            zoom: 12,
        }
    }
}

/// Response of `GET /stores/map-data/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    pub stores: Vec<Store>,
    #[serde(default)]
    pub map_config: MapConfig,
}

/// Authenticated customer account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl User {
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) if !first.is_empty() => format!("{} {}", first, last),
            (Some(first), _) if !first.is_empty() => first.clone(),
            _ => self.email.clone(),
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_accepts_string_prices() {
        let product: Product = serde_json::from_value(json!({
            "id": 7,
            "sku": "RB-3025",
            "name": "Aviator",
            "slug": "aviator",
            "base_price": "149.90",
            "variants": [{ "id": 70, "price": "159.90" }, { "id": 71 }]
        }))
        .unwrap();

        assert_eq!(product.base_price, Decimal::new(14990, 2));
        assert!(product.is_active);
        assert_eq!(
            product.unit_price(product.variant(70)),
            Decimal::new(15990, 2)
        );
        assert_eq!(product.unit_price(product.variant(71)), product.base_price);
        assert_eq!(product.unit_price(None), product.base_price);
    }

    #[test]
    fn test_store_position_requires_both_coordinates() {
        let mut store: Store = serde_json::from_value(json!({
            "id": 1,
            "name": "Ottica Centro",
            "address": "Via Roma 1",
            "latitude": "38.115700",
            "longitude": "13.361300"
        }))
        .unwrap();

        let pos = store.position().unwrap();
        assert!((pos.lat - 38.1157).abs() < 1e-9);
        assert!((pos.lng - 13.3613).abs() < 1e-9);

        store.longitude = None;
        assert!(store.position().is_none());
    }

    #[test]
    fn test_map_data_defaults_config() {
        let data: MapData = serde_json::from_value(json!({ "stores": [] })).unwrap();
        assert_eq!(data.map_config, MapConfig::default());
    }

    #[test]
    fn test_user_display_name() {
        let user: User = serde_json::from_value(json!({
            "id": 3,
            "email": "mario@example.com",
            "first_name": "Mario",
            "last_name": "Rossi",
            "date_joined": "2024-01-01"
        }))
        .unwrap();
        assert_eq!(user.display_name(), "Mario Rossi");
        assert!(user.extra.contains_key("date_joined"));
    }
}
