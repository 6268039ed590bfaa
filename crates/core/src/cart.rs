//! Shopping cart aggregate
//!
//! Lines are unique by [`LineKey`] (product id plus optional variant id).
//! The unit price of a line is frozen when the line is first created, so a
//! later catalog price change never alters what is already in the cart.
//! `items_count` and `total` are derived from the lines after every action.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Product, ProductId, Variant, VariantId};
use crate::Reducer;

/// Identity of a cart line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
}

impl LineKey {
    pub fn new(product_id: ProductId, variant_id: Option<VariantId>) -> Self {
        Self {
            product_id,
            variant_id,
        }
    }
}

/// A product (and optional variant) in the cart with its captured price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub variant: Option<Variant>,
    pub quantity: u32,
    /// Unit price captured when the line was created
    pub price: Decimal,
}

impl CartLine {
    pub fn key(&self) -> LineKey {
        LineKey::new(self.product.id, self.variant.as_ref().map(|v| v.id))
    }

    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Cart mutations
#[derive(Debug, Clone)]
pub enum CartAction {
    AddItem {
        product: Product,
        variant: Option<Variant>,
        quantity: u32,
    },
    RemoveItem {
        product_id: ProductId,
        variant_id: Option<VariantId>,
    },
    /// Sets the quantity of an existing line. Zero or negative removes it.
    UpdateQuantity {
        product_id: ProductId,
        variant_id: Option<VariantId>,
        quantity: i64,
    },
    Clear,
}

impl CartAction {
    /// Adds a single unit, the default quantity of the add operation.
    pub fn add(product: Product, variant: Option<Variant>) -> Self {
        CartAction::AddItem {
            product,
            variant,
            quantity: 1,
        }
    }
}

/// The cart aggregate
///
/// Only the lines are read back when deserializing; the aggregates are
/// always derived from them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "CartLines")]
pub struct Cart {
    items: Vec<CartLine>,
    total: Decimal,
    items_count: u32,
}

#[derive(Deserialize)]
struct CartLines {
    #[serde(default)]
    items: Vec<CartLine>,
}

impl From<CartLines> for Cart {
    fn from(lines: CartLines) -> Self {
        let mut cart = Cart::new();
        for line in lines.items {
            if line.quantity == 0 {
                continue;
            }
            let key = line.key();
            match cart.items.iter_mut().find(|l| l.key() == key) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity)
                }
                None => cart.items.push(line),
            }
        }
        cart.recompute();
        cart
    }
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartLine] {
        &self.items
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn items_count(&self) -> u32 {
        self.items_count
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn line(&self, product_id: ProductId, variant_id: Option<VariantId>) -> Option<&CartLine> {
        let key = LineKey::new(product_id, variant_id);
        self.items.iter().find(|line| line.key() == key)
    }

    /// Adds `quantity` units of a product. An existing line keeps its
    /// captured price and only grows in quantity. A zero quantity is ignored.
    pub fn add_item(&mut self, product: Product, variant: Option<Variant>, quantity: u32) {
        if quantity == 0 {
            return;
        }

        let key = LineKey::new(product.id, variant.as_ref().map(|v| v.id));
        match self.items.iter_mut().find(|line| line.key() == key) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => {
                let price = product.unit_price(variant.as_ref());
                self.items.push(CartLine {
                    product,
                    variant,
                    quantity,
                    price,
                });
            }
        }

        self.recompute();
    }

    pub fn remove_item(&mut self, product_id: ProductId, variant_id: Option<VariantId>) {
        let key = LineKey::new(product_id, variant_id);
        self.items.retain(|line| line.key() != key);
        self.recompute();
    }

    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        variant_id: Option<VariantId>,
        quantity: i64,
    ) {
        if quantity <= 0 {
            self.remove_item(product_id, variant_id);
            return;
        }

        let key = LineKey::new(product_id, variant_id);
        if let Some(line) = self.items.iter_mut().find(|line| line.key() == key) {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }

        self.recompute();
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.total = Decimal::ZERO;
        self.items_count = 0;
    }

    fn recompute(&mut self) {
        self.items_count = self
            .items
            .iter()
            .fold(0u32, |count, line| count.saturating_add(line.quantity));
        self.total = self.items.iter().map(CartLine::subtotal).sum();
    }
}

impl Reducer for Cart {
    type Action = CartAction;

    fn reduce(&mut self, action: CartAction) {
        match action {
            CartAction::AddItem {
                product,
                variant,
                quantity,
            } => self.add_item(product, variant, quantity),
            CartAction::RemoveItem {
                product_id,
                variant_id,
            } => self.remove_item(product_id, variant_id),
            CartAction::UpdateQuantity {
                product_id,
                variant_id,
                quantity,
            } => self.update_quantity(product_id, variant_id, quantity),
            CartAction::Clear => self.clear(),
        }
    }
}
