//! Cart store

use ottica_storefront_core::{CartAction, Product, ProductId, Variant, VariantId};
use tracing::debug;

use crate::store::StateStore;

pub use ottica_storefront_core::{Cart, CartLine};

/// Observable cart. All operations are synchronous and cannot fail.
pub type CartStore = StateStore<Cart>;

impl CartStore {
    pub fn add_item(&self, product: Product, variant: Option<Variant>, quantity: u32) {
        debug!(product_id = product.id, quantity, "add to cart");
        self.dispatch(CartAction::AddItem {
            product,
            variant,
            quantity,
        });
    }

    pub fn remove_item(&self, product_id: ProductId, variant_id: Option<VariantId>) {
        self.dispatch(CartAction::RemoveItem {
            product_id,
            variant_id,
        });
    }

    pub fn update_quantity(
        &self,
        product_id: ProductId,
        variant_id: Option<VariantId>,
        quantity: i64,
    ) {
        self.dispatch(CartAction::UpdateQuantity {
            product_id,
            variant_id,
            quantity,
        });
    }

    pub fn clear_cart(&self) {
        debug!("clear cart");
        self.dispatch(CartAction::Clear);
    }
}
