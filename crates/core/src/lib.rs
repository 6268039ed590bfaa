//! Ottica storefront core
//!
//! Pure domain layer shared by the storefront client: catalog and store
//! models, the cart aggregate with its reducer, product filter criteria and
//! the pagination envelope returned by list endpoints. Nothing in this crate
//! performs I/O.

pub mod cart;
pub mod filters;
pub mod models;
pub mod pagination;
pub mod resource;

pub use cart::{Cart, CartAction, CartLine, LineKey};
pub use filters::{FilterUpdate, PriceRange, ProductFilters};
pub use models::*;
pub use pagination::Paginated;
pub use resource::Resource;

/// A state value that evolves only through its own actions.
///
/// Every store in the storefront holds one `Reducer` and mutates it through
/// [`Reducer::reduce`]; there is no other write path.
pub trait Reducer {
    type Action;

    fn reduce(&mut self, action: Self::Action);
}
