//! Document store access for the storefront.
//!
//! # Collections
//!
//! - `Users` - one document per user, embedding the address book, the cart
//!   and the order history
//! - `Products` - the catalog, written only by admins
//!
//! Every engine talks to storage through the object-safe [`Store`] trait so
//! the same code runs against MongoDB in production and [`MemoryStore`] in
//! tests and local demos.
//!
//! # Indexes
//!
//! Unique indexes are created explicitly, not on startup:
//! ```bash
//! cargo run -p emporium-cli -- db indexes
//! ```

mod memory;
mod mongo;
#[cfg(test)]
pub(crate) mod testing;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use emporium_core::{Email, Phone, Price, ProductId, UserId};

use crate::config::StoreConfig;
use crate::models::{Address, CartLine, Order, Product, User};

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Errors surfaced by a [`Store`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique key (user id, email, phone, product id) already exists.
    #[error("duplicate key: {0}")]
    Conflict(String),

    /// The call did not complete within the configured bound.
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),

    /// The backend reported an error.
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// A stored document could not be encoded or decoded.
    #[error("document error: {0}")]
    Document(String),
}

/// How to look up a single user.
#[derive(Debug, Clone, Copy)]
pub enum UserKey<'a> {
    Id(UserId),
    Email(&'a Email),
    Phone(&'a Phone),
}

/// The user fields an engine may overwrite in one atomic update.
///
/// Only the fields that are `Some` are written, together with `updated_at`.
/// The rest of the document is left untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub address_details: Option<Vec<Address>>,
    pub user_cart: Option<Vec<CartLine>>,
    pub order_status: Option<Vec<Order>>,
    pub tokens: Option<TokenFields>,
}

/// The token pair persisted on login and signup.
#[derive(Debug, Clone)]
pub struct TokenFields {
    pub token: String,
    pub refresh_token: String,
}

impl UserUpdate {
    #[must_use]
    pub fn addresses(mut self, addresses: Vec<Address>) -> Self {
        self.address_details = Some(addresses);
        self
    }

    #[must_use]
    pub fn cart(mut self, cart: Vec<CartLine>) -> Self {
        self.user_cart = Some(cart);
        self
    }

    #[must_use]
    pub fn orders(mut self, orders: Vec<Order>) -> Self {
        self.order_status = Some(orders);
        self
    }

    #[must_use]
    pub fn tokens(mut self, token: String, refresh_token: String) -> Self {
        self.tokens = Some(TokenFields {
            token,
            refresh_token,
        });
        self
    }

    /// Apply the named fields to an in-memory user.
    pub fn apply(self, user: &mut User, now: DateTime<Utc>) {
        if let Some(addresses) = self.address_details {
            user.address_details = addresses;
        }
        if let Some(cart) = self.user_cart {
            user.user_cart = cart;
        }
        if let Some(orders) = self.order_status {
            user.order_status = orders;
        }
        if let Some(tokens) = self.tokens {
            user.token = tokens.token;
            user.refresh_token = tokens.refresh_token;
        }
        user.updated_at = now;
    }
}

/// Result of [`Store::update_user`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

impl UpdateOutcome {
    /// Whether the update reached a document and changed it.
    #[must_use]
    pub const fn applied(self) -> bool {
        self.matched > 0 && self.modified > 0
    }
}

/// Catalog filter. All present predicates must hold.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Case-insensitive substring of the product name.
    pub name: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<Price>,
    /// Inclusive upper price bound.
    pub max_price: Option<Price>,
    /// Products to leave out (already sold).
    pub exclude: HashSet<ProductId>,
}

impl ProductFilter {
    /// Evaluate the filter against one product.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let name_ok = self.name.as_deref().is_none_or(|needle| {
            product
                .product_name
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });

        name_ok
            && self.min_price.is_none_or(|min| product.price >= min)
            && self.max_price.is_none_or(|max| product.price <= max)
            && !self.exclude.contains(&product.product_id)
    }
}

/// A page of results: skip `skip` matches, return at most `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub skip: u64,
    pub limit: u64,
}

/// Typed access to the `Users` and `Products` collections.
#[async_trait]
pub trait Store: Send + Sync {
    /// Load one user.
    async fn find_user(&self, key: UserKey<'_>) -> Result<Option<User>, StoreError>;

    /// Insert a new user. Duplicate id, email or phone yields `Conflict`.
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;

    /// Overwrite the fields named in `update` on one user, atomically.
    async fn update_user(
        &self,
        user_id: UserId,
        update: UserUpdate,
    ) -> Result<UpdateOutcome, StoreError>;

    /// Load one product.
    async fn find_product(&self, product_id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Insert a new product. Duplicate id yields `Conflict`.
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError>;

    /// Matching products in insertion order, optionally windowed.
    async fn find_products(
        &self,
        filter: &ProductFilter,
        window: Option<Window>,
    ) -> Result<Vec<Product>, StoreError>;

    /// Number of matching products.
    async fn count_products(&self, filter: &ProductFilter) -> Result<u64, StoreError>;

    /// Every product id that appears in any user's order history.
    async fn sold_product_ids(&self) -> Result<HashSet<ProductId>, StoreError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Build the store selected by configuration.
///
/// # Errors
///
/// Returns `StoreError` if the MongoDB client cannot be created.
pub async fn create_store(config: &StoreConfig) -> Result<Arc<dyn Store>, StoreError> {
    match config {
        StoreConfig::MongoDb(mongo) => Ok(Arc::new(MongoStore::connect(mongo).await?)),
        StoreConfig::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(name: &str, price: i64) -> Product {
        Product {
            product_id: ProductId::generate(),
            product_name: name.to_string(),
            price: Price::new(price).unwrap(),
            rating: 4,
            image: String::new(),
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(ProductFilter::default().matches(&product("Kettle", 1500)));
    }

    #[test]
    fn test_name_filter_is_case_insensitive_substring() {
        let filter = ProductFilter {
            name: Some("PHONE".into()),
            ..ProductFilter::default()
        };
        assert!(filter.matches(&product("Smartphone X", 100)));
        assert!(!filter.matches(&product("Laptop", 100)));
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let filter = ProductFilter {
            min_price: Some(Price::new(100).unwrap()),
            max_price: Some(Price::new(200).unwrap()),
            ..ProductFilter::default()
        };
        assert!(filter.matches(&product("a", 100)));
        assert!(filter.matches(&product("b", 200)));
        assert!(!filter.matches(&product("c", 99)));
        assert!(!filter.matches(&product("d", 201)));
    }

    #[test]
    fn test_excluded_ids_are_filtered() {
        let sold = product("Sold out", 10);
        let filter = ProductFilter {
            exclude: HashSet::from([sold.product_id]),
            ..ProductFilter::default()
        };
        assert!(!filter.matches(&sold));
    }

    #[test]
    fn test_update_outcome_applied() {
        assert!(UpdateOutcome { matched: 1, modified: 1 }.applied());
        assert!(!UpdateOutcome { matched: 1, modified: 0 }.applied());
        assert!(!UpdateOutcome::default().applied());
    }
}
