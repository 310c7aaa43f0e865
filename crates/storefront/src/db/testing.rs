//! Store doubles for unit tests.

use std::collections::HashSet;

use async_trait::async_trait;

use emporium_core::{ProductId, UserId};

use super::{
    MemoryStore, ProductFilter, Store, StoreError, UpdateOutcome, UserKey, UserUpdate, Window,
};
use crate::models::{Product, User};

/// Reads through to a memory store but reports every update as matched
/// and not modified.
pub struct StaleStore(pub MemoryStore);

#[async_trait]
impl Store for StaleStore {
    async fn find_user(&self, key: UserKey<'_>) -> Result<Option<User>, StoreError> {
        self.0.find_user(key).await
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        self.0.insert_user(user).await
    }

    async fn update_user(&self, _: UserId, _: UserUpdate) -> Result<UpdateOutcome, StoreError> {
        Ok(UpdateOutcome {
            matched: 1,
            modified: 0,
        })
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        self.0.find_product(id).await
    }

    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        self.0.insert_product(product).await
    }

    async fn find_products(
        &self,
        filter: &ProductFilter,
        window: Option<Window>,
    ) -> Result<Vec<Product>, StoreError> {
        self.0.find_products(filter, window).await
    }

    async fn count_products(&self, filter: &ProductFilter) -> Result<u64, StoreError> {
        self.0.count_products(filter).await
    }

    async fn sold_product_ids(&self) -> Result<HashSet<ProductId>, StoreError> {
        self.0.sold_product_ids().await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
