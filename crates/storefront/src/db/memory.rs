//! In-process store.
//!
//! Holds both collections behind one async `RwLock`, so every call sees a
//! consistent snapshot and every update is atomic. Used by tests and by
//! `EMPORIUM_STORE=memory` for local demos.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use emporium_core::{ProductId, UserId};

use super::{ProductFilter, Store, StoreError, UpdateOutcome, UserKey, UserUpdate, Window};
use crate::models::{Product, User};

#[derive(Debug, Default)]
struct Collections {
    users: Vec<User>,
    products: Vec<Product>,
}

/// A [`Store`] kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<Collections>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user(&self, key: UserKey<'_>) -> Result<Option<User>, StoreError> {
        let data = self.data.read().await;
        let found = data.users.iter().find(|user| match key {
            UserKey::Id(id) => user.user_id == id,
            UserKey::Email(email) => user.email == *email,
            UserKey::Phone(phone) => user.phone == *phone,
        });
        Ok(found.cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        let clash = data.users.iter().find_map(|existing| {
            if existing.user_id == user.user_id {
                Some("user_id")
            } else if existing.email == user.email {
                Some("email")
            } else if existing.phone == user.phone {
                Some("phone")
            } else {
                None
            }
        });
        if let Some(field) = clash {
            return Err(StoreError::Conflict(field.to_string()));
        }
        data.users.push(user.clone());
        Ok(())
    }

    async fn update_user(
        &self,
        user_id: UserId,
        update: UserUpdate,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut data = self.data.write().await;
        let Some(user) = data.users.iter_mut().find(|u| u.user_id == user_id) else {
            return Ok(UpdateOutcome::default());
        };
        update.apply(user, Utc::now());
        Ok(UpdateOutcome {
            matched: 1,
            modified: 1,
        })
    }

    async fn find_product(&self, product_id: ProductId) -> Result<Option<Product>, StoreError> {
        let data = self.data.read().await;
        Ok(data
            .products
            .iter()
            .find(|p| p.product_id == product_id)
            .cloned())
    }

    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        if data
            .products
            .iter()
            .any(|p| p.product_id == product.product_id)
        {
            return Err(StoreError::Conflict("product_id".to_string()));
        }
        data.products.push(product.clone());
        Ok(())
    }

    async fn find_products(
        &self,
        filter: &ProductFilter,
        window: Option<Window>,
    ) -> Result<Vec<Product>, StoreError> {
        let data = self.data.read().await;
        let matching = data.products.iter().filter(|p| filter.matches(p)).cloned();
        let products = match window {
            Some(Window { skip, limit }) => matching
                .skip(usize::try_from(skip).unwrap_or(usize::MAX))
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .collect(),
            None => matching.collect(),
        };
        Ok(products)
    }

    async fn count_products(&self, filter: &ProductFilter) -> Result<u64, StoreError> {
        let data = self.data.read().await;
        let count = data.products.iter().filter(|p| filter.matches(p)).count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn sold_product_ids(&self) -> Result<HashSet<ProductId>, StoreError> {
        let data = self.data.read().await;
        Ok(data
            .users
            .iter()
            .flat_map(|user| &user.order_status)
            .flat_map(|order| &order.order_list)
            .map(|line| line.product_id)
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
