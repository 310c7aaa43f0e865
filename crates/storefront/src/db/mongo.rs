//! MongoDB store.

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use bson::{Bson, Document, doc};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use secrecy::ExposeSecret;
use serde::Serialize;

use emporium_core::{ProductId, UserId};

use super::{ProductFilter, Store, StoreError, UpdateOutcome, UserKey, UserUpdate, Window};
use crate::config::MongoConfig;
use crate::models::{Product, User};

const USERS: &str = "Users";
const PRODUCTS: &str = "Products";

/// Server error code for a unique index violation.
const DUPLICATE_KEY: i32 = 11000;

/// A [`Store`] backed by a MongoDB database.
///
/// Every call is bounded by the configured timeout.
#[derive(Debug, Clone)]
pub struct MongoStore {
    db: Database,
    timeout: Duration,
}

impl MongoStore {
    /// Connect using the given settings.
    ///
    /// The driver connects lazily; an unreachable server surfaces on the
    /// first call (or on [`Store::ping`]).
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the connection string is invalid.
    pub async fn connect(config: &MongoConfig) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(config.url.expose_secret()).await?;
        options.app_name = Some("emporium-storefront".to_string());
        options.server_selection_timeout = Some(config.timeout);
        options.connect_timeout = Some(config.timeout);

        let client = Client::with_options(options)?;
        Ok(Self {
            db: client.database(&config.database),
            timeout: config.timeout,
        })
    }

    fn users(&self) -> Collection<User> {
        self.db.collection(USERS)
    }

    fn products(&self) -> Collection<Product> {
        self.db.collection(PRODUCTS)
    }

    /// Create the unique indexes the API relies on. Safe to run repeatedly.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if index creation fails, for instance because
    /// existing documents already violate uniqueness.
    pub async fn ensure_indexes(&self) -> Result<Vec<String>, StoreError> {
        let user_indexes = [unique_index("user_id"), unique_index("email"), unique_index("phone")];
        let product_indexes = [unique_index("product_id")];

        let users = self.users();
        let products = self.products();
        let mut names = self
            .bounded(async move { users.create_indexes(user_indexes).await })
            .await?
            .index_names;
        names.extend(
            self.bounded(async move { products.create_indexes(product_indexes).await })
                .await?
                .index_names,
        );

        tracing::info!(indexes = ?names, "Indexes ensured");
        Ok(names)
    }

    /// Run one driver call under the store timeout.
    async fn bounded<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = mongodb::error::Result<T>> + Send,
    {
        with_timeout(self.timeout, call).await
    }
}

/// Await `call` for at most `timeout`.
async fn with_timeout<T, F>(timeout: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = mongodb::error::Result<T>> + Send,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result.map_err(map_write_error),
        Err(_) => {
            tracing::warn!(?timeout, "Store call timed out");
            Err(StoreError::Timeout(timeout))
        }
    }
}

/// Translate duplicate key violations into `Conflict`.
fn map_write_error(err: mongodb::error::Error) -> StoreError {
    if let ErrorKind::Write(WriteFailure::WriteError(write)) = err.kind.as_ref() {
        if write.code == DUPLICATE_KEY {
            return StoreError::Conflict(write.message.clone());
        }
    }
    StoreError::Database(err)
}

fn unique_index(field: &str) -> IndexModel {
    let mut keys = Document::new();
    keys.insert(field, 1_i32);
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

fn user_filter(key: UserKey<'_>) -> Document {
    match key {
        UserKey::Id(id) => doc! { "user_id": id.to_hex() },
        UserKey::Email(email) => doc! { "email": email.as_str() },
        UserKey::Phone(phone) => doc! { "phone": phone.as_str() },
    }
}

/// Translate a [`ProductFilter`] into a query document.
fn product_query(filter: &ProductFilter) -> Document {
    let mut query = Document::new();

    if let Some(name) = &filter.name {
        query.insert(
            "product_name",
            doc! { "$regex": regex::escape(name), "$options": "i" },
        );
    }

    let mut price = Document::new();
    if let Some(min) = filter.min_price {
        price.insert("$gte", min.amount());
    }
    if let Some(max) = filter.max_price {
        price.insert("$lte", max.amount());
    }
    if !price.is_empty() {
        query.insert("price", price);
    }

    if !filter.exclude.is_empty() {
        let ids: Vec<String> = filter.exclude.iter().map(ProductId::to_hex).collect();
        query.insert("product_id", doc! { "$nin": ids });
    }

    query
}

fn set_document(update: UserUpdate) -> Result<Document, StoreError> {
    let mut set = Document::new();
    if let Some(addresses) = &update.address_details {
        set.insert("address_details", encode(addresses)?);
    }
    if let Some(cart) = &update.user_cart {
        set.insert("user_cart", encode(cart)?);
    }
    if let Some(orders) = &update.order_status {
        set.insert("order_status", encode(orders)?);
    }
    if let Some(tokens) = update.tokens {
        set.insert("token", tokens.token);
        set.insert("refresh_token", tokens.refresh_token);
    }
    set.insert("updated_at", encode(&Utc::now())?);
    Ok(set)
}

fn encode<T: Serialize>(value: &T) -> Result<Bson, StoreError> {
    bson::to_bson(value).map_err(|e| StoreError::Document(e.to_string()))
}

#[async_trait]
impl Store for MongoStore {
    async fn find_user(&self, key: UserKey<'_>) -> Result<Option<User>, StoreError> {
        let users = self.users();
        let filter = user_filter(key);
        self.bounded(async move { users.find_one(filter).await })
            .await
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let users = self.users();
        self.bounded(async move { users.insert_one(user).await })
            .await?;
        Ok(())
    }

    async fn update_user(
        &self,
        user_id: UserId,
        update: UserUpdate,
    ) -> Result<UpdateOutcome, StoreError> {
        let users = self.users();
        let set = set_document(update)?;
        let result = self
            .bounded(async move {
                users
                    .update_one(doc! { "user_id": user_id.to_hex() }, doc! { "$set": set })
                    .await
            })
            .await?;

        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn find_product(&self, product_id: ProductId) -> Result<Option<Product>, StoreError> {
        let products = self.products();
        self.bounded(async move {
            products
                .find_one(doc! { "product_id": product_id.to_hex() })
                .await
        })
        .await
    }

    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        let products = self.products();
        self.bounded(async move { products.insert_one(product).await })
            .await?;
        Ok(())
    }

    async fn find_products(
        &self,
        filter: &ProductFilter,
        window: Option<Window>,
    ) -> Result<Vec<Product>, StoreError> {
        let products = self.products();
        let query = product_query(filter);
        self.bounded(async move {
            let find = products.find(query).sort(doc! { "_id": 1 });
            let cursor = match window {
                Some(Window { skip, limit }) => {
                    find.skip(skip)
                        .limit(i64::try_from(limit).unwrap_or(i64::MAX))
                        .await?
                }
                None => find.await?,
            };
            cursor.try_collect::<Vec<Product>>().await
        })
        .await
    }

    async fn count_products(&self, filter: &ProductFilter) -> Result<u64, StoreError> {
        let products = self.products();
        let query = product_query(filter);
        self.bounded(async move { products.count_documents(query).await })
            .await
    }

    async fn sold_product_ids(&self) -> Result<HashSet<ProductId>, StoreError> {
        let users = self.users();
        let values = self
            .bounded(async move {
                users
                    .distinct("order_status.order_list.product_id", doc! {})
                    .await
            })
            .await?;

        let mut ids = HashSet::with_capacity(values.len());
        for value in values {
            match value {
                Bson::String(hex) => match ProductId::parse(&hex) {
                    Ok(id) => {
                        ids.insert(id);
                    }
                    Err(e) => tracing::warn!(error = %e, "Skipping malformed product id in order history"),
                },
                other => tracing::warn!(value = %other, "Skipping non-string product id in order history"),
            }
        }
        Ok(ids)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let db = self.db.clone();
        self.bounded(async move { db.run_command(doc! { "ping": 1 }).await })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use emporium_core::Price;

    use super::*;

    #[tokio::test]
    async fn test_stalled_call_times_out() {
        let timeout = Duration::from_millis(50);
        let stalled = std::future::pending::<mongodb::error::Result<()>>();

        let result = with_timeout(timeout, stalled).await;
        assert!(matches!(result, Err(StoreError::Timeout(t)) if t == timeout));
    }

    #[tokio::test]
    async fn test_prompt_call_passes_through() {
        let result = with_timeout(Duration::from_secs(5), async { Ok(7_u64) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[test]
    fn test_empty_filter_is_empty_query() {
        assert_eq!(product_query(&ProductFilter::default()), Document::new());
    }

    #[test]
    fn test_name_is_escaped_case_insensitive_regex() {
        let query = product_query(&ProductFilter {
            name: Some("c++ (v2)".into()),
            ..ProductFilter::default()
        });
        assert_eq!(
            query,
            doc! { "product_name": { "$regex": r"c\+\+ \(v2\)", "$options": "i" } }
        );
    }

    #[test]
    fn test_price_range_and_exclusions() {
        let sold = ProductId::generate();
        let query = product_query(&ProductFilter {
            min_price: Some(Price::new(100).unwrap()),
            max_price: Some(Price::new(500).unwrap()),
            exclude: HashSet::from([sold]),
            ..ProductFilter::default()
        });
        assert_eq!(
            query,
            doc! {
                "price": { "$gte": 100_i64, "$lte": 500_i64 },
                "product_id": { "$nin": [sold.to_hex()] },
            }
        );
    }

    #[test]
    fn test_set_document_names_only_given_fields() {
        let set = set_document(UserUpdate::default().tokens("a".into(), "r".into())).unwrap();
        let mut keys: Vec<_> = set.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["refresh_token", "token", "updated_at"]);

        let set = set_document(UserUpdate::default().cart(Vec::new())).unwrap();
        assert_eq!(set.get_array("user_cart").unwrap().len(), 0);
        assert!(!set.contains_key("order_status"));
    }
}
