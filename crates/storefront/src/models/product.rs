//! Catalog products.

use serde::{Deserialize, Serialize};

use emporium_core::{Price, ProductId};

/// A product as stored in the `Products` collection.
///
/// Products are never modified once created; orders and cart lines keep
/// their own snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: ProductId,
    pub product_name: String,
    pub price: Price,
    #[serde(default)]
    pub rating: u32,
    #[serde(default)]
    pub image: String,
}

/// Admin input for creating a product. The id is assigned on insert.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub product_name: String,
    pub price: Price,
    #[serde(default)]
    pub rating: u32,
    #[serde(default)]
    pub image: String,
}
