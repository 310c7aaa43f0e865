//! Cart lines.

use serde::{Deserialize, Serialize};

use emporium_core::{Price, ProductId};

use super::Product;

/// A product snapshot held in a user's cart.
///
/// The line is keyed by `product_id`; a cart never holds two lines for the
/// same product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub price: Price,
    #[serde(default)]
    pub rating: u32,
    #[serde(default)]
    pub image: String,
}

impl From<&Product> for CartLine {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.product_id,
            product_name: product.product_name.clone(),
            price: product.price,
            rating: product.rating,
            image: product.image.clone(),
        }
    }
}
