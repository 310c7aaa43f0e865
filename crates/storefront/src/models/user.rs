//! User documents.
//!
//! A user document carries everything the API mutates: the address book,
//! the cart, and the order history. Engines load it, change one of those
//! lists in memory, and write back only the fields they touched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use emporium_core::{Email, Phone, ProductId, UserId};

use super::{Address, CartLine, Order};

/// A user as stored in the `Users` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: Phone,
    /// Argon2 PHC hash string.
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
    /// Most recently issued access token.
    #[serde(default)]
    pub token: String,
    /// Most recently issued refresh token.
    #[serde(default)]
    pub refresh_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub address_details: Vec<Address>,
    #[serde(default)]
    pub user_cart: Vec<CartLine>,
    #[serde(default)]
    pub order_status: Vec<Order>,
}

impl User {
    /// Position of the cart line for `product_id`, if present.
    #[must_use]
    pub fn cart_position(&self, product_id: ProductId) -> Option<usize> {
        self.user_cart
            .iter()
            .position(|line| line.product_id == product_id)
    }

    /// The most recently placed order.
    #[must_use]
    pub fn last_order(&self) -> Option<&Order> {
        self.order_status.last()
    }
}
