//! Placed orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use emporium_core::{OrderId, PaymentMethod, Price};

use super::CartLine;

/// An order in a user's history. Orders are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub order_list: Vec<CartLine>,
    pub ordered_on: DateTime<Utc>,
    pub total_price: Price,
    #[serde(default)]
    pub discount: Price,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

/// What a successful checkout or instant buy reports back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub order_id: OrderId,
    pub total_price: Price,
}

impl From<&Order> for Receipt {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.order_id,
            total_price: order.total_price,
        }
    }
}
