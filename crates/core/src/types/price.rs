//! Exact price representation in currency minor units.
//!
//! Prices never pass through floating point. A product priced at 499 is 499
//! minor units everywhere: in the request body, in the stored document, and in
//! an order total. Sums are checked so an oversized cart surfaces as an error
//! rather than wrapping.

use core::fmt;
use core::iter::Sum;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing or summing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(i64),
    /// Adding prices exceeded the representable range.
    #[error("price total overflowed")]
    Overflow,
}

/// A non-negative amount in minor currency units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Price(i64);

impl Price {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Create a price from minor units.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount < 0`.
    pub const fn new(amount: i64) -> Result<Self, PriceError> {
        if amount < 0 {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Amount in minor units.
    #[must_use]
    pub const fn amount(self) -> i64 {
        self.0
    }

    /// Add two prices, failing instead of wrapping.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the sum does not fit.
    pub const fn checked_add(self, other: Self) -> Result<Self, PriceError> {
        match self.0.checked_add(other.0) {
            Some(sum) => Ok(Self(sum)),
            None => Err(PriceError::Overflow),
        }
    }

    /// Sum an iterator of prices with overflow checking.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the running total does not fit.
    pub fn total<I>(prices: I) -> Result<Self, PriceError>
    where
        I: IntoIterator<Item = Self>,
    {
        prices
            .into_iter()
            .try_fold(Self::ZERO, Self::checked_add)
    }
}

impl TryFrom<i64> for Price {
    type Error = PriceError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for i64 {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Saturating sum, for display-only aggregates. Use [`Price::total`] where an
/// overflow must be reported.
impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.fold(0_i64, |acc, p| acc.saturating_add(p.0)))
    }
}
