//! Payment method chosen at checkout.

use serde::{Deserialize, Serialize};

/// How an order is paid for.
///
/// The wire form is a pair of flags, `{"digital": bool, "cod": bool}`, so
/// older clients keep working. `digital: true` selects [`Self::Digital`];
/// any other combination, including both flags false, is cash on delivery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "PaymentFlags", into = "PaymentFlags")]
pub enum PaymentMethod {
    /// Paid up front.
    Digital,
    /// Paid to the courier.
    #[default]
    CashOnDelivery,
}

impl PaymentMethod {
    /// Whether this is a digital payment.
    #[must_use]
    pub const fn is_digital(self) -> bool {
        matches!(self, Self::Digital)
    }
}

/// Flag pair used to (de)serialize [`PaymentMethod`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentFlags {
    /// Digital payment requested.
    #[serde(default)]
    pub digital: bool,
    /// Cash on delivery requested.
    #[serde(default)]
    pub cod: bool,
}

impl From<PaymentFlags> for PaymentMethod {
    fn from(flags: PaymentFlags) -> Self {
        if flags.digital {
            Self::Digital
        } else {
            Self::CashOnDelivery
        }
    }
}

impl From<PaymentMethod> for PaymentFlags {
    fn from(method: PaymentMethod) -> Self {
        Self {
            digital: method.is_digital(),
            cod: !method.is_digital(),
        }
    }
}
