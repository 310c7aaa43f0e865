//! Address book entries.

use serde::{Deserialize, Serialize};

use emporium_core::AddressId;

/// A stored address. Position 0 is home, position 1 is work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub address_id: AddressId,
    pub house_name: String,
    pub street_name: String,
    pub city_name: String,
    pub pin_code: String,
}

/// Address fields as submitted by a client.
///
/// `address_id` is optional; when absent the address book keeps or assigns
/// one. Missing text fields deserialize as empty and are rejected by
/// the address book.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressInput {
    #[serde(default)]
    pub address_id: Option<AddressId>,
    #[serde(default)]
    pub house_name: String,
    #[serde(default)]
    pub street_name: String,
    #[serde(default)]
    pub city_name: String,
    #[serde(default)]
    pub pin_code: String,
}

impl AddressInput {
    /// Name of the first blank field, if any.
    #[must_use]
    pub fn blank_field(&self) -> Option<&'static str> {
        [
            ("house_name", &self.house_name),
            ("street_name", &self.street_name),
            ("city_name", &self.city_name),
            ("pin_code", &self.pin_code),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }

    /// Build the stored address with the given id and trimmed fields.
    #[must_use]
    pub fn into_address(self, address_id: AddressId) -> Address {
        Address {
            address_id,
            house_name: self.house_name.trim().to_owned(),
            street_name: self.street_name.trim().to_owned(),
            city_name: self.city_name.trim().to_owned(),
            pin_code: self.pin_code.trim().to_owned(),
        }
    }
}
