//! Newtype IDs for type-safe entity references.
//!
//! Every entity is keyed by a MongoDB `ObjectId`. On the wire and inside
//! stored documents the ID is always the 24-character lowercase hex form, so
//! a product ID in a query string, a JSON body, and a `Users` document all
//! look the same.
//!
//! Use the `define_id!` macro to create wrappers that prevent accidentally
//! mixing IDs from different entity types.

pub use bson::oid::ObjectId;

/// Error returned when a string is not a valid 24-character hex ID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid id '{0}': expected 24 hexadecimal characters")]
pub struct IdError(pub String);

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around [`ObjectId`] with:
/// - `Serialize`/`Deserialize` as a hex string
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - `generate()`, `parse()`, `to_hex()`, `Display` and `FromStr`
///
/// # Example
///
/// ```rust
/// # use emporium_core::define_id;
/// define_id!(WidgetId);
///
/// let id = WidgetId::generate();
/// let parsed = WidgetId::parse(&id.to_hex()).unwrap();
/// assert_eq!(parsed, id);
/// assert!(WidgetId::parse("not-hex").is_err());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(try_from = "String", into = "String")]
        pub struct $name($crate::ObjectId);

        impl $name {
            /// Generate a fresh, unique ID.
            #[must_use]
            pub fn generate() -> Self {
                Self($crate::ObjectId::new())
            }

            /// Parse an ID from its 24-character hex form.
            ///
            /// # Errors
            ///
            /// Returns `IdError` if the input is not valid hex of the right length.
            pub fn parse(s: &str) -> ::core::result::Result<Self, $crate::IdError> {
                $crate::ObjectId::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| $crate::IdError(s.to_owned()))
            }

            /// Wrap an existing `ObjectId`.
            #[must_use]
            pub const fn from_object_id(id: $crate::ObjectId) -> Self {
                Self(id)
            }

            /// Get the underlying `ObjectId`.
            #[must_use]
            pub const fn as_object_id(&self) -> $crate::ObjectId {
                self.0
            }

            /// Hex representation used on the wire and in documents.
            #[must_use]
            pub fn to_hex(&self) -> String {
                self.0.to_hex()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0.to_hex())
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl ::core::convert::TryFrom<String> for $name {
            type Error = $crate::IdError;

            fn try_from(value: String) -> ::core::result::Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl ::core::convert::From<$name> for String {
            fn from(id: $name) -> Self {
                id.to_hex()
            }
        }
    };
}

define_id!(UserId);
define_id!(ProductId);
define_id!(OrderId);
define_id!(AddressId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(ProductId::generate(), ProductId::generate());
    }

    #[test]
    fn test_parse_accepts_hex_and_trims() {
        let id = UserId::parse(" 64b7f0c2a1b2c3d4e5f60718 ").unwrap();
        assert_eq!(id.to_hex(), "64b7f0c2a1b2c3d4e5f60718");
        assert_eq!(id.to_string(), "64b7f0c2a1b2c3d4e5f60718");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(ProductId::parse("").is_err());
        assert!(ProductId::parse("64b7f0c2a1b2").is_err());
        assert!(ProductId::parse("zzzzzzzzzzzzzzzzzzzzzzzz").is_err());
    }

    #[test]
    fn test_serializes_as_plain_hex_string() {
        let id = OrderId::parse("64b7f0c2a1b2c3d4e5f60718").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"64b7f0c2a1b2c3d4e5f60718\"");

        let back: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_deserialize_rejects_invalid_hex() {
        let result: Result<AddressId, _> = serde_json::from_str("\"nope\"");
        assert!(result.is_err());
    }
}
