//! Domain models for the storefront.
//!
//! These types double as the stored document shapes: field names match the
//! `Users` and `Products` collections exactly.

pub mod address;
pub mod cart;
pub mod order;
pub mod product;
pub mod user;

pub use address::{Address, AddressInput};
pub use cart::CartLine;
pub use order::{Order, Receipt};
pub use product::{NewProduct, Product};
pub use user::User;
