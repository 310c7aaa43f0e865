//! Business logic services.
//!
//! Each service borrows the store (and, for auth, the token issuer) from
//! `AppState` for the duration of one request.
//!
//! - `auth` - signup, login, token issuing and validation
//! - `catalog` - product listing, search and admin product creation
//! - `cart` - cart contents, checkout and instant buy
//! - `address` - the user's address book

pub mod address;
pub mod auth;
pub mod cart;
pub mod catalog;
