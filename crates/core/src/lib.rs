//! Emporium Core - Shared domain types.
//!
//! This crate provides the value types used across the Emporium components:
//! - `storefront` - JSON REST API (users, catalog, cart, orders, addresses)
//! - `cli` - Operator commands (indexes, admin accounts, seeding)
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP.
//! It depends on `bson` solely for the `ObjectId` representation behind the
//! typed identifiers.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, prices, emails, phone numbers, and payment methods

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
