//! Core types for Emporium.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod payment;
pub mod phone;
pub mod price;

pub use email::{Email, EmailError};
pub use id::*;
pub use payment::{PaymentFlags, PaymentMethod};
pub use phone::{Phone, PhoneError};
pub use price::{Price, PriceError};
