//! Core types for Presto.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod phone;
pub mod price;
pub mod status;

pub use id::*;
pub use phone::{PhoneError, PhoneNumber, PhoneRule};
pub use price::{CurrencyCode, Price};
pub use status::CheckoutStatus;
