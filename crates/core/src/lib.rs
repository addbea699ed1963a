//! Presto Core - the order builder.
//!
//! This crate provides the domain logic shared by every Presto front end:
//! - `storefront` - HTTP session host serving the ordering API
//!
//! # Architecture
//!
//! The core crate contains only types, state machines and pure functions - no
//! I/O, no HTTP clients, no clocks. Submissions are performed by the caller
//! and reported back as outcomes, which keeps every transition synchronous and
//! testable.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, phone numbers and statuses
//! - [`catalog`] - The validated, read-only menu and category filtering
//! - [`cart`] - Cart lines, mutation commands and derived totals
//! - [`checkout`] - Confirmation and submission state machine
//! - [`order`] - Order snapshots and their wire payload
//! - [`session`] - Per-user coordinator tying the above together

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod order;
pub mod session;
pub mod types;

pub use cart::{Cart, CartCommand, CartLine};
pub use catalog::{Catalog, CatalogError, CatalogItem, CategoryFilter};
pub use checkout::{
    Checkout, CheckoutError, Notice, PendingSubmission, PhoneField, PhonePolicy, Resolution,
    SubmissionOutcome,
};
pub use order::{Order, OrderLine, OrderPayload};
pub use session::OrderSession;
pub use types::*;
