//! Business logic services for storefront.
//!
//! # Services
//!
//! - `sessions` - Per-visitor order sessions keyed from the session cookie
//! - `checkout` - Runs confirmed orders through the submitter
//! - `submission` - Pluggable order submitters (Telegram, HTTP)

pub mod checkout;
pub mod sessions;
pub mod submission;
