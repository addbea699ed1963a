//! Status enums for the checkout flow.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Where a session is in the checkout flow.
///
/// ```text
/// Idle ──open──▶ ConfirmationOpen ──confirm──▶ Submitting
///  ▲                  │    ▲                      │
///  └──────cancel──────┘    └──────failure─────────┤
///  ▲                                              │
///  └────────────────────success───────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStatus {
    /// No confirmation dialog is shown.
    #[default]
    Idle,
    /// The confirmation dialog is open and waiting for the user.
    ConfirmationOpen,
    /// The order has been handed to the submitter and no outcome is known yet.
    Submitting,
}

impl CheckoutStatus {
    /// Whether the confirmation dialog is visible in this status.
    #[must_use]
    pub const fn dialog_open(self) -> bool {
        matches!(self, Self::ConfirmationOpen | Self::Submitting)
    }

    /// Get the status as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::ConfirmationOpen => "confirmation_open",
            Self::Submitting => "submitting",
        }
    }
}

impl fmt::Display for CheckoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
