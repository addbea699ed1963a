//! Checkout state machine.
//!
//! Gates the cart behind a confirmation step and guarantees that at most one
//! submission is in flight at a time. The submission itself happens outside
//! this module; callers take a [`PendingSubmission`] from
//! [`Checkout::begin_submission`], run it, and report back through
//! [`Checkout::complete`] with the ticket they were given.

use serde::Serialize;

use crate::cart::Cart;
use crate::order::Order;
use crate::types::{CheckoutStatus, PhoneError, PhoneNumber, PhoneRule, SubmissionTicket};

/// Checkout transitions that were refused.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// Checkout was attempted with nothing in the cart.
    #[error("cart is empty")]
    EmptyCart,
    /// The contact phone is missing or malformed.
    #[error("invalid phone number: {0}")]
    InvalidPhone(#[from] PhoneError),
    /// The operation needs the confirmation dialog to be open.
    #[error("checkout confirmation is not open")]
    NotOpen,
    /// A submission is already in flight.
    #[error("an order submission is already in progress")]
    SubmissionInFlight,
}

impl CheckoutError {
    /// The user-facing notice for validation failures.
    ///
    /// Returns `None` for protocol errors the user cannot fix by editing input.
    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        match self {
            Self::EmptyCart => Some(Notice::EmptyCart),
            Self::InvalidPhone(err) => Some(Notice::InvalidPhone { error: err.clone() }),
            Self::NotOpen | Self::SubmissionInFlight => None,
        }
    }
}

/// Messages for the user about checkout progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// Checkout was attempted on an empty cart.
    EmptyCart,
    /// The phone number did not validate.
    InvalidPhone {
        /// Why the number was rejected.
        error: PhoneError,
    },
    /// The order was handed off successfully.
    OrderSubmitted {
        /// Where the client should go to finish the hand-off, if anywhere.
        redirect_url: Option<String>,
    },
    /// The order could not be submitted; the cart is intact.
    SubmissionFailed {
        /// Short description of what went wrong.
        reason: String,
        /// Whether confirming again may succeed.
        retryable: bool,
    },
}

/// Whether checkout must collect a contact phone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PhonePolicy {
    /// No phone field is shown.
    #[default]
    NotRequired,
    /// A phone matching the rule is required before confirming.
    Required(PhoneRule),
}

/// The phone input inside the confirmation dialog.
///
/// Errors are only reported once the field has been interacted with, so a
/// freshly opened dialog does not greet the user with a validation message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhoneField {
    value: String,
    touched: bool,
}

impl PhoneField {
    /// Replace the field's value and mark it as interacted with.
    pub fn input(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.touched = true;
    }

    /// Mark the field as interacted with without changing its value.
    pub const fn touch(&mut self) {
        self.touched = true;
    }

    /// Current raw value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether the field has been interacted with.
    #[must_use]
    pub const fn touched(&self) -> bool {
        self.touched
    }

    /// Validate the current value.
    ///
    /// # Errors
    ///
    /// Returns the reason the value does not satisfy `rule`.
    pub fn validate(&self, rule: &PhoneRule) -> Result<PhoneNumber, PhoneError> {
        PhoneNumber::parse(&self.value, rule)
    }

    /// The error to display, if any.
    #[must_use]
    pub fn visible_error(&self, rule: &PhoneRule) -> Option<PhoneError> {
        if !self.touched {
            return None;
        }
        self.validate(rule).err()
    }
}

/// The outcome reported by a submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The order was accepted.
    Submitted {
        /// Where the client should go next, if anywhere.
        redirect_url: Option<String>,
    },
    /// The order was not accepted.
    Failed {
        /// Short description of what went wrong.
        reason: String,
    },
}

/// An order ready to be handed to a submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    /// Ticket to pass back to [`Checkout::complete`].
    pub ticket: SubmissionTicket,
    /// The order to submit.
    pub order: Order,
}

/// What [`Checkout::complete`] did with an outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Message for the user.
    pub notice: Notice,
    /// Whether the cart was emptied.
    pub cart_cleared: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct InFlight {
    ticket: SubmissionTicket,
    snapshot: Cart,
}

/// Checkout state for one session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Checkout {
    status: CheckoutStatus,
    policy: PhonePolicy,
    phone: PhoneField,
    in_flight: Option<InFlight>,
}

impl Checkout {
    /// Create an idle checkout.
    #[must_use]
    pub fn new(policy: PhonePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> CheckoutStatus {
        self.status
    }

    /// Phone policy in effect.
    #[must_use]
    pub const fn policy(&self) -> &PhonePolicy {
        &self.policy
    }

    /// Whether a phone must be collected.
    #[must_use]
    pub const fn requires_phone(&self) -> bool {
        matches!(self.policy, PhonePolicy::Required(_))
    }

    /// The phone input.
    #[must_use]
    pub const fn phone(&self) -> &PhoneField {
        &self.phone
    }

    /// The phone error to show, if the phone is required and invalid.
    #[must_use]
    pub fn phone_error(&self) -> Option<PhoneError> {
        match &self.policy {
            PhonePolicy::NotRequired => None,
            PhonePolicy::Required(rule) => self.phone.visible_error(rule),
        }
    }

    /// Ticket of the submission currently in flight, if any.
    ///
    /// A submission stays in flight after the dialog is cancelled until its
    /// outcome is reported.
    #[must_use]
    pub fn in_flight(&self) -> Option<SubmissionTicket> {
        self.in_flight.as_ref().map(|f| f.ticket)
    }

    /// Whether the confirm control should be enabled.
    #[must_use]
    pub fn confirm_enabled(&self) -> bool {
        self.status == CheckoutStatus::ConfirmationOpen
            && self.in_flight.is_none()
            && match &self.policy {
                PhonePolicy::NotRequired => true,
                PhonePolicy::Required(rule) => self.phone.validate(rule).is_ok(),
            }
    }

    /// Open the confirmation dialog.
    ///
    /// Opening an already open dialog is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] if the cart is empty; the status
    /// stays as it was.
    pub fn open(&mut self, cart: &Cart) -> Result<(), CheckoutError> {
        if self.status.dialog_open() {
            return Ok(());
        }
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        self.phone = PhoneField::default();
        self.status = CheckoutStatus::ConfirmationOpen;
        Ok(())
    }

    /// Close the confirmation dialog.
    ///
    /// Always permitted. A submission in flight is not aborted; its outcome is
    /// still applied by [`Checkout::complete`].
    pub const fn cancel(&mut self) {
        self.status = CheckoutStatus::Idle;
    }

    /// Update the phone input.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotOpen`] unless the dialog is waiting for
    /// confirmation.
    pub fn input_phone(&mut self, value: impl Into<String>) -> Result<(), CheckoutError> {
        if self.status != CheckoutStatus::ConfirmationOpen {
            return Err(CheckoutError::NotOpen);
        }
        self.phone.input(value);
        Ok(())
    }

    /// Confirm the order and move to `Submitting`.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::SubmissionInFlight`] if another submission has not
    ///   reported back yet
    /// - [`CheckoutError::NotOpen`] if the dialog is not open
    /// - [`CheckoutError::EmptyCart`] if the cart was emptied while the dialog
    ///   was open; the dialog is closed
    /// - [`CheckoutError::InvalidPhone`] if a required phone does not
    ///   validate; the field is marked as touched so the error shows
    pub fn begin_submission(&mut self, cart: &Cart) -> Result<PendingSubmission, CheckoutError> {
        if self.in_flight.is_some() {
            return Err(CheckoutError::SubmissionInFlight);
        }
        if self.status != CheckoutStatus::ConfirmationOpen {
            return Err(CheckoutError::NotOpen);
        }
        if cart.is_empty() {
            self.status = CheckoutStatus::Idle;
            return Err(CheckoutError::EmptyCart);
        }

        let phone = match &self.policy {
            PhonePolicy::NotRequired => None,
            PhonePolicy::Required(rule) => {
                self.phone.touch();
                Some(self.phone.validate(rule)?)
            }
        };

        let order = Order::from_cart(cart, phone).ok_or(CheckoutError::EmptyCart)?;
        let ticket = SubmissionTicket::issue();
        self.in_flight = Some(InFlight {
            ticket,
            snapshot: cart.clone(),
        });
        self.status = CheckoutStatus::Submitting;
        Ok(PendingSubmission { ticket, order })
    }

    /// Apply the outcome of the submission identified by `ticket`.
    ///
    /// On success the dialog closes and the cart is cleared, unless the cart
    /// changed while the submission was in flight, in which case the newer
    /// cart is kept. On failure the dialog returns to `ConfirmationOpen` if it
    /// was still showing the submission, and the cart is left alone.
    ///
    /// Returns `None` and changes nothing if `ticket` is not the submission in
    /// flight.
    pub fn complete(
        &mut self,
        ticket: SubmissionTicket,
        outcome: SubmissionOutcome,
        cart: &mut Cart,
    ) -> Option<Resolution> {
        if self.in_flight.as_ref().map(|f| f.ticket) != Some(ticket) {
            return None;
        }
        let in_flight = self.in_flight.take()?;

        match outcome {
            SubmissionOutcome::Submitted { redirect_url } => {
                let cart_cleared = *cart == in_flight.snapshot;
                if cart_cleared {
                    cart.clear();
                }
                self.status = CheckoutStatus::Idle;
                self.phone = PhoneField::default();
                Some(Resolution {
                    notice: Notice::OrderSubmitted { redirect_url },
                    cart_cleared,
                })
            }
            SubmissionOutcome::Failed { reason } => {
                if self.status == CheckoutStatus::Submitting {
                    self.status = CheckoutStatus::ConfirmationOpen;
                }
                Some(Resolution {
                    notice: Notice::SubmissionFailed {
                        reason,
                        retryable: true,
                    },
                    cart_cleared: false,
                })
            }
        }
    }
}
