//! The order builder for one interactive session.
//!
//! [`OrderSession`] owns the cart, the cart panel's visibility and the
//! checkout state machine. Every user action is a method call on it; nothing
//! else holds mutable order state.

use crate::cart::{Cart, CartCommand};
use crate::catalog::CatalogItem;
use crate::checkout::{
    Checkout, CheckoutError, Notice, PendingSubmission, PhonePolicy, SubmissionOutcome,
};
use crate::types::{CheckoutStatus, ItemId, Price, SubmissionTicket};

/// Cart, cart panel and checkout for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderSession {
    cart: Cart,
    cart_open: bool,
    checkout: Checkout,
}

impl OrderSession {
    /// Start a session with an empty cart.
    #[must_use]
    pub fn new(policy: PhonePolicy) -> Self {
        Self {
            cart: Cart::new(),
            cart_open: false,
            checkout: Checkout::new(policy),
        }
    }

    /// The cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Whether the cart panel is showing.
    #[must_use]
    pub const fn cart_open(&self) -> bool {
        self.cart_open
    }

    /// The checkout state machine.
    #[must_use]
    pub const fn checkout(&self) -> &Checkout {
        &self.checkout
    }

    /// Checkout status.
    #[must_use]
    pub const fn status(&self) -> CheckoutStatus {
        self.checkout.status()
    }

    /// Units in the cart, for the header badge.
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.cart.total_item_count()
    }

    /// Cart total.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.cart.total_price()
    }

    /// Apply a cart command. Adding an item also reveals the cart panel.
    pub fn execute(&mut self, command: &CartCommand) {
        self.cart.execute(command);
        if matches!(command, CartCommand::Add(_)) {
            self.cart_open = true;
        }
    }

    /// Add one unit of `item` and reveal the cart.
    pub fn add_item(&mut self, item: &CatalogItem) {
        self.execute(&CartCommand::Add(item.clone()));
    }

    /// Set a line's quantity; zero or less removes it.
    pub fn set_quantity(&mut self, item_id: &ItemId, quantity: i64) {
        self.execute(&CartCommand::SetQuantity {
            item_id: item_id.clone(),
            quantity,
        });
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) {
        self.execute(&CartCommand::Clear);
    }

    /// Show or hide the cart panel.
    pub const fn toggle_cart(&mut self) {
        self.cart_open = !self.cart_open;
    }

    /// Hide the cart panel.
    pub const fn close_cart(&mut self) {
        self.cart_open = false;
    }

    /// Open the confirmation dialog.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] if the cart is empty.
    pub fn open_checkout(&mut self) -> Result<(), CheckoutError> {
        self.checkout.open(&self.cart)
    }

    /// Close the confirmation dialog.
    pub const fn cancel_checkout(&mut self) {
        self.checkout.cancel();
    }

    /// Update the phone input in the confirmation dialog.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotOpen`] unless the dialog is waiting for
    /// confirmation.
    pub fn input_phone(&mut self, value: impl Into<String>) -> Result<(), CheckoutError> {
        self.checkout.input_phone(value)
    }

    /// Confirm the order; see [`Checkout::begin_submission`].
    ///
    /// # Errors
    ///
    /// Returns the reason the order cannot be submitted right now.
    pub fn begin_submission(&mut self) -> Result<PendingSubmission, CheckoutError> {
        self.checkout.begin_submission(&self.cart)
    }

    /// Apply a submission outcome; see [`Checkout::complete`].
    ///
    /// A successful submission also closes the cart panel. Returns `None` for
    /// an unknown or already applied ticket.
    pub fn complete_submission(
        &mut self,
        ticket: SubmissionTicket,
        outcome: SubmissionOutcome,
    ) -> Option<Notice> {
        let resolution = self.checkout.complete(ticket, outcome, &mut self.cart)?;
        if matches!(resolution.notice, Notice::OrderSubmitted { .. }) {
            self.cart_open = false;
        }
        Some(resolution.notice)
    }
}
