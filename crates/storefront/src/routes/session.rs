//! Session view: everything a client needs to render the cart, the header
//! badge and the checkout dialog.

use axum::{Json, extract::State};
use presto_core::{CheckoutStatus, CurrencyCode, Notice, OrderSession, PhoneError, Price};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::state::AppState;

/// One cart line for display.
#[derive(Debug, Serialize)]
pub struct CartLineView {
    pub item_id: String,
    pub name: String,
    pub image_url: String,
    pub quantity: u32,
    pub unit_price: Price,
    pub unit_price_display: String,
    pub line_total: Price,
    pub line_total_display: String,
}

/// Checkout dialog state for display.
#[derive(Debug, Serialize)]
pub struct CheckoutView {
    pub status: CheckoutStatus,
    pub dialog_open: bool,
    pub submitting: bool,
    pub confirm_enabled: bool,
    pub requires_phone: bool,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_error: Option<PhoneError>,
}

/// A notice with its user-facing text.
#[derive(Debug, Serialize)]
pub struct NoticeView {
    #[serde(flatten)]
    pub notice: Notice,
    pub message: String,
}

/// Snapshot of one visitor's order session.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub items: Vec<CartLineView>,
    pub item_count: u64,
    pub total_price: Price,
    pub total_display: String,
    pub cart_open: bool,
    pub checkout: CheckoutView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<NoticeView>,
}

impl SessionView {
    /// Render `session` with prices in `currency`.
    #[must_use]
    pub fn new(session: &OrderSession, currency: CurrencyCode) -> Self {
        let items = session
            .cart()
            .lines()
            .iter()
            .map(|line| CartLineView {
                item_id: line.item_id.to_string(),
                name: line.name.clone(),
                image_url: line.image_url.clone(),
                quantity: line.quantity.get(),
                unit_price: line.unit_price,
                unit_price_display: line.unit_price.display(currency),
                line_total: line.line_total(),
                line_total_display: line.line_total().display(currency),
            })
            .collect();

        let checkout = session.checkout();
        let total_price = session.total_price();

        Self {
            items,
            item_count: session.total_item_count(),
            total_price,
            total_display: total_price.display(currency),
            cart_open: session.cart_open(),
            checkout: CheckoutView {
                status: checkout.status(),
                dialog_open: checkout.status().dialog_open(),
                submitting: checkout.status() == CheckoutStatus::Submitting,
                confirm_enabled: checkout.confirm_enabled(),
                requires_phone: checkout.requires_phone(),
                phone: checkout.phone().value().to_string(),
                phone_error: checkout.phone_error(),
            },
            notice: None,
        }
    }

    /// Attach a notice for the client to show.
    #[must_use]
    pub fn with_notice(mut self, notice: Option<Notice>) -> Self {
        self.notice = notice.map(|notice| NoticeView {
            message: notice_message(&notice),
            notice,
        });
        self
    }
}

/// User-facing text for a notice.
fn notice_message(notice: &Notice) -> String {
    match notice {
        Notice::EmptyCart => "Savatingiz bo'sh!".to_string(),
        Notice::InvalidPhone { error } => format!("Telefon raqami noto'g'ri: {error}"),
        Notice::OrderSubmitted { .. } => "Rahmat! Buyurtmangiz yuborildi.".to_string(),
        Notice::SubmissionFailed { .. } => {
            "Kechirasiz, buyurtmani yuborishda xatolik yuz berdi. Iltimos, qayta urinib ko'ring."
                .to_string()
        }
    }
}

/// Current session state.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<SessionView>> {
    let order_session = state.sessions().resolve(&session).await?;
    let guard = order_session.lock().await;
    Ok(Json(SessionView::new(&guard, state.config().currency)))
}
