//! Checkout route handlers.
//!
//! Refused transitions come back as errors whose body carries a notice
//! (422 for input problems, 409 for requests out of sequence). A submission
//! that ran but failed is not an error: the response is the session view with
//! a `submission_failed` notice and the dialog open again.

use axum::{Json, extract::State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::routes::session::SessionView;
use crate::state::AppState;

/// Phone input request: `{ "value": "+998 90 123 45 67" }`.
#[derive(Debug, Deserialize)]
pub struct PhoneRequest {
    pub value: String,
}

/// Open the confirmation dialog.
#[instrument(skip(state, session))]
pub async fn open(State(state): State<AppState>, session: Session) -> Result<Json<SessionView>> {
    let order_session = state.sessions().resolve(&session).await?;
    let mut guard = order_session.lock().await;
    guard.open_checkout()?;
    add_breadcrumb("checkout", "Opened confirmation", None);

    Ok(Json(SessionView::new(&guard, state.config().currency)))
}

/// Close the confirmation dialog.
#[instrument(skip(state, session))]
pub async fn cancel(State(state): State<AppState>, session: Session) -> Result<Json<SessionView>> {
    let order_session = state.sessions().resolve(&session).await?;
    let mut guard = order_session.lock().await;
    guard.cancel_checkout();

    Ok(Json(SessionView::new(&guard, state.config().currency)))
}

/// Update the phone field.
#[instrument(skip(state, session, request))]
pub async fn phone(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<PhoneRequest>,
) -> Result<Json<SessionView>> {
    let order_session = state.sessions().resolve(&session).await?;
    let mut guard = order_session.lock().await;
    guard.input_phone(request.value)?;

    Ok(Json(SessionView::new(&guard, state.config().currency)))
}

/// Confirm the order and wait for the submission outcome.
#[instrument(skip(state, session))]
pub async fn confirm(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<SessionView>> {
    let order_session = state.sessions().resolve(&session).await?;
    let notice = state.checkout().confirm(order_session.clone()).await?;

    let guard = order_session.lock().await;
    Ok(Json(
        SessionView::new(&guard, state.config().currency).with_notice(notice),
    ))
}
