//! Cart route handlers.
//!
//! Every handler answers with the updated [`SessionView`] so the client can
//! re-render the cart, the badge and the totals from one response.

use axum::{Json, extract::State};
use presto_core::ItemId;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::routes::session::SessionView;
use crate::state::AppState;

/// Add to cart request.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub item_id: ItemId,
}

/// Update quantity request.
///
/// Zero or a negative quantity removes the line.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub item_id: ItemId,
    pub quantity: i64,
}

/// Add one unit of a menu item and reveal the cart.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<SessionView>> {
    let item = state
        .catalog()
        .get(&request.item_id)
        .ok_or_else(|| AppError::NotFound(format!("menu item {}", request.item_id)))?;

    let order_session = state.sessions().resolve(&session).await?;
    let mut guard = order_session.lock().await;
    guard.add_item(item);
    add_breadcrumb("cart", "Added item", Some(&[("item_id", item.id.as_str())]));

    Ok(Json(SessionView::new(&guard, state.config().currency)))
}

/// Set a line's quantity. Unknown items are ignored.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<UpdateCartRequest>,
) -> Result<Json<SessionView>> {
    let order_session = state.sessions().resolve(&session).await?;
    let mut guard = order_session.lock().await;
    guard.set_quantity(&request.item_id, request.quantity);

    Ok(Json(SessionView::new(&guard, state.config().currency)))
}

/// Empty the cart.
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Json<SessionView>> {
    let order_session = state.sessions().resolve(&session).await?;
    let mut guard = order_session.lock().await;
    guard.clear_cart();
    add_breadcrumb("cart", "Cleared cart", None);

    Ok(Json(SessionView::new(&guard, state.config().currency)))
}

/// Show or hide the cart panel.
#[instrument(skip(state, session))]
pub async fn toggle(State(state): State<AppState>, session: Session) -> Result<Json<SessionView>> {
    let order_session = state.sessions().resolve(&session).await?;
    let mut guard = order_session.lock().await;
    guard.toggle_cart();

    Ok(Json(SessionView::new(&guard, state.config().currency)))
}
