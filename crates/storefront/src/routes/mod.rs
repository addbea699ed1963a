//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Menu
//! GET  /api/categories         - Category selector entries
//! GET  /api/catalog            - Menu items (?category= filters)
//!
//! # Session
//! GET  /api/session            - Cart, badge, totals and checkout state
//!
//! # Cart
//! POST /api/cart/add           - Add one unit of an item
//! POST /api/cart/update        - Set a line's quantity (<= 0 removes)
//! POST /api/cart/clear         - Empty the cart
//! POST /api/cart/toggle        - Show or hide the cart panel
//!
//! # Checkout
//! POST /api/checkout/open      - Open the confirmation dialog
//! POST /api/checkout/cancel    - Close the confirmation dialog
//! POST /api/checkout/phone     - Update the phone field
//! POST /api/checkout/confirm   - Submit the order
//! ```

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod session;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{create_session_layer, request_id_middleware};
use crate::state::AppState;

/// Create the menu routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(catalog::categories))
        .route("/catalog", get(catalog::index))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/clear", post(cart::clear))
        .route("/toggle", post(cart::toggle))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/open", post(checkout::open))
        .route("/cancel", post(checkout::cancel))
        .route("/phone", post(checkout::phone))
        .route("/confirm", post(checkout::confirm))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(catalog_routes())
        .route("/session", get(session::show))
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
}

/// Build the application router with its middleware stack.
///
/// Sentry layers are added by the binary so tests can drive this router
/// without a Sentry client.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .nest("/api", routes())
        .layer(session_layer)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
