//! Router assembly

use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::handlers;
use crate::state::AppState;

/// Build the application router
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/users", post(handlers::register))
        .route("/api/login", post(handlers::login))
        .route("/api/refresh", post(handlers::refresh))
        .route("/api/revoke", post(handlers::revoke))
        .route("/api/me", get(handlers::me))
        .route("/api/webhooks/upgrade", post(handlers::upgrade));

    let health = Router::new()
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready));

    // Outermost first; the timeout sits closest to the handlers
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(TimeoutLayer::new(state.request_timeout()));

    api.layer(middleware).merge(health).with_state(state)
}
