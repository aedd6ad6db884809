//! Crowdfund web application library.
//!
//! User registration, sign-in and history pages over `PostgreSQL`, exposed as
//! a library so the router can be driven directly in tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod format;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, body::Body, http::Request, middleware::from_fn};
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};
use tracing::Span;

use state::AppState;

/// Span for one HTTP request. `request_id` is filled in by the request ID middleware.
fn make_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "http-request",
        method = %request.method(),
        path = request.uri().path(),
        request_id = tracing::field::Empty,
    )
}

/// Build the application router over any session store.
///
/// Sentry layers are added by the binary so tests run without a client.
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    Router::new()
        .merge(routes::health_routes())
        .merge(routes::routes())
        .layer(session_layer)
        .with_state(state)
        .layer(from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_span))
}
