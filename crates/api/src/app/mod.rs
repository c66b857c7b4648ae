//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: collaborator wiring (inventory store, notification sink, clock)
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(services: Arc<services::AppServices>) -> Router {
    let auth_state = middleware::AuthState::new(services.api_token.clone());

    // Protected routes: bearer token when one is configured.
    let protected = routes::router().layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn_with_state(
                auth_state,
                middleware::auth_middleware,
            ))
            .layer(Extension(services)),
    );

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
}
