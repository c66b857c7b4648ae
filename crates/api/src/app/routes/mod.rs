use axum::{Router, routing::post};

pub mod replenishment;
pub mod system;

/// Router for all protected endpoints.
pub fn router() -> Router {
    Router::new().route("/v1/replenishment/check", post(replenishment::run_check))
}
