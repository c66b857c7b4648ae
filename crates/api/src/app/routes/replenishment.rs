use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn run_check(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CheckRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_request", rejection.body_text());
        }
    };

    match services
        .check
        .execute(&req.policy_overrides, &req.notification)
        .await
    {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => errors::check_error_to_response(e),
    }
}
