use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use restock_infra::CheckError;

pub fn check_error_to_response(err: CheckError) -> axum::response::Response {
    match err {
        CheckError::Validation(e) => (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({
                "error": "validation_error",
                "message": e.to_string(),
                "fields": e.fields(),
            })),
        )
            .into_response(),
        CheckError::Adapter(e) => (
            StatusCode::BAD_GATEWAY,
            axum::Json(json!({
                "error": "adapter_error",
                "collaborator": e.collaborator,
                "operation": e.operation,
                "kind": e.kind,
                "message": e.to_string(),
            })),
        )
            .into_response(),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
