use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use gatehouse_core::AccessError;

pub fn access_error_to_response(err: AccessError) -> axum::response::Response {
    match err {
        AccessError::Unauthenticated => json_error(
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            err.to_string(),
        ),
        AccessError::Forbidden => json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string()),
    }
}

pub fn not_found() -> axum::response::Response {
    json_error(StatusCode::NOT_FOUND, "not_found", "not found")
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
