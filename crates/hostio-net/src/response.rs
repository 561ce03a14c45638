//! Response helpers for server handlers.

use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// `application/json` response of `value`.
pub fn json<T: Serialize>(value: &T) -> Response {
    axum::Json(value).into_response()
}

/// `text/plain` response of `content`.
pub fn text(content: impl Into<String>) -> Response {
    ([(header::CONTENT_TYPE, "text/plain")], content.into()).into_response()
}
