use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

/// Error body shared by every failure: `{"error": "..."}`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorResponse {
	pub error: String,
}

impl ErrorResponse {
	pub fn new(error: impl Into<String>) -> Self {
		Self {
			error: error.into(),
		}
	}
}

/// Fallback for anything no route or static file answers
pub async fn not_found() -> impl IntoResponse {
	(StatusCode::NOT_FOUND, Json(ErrorResponse::new("Not found")))
}
