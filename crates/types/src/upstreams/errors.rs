//! Error types for upstream operations

use thiserror::Error;

/// Upstream operation errors
///
/// Display strings are what clients eventually see, so transport and status
/// errors keep the upstream's own wording.
#[derive(Error, Debug)]
pub enum UpstreamError {
	#[error("{0}")]
	HttpError(#[from] reqwest::Error),

	/// Non-success status; `message` is the upstream's error text when it sent one
	#[error("{message}")]
	HttpStatusError { status_code: u16, message: String },

	#[error("Invalid response format: {reason}")]
	InvalidResponse { reason: String },

	#[error("Upstream response exceeds the {limit} byte limit")]
	BodyTooLarge { limit: usize },

	#[error("Missing credential: {name}")]
	MissingCredential { name: String },

	#[error("Invalid parameter '{name}': {reason}")]
	InvalidParameter { name: String, reason: String },

	#[error("Image transform failed: {0}")]
	Transform(String),

	#[error("Upstream task failed: {0}")]
	Task(String),
}

impl UpstreamError {
	/// Build a status error from an upstream body, preferring its own message
	///
	/// Falls back to the conventional `Request failed with status code N`.
	pub fn from_status(status_code: u16, body: &str) -> Self {
		let message = extract_error_message(body).unwrap_or_else(|| {
			format!("Request failed with status code {}", status_code)
		});
		UpstreamError::HttpStatusError {
			status_code,
			message,
		}
	}

	/// Shorthand for a schema mismatch in an upstream body
	pub fn invalid_response(reason: impl Into<String>) -> Self {
		UpstreamError::InvalidResponse {
			reason: reason.into(),
		}
	}

	/// Extract HTTP status code from the error if available
	pub fn status_code(&self) -> Option<u16> {
		match self {
			UpstreamError::HttpStatusError { status_code, .. } => Some(*status_code),
			UpstreamError::HttpError(reqwest_error) => {
				reqwest_error.status().map(|status| status.as_u16())
			},
			_ => None,
		}
	}

	/// Whether the upstream answered with something the caller could not map
	pub fn is_malformed(&self) -> bool {
		matches!(self, UpstreamError::InvalidResponse { .. })
	}
}

impl From<serde_json::Error> for UpstreamError {
	fn from(err: serde_json::Error) -> Self {
		UpstreamError::InvalidResponse {
			reason: err.to_string(),
		}
	}
}

/// Pull a human-readable error out of common upstream error bodies
fn extract_error_message(body: &str) -> Option<String> {
	let value: serde_json::Value = serde_json::from_str(body).ok()?;
	let candidate = value
		.get("error")
		.or_else(|| value.get("message"))
		.or_else(|| value.get("errors").and_then(|errors| errors.get(0)))?;

	match candidate {
		serde_json::Value::String(text) if !text.is_empty() => Some(text.clone()),
		serde_json::Value::Object(inner) => inner
			.get("message")
			.or_else(|| inner.get("title"))
			.and_then(|m| m.as_str())
			.map(str::to_string),
		_ => None,
	}
}
