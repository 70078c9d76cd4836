//! Gateway-level error taxonomy

use thiserror::Error;

use crate::UpstreamError;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Coarse classification used to pick the response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	MissingParameter,
	UpstreamFailure,
	UpstreamMalformedResponse,
	NotFound,
}

/// Every failure a route can end in
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
	#[error("Missing required parameter: {name}")]
	MissingParameter { name: String },

	/// Upstream message passed through as-is
	#[error("{message}")]
	UpstreamFailure { message: String },

	#[error("Malformed upstream response: {reason}")]
	UpstreamMalformedResponse { reason: String },

	#[error("Not found")]
	NotFound,
}

impl GatewayError {
	pub fn missing(name: impl Into<String>) -> Self {
		GatewayError::MissingParameter { name: name.into() }
	}

	pub fn upstream(message: impl Into<String>) -> Self {
		GatewayError::UpstreamFailure {
			message: message.into(),
		}
	}

	pub fn kind(&self) -> ErrorKind {
		match self {
			GatewayError::MissingParameter { .. } => ErrorKind::MissingParameter,
			GatewayError::UpstreamFailure { .. } => ErrorKind::UpstreamFailure,
			GatewayError::UpstreamMalformedResponse { .. } => ErrorKind::UpstreamMalformedResponse,
			GatewayError::NotFound => ErrorKind::NotFound,
		}
	}

	/// Rewrite the surfaced text, keeping the variant
	pub fn map_message<F>(self, f: F) -> Self
	where
		F: FnOnce(String) -> String,
	{
		match self {
			GatewayError::UpstreamFailure { message } => GatewayError::UpstreamFailure {
				message: f(message),
			},
			GatewayError::UpstreamMalformedResponse { reason } => {
				GatewayError::UpstreamMalformedResponse { reason: f(reason) }
			},
			other => other,
		}
	}
}

impl From<UpstreamError> for GatewayError {
	fn from(err: UpstreamError) -> Self {
		match err {
			UpstreamError::InvalidResponse { reason } => {
				GatewayError::UpstreamMalformedResponse { reason }
			},
			other => GatewayError::UpstreamFailure {
				message: other.to_string(),
			},
		}
	}
}
