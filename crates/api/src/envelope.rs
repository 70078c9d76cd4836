//! Response envelope: the fixed JSON and binary contracts

use axum::{
	http::{header, HeaderValue, StatusCode},
	response::{IntoResponse, Response},
	Json,
};
use relay_types::{ErrorKind, GatewayError, JsonPayload, ProxyResult, UpstreamPayload};
use serde_json::Value;

use crate::handlers::common::ErrorResponse;

const OCTET_STREAM: &str = "application/octet-stream";

/// Turns a `ProxyResult` into an HTTP response
#[derive(Debug, Clone)]
pub struct EnvelopeBuilder {
	creator: String,
	missing_parameter_status: StatusCode,
}

impl Default for EnvelopeBuilder {
	fn default() -> Self {
		Self::new("Crazy", 400)
	}
}

impl EnvelopeBuilder {
	/// `missing_parameter_status` falls back to 400 if it is not a valid status code
	pub fn new(creator: impl Into<String>, missing_parameter_status: u16) -> Self {
		Self {
			creator: creator.into(),
			missing_parameter_status: StatusCode::from_u16(missing_parameter_status)
				.unwrap_or(StatusCode::BAD_REQUEST),
		}
	}

	pub fn creator(&self) -> &str {
		&self.creator
	}

	/// `{"status":200,"creator":..., ...payload}`; envelope keys win over payload keys
	pub fn json_body(&self, payload: JsonPayload) -> Value {
		let mut body = payload;
		body.insert("status".to_string(), Value::from(StatusCode::OK.as_u16()));
		body.insert("creator".to_string(), Value::from(self.creator.clone()));
		Value::Object(body)
	}

	pub fn status_for(&self, error: &GatewayError) -> StatusCode {
		match error.kind() {
			ErrorKind::MissingParameter => self.missing_parameter_status,
			ErrorKind::NotFound => StatusCode::NOT_FOUND,
			ErrorKind::UpstreamFailure | ErrorKind::UpstreamMalformedResponse => {
				StatusCode::INTERNAL_SERVER_ERROR
			},
		}
	}

	pub fn build(&self, result: ProxyResult) -> Response {
		match result {
			ProxyResult::Success(UpstreamPayload::Json(payload)) => {
				(StatusCode::OK, Json(self.json_body(payload))).into_response()
			},
			ProxyResult::Success(UpstreamPayload::Binary { media_type, bytes }) => {
				let content_type = HeaderValue::from_str(&media_type)
					.unwrap_or_else(|_| HeaderValue::from_static(OCTET_STREAM));
				(StatusCode::OK, [(header::CONTENT_TYPE, content_type)], bytes).into_response()
			},
			ProxyResult::Failure(error) => self.failure(&error),
		}
	}

	pub fn failure(&self, error: &GatewayError) -> Response {
		(self.status_for(error), Json(ErrorResponse::new(error.to_string()))).into_response()
	}

	pub fn not_found(&self) -> Response {
		self.failure(&GatewayError::NotFound)
	}
}
