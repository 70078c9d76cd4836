//! Outcome of a single proxied call

use bytes::Bytes;

use crate::GatewayError;

/// JSON object payload, flattened into the response envelope
pub type JsonPayload = serde_json::Map<String, serde_json::Value>;

/// What an upstream caller produces on success
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamPayload {
	Json(JsonPayload),
	Binary { media_type: String, bytes: Bytes },
}

impl UpstreamPayload {
	/// Single-field JSON payload, the shape most routes return
	pub fn field(key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
		let mut map = JsonPayload::new();
		map.insert(key.into(), value.into());
		UpstreamPayload::Json(map)
	}

	pub fn binary(media_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
		UpstreamPayload::Binary {
			media_type: media_type.into(),
			bytes: bytes.into(),
		}
	}

	pub fn is_binary(&self) -> bool {
		matches!(self, UpstreamPayload::Binary { .. })
	}
}

/// Exactly one of success or failure, consumed by the envelope builder
#[derive(Debug)]
pub enum ProxyResult {
	Success(UpstreamPayload),
	Failure(GatewayError),
}

impl ProxyResult {
	pub fn is_success(&self) -> bool {
		matches!(self, ProxyResult::Success(_))
	}

	/// Failure message as surfaced to clients
	pub fn failure_message(&self) -> Option<String> {
		match self {
			ProxyResult::Success(_) => None,
			ProxyResult::Failure(err) => Some(err.to_string()),
		}
	}
}

impl From<Result<UpstreamPayload, GatewayError>> for ProxyResult {
	fn from(result: Result<UpstreamPayload, GatewayError>) -> Self {
		match result {
			Ok(payload) => ProxyResult::Success(payload),
			Err(err) => ProxyResult::Failure(err),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_field_payload() {
		let payload = UpstreamPayload::field("translated", "bonjour");
		match payload {
			UpstreamPayload::Json(map) => assert_eq!(map["translated"], "bonjour"),
			other => panic!("unexpected payload: {:?}", other),
		}
	}

	#[test]
	fn test_result_conversion() {
		let ok: ProxyResult = Ok(UpstreamPayload::binary("image/png", vec![1u8, 2, 3])).into();
		assert!(ok.is_success());
		assert_eq!(ok.failure_message(), None);

		let failed: ProxyResult = Err(GatewayError::upstream("network down")).into();
		assert_eq!(failed.failure_message().as_deref(), Some("network down"));
	}
}
