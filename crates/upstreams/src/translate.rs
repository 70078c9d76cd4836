//! Text translation via the public Google translate endpoint

use async_trait::async_trait;
use relay_types::{
	Capability, ProxyRequest, UpstreamCaller, UpstreamError, UpstreamInfo, UpstreamPayload,
	UpstreamResult, UpstreamRuntimeConfig,
};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::http::send_json;

pub const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com";

/// Translates `text` into the `to` language; answers `{translated}`
#[derive(Debug)]
pub struct GoogleTranslateCaller {
	info: UpstreamInfo,
	client: Client,
}

impl GoogleTranslateCaller {
	pub const ID: &'static str = "google-translate";

	pub fn new(client: Client, config: UpstreamRuntimeConfig) -> Self {
		Self {
			info: UpstreamInfo::new(
				Self::ID,
				"Google translate",
				Capability::Translate,
				config.endpoint_or(DEFAULT_ENDPOINT),
			),
			client,
		}
	}
}

/// The response is a nested array: `[[["Hola", "Hello", ...], ["mundo", "world", ...]], ...]`.
/// The translation is the concatenation of the first element of every segment.
fn join_segments(body: &Value) -> UpstreamResult<String> {
	let segments = body
		.get(0)
		.and_then(Value::as_array)
		.ok_or_else(|| UpstreamError::invalid_response("translation segments missing"))?;

	let translated: String = segments
		.iter()
		.filter_map(|segment| segment.get(0).and_then(Value::as_str))
		.collect();

	if translated.is_empty() && !segments.is_empty() {
		return Err(UpstreamError::invalid_response("translation segments were empty"));
	}
	Ok(translated)
}

#[async_trait]
impl UpstreamCaller for GoogleTranslateCaller {
	fn upstream_info(&self) -> &UpstreamInfo {
		&self.info
	}

	async fn call(&self, request: &ProxyRequest) -> UpstreamResult<UpstreamPayload> {
		let text = request.require_arg("text")?;
		let target = request.arg("to").map(str::trim).filter(|t| !t.is_empty()).unwrap_or("en");
		debug!("Translating {} chars into {}", text.len(), target);

		let body: Value = send_json(
			self.client
				.get(format!("{}/translate_a/single", self.info.endpoint))
				.query(&[
					("client", "gtx"),
					("sl", "auto"),
					("tl", target),
					("dt", "t"),
					("q", text),
				]),
		)
		.await?;

		Ok(UpstreamPayload::field("translated", join_segments(&body)?))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::http::{build_client, ClientConfig};
	use relay_types::QueryParams;
	use wiremock::matchers::{method, path, query_param};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	#[test]
	fn test_join_segments() {
		let body = serde_json::json!([[["Hola ", "Hello ", null], ["mundo", "world", null]], null, "en"]);
		assert_eq!(join_segments(&body).unwrap(), "Hola mundo");

		let err = join_segments(&serde_json::json!({"unexpected": true})).unwrap_err();
		assert!(err.is_malformed());
	}

	#[tokio::test]
	async fn test_translate_defaults_to_english() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/translate_a/single"))
			.and(query_param("tl", "en"))
			.and(query_param("q", "hola mundo"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
				[["hello world", "hola mundo", null, null, 10]],
				null,
				"es"
			])))
			.expect(1)
			.mount(&server)
			.await;

		let caller = GoogleTranslateCaller::new(
			build_client(&ClientConfig::default()).unwrap(),
			UpstreamRuntimeConfig::new().with_endpoint(server.uri()),
		);
		let mut params = QueryParams::new();
		params.insert("text".to_string(), "hola mundo".to_string());
		let payload = caller
			.call(&ProxyRequest::new("/api/translate", params, QueryParams::new()))
			.await
			.unwrap();

		assert_eq!(payload, UpstreamPayload::field("translated", "hello world"));
	}
}
