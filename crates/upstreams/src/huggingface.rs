//! Hugging Face Inference API callers
//!
//! Both callers POST to `{endpoint}/models/{model}`; the model comes from the
//! route's `model` binding.

use async_trait::async_trait;
use relay_types::{
	Capability, ProxyRequest, UpstreamCaller, UpstreamError, UpstreamInfo, UpstreamPayload,
	UpstreamResult, UpstreamRuntimeConfig,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http::{send_bytes, send_json};

pub const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co";
pub const CREDENTIAL_ENV: &str = "HF_TOKEN";

const MAX_NEW_TOKENS: u32 = 180;
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Serialize)]
struct TextGenerationRequest<'a> {
	inputs: &'a str,
	parameters: TextGenerationParameters,
}

#[derive(Debug, Serialize)]
struct TextGenerationParameters {
	max_new_tokens: u32,
	temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
	generated_text: String,
}

/// Text generation; answers `{response}`
#[derive(Debug)]
pub struct HuggingFaceTextCaller {
	info: UpstreamInfo,
	client: Client,
	config: UpstreamRuntimeConfig,
}

impl HuggingFaceTextCaller {
	pub const ID: &'static str = "huggingface-text";

	pub fn new(client: Client, config: UpstreamRuntimeConfig) -> Self {
		let endpoint = config.endpoint_or(DEFAULT_ENDPOINT);
		Self {
			info: UpstreamInfo::new(
				Self::ID,
				"Hugging Face text generation",
				Capability::TextGenerate,
				endpoint,
			),
			client,
			config,
		}
	}

	/// `prompt` (if any) is prepended to `q`
	fn build_input(request: &ProxyRequest) -> UpstreamResult<String> {
		let query = request.require_arg("q")?;
		Ok(match request.arg("prompt").map(str::trim) {
			Some(prompt) if !prompt.is_empty() => format!("{} {}", prompt, query),
			_ => query.to_string(),
		})
	}
}

#[async_trait]
impl UpstreamCaller for HuggingFaceTextCaller {
	fn upstream_info(&self) -> &UpstreamInfo {
		&self.info
	}

	async fn call(&self, request: &ProxyRequest) -> UpstreamResult<UpstreamPayload> {
		let model = request.require_arg("model")?;
		let token = self.config.require_credential()?;
		let inputs = Self::build_input(request)?;
		debug!("Text generation with model {} ({} chars)", model, inputs.len());

		let body = TextGenerationRequest {
			inputs: &inputs,
			parameters: TextGenerationParameters {
				max_new_tokens: MAX_NEW_TOKENS,
				temperature: TEMPERATURE,
			},
		};

		let outputs: Vec<GeneratedText> = send_json(
			self.client
				.post(format!("{}/models/{}", self.info.endpoint, model))
				.bearer_auth(token.expose_secret())
				.json(&body),
		)
		.await?;

		let first = outputs
			.into_iter()
			.next()
			.ok_or_else(|| UpstreamError::invalid_response("text generation returned no output"))?;

		Ok(UpstreamPayload::field("response", first.generated_text))
	}
}

#[derive(Debug, Serialize)]
struct TextToImageRequest<'a> {
	inputs: &'a str,
}

/// Text-to-image; answers raw image bytes with the upstream's content type
#[derive(Debug)]
pub struct HuggingFaceImageCaller {
	info: UpstreamInfo,
	client: Client,
	config: UpstreamRuntimeConfig,
}

impl HuggingFaceImageCaller {
	pub const ID: &'static str = "huggingface-image";

	pub fn new(client: Client, config: UpstreamRuntimeConfig) -> Self {
		let endpoint = config.endpoint_or(DEFAULT_ENDPOINT);
		Self {
			info: UpstreamInfo::new(
				Self::ID,
				"Hugging Face text-to-image",
				Capability::TextGenerate,
				endpoint,
			),
			client,
			config,
		}
	}
}

#[async_trait]
impl UpstreamCaller for HuggingFaceImageCaller {
	fn upstream_info(&self) -> &UpstreamInfo {
		&self.info
	}

	async fn call(&self, request: &ProxyRequest) -> UpstreamResult<UpstreamPayload> {
		let model = request.require_arg("model")?;
		let prompt = request.require_arg("q")?;
		let token = self.config.require_credential()?;
		debug!("Text-to-image with model {}", model);

		let (media_type, bytes) = send_bytes(
			self.client
				.post(format!("{}/models/{}", self.info.endpoint, model))
				.bearer_auth(token.expose_secret())
				.json(&TextToImageRequest { inputs: prompt }),
			self.config.body_limit(),
		)
		.await?;

		if !media_type.starts_with("image/") {
			return Err(UpstreamError::invalid_response(format!(
				"expected an image, got {}",
				media_type
			)));
		}

		Ok(UpstreamPayload::binary(media_type, bytes))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::http::{build_client, ClientConfig};
	use relay_types::{QueryParams, SecretString};
	use wiremock::matchers::{body_partial_json, header, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn request(params: &[(&str, &str)], model: &str) -> ProxyRequest {
		let params = params
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		let mut bindings = QueryParams::new();
		bindings.insert("model".to_string(), model.to_string());
		ProxyRequest::new("/api/test", params, bindings)
	}

	fn config(server: &MockServer, token: Option<&str>) -> UpstreamRuntimeConfig {
		UpstreamRuntimeConfig::new()
			.with_endpoint(server.uri())
			.with_credential(CREDENTIAL_ENV, token.map(SecretString::from))
	}

	#[tokio::test]
	async fn test_text_generation_prepends_prompt() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/models/google/gemma-2b-it"))
			.and(header("authorization", "Bearer hf_test"))
			.and(body_partial_json(serde_json::json!({
				"inputs": "Be brief. what is rust",
				"parameters": { "max_new_tokens": 180 }
			})))
			.respond_with(
				ResponseTemplate::new(200)
					.set_body_json(serde_json::json!([{ "generated_text": "A language." }])),
			)
			.expect(1)
			.mount(&server)
			.await;

		let caller = HuggingFaceTextCaller::new(
			build_client(&ClientConfig::default()).unwrap(),
			config(&server, Some("hf_test")),
		);
		let payload = caller
			.call(&request(&[("q", "what is rust"), ("prompt", "Be brief.")], "google/gemma-2b-it"))
			.await
			.unwrap();

		assert_eq!(payload, UpstreamPayload::field("response", "A language."));
	}

	#[tokio::test]
	async fn test_text_generation_without_token_fails_before_calling() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(200))
			.expect(0)
			.mount(&server)
			.await;

		let caller = HuggingFaceTextCaller::new(
			build_client(&ClientConfig::default()).unwrap(),
			config(&server, None),
		);
		let err = caller
			.call(&request(&[("q", "hi")], "Qwen/Qwen2.5-7B-Instruct"))
			.await
			.unwrap_err();

		assert_eq!(err.to_string(), "Missing credential: HF_TOKEN");
	}

	#[tokio::test]
	async fn test_text_generation_empty_output_is_malformed() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
			.mount(&server)
			.await;

		let caller = HuggingFaceTextCaller::new(
			build_client(&ClientConfig::default()).unwrap(),
			config(&server, Some("hf_test")),
		);
		let err = caller.call(&request(&[("q", "hi")], "m")).await.unwrap_err();
		assert!(err.is_malformed());
	}

	#[tokio::test]
	async fn test_text_to_image_returns_bytes() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/models/runwayml/stable-diffusion-v1-5"))
			.respond_with(
				ResponseTemplate::new(200)
					.insert_header("content-type", "image/jpeg")
					.set_body_bytes(vec![0xFF, 0xD8, 0xFF]),
			)
			.mount(&server)
			.await;

		let caller = HuggingFaceImageCaller::new(
			build_client(&ClientConfig::default()).unwrap(),
			config(&server, Some("hf_test")),
		);
		let payload = caller
			.call(&request(&[("q", "a cat")], "runwayml/stable-diffusion-v1-5"))
			.await
			.unwrap();

		match payload {
			UpstreamPayload::Binary { media_type, bytes } => {
				assert_eq!(media_type, "image/jpeg");
				assert_eq!(bytes.as_ref(), &[0xFF, 0xD8, 0xFF]);
			},
			other => panic!("expected binary payload, got {:?}", other),
		}
	}
}
