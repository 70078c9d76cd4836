//! Catalog search callers: images, npm packages, lyrics and videos

use async_trait::async_trait;
use relay_types::{
	Capability, ProxyRequest, UpstreamCaller, UpstreamError, UpstreamInfo, UpstreamPayload,
	UpstreamResult, UpstreamRuntimeConfig,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::http::send_json;

pub const UNSPLASH_ENDPOINT: &str = "https://api.unsplash.com";
pub const UNSPLASH_CREDENTIAL_ENV: &str = "UNSPLASH_ACCESS_KEY";
pub const NPM_ENDPOINT: &str = "https://registry.npmjs.org";
pub const LRCLIB_ENDPOINT: &str = "https://lrclib.net";
pub const PIPED_ENDPOINT: &str = "https://pipedapi.kavin.rocks";

/// Video results returned per query
pub const MAX_VIDEO_RESULTS: usize = 10;

fn search_info(id: &str, name: &str, config: &UpstreamRuntimeConfig, default: &str) -> UpstreamInfo {
	UpstreamInfo::new(id, name, Capability::SearchCatalog, config.endpoint_or(default))
}

#[derive(Debug, Deserialize)]
struct UnsplashResponse {
	#[serde(default)]
	results: Vec<UnsplashPhoto>,
}

#[derive(Debug, Deserialize)]
struct UnsplashPhoto {
	urls: UnsplashUrls,
}

#[derive(Debug, Deserialize)]
struct UnsplashUrls {
	small: String,
}

/// Image search; answers `{images: [url, ...]}`
#[derive(Debug)]
pub struct UnsplashSearchCaller {
	info: UpstreamInfo,
	client: Client,
	config: UpstreamRuntimeConfig,
}

impl UnsplashSearchCaller {
	pub const ID: &'static str = "unsplash-search";

	pub fn new(client: Client, config: UpstreamRuntimeConfig) -> Self {
		Self {
			info: search_info(Self::ID, "Unsplash photo search", &config, UNSPLASH_ENDPOINT),
			client,
			config,
		}
	}
}

#[async_trait]
impl UpstreamCaller for UnsplashSearchCaller {
	fn upstream_info(&self) -> &UpstreamInfo {
		&self.info
	}

	async fn call(&self, request: &ProxyRequest) -> UpstreamResult<UpstreamPayload> {
		let query = request.require_arg("q")?;
		let key = self.config.require_credential()?;

		let response: UnsplashResponse = send_json(
			self.client
				.get(format!("{}/search/photos", self.info.endpoint))
				.query(&[("query", query), ("client_id", key.expose_secret())]),
		)
		.await?;

		let images: Vec<String> = response.results.into_iter().map(|p| p.urls.small).collect();
		debug!("Image search for '{}' returned {} results", query, images.len());
		Ok(UpstreamPayload::field("images", images))
	}
}

#[derive(Debug, Deserialize)]
struct NpmSearchResponse {
	#[serde(default)]
	objects: Vec<NpmSearchObject>,
}

#[derive(Debug, Deserialize)]
struct NpmSearchObject {
	package: NpmPackage,
}

#[derive(Debug, Serialize, Deserialize)]
struct NpmPackage {
	name: String,
	#[serde(default)]
	version: Option<String>,
	#[serde(default)]
	description: Option<String>,
	#[serde(default)]
	links: Option<Value>,
}

/// npm registry search; answers `{packages: [...]}`
#[derive(Debug)]
pub struct NpmSearchCaller {
	info: UpstreamInfo,
	client: Client,
}

impl NpmSearchCaller {
	pub const ID: &'static str = "npm-search";

	pub fn new(client: Client, config: UpstreamRuntimeConfig) -> Self {
		Self {
			info: search_info(Self::ID, "npm registry search", &config, NPM_ENDPOINT),
			client,
		}
	}
}

#[async_trait]
impl UpstreamCaller for NpmSearchCaller {
	fn upstream_info(&self) -> &UpstreamInfo {
		&self.info
	}

	async fn call(&self, request: &ProxyRequest) -> UpstreamResult<UpstreamPayload> {
		let query = request.require_arg("q")?;

		let response: NpmSearchResponse = send_json(
			self.client
				.get(format!("{}/-/v1/search", self.info.endpoint))
				.query(&[("text", query)]),
		)
		.await?;

		let packages: Vec<NpmPackage> = response.objects.into_iter().map(|o| o.package).collect();
		Ok(UpstreamPayload::field("packages", serde_json::to_value(packages)?))
	}
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LyricsRecord {
	#[serde(default)]
	track_name: Option<String>,
	#[serde(default)]
	artist_name: Option<String>,
	#[serde(default)]
	plain_lyrics: Option<String>,
}

/// Lyrics search through LRCLIB; answers `{lyrics}` for the first match with text
#[derive(Debug)]
pub struct LyricsSearchCaller {
	info: UpstreamInfo,
	client: Client,
}

impl LyricsSearchCaller {
	pub const ID: &'static str = "lyrics-search";

	pub fn new(client: Client, config: UpstreamRuntimeConfig) -> Self {
		Self {
			info: search_info(Self::ID, "LRCLIB lyrics search", &config, LRCLIB_ENDPOINT),
			client,
		}
	}
}

#[async_trait]
impl UpstreamCaller for LyricsSearchCaller {
	fn upstream_info(&self) -> &UpstreamInfo {
		&self.info
	}

	async fn call(&self, request: &ProxyRequest) -> UpstreamResult<UpstreamPayload> {
		let query = request.require_arg("q")?;

		let records: Vec<LyricsRecord> = send_json(
			self.client
				.get(format!("{}/api/search", self.info.endpoint))
				.query(&[("q", query)]),
		)
		.await?;

		let record = records
			.into_iter()
			.find(|r| r.plain_lyrics.as_deref().is_some_and(|l| !l.trim().is_empty()))
			.ok_or_else(|| UpstreamError::invalid_response(format!("no lyrics found for '{}'", query)))?;

		debug!(
			"Lyrics match: {} - {}",
			record.artist_name.as_deref().unwrap_or("?"),
			record.track_name.as_deref().unwrap_or("?")
		);
		Ok(UpstreamPayload::field(
			"lyrics",
			record.plain_lyrics.unwrap_or_default(),
		))
	}
}

#[derive(Debug, Deserialize)]
struct VideoSearchResponse {
	#[serde(default)]
	items: Vec<Value>,
}

/// Video search through a Piped-compatible API; answers up to ten `{videos}`
#[derive(Debug)]
pub struct VideoSearchCaller {
	info: UpstreamInfo,
	client: Client,
}

impl VideoSearchCaller {
	pub const ID: &'static str = "video-search";

	pub fn new(client: Client, config: UpstreamRuntimeConfig) -> Self {
		Self {
			info: search_info(Self::ID, "Video search", &config, PIPED_ENDPOINT),
			client,
		}
	}
}

#[async_trait]
impl UpstreamCaller for VideoSearchCaller {
	fn upstream_info(&self) -> &UpstreamInfo {
		&self.info
	}

	async fn call(&self, request: &ProxyRequest) -> UpstreamResult<UpstreamPayload> {
		let query = request.require_arg("q")?;

		let response: VideoSearchResponse = send_json(
			self.client
				.get(format!("{}/search", self.info.endpoint))
				.query(&[("q", query), ("filter", "videos")]),
		)
		.await?;

		let videos: Vec<Value> = response.items.into_iter().take(MAX_VIDEO_RESULTS).collect();
		Ok(UpstreamPayload::field("videos", videos))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::http::{build_client, ClientConfig};
	use relay_types::{QueryParams, SecretString};
	use wiremock::matchers::{method, path, query_param};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn query_request(q: &str) -> ProxyRequest {
		let mut params = QueryParams::new();
		params.insert("q".to_string(), q.to_string());
		ProxyRequest::new("/api/search", params, QueryParams::new())
	}

	fn endpoint(server: &MockServer) -> UpstreamRuntimeConfig {
		UpstreamRuntimeConfig::new().with_endpoint(server.uri())
	}

	fn client() -> Client {
		build_client(&ClientConfig::default()).unwrap()
	}

	#[tokio::test]
	async fn test_unsplash_returns_small_urls() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/search/photos"))
			.and(query_param("query", "cats"))
			.and(query_param("client_id", "unsplash_key"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
				"total": 2,
				"results": [
					{ "id": "a", "urls": { "small": "https://img/a", "full": "https://img/a-full" } },
					{ "id": "b", "urls": { "small": "https://img/b" } }
				]
			})))
			.mount(&server)
			.await;

		let caller = UnsplashSearchCaller::new(
			client(),
			endpoint(&server)
				.with_credential(UNSPLASH_CREDENTIAL_ENV, Some(SecretString::from("unsplash_key"))),
		);
		let payload = caller.call(&query_request("cats")).await.unwrap();
		assert_eq!(
			payload,
			UpstreamPayload::field("images", vec!["https://img/a", "https://img/b"])
		);
	}

	#[tokio::test]
	async fn test_npm_search_maps_packages() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/-/v1/search"))
			.and(query_param("text", "axios"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
				"objects": [
					{ "package": { "name": "axios", "version": "1.7.0", "description": "HTTP client" }, "score": {} }
				],
				"total": 1
			})))
			.mount(&server)
			.await;

		let caller = NpmSearchCaller::new(client(), endpoint(&server));
		let payload = caller.call(&query_request("axios")).await.unwrap();

		let UpstreamPayload::Json(map) = payload else {
			panic!("expected json payload");
		};
		assert_eq!(map["packages"][0]["name"], "axios");
		assert_eq!(map["packages"][0]["version"], "1.7.0");
	}

	#[tokio::test]
	async fn test_lyrics_skips_instrumental_matches() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/api/search"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
				{ "trackName": "Song", "artistName": "Band", "plainLyrics": null, "instrumental": true },
				{ "trackName": "Song", "artistName": "Band", "plainLyrics": "la la la" }
			])))
			.mount(&server)
			.await;

		let caller = LyricsSearchCaller::new(client(), endpoint(&server));
		let payload = caller.call(&query_request("song")).await.unwrap();
		assert_eq!(payload, UpstreamPayload::field("lyrics", "la la la"));
	}

	#[tokio::test]
	async fn test_lyrics_without_match_is_malformed() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
			.mount(&server)
			.await;

		let caller = LyricsSearchCaller::new(client(), endpoint(&server));
		let err = caller.call(&query_request("nothing")).await.unwrap_err();
		assert!(err.is_malformed());
	}

	#[tokio::test]
	async fn test_video_search_caps_results() {
		let items: Vec<Value> = (0..15)
			.map(|i| serde_json::json!({ "url": format!("/watch?v={}", i), "title": format!("video {}", i) }))
			.collect();
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/search"))
			.and(query_param("filter", "videos"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "items": items })))
			.mount(&server)
			.await;

		let caller = VideoSearchCaller::new(client(), endpoint(&server));
		let payload = caller.call(&query_request("rust")).await.unwrap();

		let UpstreamPayload::Json(map) = payload else {
			panic!("expected json payload");
		};
		assert_eq!(map["videos"].as_array().unwrap().len(), MAX_VIDEO_RESULTS);
		assert_eq!(map["videos"][0]["title"], "video 0");
	}
}
