//! Random resource callers (quotes, images)

use async_trait::async_trait;
use relay_types::{
	Capability, ProxyRequest, UpstreamCaller, UpstreamInfo, UpstreamPayload, UpstreamResult,
	UpstreamRuntimeConfig,
};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::http::send_json;

pub const QUOTABLE_ENDPOINT: &str = "https://api.quotable.io";
pub const WAIFU_ENDPOINT: &str = "https://api.waifu.pics";

/// Random quote; answers `{quote: {...}}` with the upstream object as-is
#[derive(Debug)]
pub struct RandomQuoteCaller {
	info: UpstreamInfo,
	client: Client,
}

impl RandomQuoteCaller {
	pub const ID: &'static str = "random-quote";

	pub fn new(client: Client, config: UpstreamRuntimeConfig) -> Self {
		Self {
			info: UpstreamInfo::new(
				Self::ID,
				"Random quote",
				Capability::FetchRandomResource,
				config.endpoint_or(QUOTABLE_ENDPOINT),
			),
			client,
		}
	}
}

#[async_trait]
impl UpstreamCaller for RandomQuoteCaller {
	fn upstream_info(&self) -> &UpstreamInfo {
		&self.info
	}

	async fn call(&self, _request: &ProxyRequest) -> UpstreamResult<UpstreamPayload> {
		let quote: serde_json::Map<String, Value> =
			send_json(self.client.get(format!("{}/random", self.info.endpoint))).await?;
		Ok(UpstreamPayload::field("quote", quote))
	}
}

#[derive(Debug, Deserialize)]
struct WaifuResponse {
	url: String,
}

/// Random SFW anime image; answers `{url}`
#[derive(Debug)]
pub struct RandomWaifuCaller {
	info: UpstreamInfo,
	client: Client,
}

impl RandomWaifuCaller {
	pub const ID: &'static str = "random-waifu";

	pub fn new(client: Client, config: UpstreamRuntimeConfig) -> Self {
		Self {
			info: UpstreamInfo::new(
				Self::ID,
				"Random waifu image",
				Capability::FetchRandomResource,
				config.endpoint_or(WAIFU_ENDPOINT),
			),
			client,
		}
	}
}

#[async_trait]
impl UpstreamCaller for RandomWaifuCaller {
	fn upstream_info(&self) -> &UpstreamInfo {
		&self.info
	}

	async fn call(&self, _request: &ProxyRequest) -> UpstreamResult<UpstreamPayload> {
		let response: WaifuResponse =
			send_json(self.client.get(format!("{}/sfw/waifu", self.info.endpoint))).await?;
		Ok(UpstreamPayload::field("url", response.url))
	}
}
