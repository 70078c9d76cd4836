//! Media format resolution against a Piped-compatible streams API

use async_trait::async_trait;
use relay_types::{
	Capability, ProxyRequest, UpstreamCaller, UpstreamError, UpstreamInfo, UpstreamPayload,
	UpstreamResult, UpstreamRuntimeConfig,
};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::http::send_json;

pub const DEFAULT_ENDPOINT: &str = "https://pipedapi.kavin.rocks";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StreamsResponse {
	#[serde(default)]
	video_streams: Vec<Stream>,
	#[serde(default)]
	audio_streams: Vec<Stream>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Stream {
	url: String,
	#[serde(default)]
	quality: Option<String>,
	#[serde(default)]
	bitrate: Option<u64>,
	#[serde(default)]
	video_only: bool,
}

impl Stream {
	/// Vertical resolution parsed from labels like `720p` or `1080p60`
	fn height(&self) -> u32 {
		self.quality
			.as_deref()
			.and_then(|q| q.split('p').next())
			.and_then(|h| h.parse().ok())
			.unwrap_or(0)
	}
}

/// Which stream the client asked for via `format`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualityChoice {
	Highest,
	Lowest,
	HighestAudio,
	LowestAudio,
	/// Exact quality label, e.g. `720p` or `AUDIO_QUALITY_MEDIUM`
	Label(String),
}

impl QualityChoice {
	pub fn parse(value: &str) -> Self {
		match value.trim().to_ascii_lowercase().as_str() {
			"" | "highest" | "highestvideo" => QualityChoice::Highest,
			"lowest" | "lowestvideo" => QualityChoice::Lowest,
			"highestaudio" => QualityChoice::HighestAudio,
			"lowestaudio" => QualityChoice::LowestAudio,
			_ => QualityChoice::Label(value.trim().to_string()),
		}
	}
}

/// Extract a video id from a watch URL, a short link, a shorts URL or a bare id
pub fn extract_video_id(input: &str) -> Option<String> {
	let input = input.trim();
	let is_id = |s: &str| {
		s.len() == 11 && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
	};

	if is_id(input) {
		return Some(input.to_string());
	}

	let url = Url::parse(input).ok()?;
	let host = url.host_str()?.trim_start_matches("www.").trim_start_matches("m.");

	let candidate = match host {
		"youtu.be" => url.path_segments()?.next().map(str::to_string),
		"youtube.com" | "music.youtube.com" => {
			let mut segments = url.path_segments()?;
			match segments.next() {
				Some("watch") => url
					.query_pairs()
					.find(|(k, _)| k == "v")
					.map(|(_, v)| v.into_owned()),
				Some("shorts") | Some("embed") | Some("live") => segments.next().map(str::to_string),
				_ => None,
			}
		},
		_ => None,
	}?;

	is_id(&candidate).then_some(candidate)
}

fn choose_stream(streams: StreamsResponse, choice: &QualityChoice) -> UpstreamResult<Stream> {
	let muxed: Vec<&Stream> = streams.video_streams.iter().filter(|s| !s.video_only).collect();
	let video: Vec<&Stream> = if muxed.is_empty() {
		streams.video_streams.iter().collect()
	} else {
		muxed
	};

	let chosen = match choice {
		QualityChoice::Highest => video.into_iter().max_by_key(|s| s.height()),
		QualityChoice::Lowest => video.into_iter().min_by_key(|s| s.height()),
		QualityChoice::HighestAudio => streams
			.audio_streams
			.iter()
			.max_by_key(|s| s.bitrate.unwrap_or(0)),
		QualityChoice::LowestAudio => streams
			.audio_streams
			.iter()
			.min_by_key(|s| s.bitrate.unwrap_or(0)),
		QualityChoice::Label(label) => {
			let matches = |s: &&Stream| s.quality.as_deref() == Some(label.as_str());
			let found = streams
				.video_streams
				.iter()
				.find(matches)
				.or_else(|| streams.audio_streams.iter().find(matches));
			return found.cloned().ok_or_else(|| UpstreamError::InvalidParameter {
				name: "format".to_string(),
				reason: format!("No such format found: {}", label),
			});
		},
	};

	chosen
		.cloned()
		.ok_or_else(|| UpstreamError::invalid_response("no playable streams in response"))
}

/// Resolves a direct download URL for one stream of a video
#[derive(Debug)]
pub struct MediaStreamsCaller {
	info: UpstreamInfo,
	client: Client,
}

impl MediaStreamsCaller {
	pub const ID: &'static str = "media-streams";

	pub fn new(client: Client, config: UpstreamRuntimeConfig) -> Self {
		Self {
			info: UpstreamInfo::new(
				Self::ID,
				"Media stream resolver",
				Capability::ResolveMediaFormat,
				config.endpoint_or(DEFAULT_ENDPOINT),
			),
			client,
		}
	}
}

#[async_trait]
impl UpstreamCaller for MediaStreamsCaller {
	fn upstream_info(&self) -> &UpstreamInfo {
		&self.info
	}

	async fn call(&self, request: &ProxyRequest) -> UpstreamResult<UpstreamPayload> {
		let url = request.require_arg("url")?;
		let video_id = extract_video_id(url).ok_or_else(|| UpstreamError::InvalidParameter {
			name: "url".to_string(),
			reason: format!("No video id found: {}", url),
		})?;
		let choice = QualityChoice::parse(request.arg("format").unwrap_or("highest"));
		debug!("Resolving {:?} stream for video {}", choice, video_id);

		let streams: StreamsResponse = send_json(
			self.client
				.get(format!("{}/streams/{}", self.info.endpoint, video_id)),
		)
		.await?;

		let stream = choose_stream(streams, &choice)?;
		Ok(UpstreamPayload::field("downloadUrl", stream.url))
	}
}
