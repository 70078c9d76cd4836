//! Image transformation callers
//!
//! `ImageEnhanceCaller` does its work locally: it fetches the source image,
//! upscales it and re-encodes it as WebP on the blocking pool.
//! `RemoveBgCaller` delegates to the remove.bg API.

use async_trait::async_trait;
use bytes::Bytes;
use image::{imageops::FilterType, DynamicImage, ImageFormat, ImageReader, Limits};
use relay_types::{
	Capability, ProxyRequest, UpstreamCaller, UpstreamError, UpstreamInfo, UpstreamPayload,
	UpstreamResult, UpstreamRuntimeConfig,
};
use reqwest::Client;
use serde::Serialize;
use std::io::Cursor;
use tracing::debug;

use crate::http::send_bytes;

pub const TARGET_WIDTH: u32 = 1920;
pub const WEBP_MEDIA_TYPE: &str = "image/webp";

/// Output bound: 1920 wide and at most 4320 tall
pub const MAX_OUTPUT_PIXELS: u64 = TARGET_WIDTH as u64 * 4320;

/// Source bounds enforced while decoding
pub const MAX_SOURCE_DIMENSION: u32 = 16_384;
pub const MAX_DECODE_ALLOC: u64 = 256 * 1024 * 1024;

pub const REMOVE_BG_ENDPOINT: &str = "https://api.remove.bg";
pub const REMOVE_BG_CREDENTIAL_ENV: &str = "REMOVE_BG_KEY";

fn decode_source(source: &[u8]) -> UpstreamResult<DynamicImage> {
	let decode_error = |e: String| UpstreamError::Transform(format!("cannot decode source image: {}", e));

	let mut reader = ImageReader::new(Cursor::new(source))
		.with_guessed_format()
		.map_err(|e| decode_error(e.to_string()))?;

	let mut limits = Limits::default();
	limits.max_image_width = Some(MAX_SOURCE_DIMENSION);
	limits.max_image_height = Some(MAX_SOURCE_DIMENSION);
	limits.max_alloc = Some(MAX_DECODE_ALLOC);
	reader.limits(limits);

	reader.decode().map_err(|e| decode_error(e.to_string()))
}

/// Resize to `TARGET_WIDTH` keeping the aspect ratio and encode as WebP
///
/// Fails with `Transform` when the scaled output would exceed `MAX_OUTPUT_PIXELS`.
pub fn upscale_to_webp(source: &[u8]) -> UpstreamResult<Vec<u8>> {
	let decoded = decode_source(source)?;

	let (width, height) = (decoded.width(), decoded.height());
	if width == 0 || height == 0 {
		return Err(UpstreamError::Transform("source image has no pixels".to_string()));
	}
	let scaled_height = ((height as f64 * TARGET_WIDTH as f64) / width as f64)
		.round()
		.max(1.0);
	if scaled_height * TARGET_WIDTH as f64 > MAX_OUTPUT_PIXELS as f64 {
		return Err(UpstreamError::Transform(format!(
			"output too large: {}x{} source would scale to {}x{}, limit is {} pixels",
			width, height, TARGET_WIDTH, scaled_height, MAX_OUTPUT_PIXELS
		)));
	}
	let target_height = scaled_height as u32;

	let resized = decoded.resize_exact(TARGET_WIDTH, target_height, FilterType::Lanczos3);
	let rgba = DynamicImage::ImageRgba8(resized.to_rgba8());

	let mut out = Cursor::new(Vec::new());
	rgba.write_to(&mut out, ImageFormat::WebP)
		.map_err(|e| UpstreamError::Transform(format!("cannot encode webp: {}", e)))?;
	Ok(out.into_inner())
}

/// Upscales the image at `url`; answers `image/webp` bytes
#[derive(Debug)]
pub struct ImageEnhanceCaller {
	info: UpstreamInfo,
	client: Client,
	config: UpstreamRuntimeConfig,
}

impl ImageEnhanceCaller {
	pub const ID: &'static str = "image-enhance";

	/// The endpoint is informational only; images are fetched from the caller-supplied URL
	pub fn new(client: Client, config: UpstreamRuntimeConfig) -> Self {
		Self {
			info: UpstreamInfo::new(
				Self::ID,
				"Image enhancer",
				Capability::TransformImage,
				config.endpoint_or("local"),
			),
			client,
			config,
		}
	}
}

#[async_trait]
impl UpstreamCaller for ImageEnhanceCaller {
	fn upstream_info(&self) -> &UpstreamInfo {
		&self.info
	}

	async fn call(&self, request: &ProxyRequest) -> UpstreamResult<UpstreamPayload> {
		let url = request.require_arg("url")?;
		let (_, source) = send_bytes(self.client.get(url), self.config.body_limit()).await?;
		debug!("Enhancing {} byte image", source.len());

		let encoded = tokio::task::spawn_blocking(move || upscale_to_webp(&source))
			.await
			.map_err(|e| UpstreamError::Task(e.to_string()))??;

		Ok(UpstreamPayload::binary(WEBP_MEDIA_TYPE, Bytes::from(encoded)))
	}
}

#[derive(Debug, Serialize)]
struct RemoveBgRequest<'a> {
	image_url: &'a str,
	size: &'static str,
}

/// Background removal through remove.bg; answers `image/png` bytes
#[derive(Debug)]
pub struct RemoveBgCaller {
	info: UpstreamInfo,
	client: Client,
	config: UpstreamRuntimeConfig,
}

impl RemoveBgCaller {
	pub const ID: &'static str = "remove-bg";

	pub fn new(client: Client, config: UpstreamRuntimeConfig) -> Self {
		let endpoint = config.endpoint_or(REMOVE_BG_ENDPOINT);
		Self {
			info: UpstreamInfo::new(
				Self::ID,
				"remove.bg background removal",
				Capability::TransformImage,
				endpoint,
			),
			client,
			config,
		}
	}
}

#[async_trait]
impl UpstreamCaller for RemoveBgCaller {
	fn upstream_info(&self) -> &UpstreamInfo {
		&self.info
	}

	async fn call(&self, request: &ProxyRequest) -> UpstreamResult<UpstreamPayload> {
		let url = request.require_arg("url")?;
		let key = self.config.require_credential()?;

		let (media_type, bytes) = send_bytes(
			self.client
				.post(format!("{}/v1.0/removebg", self.info.endpoint))
				.header("X-Api-Key", key.expose_secret())
				.json(&RemoveBgRequest {
					image_url: url,
					size: "auto",
				}),
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
