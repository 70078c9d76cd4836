//! Core upstream domain model

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::SecretString;

pub mod errors;
pub mod traits;

pub use errors::UpstreamError;
pub use traits::UpstreamCaller;

/// Result type for upstream operations
pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// The external capabilities a route can forward to
///
/// Each upstream caller belongs to exactly one capability. Concurrency gates
/// are keyed by capability, so all callers of the same kind share a budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
	TextGenerate,
	ResolveMediaFormat,
	Translate,
	TransformImage,
	SearchCatalog,
	FetchRandomResource,
}

impl Capability {
	/// Every capability, in declaration order
	pub const ALL: [Capability; 6] = [
		Capability::TextGenerate,
		Capability::ResolveMediaFormat,
		Capability::Translate,
		Capability::TransformImage,
		Capability::SearchCatalog,
		Capability::FetchRandomResource,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			Capability::TextGenerate => "text_generate",
			Capability::ResolveMediaFormat => "resolve_media_format",
			Capability::Translate => "translate",
			Capability::TransformImage => "transform_image",
			Capability::SearchCatalog => "search_catalog",
			Capability::FetchRandomResource => "fetch_random_resource",
		}
	}
}

impl fmt::Display for Capability {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Static description of an upstream caller
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamInfo {
	/// Registry identifier, referenced by routes
	pub upstream_id: String,

	/// Human-readable name
	pub name: String,

	/// Capability this upstream provides
	pub capability: Capability,

	/// Base endpoint the caller talks to (informational for local callers)
	pub endpoint: String,
}

impl UpstreamInfo {
	pub fn new(
		upstream_id: impl Into<String>,
		name: impl Into<String>,
		capability: Capability,
		endpoint: impl Into<String>,
	) -> Self {
		Self {
			upstream_id: upstream_id.into(),
			name: name.into(),
			capability,
			endpoint: endpoint.into(),
		}
	}
}

/// Largest body a caller buffers from an upstream unless configured otherwise
pub const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Minimal runtime configuration handed to an upstream caller at construction
///
/// Credentials are resolved once at startup. An absent credential is kept as
/// `None` so the caller fails at call time rather than at boot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpstreamRuntimeConfig {
	/// Override for the caller's default base endpoint
	pub endpoint: Option<String>,

	/// Resolved credential, if any
	pub credential: Option<SecretString>,

	/// Name of the credential source, used in "missing credential" errors
	pub credential_name: Option<String>,

	/// Cap on buffered upstream bodies; `None` means `DEFAULT_MAX_BODY_BYTES`
	pub max_body_bytes: Option<usize>,
}

impl UpstreamRuntimeConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.endpoint = Some(endpoint.into());
		self
	}

	pub fn with_credential(mut self, name: impl Into<String>, credential: Option<SecretString>) -> Self {
		self.credential_name = Some(name.into());
		self.credential = credential;
		self
	}

	pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
		self.max_body_bytes = Some(max_body_bytes);
		self
	}

	pub fn body_limit(&self) -> usize {
		self.max_body_bytes.unwrap_or(DEFAULT_MAX_BODY_BYTES)
	}

	/// Endpoint to use, falling back to the caller's default
	pub fn endpoint_or(&self, default: &str) -> String {
		self.endpoint
			.as_deref()
			.unwrap_or(default)
			.trim_end_matches('/')
			.to_string()
	}

	/// The resolved credential or a `MissingCredential` error
	pub fn require_credential(&self) -> UpstreamResult<&SecretString> {
		self.credential
			.as_ref()
			.filter(|secret| !secret.is_empty())
			.ok_or_else(|| UpstreamError::MissingCredential {
				name: self
					.credential_name
					.clone()
					.unwrap_or_else(|| "credential".to_string()),
			})
	}
}
