//! Configuration settings structures

use crate::{configurable_value::ConfigurableValue, ConfigurableValueError};
use relay_types::{Capability, RouteSpec, SecretString, DEFAULT_MAX_BODY_BYTES};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Main application settings
///
/// Every section has defaults, so a config file only needs the keys it changes.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
	pub server: ServerSettings,
	pub timeouts: TimeoutSettings,
	pub concurrency: ConcurrencySettings,
	pub environment: EnvironmentSettings,
	pub logging: LoggingSettings,
	pub errors: ErrorSettings,
	pub limits: LimitSettings,
	/// Per-upstream overrides keyed by upstream id
	pub upstreams: HashMap<String, UpstreamSettings>,
	/// Routes added on top of the built-in table
	pub routes: Vec<RouteSpec>,
}

/// Server configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
	pub host: String,
	pub port: u16,
	/// Directory served for every path outside `/api`
	pub static_dir: String,
	/// Fixed `creator` value stamped on every JSON envelope
	pub creator: String,
}

impl Default for ServerSettings {
	fn default() -> Self {
		Self {
			host: "0.0.0.0".to_string(),
			port: 3000,
			static_dir: "public".to_string(),
			creator: "Crazy".to_string(),
		}
	}
}

/// Outbound HTTP timeouts
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TimeoutSettings {
	/// Whole-request timeout for upstream calls
	pub request_ms: u64,
	/// TCP connect timeout for upstream calls
	pub connect_ms: u64,
}

impl Default for TimeoutSettings {
	fn default() -> Self {
		Self {
			request_ms: 60_000,
			connect_ms: 10_000,
		}
	}
}

/// Bounded in-flight upstream calls per capability
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ConcurrencySettings {
	pub default_permits: usize,
	/// Overrides keyed by capability name, e.g. `transform_image = 2`
	pub per_capability: HashMap<String, usize>,
}

impl Default for ConcurrencySettings {
	fn default() -> Self {
		Self {
			default_permits: 16,
			per_capability: HashMap::new(),
		}
	}
}

impl ConcurrencySettings {
	/// Permit count for a capability
	pub fn permits_for(&self, capability: Capability) -> usize {
		self.per_capability
			.get(capability.as_str())
			.copied()
			.unwrap_or(self.default_permits)
	}
}

/// Environment-specific settings
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct EnvironmentSettings {
	pub rate_limiting: RateLimitSettings,
}

/// Global inbound rate limiting
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RateLimitSettings {
	pub enabled: bool,
	pub requests_per_minute: u32,
}

impl Default for RateLimitSettings {
	fn default() -> Self {
		Self {
			enabled: false,
			requests_per_minute: 600,
		}
	}
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingSettings {
	pub level: String,
	pub format: LogFormat,
	pub structured: bool,
}

impl Default for LoggingSettings {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LogFormat::Pretty,
			structured: false,
		}
	}
}

/// Log format options
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	Json,
	Pretty,
	Compact,
}

/// How failures are surfaced to clients
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ErrorSettings {
	/// Status for a missing required parameter; 500 reproduces the legacy behavior
	pub missing_parameter_status: u16,
	/// Longest failure message returned to clients
	pub max_message_len: usize,
	/// Strip query strings from URLs embedded in failure messages
	pub redact_urls: bool,
}

impl Default for ErrorSettings {
	fn default() -> Self {
		Self {
			missing_parameter_status: 400,
			max_message_len: 512,
			redact_urls: true,
		}
	}
}

/// Bounds on what the gateway buffers from upstreams
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LimitSettings {
	/// Largest upstream body read into memory (downloads included)
	pub max_body_bytes: usize,
}

impl Default for LimitSettings {
	fn default() -> Self {
		Self {
			max_body_bytes: DEFAULT_MAX_BODY_BYTES,
		}
	}
}

/// Override for one upstream caller
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct UpstreamSettings {
	/// Replaces the caller's default base URL
	pub endpoint: Option<String>,
	/// Replaces the caller's default credential source
	pub credential: Option<ConfigurableValue>,
}

impl UpstreamSettings {
	/// Resolve the configured credential, if one is configured
	///
	/// `Ok(None)` means no override; an `Err` means the override names an
	/// environment variable that is not set.
	pub fn resolve_credential(&self) -> Result<Option<SecretString>, ConfigurableValueError> {
		self.credential
			.as_ref()
			.map(|value| value.resolve_for_secret())
			.transpose()
	}
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigValidationError {
	#[error("server.port must be non-zero")]
	InvalidPort,

	#[error("concurrency.default_permits must be at least 1")]
	ZeroPermits,

	#[error("concurrency.per_capability.{0} must be at least 1")]
	ZeroCapabilityPermits(String),

	#[error("unknown capability in concurrency.per_capability: {0}")]
	UnknownCapability(String),

	#[error("errors.missing_parameter_status must be a 4xx or 5xx code, got {0}")]
	InvalidMissingParameterStatus(u16),

	#[error("limits.max_body_bytes must be at least 1")]
	ZeroBodyLimit,

	#[error("environment.rate_limiting.requests_per_minute must be at least 1 when enabled")]
	ZeroRateLimit,
}

impl Settings {
	/// Get server bind address
	pub fn bind_address(&self) -> String {
		format!("{}:{}", self.server.host, self.server.port)
	}

	/// Check the values serde cannot
	pub fn validate(&self) -> Result<(), ConfigValidationError> {
		if self.server.port == 0 {
			return Err(ConfigValidationError::InvalidPort);
		}
		if self.concurrency.default_permits == 0 {
			return Err(ConfigValidationError::ZeroPermits);
		}
		for (name, permits) in &self.concurrency.per_capability {
			if !Capability::ALL.iter().any(|c| c.as_str() == name) {
				return Err(ConfigValidationError::UnknownCapability(name.clone()));
			}
			if *permits == 0 {
				return Err(ConfigValidationError::ZeroCapabilityPermits(name.clone()));
			}
		}
		if !(400..=599).contains(&self.errors.missing_parameter_status) {
			return Err(ConfigValidationError::InvalidMissingParameterStatus(
				self.errors.missing_parameter_status,
			));
		}
		if self.limits.max_body_bytes == 0 {
			return Err(ConfigValidationError::ZeroBodyLimit);
		}
		let rate = &self.environment.rate_limiting;
		if rate.enabled && rate.requests_per_minute == 0 {
			return Err(ConfigValidationError::ZeroRateLimit);
		}
		Ok(())
	}

	/// Override settings for an upstream id, if any
	pub fn upstream(&self, upstream_id: &str) -> Option<&UpstreamSettings> {
		self.upstreams.get(upstream_id)
	}
}
