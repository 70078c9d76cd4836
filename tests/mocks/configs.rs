//! Settings fixtures for tests

use relay_gateway::config::{ConfigurableValue, Settings, UpstreamSettings};

/// Directory with a minimal dashboard, relative to the package root
pub const STATIC_FIXTURE_DIR: &str = "tests/fixtures/public";

#[allow(dead_code)]
pub struct MockConfigs;

#[allow(dead_code)]
impl MockConfigs {
	/// Defaults with a loopback bind and the fixture dashboard
	pub fn test_settings() -> Settings {
		let mut settings = Settings::default();
		settings.server.host = "127.0.0.1".to_string();
		settings.server.static_dir = STATIC_FIXTURE_DIR.to_string();
		settings.logging.level = "debug".to_string();
		settings
	}

	/// Missing parameters answered with 500 as in the legacy service
	pub fn legacy_status_settings() -> Settings {
		let mut settings = Self::test_settings();
		settings.errors.missing_parameter_status = 500;
		settings
	}

	/// Point one built-in upstream at a mock server
	pub fn with_endpoint(mut settings: Settings, upstream_id: &str, endpoint: &str) -> Settings {
		settings
			.upstreams
			.entry(upstream_id.to_string())
			.or_insert_with(UpstreamSettings::default)
			.endpoint = Some(endpoint.to_string());
		settings
	}

	/// Read an upstream's credential from an env var that is never set
	pub fn with_unset_credential(mut settings: Settings, upstream_id: &str, env_name: &str) -> Settings {
		settings
			.upstreams
			.entry(upstream_id.to_string())
			.or_insert_with(UpstreamSettings::default)
			.credential = Some(ConfigurableValue::from_env(env_name));
		settings
	}

	/// Global per-request limit of `requests_per_minute`
	pub fn rate_limited_settings(requests_per_minute: u32) -> Settings {
		let mut settings = Self::test_settings();
		settings.environment.rate_limiting.enabled = true;
		settings.environment.rate_limiting.requests_per_minute = requests_per_minute;
		settings
	}
}
