//! Configuration loading utilities

use crate::{settings::ConfigValidationError, Settings};
use config::{Config, ConfigError, Environment, File};
use std::env;

/// Default config file location (extension resolved by the `config` crate)
pub const DEFAULT_CONFIG_PATH: &str = "config/config";

/// Prefix for environment overrides, e.g. `RELAY__SERVER__PORT=8080`
pub const ENV_PREFIX: &str = "RELAY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
	#[error("Failed to read configuration: {0}")]
	Source(#[from] ConfigError),

	#[error("Invalid configuration: {0}")]
	Validation(#[from] ConfigValidationError),

	#[error("Invalid PORT value '{0}'")]
	InvalidPort(String),
}

/// Load configuration from `config/config.*`, then environment overrides
pub fn load_config() -> Result<Settings, ConfigLoadError> {
	let path = env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
	load_config_from(&path)
}

/// Load configuration from an explicit file path (optional), then the environment
///
/// A plain `PORT` variable is honored last, as hosting platforms set it.
pub fn load_config_from(path: &str) -> Result<Settings, ConfigLoadError> {
	let source = Config::builder()
		.add_source(File::with_name(path).required(false))
		.add_source(
			Environment::with_prefix(ENV_PREFIX)
				.prefix_separator("__")
				.separator("__")
				.try_parsing(true),
		)
		.build()?;

	let mut settings: Settings = source.try_deserialize()?;

	if let Ok(port) = env::var("PORT") {
		settings.server.port = port
			.trim()
			.parse()
			.map_err(|_| ConfigLoadError::InvalidPort(port.clone()))?;
	}

	settings.validate()?;
	Ok(settings)
}
