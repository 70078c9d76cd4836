//! Relay Configuration
//!
//! Configuration management and startup utilities for the relay gateway.

pub mod configurable_value;
pub mod loader;
pub mod settings;
pub mod startup_logger;

pub use configurable_value::{ConfigurableValue, ConfigurableValueError, ValueType};
pub use loader::{load_config, load_config_from, ConfigLoadError};
pub use settings::{
	ConcurrencySettings, ConfigValidationError, EnvironmentSettings, ErrorSettings, LimitSettings,
	LogFormat, LoggingSettings, RateLimitSettings, ServerSettings, Settings, TimeoutSettings, UpstreamSettings,
};
pub use startup_logger::{
	log_routes, log_service_info, log_service_shutdown, log_settings_summary, log_startup_complete,
};
