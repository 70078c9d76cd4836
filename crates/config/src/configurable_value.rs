//! Credential references that resolve from the environment or from plain text

use relay_types::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value loaded from an environment variable or given inline
///
/// In config files: `{ type = "env", value = "HF_TOKEN" }` or
/// `{ type = "plain", value = "..." }`.
#[derive(Serialize, Deserialize, Clone, PartialEq)]
pub struct ConfigurableValue {
	#[serde(rename = "type")]
	pub value_type: ValueType,
	/// Environment variable name, or the value itself
	pub value: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
	Env,
	Plain,
}

impl ConfigurableValue {
	pub fn from_env(env_var_name: &str) -> Self {
		Self {
			value_type: ValueType::Env,
			value: env_var_name.to_string(),
		}
	}

	pub fn from_plain(plain_value: &str) -> Self {
		Self {
			value_type: ValueType::Plain,
			value: plain_value.to_string(),
		}
	}

	/// Resolve the actual value
	pub fn resolve(&self) -> Result<String, ConfigurableValueError> {
		match self.value_type {
			ValueType::Env => std::env::var(&self.value).map_err(|_| {
				ConfigurableValueError::EnvironmentVariableNotFound(self.value.clone())
			}),
			ValueType::Plain => Ok(self.value.clone()),
		}
	}

	pub fn resolve_for_secret(&self) -> Result<SecretString, ConfigurableValueError> {
		self.resolve().map(SecretString::new)
	}

	/// Name used in "missing credential" errors and startup logs
	pub fn source_name(&self) -> String {
		match self.value_type {
			ValueType::Env => self.value.clone(),
			ValueType::Plain => "inline credential".to_string(),
		}
	}
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigurableValueError {
	#[error("Environment variable '{0}' not found")]
	EnvironmentVariableNotFound(String),
}

// Never print plain values
impl fmt::Display for ConfigurableValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.value_type {
			ValueType::Env => write!(f, "env:{}", self.value),
			ValueType::Plain => write!(f, "plain:[REDACTED]"),
		}
	}
}

impl fmt::Debug for ConfigurableValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let value = match self.value_type {
			ValueType::Env => self.value.as_str(),
			ValueType::Plain => "[REDACTED]",
		};
		f.debug_struct("ConfigurableValue")
			.field("value_type", &self.value_type)
			.field("value", &value)
			.finish()
	}
}

/// `env:NAME` becomes an environment reference, anything else is plain
impl From<&str> for ConfigurableValue {
	fn from(value: &str) -> Self {
		match value.strip_prefix("env:") {
			Some(env_var) => Self::from_env(env_var),
			None => Self::from_plain(value),
		}
	}
}

impl From<String> for ConfigurableValue {
	fn from(value: String) -> Self {
		ConfigurableValue::from(value.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::env;

	#[test]
	fn test_plain_value() {
		let config = ConfigurableValue::from_plain("unsplash-key");
		assert_eq!(config.resolve().unwrap(), "unsplash-key");
		assert_eq!(config.source_name(), "inline credential");
		assert_eq!(config.to_string(), "plain:[REDACTED]");
	}

	#[test]
	fn test_debug_hides_plain_value() {
		let plain = ConfigurableValue::from_plain("rbg_live_secret");
		let debug_str = format!("{:?}", plain);
		assert!(!debug_str.contains("rbg_live_secret"));
		assert!(debug_str.contains("[REDACTED]"));

		let env = ConfigurableValue::from_env("REMOVE_BG_KEY");
		assert!(format!("{:?}", env).contains("REMOVE_BG_KEY"));
	}

	#[test]
	fn test_env_value() {
		env::set_var("RELAY_TEST_TOKEN", "token-from-env");

		let config = ConfigurableValue::from_env("RELAY_TEST_TOKEN");
		assert_eq!(config.resolve().unwrap(), "token-from-env");
		assert_eq!(config.source_name(), "RELAY_TEST_TOKEN");
		assert_eq!(config.to_string(), "env:RELAY_TEST_TOKEN");

		env::remove_var("RELAY_TEST_TOKEN");
	}

	#[test]
	fn test_env_value_not_found() {
		let config = ConfigurableValue::from_env("RELAY_DEFINITELY_UNSET_VAR");
		assert!(matches!(
			config.resolve(),
			Err(ConfigurableValueError::EnvironmentVariableNotFound(_))
		));
	}

	#[test]
	fn test_from_string_conversion() {
		assert_eq!(
			ConfigurableValue::from("env:HF_TOKEN"),
			ConfigurableValue::from_env("HF_TOKEN")
		);
		assert_eq!(
			ConfigurableValue::from("abc".to_string()),
			ConfigurableValue::from_plain("abc")
		);
	}

	#[test]
	fn test_serde_shape() {
		let json = serde_json::to_string(&ConfigurableValue::from_env("REMOVE_BG_KEY")).unwrap();
		assert_eq!(json, r#"{"type":"env","value":"REMOVE_BG_KEY"}"#);
	}
}
