//! Inbound proxy request model

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Raw query mapping as parsed from the URL; repeated keys keep the last value
pub type QueryParams = BTreeMap<String, String>;

/// A validated inbound call, immutable once built
///
/// `params` only holds keys declared by the route schema (defaults applied).
/// `bindings` are fixed per route and cannot be set by clients.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyRequest {
	pub path: String,
	pub params: QueryParams,
	pub bindings: QueryParams,
	pub received_at: DateTime<Utc>,
}

impl ProxyRequest {
	pub fn new(path: impl Into<String>, params: QueryParams, bindings: QueryParams) -> Self {
		Self {
			path: path.into(),
			params,
			bindings,
			received_at: Utc::now(),
		}
	}

	/// Client-supplied (or defaulted) parameter
	pub fn param(&self, name: &str) -> Option<&str> {
		self.params.get(name).map(String::as_str)
	}

	/// Route binding
	pub fn binding(&self, name: &str) -> Option<&str> {
		self.bindings.get(name).map(String::as_str)
	}

	/// Binding first, then parameter
	pub fn arg(&self, name: &str) -> Option<&str> {
		self.binding(name).or_else(|| self.param(name))
	}

	/// Non-empty argument, otherwise an `InvalidParameter` upstream error
	pub fn require_arg(&self, name: &str) -> crate::UpstreamResult<&str> {
		match self.arg(name) {
			Some(value) if !value.trim().is_empty() => Ok(value),
			_ => Err(crate::UpstreamError::InvalidParameter {
				name: name.to_string(),
				reason: "value is required".to_string(),
			}),
		}
	}
}
