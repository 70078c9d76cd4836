//! Route definitions: path, parameter schema, upstream and response kind

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One declared query parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
	pub name: String,
	#[serde(default)]
	pub required: bool,
	#[serde(default)]
	pub default: Option<String>,
}

impl ParamSpec {
	pub fn required(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			required: true,
			default: None,
		}
	}

	pub fn optional(name: impl Into<String>, default: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			required: false,
			default: Some(default.into()),
		}
	}
}

/// Ordered parameter schema; order decides which missing key is reported first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamSchema(pub Vec<ParamSpec>);

impl ParamSchema {
	pub fn new(specs: Vec<ParamSpec>) -> Self {
		Self(specs)
	}

	pub fn empty() -> Self {
		Self::default()
	}

	pub fn iter(&self) -> impl Iterator<Item = &ParamSpec> {
		self.0.iter()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Names of the required parameters, in declaration order
	pub fn required_names(&self) -> Vec<&str> {
		self.0
			.iter()
			.filter(|spec| spec.required)
			.map(|spec| spec.name.as_str())
			.collect()
	}
}

/// What a route is expected to produce on success
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseKind {
	/// Flattened into the JSON envelope
	#[default]
	Json,
	/// Raw bytes; `media_type` pins the Content-Type, otherwise the upstream's is used
	Binary {
		#[serde(default)]
		media_type: Option<String>,
	},
}

impl ResponseKind {
	pub fn binary(media_type: impl Into<String>) -> Self {
		ResponseKind::Binary {
			media_type: Some(media_type.into()),
		}
	}

	pub fn is_binary(&self) -> bool {
		matches!(self, ResponseKind::Binary { .. })
	}
}

/// A (path, schema, upstream, response kind) tuple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSpec {
	/// Exact literal path, e.g. `/api/translate` or `/api/random/quote`
	pub path: String,

	#[serde(default)]
	pub params: ParamSchema,

	/// Registry id of the upstream caller
	pub upstream: String,

	#[serde(default)]
	pub response: ResponseKind,

	/// Fixed arguments passed to the caller, not client-controllable
	#[serde(default)]
	pub bindings: BTreeMap<String, String>,

	#[serde(default)]
	pub description: Option<String>,
}

impl RouteSpec {
	pub fn new(path: impl Into<String>, upstream: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			params: ParamSchema::empty(),
			upstream: upstream.into(),
			response: ResponseKind::Json,
			bindings: BTreeMap::new(),
			description: None,
		}
	}

	pub fn with_params(mut self, params: Vec<ParamSpec>) -> Self {
		self.params = ParamSchema::new(params);
		self
	}

	pub fn with_binding(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.bindings.insert(key.into(), value.into());
		self
	}

	pub fn with_response(mut self, response: ResponseKind) -> Self {
		self.response = response;
		self
	}

	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}
}
