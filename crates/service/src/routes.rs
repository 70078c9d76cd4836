//! Route table: exact path to route spec

use relay_types::{ParamSpec, ResponseKind, RouteSpec};
use relay_upstreams::{
	GoogleTranslateCaller, HuggingFaceImageCaller, HuggingFaceTextCaller, ImageEnhanceCaller,
	LyricsSearchCaller, MediaStreamsCaller, NpmSearchCaller, RandomQuoteCaller, RandomWaifuCaller,
	RemoveBgCaller, UnsplashSearchCaller, UpstreamRegistry, VideoSearchCaller,
};
use std::collections::HashMap;
use thiserror::Error;

/// Path of the health route, reserved for the API layer
pub const STATS_PATH: &str = "/api/stats";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteTableError {
	#[error("Duplicate route path '{0}'")]
	DuplicatePath(String),

	#[error("Route '{path}' references unknown upstream '{upstream}'")]
	UnknownUpstream { path: String, upstream: String },

	#[error("Invalid route path '{0}': must be an absolute literal path")]
	InvalidPath(String),

	#[error("Route path '{0}' is reserved")]
	ReservedPath(String),
}

/// Routes keyed by exact path, in registration order for listing
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
	routes: HashMap<String, RouteSpec>,
	order: Vec<String>,
}

impl RouteTable {
	pub fn new() -> Self {
		Self::default()
	}

	/// The built-in route set
	pub fn with_defaults() -> Self {
		let mut table = Self::new();
		for route in default_routes() {
			// Built-in paths are distinct literals
			let _ = table.insert(route);
		}
		table
	}

	/// Add a route; paths must be unique
	pub fn insert(&mut self, route: RouteSpec) -> Result<(), RouteTableError> {
		check_path(&route.path)?;
		if self.routes.contains_key(&route.path) {
			return Err(RouteTableError::DuplicatePath(route.path));
		}
		self.order.push(route.path.clone());
		self.routes.insert(route.path.clone(), route);
		Ok(())
	}

	/// Add a route, replacing any route with the same path
	pub fn upsert(&mut self, route: RouteSpec) -> Result<(), RouteTableError> {
		check_path(&route.path)?;
		if !self.routes.contains_key(&route.path) {
			self.order.push(route.path.clone());
		}
		self.routes.insert(route.path.clone(), route);
		Ok(())
	}

	/// Exact-match lookup
	pub fn lookup(&self, path: &str) -> Option<&RouteSpec> {
		self.routes.get(path)
	}

	/// Routes in registration order
	pub fn routes(&self) -> Vec<&RouteSpec> {
		self.order.iter().filter_map(|path| self.routes.get(path)).collect()
	}

	pub fn len(&self) -> usize {
		self.routes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}

	/// Every route must point at a registered upstream
	pub fn validate(&self, registry: &UpstreamRegistry) -> Result<(), RouteTableError> {
		for route in self.routes() {
			if !registry.contains(&route.upstream) {
				return Err(RouteTableError::UnknownUpstream {
					path: route.path.clone(),
					upstream: route.upstream.clone(),
				});
			}
		}
		Ok(())
	}
}

fn check_path(path: &str) -> Result<(), RouteTableError> {
	if path == STATS_PATH {
		return Err(RouteTableError::ReservedPath(path.to_string()));
	}
	let literal = path.starts_with('/')
		&& path.len() > 1
		&& !path.ends_with('/')
		&& !path.contains(['{', '}', '*', '?', '#', ':'])
		&& !path.contains("//");
	if literal {
		Ok(())
	} else {
		Err(RouteTableError::InvalidPath(path.to_string()))
	}
}

/// Routes served out of the box
pub fn default_routes() -> Vec<RouteSpec> {
	let q = || vec![ParamSpec::required("q")];
	let url = || vec![ParamSpec::required("url")];

	vec![
		RouteSpec::new("/api/gptlogic", HuggingFaceTextCaller::ID)
			.with_params(vec![ParamSpec::required("q"), ParamSpec::optional("prompt", "")])
			.with_binding("model", "google/gemma-2b-it")
			.with_description("Text generation with an optional system prompt"),
		RouteSpec::new("/api/gpt-5", HuggingFaceTextCaller::ID)
			.with_params(q())
			.with_binding("model", "Qwen/Qwen2.5-72B-Instruct"),
		RouteSpec::new("/api/qwen", HuggingFaceTextCaller::ID)
			.with_params(q())
			.with_binding("model", "Qwen/Qwen2.5-7B-Instruct"),
		RouteSpec::new("/api/ytdl", MediaStreamsCaller::ID)
			.with_params(vec![ParamSpec::required("url"), ParamSpec::optional("format", "highest")])
			.with_description("Direct download URL for a video stream"),
		RouteSpec::new("/api/yta", MediaStreamsCaller::ID)
			.with_params(url())
			.with_binding("format", "highestaudio")
			.with_description("Direct download URL for the best audio stream"),
		RouteSpec::new("/api/pinterest", UnsplashSearchCaller::ID).with_params(q()),
		RouteSpec::new("/api/npmsearch", NpmSearchCaller::ID).with_params(q()),
		RouteSpec::new("/api/lyrics", LyricsSearchCaller::ID).with_params(q()),
		RouteSpec::new("/api/ytplay", VideoSearchCaller::ID).with_params(q()),
		RouteSpec::new("/api/translate", GoogleTranslateCaller::ID)
			.with_params(vec![ParamSpec::required("text"), ParamSpec::optional("to", "en")]),
		RouteSpec::new("/api/enhance", ImageEnhanceCaller::ID)
			.with_params(url())
			.with_response(ResponseKind::binary("image/webp")),
		RouteSpec::new("/api/removebg", RemoveBgCaller::ID)
			.with_params(url())
			.with_response(ResponseKind::binary("image/png")),
		RouteSpec::new("/api/txt2img", HuggingFaceImageCaller::ID)
			.with_params(q())
			.with_binding("model", "runwayml/stable-diffusion-v1-5")
			.with_response(ResponseKind::Binary { media_type: None }),
		RouteSpec::new("/api/randomquotes", RandomQuoteCaller::ID),
		RouteSpec::new("/api/waifu", RandomWaifuCaller::ID),
	]
}

#[cfg(test)]
mod tests {
	use super::*;
	use relay_types::test_utils::StubUpstream;
	use relay_types::Capability;
	use relay_upstreams::{build_client, ClientConfig};
	use std::sync::Arc;

	#[test]
	fn test_defaults_validate_against_builtin_registry() {
		let table = RouteTable::with_defaults();
		let registry = UpstreamRegistry::with_defaults(
			build_client(&ClientConfig::default()).unwrap(),
			&HashMap::new(),
		);

		assert_eq!(table.len(), default_routes().len());
		assert!(table.validate(&registry).is_ok());
		assert_eq!(table.routes()[0].path, "/api/gptlogic");
	}

	#[test]
	fn test_lookup_is_exact() {
		let table = RouteTable::with_defaults();
		assert!(table.lookup("/api/translate").is_some());
		assert!(table.lookup("/api/translate/").is_none());
		assert!(table.lookup("/API/translate").is_none());
		assert!(table.lookup("/api/doesnotexist").is_none());
	}

	#[test]
	fn test_duplicate_and_invalid_paths_rejected() {
		let mut table = RouteTable::with_defaults();
		let err = table
			.insert(RouteSpec::new("/api/translate", "google-translate"))
			.unwrap_err();
		assert_eq!(err, RouteTableError::DuplicatePath("/api/translate".to_string()));

		assert!(matches!(
			table.insert(RouteSpec::new("/api/{id}", "x")),
			Err(RouteTableError::InvalidPath(_))
		));
		assert!(matches!(
			table.insert(RouteSpec::new("api/relative", "x")),
			Err(RouteTableError::InvalidPath(_))
		));
		assert!(matches!(
			table.insert(RouteSpec::new(STATS_PATH, "x")),
			Err(RouteTableError::ReservedPath(_))
		));
	}

	#[test]
	fn test_nested_literal_paths_allowed() {
		let mut table = RouteTable::new();
		table
			.insert(RouteSpec::new("/api/random/quote", "random-quote"))
			.unwrap();
		assert!(table.lookup("/api/random/quote").is_some());
	}

	#[test]
	fn test_upsert_replaces_in_place() {
		let mut table = RouteTable::with_defaults();
		table
			.upsert(RouteSpec::new("/api/translate", "stub-translate"))
			.unwrap();
		assert_eq!(table.len(), default_routes().len());
		assert_eq!(table.lookup("/api/translate").unwrap().upstream, "stub-translate");
	}

	#[test]
	fn test_unknown_upstream_rejected() {
		let mut table = RouteTable::new();
		table.insert(RouteSpec::new("/api/echo", "echo")).unwrap();
		table.insert(RouteSpec::new("/api/ghost", "ghost")).unwrap();

		let mut registry = UpstreamRegistry::new();
		registry
			.register(Arc::new(StubUpstream::echo("echo", Capability::SearchCatalog)))
			.unwrap();

		assert_eq!(
			table.validate(&registry).unwrap_err(),
			RouteTableError::UnknownUpstream {
				path: "/api/ghost".to_string(),
				upstream: "ghost".to_string(),
			}
		);
	}
}
