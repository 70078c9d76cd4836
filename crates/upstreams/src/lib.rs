//! Relay upstream callers
//!
//! One module per upstream family, plus the registry the gateway dispatches through.

pub mod catalog;
pub mod http;
pub mod huggingface;
pub mod imaging;
pub mod media;
pub mod random;
pub mod translate;

use std::collections::HashMap;
use std::sync::Arc;

pub use catalog::{LyricsSearchCaller, NpmSearchCaller, UnsplashSearchCaller, VideoSearchCaller};
pub use http::{build_client, ClientConfig};
pub use huggingface::{HuggingFaceImageCaller, HuggingFaceTextCaller};
pub use imaging::{ImageEnhanceCaller, RemoveBgCaller};
pub use media::MediaStreamsCaller;
pub use random::{RandomQuoteCaller, RandomWaifuCaller};
pub use relay_types::{UpstreamCaller, UpstreamError, UpstreamResult};
pub use translate::GoogleTranslateCaller;

use reqwest::Client;
use relay_types::UpstreamRuntimeConfig;

/// Ids of every built-in caller, in registration order
pub const BUILTIN_UPSTREAM_IDS: [&str; 12] = [
	HuggingFaceTextCaller::ID,
	HuggingFaceImageCaller::ID,
	MediaStreamsCaller::ID,
	GoogleTranslateCaller::ID,
	ImageEnhanceCaller::ID,
	RemoveBgCaller::ID,
	UnsplashSearchCaller::ID,
	NpmSearchCaller::ID,
	LyricsSearchCaller::ID,
	VideoSearchCaller::ID,
	RandomQuoteCaller::ID,
	RandomWaifuCaller::ID,
];

/// Environment variable a built-in caller reads its credential from, if it needs one
pub fn default_credential_env(upstream_id: &str) -> Option<&'static str> {
	match upstream_id {
		HuggingFaceTextCaller::ID | HuggingFaceImageCaller::ID => Some(huggingface::CREDENTIAL_ENV),
		RemoveBgCaller::ID => Some(imaging::REMOVE_BG_CREDENTIAL_ENV),
		UnsplashSearchCaller::ID => Some(catalog::UNSPLASH_CREDENTIAL_ENV),
		_ => None,
	}
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
	#[error("Upstream '{0}' is already registered")]
	Duplicate(String),
}

/// Registry of upstream callers keyed by id
#[derive(Debug, Default, Clone)]
pub struct UpstreamRegistry {
	callers: HashMap<String, Arc<dyn UpstreamCaller>>,
}

impl UpstreamRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registry holding every built-in caller
	///
	/// All callers share `client`. `configs` supplies per-id endpoint overrides
	/// and resolved credentials; ids without an entry get defaults.
	pub fn with_defaults(client: Client, configs: &HashMap<String, UpstreamRuntimeConfig>) -> Self {
		let config = |id: &str| configs.get(id).cloned().unwrap_or_default();
		let callers: Vec<Arc<dyn UpstreamCaller>> = vec![
			Arc::new(HuggingFaceTextCaller::new(client.clone(), config(HuggingFaceTextCaller::ID))),
			Arc::new(HuggingFaceImageCaller::new(client.clone(), config(HuggingFaceImageCaller::ID))),
			Arc::new(MediaStreamsCaller::new(client.clone(), config(MediaStreamsCaller::ID))),
			Arc::new(GoogleTranslateCaller::new(client.clone(), config(GoogleTranslateCaller::ID))),
			Arc::new(ImageEnhanceCaller::new(client.clone(), config(ImageEnhanceCaller::ID))),
			Arc::new(RemoveBgCaller::new(client.clone(), config(RemoveBgCaller::ID))),
			Arc::new(UnsplashSearchCaller::new(client.clone(), config(UnsplashSearchCaller::ID))),
			Arc::new(NpmSearchCaller::new(client.clone(), config(NpmSearchCaller::ID))),
			Arc::new(LyricsSearchCaller::new(client.clone(), config(LyricsSearchCaller::ID))),
			Arc::new(VideoSearchCaller::new(client.clone(), config(VideoSearchCaller::ID))),
			Arc::new(RandomQuoteCaller::new(client.clone(), config(RandomQuoteCaller::ID))),
			Arc::new(RandomWaifuCaller::new(client, config(RandomWaifuCaller::ID))),
		];

		let mut registry = Self::new();
		for caller in callers {
			registry.upsert(caller);
		}
		registry
	}

	/// Register a caller under its own id; an id may only be registered once
	pub fn register(&mut self, caller: Arc<dyn UpstreamCaller>) -> Result<(), RegistryError> {
		let id = caller.id().to_string();
		if self.callers.contains_key(&id) {
			return Err(RegistryError::Duplicate(id));
		}
		self.callers.insert(id, caller);
		Ok(())
	}

	/// Register a caller, replacing any caller with the same id
	pub fn upsert(&mut self, caller: Arc<dyn UpstreamCaller>) -> Option<Arc<dyn UpstreamCaller>> {
		self.callers.insert(caller.id().to_string(), caller)
	}

	pub fn get(&self, id: &str) -> Option<Arc<dyn UpstreamCaller>> {
		self.callers.get(id).cloned()
	}

	pub fn contains(&self, id: &str) -> bool {
		self.callers.contains_key(id)
	}

	pub fn get_all(&self) -> &HashMap<String, Arc<dyn UpstreamCaller>> {
		&self.callers
	}

	/// Registered ids, sorted
	pub fn ids(&self) -> Vec<String> {
		let mut ids: Vec<String> = self.callers.keys().cloned().collect();
		ids.sort();
		ids
	}

	pub fn len(&self) -> usize {
		self.callers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.callers.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use relay_types::test_utils::StubUpstream;
	use relay_types::Capability;

	#[test]
	fn test_defaults_register_every_builtin() {
		let client = build_client(&ClientConfig::default()).unwrap();
		let registry = UpstreamRegistry::with_defaults(client, &HashMap::new());

		assert_eq!(registry.len(), BUILTIN_UPSTREAM_IDS.len());
		for id in BUILTIN_UPSTREAM_IDS {
			assert!(registry.contains(id), "missing {}", id);
		}
		assert_eq!(
			registry.get(MediaStreamsCaller::ID).unwrap().capability(),
			Capability::ResolveMediaFormat
		);
	}

	#[test]
	fn test_endpoint_override_is_applied() {
		let client = build_client(&ClientConfig::default()).unwrap();
		let mut configs = HashMap::new();
		configs.insert(
			NpmSearchCaller::ID.to_string(),
			UpstreamRuntimeConfig::new().with_endpoint("http://localhost:9999/"),
		);
		let registry = UpstreamRegistry::with_defaults(client, &configs);

		let npm = registry.get(NpmSearchCaller::ID).unwrap();
		assert_eq!(npm.upstream_info().endpoint, "http://localhost:9999");
	}

	#[test]
	fn test_register_rejects_duplicates() {
		let mut registry = UpstreamRegistry::new();
		registry
			.register(Arc::new(StubUpstream::echo("stub", Capability::Translate)))
			.unwrap();
		let err = registry
			.register(Arc::new(StubUpstream::echo("stub", Capability::Translate)))
			.unwrap_err();
		assert_eq!(err, RegistryError::Duplicate("stub".to_string()));

		assert!(registry
			.upsert(Arc::new(StubUpstream::echo("stub", Capability::SearchCatalog)))
			.is_some());
		assert_eq!(registry.get("stub").unwrap().capability(), Capability::SearchCatalog);
	}

	#[test]
	fn test_credential_env_mapping() {
		assert_eq!(default_credential_env("huggingface-text"), Some("HF_TOKEN"));
		assert_eq!(default_credential_env("remove-bg"), Some("REMOVE_BG_KEY"));
		assert_eq!(default_credential_env("npm-search"), None);
	}
}
