//! Relay Gateway Library
//!
//! A generic outbound-proxy gateway: every `GET /api/...` route validates its
//! query parameters, calls exactly one upstream and answers a uniform
//! envelope.

// Core domain types
pub use relay_types::{
	chrono,
	serde_json,
	Capability,
	ErrorKind,
	GatewayError,
	ParamSchema,
	ParamSpec,
	ProxyRequest,
	ProxyResult,
	ResponseKind,
	RouteSpec,
	SecretString,
	UpstreamCaller,
	UpstreamError,
	UpstreamInfo,
	UpstreamPayload,
	UpstreamResult,
	UpstreamRuntimeConfig,
};

// Service layer
pub use relay_service::{
	default_routes, CapabilityGates, ErrorSanitizer, GatewayService, GatewayTrait, RouteTable,
	RouteTableError,
};

// API layer
pub use relay_api::{create_router, with_rate_limit, AppState, EnvelopeBuilder, RequestRateLimiter};

// Upstreams
pub use relay_upstreams::{build_client, ClientConfig, UpstreamRegistry};

// Config
pub use relay_config::{load_config, log_service_info, log_startup_complete, Settings};

pub mod config {
	pub use relay_config::*;
}

pub mod upstreams {
	pub use relay_upstreams::*;
}

pub mod service {
	pub use relay_service::*;
}

pub mod api {
	pub use relay_api::*;
}

pub mod test_utils {
	pub use relay_types::test_utils::*;
}

use relay_config::{log_routes, log_service_shutdown, log_settings_summary, settings::LogFormat};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

// Re-export external dependencies for embedding
pub use async_trait;
pub use reqwest;

/// Builder for the gateway: settings, extra upstreams and extra routes
#[derive(Default)]
pub struct GatewayBuilder {
	settings: Option<Settings>,
	upstreams: Vec<Arc<dyn UpstreamCaller>>,
	routes: Vec<RouteSpec>,
}

impl GatewayBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_settings(mut self, settings: Settings) -> Self {
		self.settings = Some(settings);
		self
	}

	pub fn settings(&self) -> Option<&Settings> {
		self.settings.as_ref()
	}

	/// Register an upstream caller; replaces a built-in caller with the same id
	pub fn with_upstream<C>(mut self, caller: C) -> Self
	where
		C: UpstreamCaller + 'static,
	{
		self.upstreams.push(Arc::new(caller));
		self
	}

	/// Add a route; replaces a built-in route with the same path
	pub fn with_route(mut self, route: RouteSpec) -> Self {
		self.routes.push(route);
		self
	}

	/// Initialize tracing with configuration-based settings
	fn init_tracing_from_settings(
		&self,
		settings: &Settings,
	) -> Result<(), Box<dyn std::error::Error>> {
		let log_level = &settings.logging.level;
		let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
			.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

		match settings.logging.format {
			LogFormat::Json => {
				let subscriber = tracing_subscriber::fmt().json().with_env_filter(env_filter);

				if settings.logging.structured {
					subscriber.with_target(true).with_thread_ids(true).init();
				} else {
					subscriber.init();
				}
			},
			LogFormat::Pretty => {
				let subscriber = tracing_subscriber::fmt()
					.pretty()
					.with_env_filter(env_filter);

				if settings.logging.structured {
					subscriber.with_target(true).with_thread_ids(true).init();
				} else {
					subscriber.init();
				}
			},
			LogFormat::Compact => {
				let subscriber = tracing_subscriber::fmt()
					.compact()
					.with_env_filter(env_filter);

				if settings.logging.structured {
					subscriber.with_target(true).with_thread_ids(true).init();
				} else {
					subscriber.init();
				}
			},
		}

		info!(
			"Logging configuration applied: level={}, format={:?}, structured={}",
			settings.logging.level, settings.logging.format, settings.logging.structured
		);

		Ok(())
	}

	/// Per-upstream endpoint overrides and credentials, resolved once
	///
	/// Returns the runtime configs plus every resolved secret (for the error sanitizer).
	fn resolve_upstream_configs(
		settings: &Settings,
	) -> (HashMap<String, UpstreamRuntimeConfig>, Vec<SecretString>) {
		let mut configs = HashMap::new();
		let mut secrets = Vec::new();

		for id in relay_upstreams::BUILTIN_UPSTREAM_IDS {
			let overrides = settings.upstream(id);
			let mut config =
				UpstreamRuntimeConfig::new().with_max_body_bytes(settings.limits.max_body_bytes);

			if let Some(endpoint) = overrides.and_then(|o| o.endpoint.clone()) {
				config = config.with_endpoint(endpoint);
			}

			let configured = overrides.and_then(|o| o.credential.as_ref().map(|c| (o, c)));
			if let Some((overrides, value)) = configured {
				let credential = match overrides.resolve_credential() {
					Ok(credential) => credential,
					Err(e) => {
						warn!("Credential for upstream '{}' unavailable: {}", id, e);
						None
					},
				};
				config = config.with_credential(value.source_name(), credential);
			} else if let Some(env_name) = relay_upstreams::default_credential_env(id) {
				let credential = std::env::var(env_name)
					.ok()
					.filter(|v| !v.trim().is_empty())
					.map(SecretString::from);
				if credential.is_none() {
					warn!("{} is not set; upstream '{}' will fail until it is", env_name, id);
				}
				config = config.with_credential(env_name, credential);
			}

			if let Some(secret) = &config.credential {
				secrets.push(secret.clone());
			}
			configs.insert(id.to_string(), config);
		}

		for id in settings.upstreams.keys() {
			if !relay_upstreams::BUILTIN_UPSTREAM_IDS.contains(&id.as_str()) {
				warn!("Settings reference unknown upstream '{}'; ignored", id);
			}
		}

		(configs, secrets)
	}

	/// Built-in routes, then configured routes, then builder routes
	fn build_route_table(&self, settings: &Settings) -> Result<RouteTable, RouteTableError> {
		let mut configured = RouteTable::new();
		for route in settings.routes.iter().cloned() {
			configured.insert(route)?;
		}

		let mut table = RouteTable::with_defaults();
		for route in configured.routes().into_iter().cloned() {
			table.upsert(route)?;
		}
		for route in self.routes.iter().cloned() {
			table.upsert(route)?;
		}
		Ok(table)
	}

	/// Start the gateway and return the configured router with state
	pub async fn start(self) -> Result<(axum::Router, AppState), Box<dyn std::error::Error>> {
		let settings = self.settings.clone().unwrap_or_default();
		settings.validate()?;

		let client = build_client(
			&ClientConfig::default()
				.with_timeouts(settings.timeouts.request_ms, settings.timeouts.connect_ms),
		)?;

		let (configs, secrets) = Self::resolve_upstream_configs(&settings);
		let mut registry = UpstreamRegistry::with_defaults(client, &configs);
		for caller in &self.upstreams {
			if registry.upsert(Arc::clone(caller)).is_some() {
				info!("Upstream '{}' replaced by a custom caller", caller.id());
			}
		}

		let routes = self.build_route_table(&settings)?;
		let gates = CapabilityGates::new(|capability| settings.concurrency.permits_for(capability));
		let sanitizer = ErrorSanitizer::new(
			secrets,
			settings.errors.max_message_len,
			settings.errors.redact_urls,
		);

		let gateway = GatewayService::new(routes, registry, gates, sanitizer)?;
		info!(
			"Successfully initialized {} route(s) over {} upstream(s)",
			gateway.route_table().len(),
			gateway.registry().len()
		);

		let app_state = AppState::new(
			Arc::new(gateway),
			EnvelopeBuilder::new(
				settings.server.creator.clone(),
				settings.errors.missing_parameter_status,
			),
		);

		let static_dir = Some(settings.server.static_dir.as_str())
			.filter(|dir| !dir.trim().is_empty())
			.map(Path::new);
		let mut router = create_router(static_dir).with_state(app_state.clone());

		let rate_cfg = &settings.environment.rate_limiting;
		if rate_cfg.enabled {
			info!("Rate limiting enabled: {} requests/minute", rate_cfg.requests_per_minute);
			router = with_rate_limit(
				router,
				Arc::new(RequestRateLimiter::per_minute(rate_cfg.requests_per_minute)),
			);
		}

		Ok((router, app_state))
	}

	/// Start the complete server with all defaults and setup
	///
	/// Loads `.env`, loads configuration, initializes tracing, then binds and
	/// serves until Ctrl-C.
	pub async fn start_server(mut self) -> Result<(), Box<dyn std::error::Error>> {
		dotenvy::dotenv().ok();

		let using_provided_settings = self.settings.is_some();
		let settings = match self.settings.take() {
			Some(settings) => settings,
			None => load_config()?,
		};

		self.init_tracing_from_settings(&settings)?;

		log_service_info();
		info!(
			"Using configuration: loaded from {}",
			if using_provided_settings {
				"provided settings"
			} else {
				"config file or defaults"
			}
		);
		log_settings_summary(&settings);

		let bind_addr = settings.bind_address();
		let addr: SocketAddr = bind_addr
			.parse()
			.map_err(|e| format!("Invalid bind address '{}': {}", bind_addr, e))?;

		self.settings = Some(settings.clone());
		let (app, state) = self.start().await?;

		let listener = tokio::net::TcpListener::bind(addr).await?;

		log_startup_complete(&bind_addr);
		log_routes(state.gateway.routes().iter());

		axum::serve(listener, app)
			.with_graceful_shutdown(shutdown_signal())
			.await?;

		log_service_shutdown();
		Ok(())
	}
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		warn!("Failed to listen for shutdown signal: {}", e);
		std::future::pending::<()>().await;
	}
}
