//! Service startup logging for the relay gateway

use relay_types::RouteSpec;
use std::env;
use tracing::info;

use crate::Settings;

/// Logs service information at startup
pub fn log_service_info() {
	let service_name = "relay-gateway";
	let service_version = env!("CARGO_PKG_VERSION");

	info!("=== Relay Gateway Starting ===");
	info!("🚀 Service: {} v{}", service_name, service_version);
	info!("💻 Platform: {} ({})", env::consts::OS, env::consts::ARCH);

	if let Ok(cwd) = env::current_dir() {
		info!("📁 Working Directory: {}", cwd.display());
	}

	if let Ok(rust_log) = env::var("RUST_LOG") {
		info!("🔧 Log Level: {}", rust_log);
	}

	if let Ok(config_path) = env::var("CONFIG_PATH") {
		info!("📋 Config Path: {}", config_path);
	}

	info!(
		"🕒 Started at: {}",
		chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
	);
}

/// Logs the effective configuration, never credential values
pub fn log_settings_summary(settings: &Settings) {
	info!(
		"Outbound timeouts: request={}ms connect={}ms",
		settings.timeouts.request_ms, settings.timeouts.connect_ms
	);
	info!(
		"Concurrency: {} permits per capability ({} overrides)",
		settings.concurrency.default_permits,
		settings.concurrency.per_capability.len()
	);
	info!("Upstream body limit: {} bytes", settings.limits.max_body_bytes);
	for (id, upstream) in &settings.upstreams {
		info!(
			"  upstream {}: endpoint={} credential={}",
			id,
			upstream.endpoint.as_deref().unwrap_or("default"),
			upstream
				.credential
				.as_ref()
				.map(|c| c.to_string())
				.unwrap_or_else(|| "default".to_string())
		);
	}
}

/// Logs every registered route
pub fn log_routes<'a>(routes: impl IntoIterator<Item = &'a RouteSpec>) {
	info!("API endpoints available:");
	info!("  GET  /api/stats");
	for route in routes {
		info!("  GET  {} -> {}", route.path, route.upstream);
	}
}

pub fn log_service_shutdown() {
	info!("🛑 Relay Gateway Shutting Down");
	info!(
		"🕒 Shutdown at: {}",
		chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
	);
}

pub fn log_startup_complete(bind_address: &str) {
	info!("✅ Relay Gateway Started Successfully");
	info!("🌐 API listening on {}", bind_address);
}
