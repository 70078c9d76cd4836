use axum::{handler::HandlerWithoutStateExt, routing::get, Router};
use std::path::Path;
use tower::ServiceBuilder;
use tower_http::{
	compression::CompressionLayer,
	cors::CorsLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	services::ServeDir,
	trace::TraceLayer,
};
use tracing::Level;

use crate::handlers::{not_found, proxy, stats};
use crate::security::add_security_headers;
use crate::state::AppState;

/// Build the router; `static_dir` is served for paths outside `/api`
///
/// Missing static files and unknown API paths both answer the JSON not-found body.
pub fn create_router(static_dir: Option<&Path>) -> Router<AppState> {
	let cors = CorsLayer::permissive();
	let trace = TraceLayer::new_for_http()
		.make_span_with(|req: &axum::http::Request<_>| {
			let req_id = req
				.headers()
				.get("x-request-id")
				.and_then(|v| v.to_str().ok())
				.unwrap_or("-");
			tracing::info_span!(
				"http_request",
				method = %req.method(),
				uri = %req.uri(),
				req_id
			)
		})
		.on_request(tower_http::trace::DefaultOnRequest::new().level(Level::INFO))
		.on_response(
			tower_http::trace::DefaultOnResponse::new()
				.level(Level::INFO)
				.latency_unit(tower_http::LatencyUnit::Millis),
		);
	let req_id = ServiceBuilder::new()
		.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
		.layer(PropagateRequestIdLayer::x_request_id());

	let api = Router::new()
		.route("/api/stats", get(stats))
		.route("/api/{*path}", get(proxy));

	let router = match static_dir {
		Some(dir) => api.fallback_service(
			ServeDir::new(dir)
				.append_index_html_on_directories(true)
				.not_found_service(not_found.into_service()),
		),
		None => api.fallback(not_found),
	};

	let router = router
		.layer(cors)
		.layer(CompressionLayer::new())
		.layer(trace)
		.layer(req_id);

	add_security_headers(router)
}
