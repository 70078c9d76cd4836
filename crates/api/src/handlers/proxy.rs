use axum::{
	extract::State,
	http::Uri,
	response::Response,
};
use tracing::debug;

use crate::state::AppState;

/// GET /api/{*path}: every proxied route goes through here
pub async fn proxy(State(state): State<AppState>, uri: Uri) -> Response {
	debug!("Dispatching {}", uri.path());
	let result = state.gateway.dispatch(uri.path(), uri.query()).await;
	state.envelope.build(result)
}
