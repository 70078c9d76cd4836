use axum::{extract::State, response::Json};
use serde::Serialize;

use crate::state::AppState;

/// Health payload
#[derive(Debug, Serialize)]
pub struct StatsResponse {
	pub status: u16,
	pub creator: String,
	pub msg: &'static str,
	/// Seconds since startup
	pub uptime: f64,
}

/// GET /api/stats
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
	Json(StatsResponse {
		status: 200,
		creator: state.envelope.creator().to_string(),
		msg: "Server is running",
		uptime: state.started_at.elapsed().as_secs_f64(),
	})
}
