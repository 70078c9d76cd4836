//! Global per-request rate limiting
//!
//! A fixed window shared by every client: each request, on any connection,
//! counts against `requests_per_window`. Excess requests get 429.

use axum::{
	extract::{Request, State},
	http::{header, HeaderValue, StatusCode},
	middleware::{self, Next},
	response::{IntoResponse, Response},
	Json, Router,
};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::warn;

use crate::handlers::ErrorResponse;

#[derive(Debug)]
struct Window {
	started: Instant,
	count: u32,
}

/// Outcome of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
	Allowed { remaining: u32 },
	Limited { retry_after: Duration },
}

#[derive(Debug)]
pub struct RequestRateLimiter {
	requests_per_window: u32,
	window: Duration,
	current: Mutex<Window>,
}

impl RequestRateLimiter {
	pub fn new(requests_per_window: u32, window: Duration) -> Self {
		Self {
			requests_per_window,
			window,
			current: Mutex::new(Window {
				started: Instant::now(),
				count: 0,
			}),
		}
	}

	pub fn per_minute(requests_per_minute: u32) -> Self {
		Self::new(requests_per_minute, Duration::from_secs(60))
	}

	/// Count one request against the current window
	pub fn check(&self) -> RateDecision {
		self.check_at(Instant::now())
	}

	fn check_at(&self, now: Instant) -> RateDecision {
		let mut window = match self.current.lock() {
			Ok(guard) => guard,
			Err(poisoned) => poisoned.into_inner(),
		};

		let elapsed = now.saturating_duration_since(window.started);
		if elapsed >= self.window {
			window.started = now;
			window.count = 0;
		}

		if window.count >= self.requests_per_window {
			let retry_after = self
				.window
				.saturating_sub(now.saturating_duration_since(window.started));
			return RateDecision::Limited { retry_after };
		}

		window.count += 1;
		RateDecision::Allowed {
			remaining: self.requests_per_window - window.count,
		}
	}
}

async fn rate_limit(
	State(limiter): State<Arc<RequestRateLimiter>>,
	request: Request,
	next: Next,
) -> Response {
	match limiter.check() {
		RateDecision::Allowed { .. } => next.run(request).await,
		RateDecision::Limited { retry_after } => {
			warn!("Rate limit exceeded for {}", request.uri().path());
			let mut response = (
				StatusCode::TOO_MANY_REQUESTS,
				Json(ErrorResponse::new("Too many requests")),
			)
				.into_response();
			let seconds = retry_after.as_secs().max(1);
			if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
				response.headers_mut().insert(header::RETRY_AFTER, value);
			}
			response
		},
	}
}

/// Wrap every route (static fallback included) with the shared limiter
pub fn with_rate_limit(router: Router, limiter: Arc<RequestRateLimiter>) -> Router {
	router.layer(middleware::from_fn_with_state(limiter, rate_limit))
}
