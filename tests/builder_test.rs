//! Startup validation performed by `GatewayBuilder::start`

mod mocks;

use mocks::{MockConfigs, MockUpstreams};
use relay_gateway::{GatewayBuilder, GatewayTrait, ParamSpec, RouteSpec};

#[tokio::test]
async fn test_default_routes_are_served() {
	let (_router, state) = GatewayBuilder::new()
		.with_settings(MockConfigs::test_settings())
		.start()
		.await
		.expect("defaults are consistent");

	let paths: Vec<String> = state.gateway.routes().into_iter().map(|r| r.path).collect();
	for expected in ["/api/gptlogic", "/api/ytdl", "/api/translate", "/api/enhance", "/api/waifu"] {
		assert!(paths.iter().any(|p| p == expected), "missing {}", expected);
	}
}

#[tokio::test]
async fn test_route_with_unknown_upstream_fails_startup() {
	let result = GatewayBuilder::new()
		.with_settings(MockConfigs::test_settings())
		.with_route(RouteSpec::new("/api/ghost", "no-such-upstream"))
		.start()
		.await;

	let err = result.err().expect("startup must fail");
	assert!(err.to_string().contains("unknown upstream 'no-such-upstream'"));
}

#[tokio::test]
async fn test_duplicate_configured_routes_fail_startup() {
	let mut settings = MockConfigs::test_settings();
	settings.routes = vec![
		RouteSpec::new("/api/random/quote", "random-quote"),
		RouteSpec::new("/api/random/quote", "random-waifu"),
	];

	let err = GatewayBuilder::new()
		.with_settings(settings)
		.start()
		.await
		.err()
		.expect("startup must fail");
	assert!(err.to_string().contains("Duplicate route path '/api/random/quote'"));
}

#[tokio::test]
async fn test_invalid_settings_fail_startup() {
	let mut settings = MockConfigs::test_settings();
	settings.concurrency.default_permits = 0;

	let result = GatewayBuilder::new().with_settings(settings).start().await;
	assert!(result.is_err());
}

#[tokio::test]
async fn test_builder_route_overrides_default() {
	let stub = MockUpstreams::quote_fixed();
	let (_router, state) = GatewayBuilder::new()
		.with_settings(MockConfigs::test_settings())
		.with_upstream(stub.clone())
		.with_route(
			RouteSpec::new("/api/translate", "random-quote")
				.with_params(vec![ParamSpec::optional("lang", "en")]),
		)
		.start()
		.await
		.expect("override is valid");

	let result = state.gateway.dispatch("/api/translate", None).await;
	assert!(result.is_success());
	assert_eq!(stub.calls(), 1);
	assert_eq!(stub.last_request().unwrap().param("lang"), Some("en"));
}
