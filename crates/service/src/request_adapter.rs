//! Query extraction and validation against a route's parameter schema

use relay_types::{GatewayError, GatewayResult, ProxyRequest, QueryParams, RouteSpec};
use url::form_urlencoded;

/// Parse a raw query string; a repeated key keeps its last value
pub fn parse_query(raw: Option<&str>) -> QueryParams {
	raw.map(|query| form_urlencoded::parse(query.as_bytes()).into_owned().collect())
		.unwrap_or_default()
}

/// Build a validated request for `route` from the raw query mapping
///
/// Required parameters are checked in schema order and the first missing one
/// is reported; a present but blank value counts as missing. Optional
/// parameters fall back to their default when absent or blank. Keys outside
/// the schema are dropped.
pub fn extract_request(route: &RouteSpec, raw: &QueryParams) -> GatewayResult<ProxyRequest> {
	let mut params = QueryParams::new();

	for spec in route.params.iter() {
		let supplied = raw
			.get(&spec.name)
			.filter(|value| !value.trim().is_empty());

		match (supplied, &spec.default) {
			(Some(value), _) => {
				params.insert(spec.name.clone(), value.clone());
			},
			(None, _) if spec.required => return Err(GatewayError::missing(&spec.name)),
			(None, Some(default)) => {
				params.insert(spec.name.clone(), default.clone());
			},
			(None, None) => {},
		}
	}

	Ok(ProxyRequest::new(
		route.path.clone(),
		params,
		route.bindings.clone(),
	))
}

#[cfg(test)]
mod tests {
	use super::*;
	use relay_types::ParamSpec;

	fn translate_route() -> RouteSpec {
		RouteSpec::new("/api/translate", "google-translate")
			.with_params(vec![ParamSpec::required("text"), ParamSpec::optional("to", "en")])
	}

	#[test]
	fn test_parse_query_last_value_wins() {
		let params = parse_query(Some("text=one&to=fr&text=two+words&empty="));
		assert_eq!(params.get("text").map(String::as_str), Some("two words"));
		assert_eq!(params.get("to").map(String::as_str), Some("fr"));
		assert_eq!(params.get("empty").map(String::as_str), Some(""));
		assert!(parse_query(None).is_empty());
	}

	#[test]
	fn test_defaults_applied_and_unknown_keys_dropped() {
		let raw = parse_query(Some("text=hola&debug=1"));
		let request = extract_request(&translate_route(), &raw).unwrap();

		assert_eq!(request.path, "/api/translate");
		assert_eq!(request.param("text"), Some("hola"));
		assert_eq!(request.param("to"), Some("en"));
		assert_eq!(request.param("debug"), None);
	}

	#[test]
	fn test_blank_required_counts_as_missing() {
		let raw = parse_query(Some("text=%20%20&to=de"));
		let err = extract_request(&translate_route(), &raw).unwrap_err();
		assert_eq!(err, GatewayError::missing("text"));
	}

	#[test]
	fn test_first_missing_in_declaration_order() {
		let route = RouteSpec::new("/api/multi", "stub").with_params(vec![
			ParamSpec::required("b"),
			ParamSpec::required("a"),
		]);
		let err = extract_request(&route, &QueryParams::new()).unwrap_err();
		assert_eq!(err.to_string(), "Missing required parameter: b");
	}

	#[test]
	fn test_bindings_carried_over() {
		let route = RouteSpec::new("/api/yta", "media-streams")
			.with_params(vec![ParamSpec::required("url")])
			.with_binding("format", "highestaudio");
		let raw = parse_query(Some("url=https%3A%2F%2Fyoutu.be%2Fabc&format=lowest"));
		let request = extract_request(&route, &raw).unwrap();

		assert_eq!(request.param("format"), None);
		assert_eq!(request.arg("format"), Some("highestaudio"));
		assert_eq!(request.param("url"), Some("https://youtu.be/abc"));
	}
}
