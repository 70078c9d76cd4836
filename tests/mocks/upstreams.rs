//! Stub upstreams standing in for the built-in callers

use relay_gateway::test_utils::StubUpstream;
use relay_gateway::upstreams::BUILTIN_UPSTREAM_IDS;
use relay_gateway::Capability;

#[allow(dead_code)]
pub struct MockUpstreams;

#[allow(dead_code)]
impl MockUpstreams {
	/// Replaces `google-translate`; answers `{translated: "hello"}`
	pub fn translate_ok() -> StubUpstream {
		StubUpstream::json("google-translate", Capability::Translate, "translated", "hello")
	}

	/// Replaces `google-translate`; always fails with `message`
	pub fn translate_failing(message: &str) -> StubUpstream {
		StubUpstream::failing("google-translate", Capability::Translate, message)
	}

	/// Replaces `image-enhance`; answers fixed bytes without a useful media type
	pub fn enhance_bytes() -> StubUpstream {
		StubUpstream::binary(
			"image-enhance",
			Capability::TransformImage,
			"application/octet-stream",
			b"RIFF\x1a\x00\x00\x00WEBPVP8L",
		)
	}

	/// Replaces `random-quote`; deterministic payload
	pub fn quote_fixed() -> StubUpstream {
		StubUpstream::json(
			"random-quote",
			Capability::FetchRandomResource,
			"quote",
			"Simplicity is prerequisite for reliability.",
		)
	}

	/// One echo stub per built-in upstream id, replacing every real caller
	pub fn echo_all() -> Vec<StubUpstream> {
		BUILTIN_UPSTREAM_IDS
			.iter()
			.map(|id| StubUpstream::echo(id, Capability::FetchRandomResource))
			.collect()
	}
}
