//! Failure message sanitizing before messages reach clients

use regex::Regex;
use relay_types::SecretString;

const REDACTED: &str = "[REDACTED]";
const ELLIPSIS: &str = "...";

/// Redacts credentials and URL query strings, then truncates
#[derive(Debug, Clone)]
pub struct ErrorSanitizer {
	secrets: Vec<SecretString>,
	max_len: usize,
	url_query: Option<Regex>,
}

impl Default for ErrorSanitizer {
	fn default() -> Self {
		Self::new(Vec::new(), 512, true)
	}
}

impl ErrorSanitizer {
	pub fn new(secrets: Vec<SecretString>, max_len: usize, redact_urls: bool) -> Self {
		let url_query = redact_urls
			.then(|| Regex::new(r#"(https?://[^\s?#"'<>()]+)\?[^\s#"'<>()]*"#).ok())
			.flatten();

		Self {
			secrets: secrets.into_iter().filter(|s| !s.is_empty()).collect(),
			max_len,
			url_query,
		}
	}

	pub fn sanitize(&self, message: &str) -> String {
		let mut text = message.to_string();

		for secret in &self.secrets {
			if text.contains(secret.expose_secret()) {
				text = text.replace(secret.expose_secret(), REDACTED);
			}
		}

		if let Some(pattern) = &self.url_query {
			text = pattern
				.replace_all(&text, format!("${{1}}?{}", REDACTED).as_str())
				.into_owned();
		}

		truncate(text, self.max_len)
	}
}

fn truncate(text: String, max_len: usize) -> String {
	if max_len == 0 || text.len() <= max_len {
		return text;
	}

	let budget = max_len.saturating_sub(ELLIPSIS.len());
	let mut cut = budget;
	while cut > 0 && !text.is_char_boundary(cut) {
		cut -= 1;
	}
	format!("{}{}", &text[..cut], ELLIPSIS)
}
