//! Lenient readers for provider response bodies.
//!
//! The providers in the catalog disagree on almost everything: JSON versus form-encoded token
//! responses, JSONP wrappers on error paths, numeric versus string identifiers, and at least four
//! shapes for an error payload. These helpers absorb that variance so strategies and flows work
//! on a plain JSON object.

// crates.io
use serde::Deserializer;
use url::form_urlencoded;
// self
use crate::{_prelude::*, provider::{ProviderFault, TokenFormat}};

/// Strips a JSONP wrapper such as `callback( {...} );`, returning the inner payload.
pub fn unwrap_jsonp(body: &str) -> Option<&str> {
	let trimmed = body.trim();
	let open = trimmed.find('(')?;
	let close = trimmed.rfind(')')?;
	let callee = trimmed[..open].trim();

	if close < open
		|| callee.is_empty()
		|| !callee.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$'))
	{
		return None;
	}

	match trimmed[close + 1..].trim() {
		"" | ";" => Some(trimmed[open + 1..close].trim()),
		_ => None,
	}
}

/// Parses a response body into a JSON object.
///
/// JSON and JSONP bodies are always recognized. Form-encoded pairs are accepted only when the
/// provider declares [`TokenFormat::Form`]. Returns `None` for empty or unparseable input.
pub fn parse_object(body: &str, format: TokenFormat) -> Option<JsonMap<String, JsonValue>> {
	let body = body.trim();

	if body.is_empty() {
		return None;
	}

	let json = unwrap_jsonp(body).unwrap_or(body);

	if json.starts_with('{') {
		return serde_json::from_str(json).ok();
	}

	match format {
		TokenFormat::Json => None,
		TokenFormat::Form => parse_form(body),
	}
}

fn parse_form(body: &str) -> Option<JsonMap<String, JsonValue>> {
	let map = form_urlencoded::parse(body.as_bytes())
		.filter(|(key, _)| !key.is_empty())
		.map(|(key, value)| (key.into_owned(), JsonValue::String(value.into_owned())))
		.collect::<JsonMap<_, _>>();

	(!map.is_empty()).then_some(map)
}

/// Renders a string or number as a non-empty string.
pub fn value_as_string(value: &JsonValue) -> Option<String> {
	match value {
		JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
		JsonValue::Number(n) => Some(n.to_string()),
		_ => None,
	}
}

/// Reads an integer that may be encoded as a JSON number or a decimal string.
pub fn value_as_i64(value: &JsonValue) -> Option<i64> {
	match value {
		JsonValue::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
		JsonValue::String(s) => s.trim().parse().ok(),
		_ => None,
	}
}

/// Serde adapter that accepts a string or a number and yields `Option<String>`.
///
/// Use with `#[serde(default, deserialize_with = "lenient_string")]`.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	let value = <Option<JsonValue>>::deserialize(deserializer)?;

	Ok(value.as_ref().and_then(value_as_string))
}

/// Detects the error payload shapes shared by most providers.
///
/// Recognized shapes, in order:
/// - `{"errcode": 40029, "errmsg": ".."}` (non-zero code)
/// - `{"error_code": 21325, "error_msg": ".."}`
/// - `{"error": "invalid_grant", "error_description": ".."}` or `{"error": {"code": .., "message": ..}}`
/// - `{"error_response": {"code": .., "msg": ..}}`
pub fn standard_fault(payload: &JsonMap<String, JsonValue>) -> Option<ProviderFault> {
	if let Some(code) = payload.get("errcode").and_then(nonzero_code) {
		return Some(ProviderFault::new(code).with_message(first_text(payload, &["errmsg"])));
	}
	if let Some(code) = payload.get("error_code").and_then(nonzero_code) {
		return Some(ProviderFault::new(code).with_message(first_text(
			payload,
			&["error_msg", "error_description", "error"],
		)));
	}

	match payload.get("error") {
		Some(JsonValue::Object(inner)) => {
			let code = inner.get("code").and_then(value_as_string).unwrap_or_else(|| "error".into());

			return Some(ProviderFault::new(code).with_message(first_text(inner, &["message"])));
		},
		Some(value) =>
			if let Some(code) = value_as_string(value) {
				return Some(
					ProviderFault::new(code)
						.with_message(first_text(payload, &["error_description"])),
				);
			},
		None => {},
	}

	if let Some(JsonValue::Object(inner)) = payload.get("error_response") {
		let code = first_text(inner, &["sub_code", "code"]).unwrap_or_else(|| "error".into());

		return Some(ProviderFault::new(code).with_message(first_text(inner, &["sub_msg", "msg"])));
	}

	None
}

/// Returns the first non-empty string or number found under `keys`.
pub fn first_text(payload: &JsonMap<String, JsonValue>, keys: &[&str]) -> Option<String> {
	keys.iter().find_map(|key| payload.get(*key).and_then(value_as_string))
}

fn nonzero_code(value: &JsonValue) -> Option<String> {
	value_as_string(value).filter(|code| code != "0")
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn object(raw: &str) -> JsonMap<String, JsonValue> {
		serde_json::from_str(raw).expect("Fixture should be a JSON object.")
	}

	#[test]
	fn jsonp_wrappers_are_stripped() {
		assert_eq!(
			unwrap_jsonp("callback( {\"client_id\":\"1\",\"openid\":\"ABC\"} );\n"),
			Some("{\"client_id\":\"1\",\"openid\":\"ABC\"}")
		);
		assert_eq!(unwrap_jsonp("{\"a\":1}"), None);
		assert_eq!(unwrap_jsonp("access_token=T&expires_in=7776000"), None);
		assert_eq!(unwrap_jsonp("callback( {} ) trailing"), None);
	}

	#[test]
	fn parse_object_honors_format() {
		let form = parse_object(
			"access_token=FE04&expires_in=7776000&refresh_token=88E4",
			TokenFormat::Form,
		)
		.expect("Form body should parse.");

		assert_eq!(form.get("access_token"), Some(&JsonValue::String("FE04".into())));
		assert!(parse_object("access_token=FE04", TokenFormat::Json).is_none());
		assert!(parse_object("callback( {\"error\":100019} );", TokenFormat::Form).is_some());
		assert!(parse_object("   ", TokenFormat::Form).is_none());
		assert!(parse_object("{not json", TokenFormat::Json).is_none());
	}

	#[test]
	fn numbers_and_strings_render_alike() {
		assert_eq!(value_as_string(&serde_json::json!(1404376560)), Some("1404376560".into()));
		assert_eq!(value_as_string(&serde_json::json!("")), None);
		assert_eq!(value_as_i64(&serde_json::json!("7200")), Some(7200));
		assert_eq!(value_as_i64(&serde_json::json!(7200)), Some(7200));
	}

	#[test]
	fn standard_fault_recognizes_known_shapes() {
		let wechat = standard_fault(&object("{\"errcode\":40029,\"errmsg\":\"invalid code\"}"))
			.expect("WeChat errcode should be a fault.");

		assert_eq!(wechat.code, "40029");
		assert_eq!(wechat.message.as_deref(), Some("invalid code"));
		assert!(standard_fault(&object("{\"errcode\":0,\"errmsg\":\"ok\"}")).is_none());

		let weibo = standard_fault(&object(
			"{\"error\":\"expired_token\",\"error_code\":21327,\"request\":\"/2/users/show.json\"}",
		))
		.expect("Weibo error_code should be a fault.");

		assert_eq!(weibo.code, "21327");
		assert_eq!(weibo.message.as_deref(), Some("expired_token"));

		let renren = standard_fault(&object(
			"{\"error\":{\"code\":\"invalid_authorization.EXPIRED-TOKEN\",\"message\":\"expired\"}}",
		))
		.expect("Nested error objects should be a fault.");

		assert_eq!(renren.code, "invalid_authorization.EXPIRED-TOKEN");

		let taobao = standard_fault(&object(
			"{\"error_response\":{\"code\":27,\"msg\":\"Invalid session\",\"sub_code\":\"invalid-sessionkey\"}}",
		))
		.expect("Taobao error_response should be a fault.");

		assert_eq!(taobao.code, "invalid-sessionkey");
		assert_eq!(taobao.message.as_deref(), Some("Invalid session"));
		assert!(standard_fault(&object("{\"access_token\":\"T\",\"uid\":\"U\"}")).is_none());
	}
}
