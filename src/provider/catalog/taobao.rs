//! Taobao Open Platform.
//!
//! The profile comes from the TOP REST router (`taobao.user.seller.get`) rather than a dedicated
//! user-info endpoint; the user id is taken from the token response.

// self
use crate::{
	_prelude::*,
	auth::{NormalizedIdentity, TokenResult},
	provider::{
		ProfileMapError, ProviderDescriptor, ProviderDescriptorError, ProviderQuirks,
		ProviderStrategy, TokenCorrelation, decode_profile, payload::lenient_string, require,
	},
};

pub(super) fn descriptor() -> Result<ProviderDescriptor, ProviderDescriptorError> {
	super::descriptor_builder(
		"taobao",
		"https://oauth.taobao.com/authorize",
		"https://oauth.taobao.com/token",
		"https://eco.taobao.com/router/rest",
	)?
	.default_scopes(["user"])
	.quirks(ProviderQuirks {
		token_correlation: TokenCorrelation::Field { pointer: "/taobao_user_id".into() },
		profile_extra_params: [
			("method", "taobao.user.seller.get"),
			("fields", "nick,user_id,type"),
			("format", "json"),
			("v", "2.0"),
		]
		.into_iter()
		.map(|(k, v)| (k.to_owned(), v.to_owned()))
		.collect(),
		..Default::default()
	})
	.build()
}

#[derive(Debug, Deserialize)]
struct SellerGetResponse {
	user_seller_get_response: SellerEnvelope,
}

#[derive(Debug, Deserialize)]
struct SellerEnvelope {
	user: TaobaoUser,
}

#[derive(Debug, Deserialize)]
struct TaobaoUser {
	#[serde(default, deserialize_with = "lenient_string")]
	user_id: Option<String>,
	#[serde(default)]
	nick: Option<String>,
	#[serde(default, rename = "type")]
	kind: Option<String>,
}

/// Reads `taobao.user.seller.get` responses; `error_response` envelopes are faults.
#[derive(Debug, Default)]
pub struct TaobaoStrategy;
impl ProviderStrategy for TaobaoStrategy {
	fn map_profile(
		&self,
		payload: &JsonValue,
		token: &TokenResult,
	) -> Result<NormalizedIdentity, ProfileMapError> {
		let response: SellerGetResponse = decode_profile(payload)?;
		let user = response.user_seller_get_response.user;
		let id = require(token.correlation_id.clone().or(user.user_id), "taobao_user_id")?;

		Ok(NormalizedIdentity::new(id, user.nick.unwrap_or_default())
			.with_optional_extra("type", user.kind))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn maps_seller_nick() {
		let token = TokenResult::builder()
			.access_token("6200e1")
			.correlation_id("3664125221")
			.build()
			.expect("Token should build.");
		let identity = TaobaoStrategy
			.map_profile(
				&serde_json::json!({
					"user_seller_get_response": { "user": { "nick": "tbtest561", "type": "C" } }
				}),
				&token,
			)
			.expect("Taobao profile should map.");

		assert_eq!(identity.id(), "3664125221");
		assert_eq!(identity.name(), "tbtest561");
		assert_eq!(identity.get("type"), Some("C"));
	}

	#[test]
	fn error_response_is_a_fault() {
		let fault = TaobaoStrategy
			.profile_fault(&serde_json::json!({
				"error_response": { "code": 27, "msg": "Invalid session", "sub_code": "invalid-sessionkey" }
			}))
			.expect("error_response should be a fault.");

		assert_eq!(fault.code, "invalid-sessionkey");
	}
}
