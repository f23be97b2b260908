//! Tencent QQ Connect.
//!
//! QQ answers the token request with form-encoded pairs and resolves the `openid` through a
//! separate JSONP endpoint. Profile calls must echo the app id as `oauth_consumer_key`.

// self
use crate::{
	_prelude::*,
	auth::{NormalizedIdentity, TokenResult},
	provider::{
		Endpoint, HttpMethod, ProfileMapError, ProviderDescriptor, ProviderDescriptorError,
		ProviderFault, ProviderQuirks, ProviderStrategy, TokenCorrelation, TokenFormat,
		decode_profile, parse_endpoint, payload, require,
	},
};

pub(super) fn descriptor() -> Result<ProviderDescriptor, ProviderDescriptorError> {
	super::descriptor_builder(
		"qq",
		"https://graph.qq.com/oauth2.0/authorize",
		"https://graph.qq.com/oauth2.0/token",
		"https://graph.qq.com/user/get_user_info",
	)?
	.correlation_endpoint(parse_endpoint(Endpoint::Correlation, "https://graph.qq.com/oauth2.0/me")?)
	.default_scopes(["get_user_info"])
	.quirks(ProviderQuirks {
		token_method: HttpMethod::Get,
		token_format: TokenFormat::Form,
		token_correlation: TokenCorrelation::Lookup,
		profile_correlation_param: Some("openid".into()),
		profile_client_id_param: Some("oauth_consumer_key".into()),
		..Default::default()
	})
	.build()
}

#[derive(Debug, Deserialize)]
struct QqUser {
	#[serde(default)]
	nickname: Option<String>,
	#[serde(default)]
	gender: Option<String>,
	#[serde(default)]
	figureurl_qq_1: Option<String>,
}

/// Reads `get_user_info` responses, where `ret != 0` signals failure.
#[derive(Debug, Default)]
pub struct QqStrategy;
impl ProviderStrategy for QqStrategy {
	fn profile_fault(&self, payload: &JsonValue) -> Option<ProviderFault> {
		let object = payload.as_object()?;
		let code = object.get("ret").and_then(payload::value_as_string)?;

		if code == "0" {
			return None;
		}

		Some(ProviderFault::new(code).with_message(payload::first_text(object, &["msg"])))
	}

	fn map_profile(
		&self,
		payload: &JsonValue,
		token: &TokenResult,
	) -> Result<NormalizedIdentity, ProfileMapError> {
		let user: QqUser = decode_profile(payload)?;

		Ok(NormalizedIdentity::new(
			require(token.correlation_id.clone(), "openid")?,
			user.nickname.unwrap_or_default(),
		)
		.with_optional_extra("gender", user.gender)
		.with_optional_extra("figureurl", user.figureurl_qq_1))
	}
}
