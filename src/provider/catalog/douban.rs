//! Douban.

// self
use crate::{
	_prelude::*,
	auth::{NormalizedIdentity, TokenResult},
	provider::{
		ProfileAuth, ProfileMapError, ProviderDescriptor, ProviderDescriptorError, ProviderFault,
		ProviderQuirks, ProviderStrategy, TokenCorrelation, decode_profile,
		payload::{self, lenient_string},
		require,
	},
};

pub(super) fn descriptor() -> Result<ProviderDescriptor, ProviderDescriptorError> {
	super::descriptor_builder(
		"douban",
		"https://www.douban.com/service/auth2/auth",
		"https://www.douban.com/service/auth2/token",
		"https://api.douban.com/v2/user/~me",
	)?
	.default_scopes(["douban_basic_common"])
	.quirks(ProviderQuirks {
		token_correlation: TokenCorrelation::Field { pointer: "/douban_user_id".into() },
		profile_auth: ProfileAuth::Header { scheme: "Bearer".into() },
		..Default::default()
	})
	.build()
}

#[derive(Debug, Deserialize)]
struct DoubanUser {
	#[serde(default, deserialize_with = "lenient_string")]
	id: Option<String>,
	#[serde(default)]
	name: Option<String>,
	#[serde(default)]
	uid: Option<String>,
	#[serde(default)]
	avatar: Option<String>,
	#[serde(default)]
	loc_name: Option<String>,
}

/// Reads `/v2/user/~me` responses.
#[derive(Debug, Default)]
pub struct DoubanStrategy;
impl ProviderStrategy for DoubanStrategy {
	fn token_fault(&self, payload: &JsonMap<String, JsonValue>) -> Option<ProviderFault> {
		douban_fault(payload)
	}

	fn profile_fault(&self, payload: &JsonValue) -> Option<ProviderFault> {
		payload.as_object().and_then(douban_fault)
	}

	fn map_profile(
		&self,
		payload: &JsonValue,
		_token: &TokenResult,
	) -> Result<NormalizedIdentity, ProfileMapError> {
		let user: DoubanUser = decode_profile(payload)?;

		Ok(NormalizedIdentity::new(require(user.id, "id")?, user.name.unwrap_or_default())
			.with_optional_extra("uid", user.uid)
			.with_optional_extra("avatar", user.avatar)
			.with_optional_extra("loc_name", user.loc_name))
	}
}

/// Douban reports `{"code": 103, "msg": "invalid_access_token", "request": ".."}`.
fn douban_fault(payload: &JsonMap<String, JsonValue>) -> Option<ProviderFault> {
	payload::standard_fault(payload).or_else(|| {
		let message = payload.get("msg").and_then(payload::value_as_string)?;
		let code = payload.get("code").and_then(payload::value_as_string)?;

		Some(ProviderFault::new(code).with_message(Some(message)))
	})
}
