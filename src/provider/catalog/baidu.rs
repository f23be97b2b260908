//! Baidu Open Platform.

// self
use crate::{
	_prelude::*,
	auth::{NormalizedIdentity, TokenResult},
	provider::{
		HttpMethod, ProfileMapError, ProviderDescriptor, ProviderDescriptorError, ProviderQuirks,
		ProviderStrategy, decode_profile, payload::lenient_string, require,
	},
};

pub(super) fn descriptor() -> Result<ProviderDescriptor, ProviderDescriptorError> {
	super::descriptor_builder(
		"baidu",
		"https://openapi.baidu.com/oauth/2.0/authorize",
		"https://openapi.baidu.com/oauth/2.0/token",
		"https://openapi.baidu.com/rest/2.0/passport/users/getLoggedInUser",
	)?
	.default_scopes(["basic"])
	.quirks(ProviderQuirks { profile_method: HttpMethod::Post, ..Default::default() })
	.build()
}

#[derive(Debug, Deserialize)]
struct BaiduUser {
	#[serde(default, deserialize_with = "lenient_string")]
	uid: Option<String>,
	#[serde(default)]
	uname: Option<String>,
	#[serde(default)]
	portrait: Option<String>,
}

/// Reads `getLoggedInUser` responses.
#[derive(Debug, Default)]
pub struct BaiduStrategy;
impl ProviderStrategy for BaiduStrategy {
	fn map_profile(
		&self,
		payload: &JsonValue,
		_token: &TokenResult,
	) -> Result<NormalizedIdentity, ProfileMapError> {
		let user: BaiduUser = decode_profile(payload)?;

		Ok(NormalizedIdentity::new(require(user.uid, "uid")?, user.uname.unwrap_or_default())
			.with_optional_extra("portrait", user.portrait))
	}
}
