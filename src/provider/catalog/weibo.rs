//! Sina Weibo.

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
		"weibo",
		"https://api.weibo.com/oauth2/authorize",
		"https://api.weibo.com/oauth2/access_token",
		"https://api.weibo.com/2/users/show.json",
	)?
	.default_scopes(["email"])
	.quirks(ProviderQuirks {
		token_correlation: TokenCorrelation::Field { pointer: "/uid".into() },
		profile_correlation_param: Some("uid".into()),
		..Default::default()
	})
	.build()
}

#[derive(Debug, Deserialize)]
struct WeiboUser {
	#[serde(default, deserialize_with = "lenient_string")]
	idstr: Option<String>,
	#[serde(default, deserialize_with = "lenient_string")]
	id: Option<String>,
	#[serde(default)]
	name: Option<String>,
	#[serde(default)]
	screen_name: Option<String>,
	#[serde(default)]
	avatar_large: Option<String>,
}

/// Reads `users/show.json` responses.
#[derive(Debug, Default)]
pub struct WeiboStrategy;
impl ProviderStrategy for WeiboStrategy {
	fn map_profile(
		&self,
		payload: &JsonValue,
		token: &TokenResult,
	) -> Result<NormalizedIdentity, ProfileMapError> {
		let user: WeiboUser = decode_profile(payload)?;
		let id = user.idstr.or(user.id).or_else(|| token.correlation_id.clone());

		Ok(NormalizedIdentity::new(require(id, "id")?, user.name.unwrap_or_default())
			.with_optional_extra("screen_name", user.screen_name)
			.with_optional_extra("avatar_large", user.avatar_large))
	}
}
