//! Sohu Weibo.

// self
use crate::{
	_prelude::*,
	auth::{NormalizedIdentity, TokenResult},
	provider::{
		ProfileMapError, ProviderDescriptor, ProviderDescriptorError, ProviderStrategy,
		decode_profile, payload::lenient_string, require,
	},
};

pub(super) fn descriptor() -> Result<ProviderDescriptor, ProviderDescriptorError> {
	super::descriptor_builder(
		"sohu_weibo",
		"https://api.t.sohu.com/oauth2/authorize",
		"https://api.t.sohu.com/oauth2/access_token",
		"https://api.t.sohu.com/users/show.json",
	)?
	.default_scopes(["basic"])
	.build()
}

#[derive(Debug, Deserialize)]
struct SohuWeiboUser {
	#[serde(default, deserialize_with = "lenient_string")]
	id: Option<String>,
	#[serde(default)]
	screen_name: Option<String>,
	#[serde(default)]
	profile_image_url: Option<String>,
}

/// Reads `users/show.json` responses.
#[derive(Debug, Default)]
pub struct SohuWeiboStrategy;
impl ProviderStrategy for SohuWeiboStrategy {
	fn map_profile(
		&self,
		payload: &JsonValue,
		token: &TokenResult,
	) -> Result<NormalizedIdentity, ProfileMapError> {
		let user: SohuWeiboUser = decode_profile(payload)?;

		Ok(NormalizedIdentity::new(
			require(user.id.or_else(|| token.correlation_id.clone()), "id")?,
			user.screen_name.unwrap_or_default(),
		)
		.with_optional_extra("profile_image_url", user.profile_image_url))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn maps_screen_name() {
		let token = TokenResult::builder().access_token("T").build().expect("Token should build.");
		let identity = SohuWeiboStrategy
			.map_profile(&serde_json::json!({ "id": "240977", "screen_name": "搜狐微博" }), &token)
			.expect("Sohu Weibo profile should map.");

		assert_eq!(identity.id(), "240977");
		assert_eq!(identity.name(), "搜狐微博");
	}
}
