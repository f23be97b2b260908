//! Renren.

// self
use crate::{
	_prelude::*,
	auth::{NormalizedIdentity, TokenResult},
	provider::{
		HttpMethod, ProfileAuth, ProfileMapError, ProviderDescriptor, ProviderDescriptorError,
		ProviderQuirks, ProviderStrategy, TokenCorrelation, decode_profile,
		payload::lenient_string, require,
	},
};

pub(super) fn descriptor() -> Result<ProviderDescriptor, ProviderDescriptorError> {
	super::descriptor_builder(
		"renren",
		"https://graph.renren.com/oauth/authorize",
		"https://graph.renren.com/oauth/token",
		"https://api.renren.com/v2/user/login/get",
	)?
	.default_scopes(["publish_share"])
	.quirks(ProviderQuirks {
		token_method: HttpMethod::Get,
		token_correlation: TokenCorrelation::Field { pointer: "/user/id".into() },
		profile_auth: ProfileAuth::Header { scheme: "Bearer".into() },
		..Default::default()
	})
	.build()
}

#[derive(Debug, Deserialize)]
struct RenrenUser {
	#[serde(default, deserialize_with = "lenient_string")]
	id: Option<String>,
	#[serde(default)]
	name: Option<String>,
}

/// Reads `/v2/user/login/get` responses.
///
/// The user object may arrive bare or wrapped in a `response` envelope. The id comes from the
/// token response's `user.id`, with the profile's own id as a fallback.
#[derive(Debug, Default)]
pub struct RenrenStrategy;
impl ProviderStrategy for RenrenStrategy {
	fn map_profile(
		&self,
		payload: &JsonValue,
		token: &TokenResult,
	) -> Result<NormalizedIdentity, ProfileMapError> {
		let user: RenrenUser = decode_profile(payload.get("response").unwrap_or(payload))?;
		let id = require(token.correlation_id.clone().or(user.id), "id")?;

		Ok(NormalizedIdentity::new(id, user.name.unwrap_or_default()))
	}
}
