//! WeChat official-account web authorization.
//!
//! WeChat renames `client_id`/`client_secret` to `appid`/`secret`, omits `redirect_uri` from the
//! token request, and requires a `#wechat_redirect` fragment on the authorization URL. With the
//! silent `snsapi_base` scope the `openid` is the whole identity, so no profile call is made.

// self
use crate::{
	_prelude::*,
	auth::{NormalizedIdentity, ScopeList, TokenResult},
	provider::{
		AuthorizeMarker, HttpMethod, ProfileMapError, ProviderDescriptor, ProviderDescriptorError,
		ProviderQuirks, ProviderStrategy, TokenCorrelation, decode_profile, payload::lenient_string,
		require,
	},
};

/// Scope that unlocks the `sns/userinfo` profile call.
pub const USERINFO_SCOPE: &str = "snsapi_userinfo";

pub(super) fn descriptor() -> Result<ProviderDescriptor, ProviderDescriptorError> {
	super::descriptor_builder(
		"weixin",
		"https://open.weixin.qq.com/connect/oauth2/authorize",
		"https://api.weixin.qq.com/sns/oauth2/access_token",
		"https://api.weixin.qq.com/sns/userinfo",
	)?
	.default_scopes(["snsapi_base"])
	.quirks(ProviderQuirks {
		client_id_param: "appid".into(),
		client_secret_param: "secret".into(),
		send_redirect_uri_on_token: false,
		scope_delimiter: ',',
		authorize_marker: Some(AuthorizeMarker::Fragment("wechat_redirect".into())),
		token_method: HttpMethod::Get,
		token_correlation: TokenCorrelation::Field { pointer: "/openid".into() },
		profile_correlation_param: Some("openid".into()),
		..Default::default()
	})
	.build()
}

#[derive(Debug, Deserialize)]
struct WeixinUser {
	#[serde(default)]
	openid: Option<String>,
	#[serde(default)]
	nickname: Option<String>,
	#[serde(default, deserialize_with = "lenient_string")]
	sex: Option<String>,
	#[serde(default)]
	city: Option<String>,
	#[serde(default)]
	country: Option<String>,
	#[serde(default)]
	headimgurl: Option<String>,
	#[serde(default)]
	unionid: Option<String>,
}

/// Builds identities from the `openid`, calling `sns/userinfo` only for `snsapi_userinfo`.
#[derive(Debug, Default)]
pub struct WeixinStrategy;
impl ProviderStrategy for WeixinStrategy {
	fn local_profile(&self, scopes: &ScopeList, token: &TokenResult) -> Option<NormalizedIdentity> {
		if scopes.contains(USERINFO_SCOPE) {
			return None;
		}

		let openid = token.correlation_id()?;

		Some(NormalizedIdentity::new(openid, openid))
	}

	fn map_profile(
		&self,
		payload: &JsonValue,
		token: &TokenResult,
	) -> Result<NormalizedIdentity, ProfileMapError> {
		let user: WeixinUser = decode_profile(payload)?;
		let openid = require(user.openid.or_else(|| token.correlation_id.clone()), "openid")?;
		let name = user.nickname.filter(|n| !n.is_empty()).unwrap_or_else(|| openid.clone());

		Ok(NormalizedIdentity::new(openid, name)
			.with_optional_extra("sex", user.sex)
			.with_optional_extra("city", user.city)
			.with_optional_extra("country", user.country)
			.with_optional_extra("headimgurl", user.headimgurl)
			.with_optional_extra("unionid", user.unionid))
	}
}
