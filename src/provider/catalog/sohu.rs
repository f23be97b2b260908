//! Sohu Passport.

// self
use crate::{
	_prelude::*,
	auth::{NormalizedIdentity, TokenResult},
	provider::{
		HttpMethod, ProfileMapError, ProviderDescriptor, ProviderDescriptorError, ProviderFault,
		ProviderQuirks, ProviderStrategy, TokenCorrelation, TokenFormat, decode_profile, payload,
		require,
	},
};

const STATUS_OK: &str = "10200";

pub(super) fn descriptor() -> Result<ProviderDescriptor, ProviderDescriptorError> {
	super::descriptor_builder(
		"sohu",
		"https://api.sohu.com/oauth2/authorize",
		"https://api.sohu.com/oauth2/token",
		"https://api.sohu.com/rest/pp/prv/1/user/get_info",
	)?
	.default_scopes(["basic"])
	.quirks(ProviderQuirks {
		token_method: HttpMethod::Get,
		token_format: TokenFormat::Form,
		token_correlation: TokenCorrelation::Field { pointer: "/open_id".into() },
		..Default::default()
	})
	.build()
}

#[derive(Debug, Deserialize)]
struct SohuEnvelope {
	data: SohuUser,
}

#[derive(Debug, Deserialize)]
struct SohuUser {
	#[serde(default)]
	uniqname: Option<String>,
	#[serde(default)]
	avatar: Option<String>,
}

/// Reads `user/get_info` responses, where any `status` other than `10200` signals failure.
#[derive(Debug, Default)]
pub struct SohuStrategy;
impl ProviderStrategy for SohuStrategy {
	fn profile_fault(&self, payload: &JsonValue) -> Option<ProviderFault> {
		let object = payload.as_object()?;
		let status = object.get("status").and_then(payload::value_as_string);

		match status.as_deref() {
			Some(STATUS_OK) => None,
			Some(code) => Some(
				ProviderFault::new(code).with_message(payload::first_text(object, &["msg", "message"])),
			),
			None => payload::standard_fault(object),
		}
	}

	fn map_profile(
		&self,
		payload: &JsonValue,
		token: &TokenResult,
	) -> Result<NormalizedIdentity, ProfileMapError> {
		let SohuEnvelope { data: user } = decode_profile(payload)?;

		Ok(NormalizedIdentity::new(
			require(token.correlation_id.clone(), "open_id")?,
			user.uniqname.unwrap_or_default(),
		)
		.with_optional_extra("avatar", user.avatar))
	}
}
