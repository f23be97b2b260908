//! Provider strategy hooks that interpret token and profile payloads.
//!
//! Descriptors say where to send requests and how to encode them; strategies say what the
//! answers mean. Flows hand strategies plain JSON values so implementations never depend on the
//! HTTP client in use.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{NormalizedIdentity, ScopeList, TokenResult},
	provider::payload::{self, value_as_string},
};

/// Strategy hook that lets providers classify failures and normalize profiles.
///
/// Implementors are required to be `Send + Sync`. Only [`ProviderStrategy::map_profile`] is
/// mandatory; the remaining hooks default to the error shapes understood by
/// [`payload::standard_fault`].
pub trait ProviderStrategy: Send + Sync {
	/// Detects a provider error carried inside a successful token response.
	fn token_fault(&self, payload: &JsonMap<String, JsonValue>) -> Option<ProviderFault> {
		payload::standard_fault(payload)
	}

	/// Extracts the provider user identifier from a correlation lookup response.
	fn correlation_from_lookup(&self, payload: &JsonMap<String, JsonValue>) -> Option<String> {
		payload.get("openid").and_then(value_as_string)
	}

	/// Detects a provider error carried inside a successful profile response.
	fn profile_fault(&self, payload: &JsonValue) -> Option<ProviderFault> {
		payload.as_object().and_then(payload::standard_fault)
	}

	/// Builds the identity without calling the profile endpoint, when the provider allows it.
	fn local_profile(&self, _scopes: &ScopeList, _token: &TokenResult) -> Option<NormalizedIdentity> {
		None
	}

	/// Maps a decoded profile payload into a normalized identity.
	fn map_profile(
		&self,
		payload: &JsonValue,
		token: &TokenResult,
	) -> Result<NormalizedIdentity, ProfileMapError>;
}

/// Error code and message reported by a provider inside an otherwise successful response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderFault {
	/// Provider-specific error code, rendered as a string.
	pub code: String,
	/// Human-readable message, if the provider sent one.
	pub message: Option<String>,
}
impl ProviderFault {
	/// Creates a fault with the given code.
	pub fn new(code: impl Into<String>) -> Self {
		Self { code: code.into(), message: None }
	}

	/// Attaches an optional message.
	pub fn with_message(mut self, message: Option<String>) -> Self {
		self.message = message;

		self
	}
}

/// Failures raised while mapping a profile payload.
#[derive(Debug, ThisError)]
pub enum ProfileMapError {
	/// Payload did not match the expected shape.
	#[error("Profile payload has an unexpected shape.")]
	Malformed(#[source] serde_path_to_error::Error<serde_json::Error>),
	/// Payload lacked a field required to build the identity.
	#[error("Profile payload is missing `{0}`.")]
	MissingField(&'static str),
}

/// Decodes a profile payload into a typed struct, keeping the failing path for diagnostics.
pub fn decode_profile<T>(payload: &JsonValue) -> Result<T, ProfileMapError>
where
	T: DeserializeOwned,
{
	serde_path_to_error::deserialize(payload).map_err(ProfileMapError::Malformed)
}

/// Resolves a mandatory field, failing with [`ProfileMapError::MissingField`].
pub fn require(value: Option<String>, field: &'static str) -> Result<String, ProfileMapError> {
	value.filter(|v| !v.is_empty()).ok_or(ProfileMapError::MissingField(field))
}

/// Strategy for descriptors outside the built-in catalog.
///
/// The identifier is read from `id`, `uid`, `openid`, or `sub`, falling back to the correlation
/// id. The display name is read from `name`, `nickname`, `screen_name`, or `username`, falling
/// back to the identifier.
#[derive(Debug, Default)]
pub struct DefaultProviderStrategy;
impl Display for DefaultProviderStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("default-provider-strategy")
	}
}
impl ProviderStrategy for DefaultProviderStrategy {
	fn map_profile(
		&self,
		payload: &JsonValue,
		token: &TokenResult,
	) -> Result<NormalizedIdentity, ProfileMapError> {
		let object = payload.as_object().ok_or(ProfileMapError::MissingField("id"))?;
		let id = require(
			payload::first_text(object, &["id", "uid", "openid", "sub"])
				.or_else(|| token.correlation_id.clone()),
			"id",
		)?;
		let name = payload::first_text(object, &["name", "nickname", "screen_name", "username"])
			.unwrap_or_else(|| id.clone());

		Ok(NormalizedIdentity::new(id, name)
			.with_optional_extra("email", payload::first_text(object, &["email"])))
	}
}
