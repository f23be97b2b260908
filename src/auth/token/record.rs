//! Token exchange results and their builder.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Errors produced by [`TokenResultBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum TokenResultBuilderError {
	/// Issued when no access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
}

/// Outcome of a successful authorization-code exchange.
///
/// The broker never persists this value; callers that need the token beyond the login attempt
/// store it themselves.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenResult {
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Provider-assigned user identifier returned with (or looked up after) the token.
	pub correlation_id: Option<String>,
	/// Refresh token secret, if the provider issued one. Captured only.
	pub refresh_token: Option<TokenSecret>,
	/// Instant the exchange completed.
	pub issued_at: OffsetDateTime,
	/// Expiry instant derived from `expires_in`, when the provider reported one.
	pub expires_at: Option<OffsetDateTime>,
	/// Remaining non-secret fields of the token response.
	pub extra: JsonMap<String, JsonValue>,
}
impl TokenResult {
	/// Returns a builder for constructing token results.
	pub fn builder() -> TokenResultBuilder {
		TokenResultBuilder::default()
	}

	/// Correlation identifier as a string slice, if captured.
	pub fn correlation_id(&self) -> Option<&str> {
		self.correlation_id.as_deref()
	}

	/// Returns `true` if the token reported an expiry that has passed at `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| instant >= expires_at)
	}
}
impl Debug for TokenResult {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenResult")
			.field("access_token", &"<redacted>")
			.field("correlation_id", &self.correlation_id)
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.field("extra", &self.extra.keys().collect::<Vec<_>>())
			.finish()
	}
}

/// Builder for [`TokenResult`].
#[derive(Clone, Debug, Default)]
pub struct TokenResultBuilder {
	access_token: Option<TokenSecret>,
	correlation_id: Option<String>,
	refresh_token: Option<TokenSecret>,
	issued_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
	extra: JsonMap<String, JsonValue>,
}
impl TokenResultBuilder {
	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(TokenSecret::new(token));

		self
	}

	/// Sets the provider-assigned correlation identifier.
	pub fn correlation_id(mut self, id: impl Into<String>) -> Self {
		self.correlation_id = Some(id.into());

		self
	}

	/// Provides the refresh token value.
	pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Sets the issued-at instant.
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets a relative expiry duration from the issued instant.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Attaches the remaining non-secret response fields.
	pub fn extra(mut self, extra: JsonMap<String, JsonValue>) -> Self {
		self.extra = extra;

		self
	}

	/// Consumes the builder and produces a [`TokenResult`].
	pub fn build(self) -> Result<TokenResult, TokenResultBuilderError> {
		let access_token = self
			.access_token
			.filter(|token| !token.is_empty())
			.ok_or(TokenResultBuilderError::MissingAccessToken)?;
		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);
		// Expiries past the representable range are treated as unknown.
		let expires_at = self
			.expires_in
			.filter(|delta| delta.is_positive())
			.and_then(|delta| issued_at.checked_add(delta));

		Ok(TokenResult {
			access_token,
			correlation_id: self.correlation_id.filter(|id| !id.is_empty()),
			refresh_token: self.refresh_token,
			issued_at,
			expires_at,
			extra: self.extra,
		})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn builder_handles_relative_expiry() {
		let result = TokenResult::builder()
			.access_token("2.00abc")
			.correlation_id("1404376560")
			.issued_at(macros::datetime!(2025-01-01 00:00 UTC))
			.expires_in(Duration::seconds(157_679_999))
			.build()
			.expect("Token result builder should support relative expiry calculations.");

		assert_eq!(result.correlation_id(), Some("1404376560"));
		assert!(result.expires_at.is_some());
		assert!(!result.is_expired_at(macros::datetime!(2025-06-01 00:00 UTC)));
	}

	#[test]
	fn builder_rejects_missing_or_empty_token() {
		assert_eq!(
			TokenResult::builder().build().expect_err("Token is required."),
			TokenResultBuilderError::MissingAccessToken
		);
		assert!(TokenResult::builder().access_token("").build().is_err());
	}

	#[test]
	fn empty_correlation_and_non_positive_expiry_are_dropped() {
		let result = TokenResult::builder()
			.access_token("token")
			.correlation_id("")
			.expires_in(Duration::ZERO)
			.build()
			.expect("Token result should build.");

		assert_eq!(result.correlation_id(), None);
		assert_eq!(result.expires_at, None);
		assert!(!result.is_expired_at(OffsetDateTime::now_utc()));
	}

	#[test]
	fn unrepresentable_expiry_is_left_unknown() {
		let result = TokenResult::builder()
			.access_token("token")
			.issued_at(macros::datetime!(2025-01-01 00:00 UTC))
			.expires_in(Duration::seconds(i64::MAX))
			.build()
			.expect("Oversized expiry must not fail the build.");

		assert_eq!(result.expires_at, None);
	}

	#[test]
	fn debug_redacts_secrets() {
		let result = TokenResult::builder()
			.access_token("super-secret")
			.refresh_token("refresh-secret")
			.build()
			.expect("Token result should build.");
		let rendered = format!("{result:?}");

		assert!(!rendered.contains("super-secret"));
		assert!(!rendered.contains("refresh-secret"));
	}
}
