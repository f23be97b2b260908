//! Authorization URL construction and return-URL bookkeeping.
//!
//! The caller's return URL doubles as the OAuth `redirect_uri` (path only) and the `state`
//! value (its raw query). Providers echo `state` back on the callback, which is how
//! [`restore_return_url`] rebuilds the page the user started from.

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	flows::LoginBroker,
	http::ProviderHttpClient,
	oauth::TransportErrorMapper,
	obs::{self, LoginStep, StepOutcome, StepSpan},
	provider::AuthorizeMarker,
};

/// Everything needed to send a user to the provider and recognize them on the way back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationRequest {
	/// Return URL as supplied by the caller.
	pub return_url: Url,
	/// Return URL without query or fragment; sent as `redirect_uri`.
	pub redirect_uri: Url,
	/// Raw query of the return URL (possibly empty); sent as `state`.
	pub state: String,
	/// Fully-formed authorization URL the user agent should be redirected to.
	pub login_url: Url,
}

/// Splits a return URL into its `redirect_uri` and `state` halves.
pub fn split_return_url(return_url: &Url) -> Result<(Url, String), ConfigError> {
	if !matches!(return_url.scheme(), "http" | "https") || return_url.cannot_be_a_base() {
		return Err(ConfigError::InvalidReturnUrl { url: return_url.to_string() });
	}

	let mut redirect_uri = return_url.clone();

	redirect_uri.set_query(None);
	redirect_uri.set_fragment(None);

	Ok((redirect_uri, return_url.query().unwrap_or_default().to_owned()))
}

/// Rebuilds the caller's original return URL from a provider callback URL.
///
/// The decoded `state` becomes the query again and the remaining callback parameters (`code`,
/// `error`, ...) are appended after it. Callback URLs without a `state` are returned as-is.
pub fn restore_return_url(callback_url: &Url) -> Url {
	let pairs = callback_url.query_pairs().into_owned().collect::<Vec<_>>();
	let Some(state) = pairs.iter().find(|(key, _)| key == "state").map(|(_, value)| value.clone())
	else {
		return callback_url.clone();
	};
	let rest = pairs.into_iter().filter(|(key, _)| key != "state").collect::<Vec<_>>();
	let mut restored = callback_url.clone();

	restored.set_query((!state.is_empty()).then_some(state.as_str()));

	if !rest.is_empty() {
		restored.query_pairs_mut().extend_pairs(rest);
	}

	restored
}

impl<C, M> LoginBroker<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds the provider authorization URL for `return_url`.
	///
	/// Parameters are emitted once each, in order: the client id parameter, `redirect_uri`,
	/// `response_type=code`, `scope`, and `state`, followed by any provider marker.
	pub fn build_login_url(&self, return_url: &Url) -> Result<AuthorizationRequest> {
		const STEP: LoginStep = LoginStep::LoginUrl;

		let provider = self.provider_name();
		let _guard = StepSpan::new(provider, STEP).entered();

		obs::record_step_outcome(provider, STEP, StepOutcome::Attempt);

		let result = self.authorization_request(return_url);

		obs::record_step_outcome(
			provider,
			STEP,
			if result.is_ok() { StepOutcome::Success } else { StepOutcome::Failure },
		);

		result
	}

	fn authorization_request(&self, return_url: &Url) -> Result<AuthorizationRequest> {
		let descriptor = &self.config.descriptor;
		let quirks = &descriptor.quirks;
		let (redirect_uri, state) = split_return_url(return_url)?;
		let mut login_url = descriptor.endpoints.authorization.clone();

		login_url
			.query_pairs_mut()
			.append_pair(&quirks.client_id_param, &self.config.client_id)
			.append_pair("redirect_uri", redirect_uri.as_str())
			.append_pair("response_type", "code")
			.append_pair("scope", &self.config.scopes.joined(quirks.scope_delimiter))
			.append_pair("state", &state);

		match &quirks.authorize_marker {
			Some(AuthorizeMarker::Fragment(fragment)) =>
				login_url.set_fragment(Some(fragment.as_str())),
			Some(AuthorizeMarker::QueryFlag(flag)) => {
				login_url.query_pairs_mut().append_key_only(flag);
			},
			None => {},
		}

		Ok(AuthorizationRequest { return_url: return_url.clone(), redirect_uri, state, login_url })
	}
}
