//! Profile retrieval and identity normalization.

// self
use crate::{
	_prelude::*,
	auth::{NormalizedIdentity, TokenResult},
	error::{ConfigError, ResponseError},
	flows::LoginBroker,
	http::ProviderHttpClient,
	oauth::{ProviderCall, TransportErrorMapper},
	obs::{self, LoginStep, StepOutcome, StepSpan},
	provider::{Endpoint, ProfileAuth, ProfileMapError, payload},
};

impl<C, M> LoginBroker<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Fetches the user's profile with `token` and maps it into a [`NormalizedIdentity`].
	///
	/// Providers whose strategy can build the identity from the token alone skip the network
	/// call. An empty profile body yields `Ok(None)`; an error code inside a 2xx body yields
	/// [`Error::Protocol`].
	pub async fn fetch_profile(&self, token: &TokenResult) -> Result<Option<NormalizedIdentity>> {
		const STEP: LoginStep = LoginStep::ProfileFetch;

		let provider = self.provider_name();
		let span = StepSpan::new(provider, STEP);

		obs::record_step_outcome(provider, STEP, StepOutcome::Attempt);

		let result = span.instrument(self.request_profile(token)).await;

		obs::record_step_outcome(provider, STEP, StepOutcome::of(&result));

		result
	}

	async fn request_profile(&self, token: &TokenResult) -> Result<Option<NormalizedIdentity>> {
		if let Some(identity) = self.strategy.local_profile(&self.config.scopes, token) {
			return Ok(Some(identity));
		}

		let descriptor = &self.config.descriptor;
		let quirks = &descriptor.quirks;
		let mut call =
			ProviderCall::new(Endpoint::UserInfo, quirks.profile_method, &descriptor.endpoints.user_info);

		call = match &quirks.profile_auth {
			ProfileAuth::QueryParam { name } => call.param(name, token.access_token.expose()),
			ProfileAuth::Header { scheme } =>
				call.authorization(format!("{scheme} {}", token.access_token.expose())),
		};

		if let Some(name) = &quirks.profile_correlation_param {
			let id = token.correlation_id().ok_or_else(|| ConfigError::MissingCorrelationId {
				provider: self.provider_name().to_owned(),
			})?;

			call = call.param(name, id);
		}
		if let Some(name) = &quirks.profile_client_id_param {
			call = call.param(name, &self.config.client_id);
		}
		for (name, value) in &quirks.profile_extra_params {
			call = call.param(name, value);
		}

		let Some(body) = self.dispatcher().send(call).await? else {
			obs::trace_empty_response(Endpoint::UserInfo, "empty body");

			return Ok(None);
		};
		let profile = parse_profile(&body)?;

		if let Some(fault) = self.strategy.profile_fault(&profile) {
			return Err(self.protocol_error(Endpoint::UserInfo, fault));
		}

		let identity = self.strategy.map_profile(&profile, token).map_err(|e| match e {
			ProfileMapError::Malformed(source) =>
				ResponseError::Malformed { endpoint: Endpoint::UserInfo, source },
			ProfileMapError::MissingField(field) =>
				ResponseError::MissingField { endpoint: Endpoint::UserInfo, field },
		})?;

		Ok(Some(identity))
	}
}

fn parse_profile(body: &str) -> Result<JsonValue, ResponseError> {
	let json = payload::unwrap_jsonp(body).unwrap_or(body);
	let mut deserializer = serde_json::Deserializer::from_str(json);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| ResponseError::Malformed { endpoint: Endpoint::UserInfo, source })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn profile_bodies_accept_jsonp() {
		let value = parse_profile("callback( {\"ret\":0,\"nickname\":\"Peter\"} );")
			.expect("JSONP profile should parse.");

		assert_eq!(value["nickname"], "Peter");
	}

	#[test]
	fn malformed_profile_is_a_response_error() {
		let err = parse_profile("<html>502</html>").expect_err("HTML is not a profile.");

		assert!(matches!(err, ResponseError::Malformed { endpoint: Endpoint::UserInfo, .. }));
	}
}
