//! Authorization-code exchange and correlation lookup.
//!
//! [`LoginBroker::exchange_code`] trades the callback `code` for a [`TokenResult`]. The request
//! dialect (verb, parameter names, whether `redirect_uri` is repeated) comes from the descriptor
//! quirks, and so does the source of the provider user id: a field of the token response or a
//! follow-up lookup call.

// self
use crate::{
	_prelude::*,
	auth::TokenResult,
	error::{ConfigError, ResponseError},
	flows::{LoginBroker, split_return_url},
	http::ProviderHttpClient,
	oauth::{ProviderCall, TransportErrorMapper},
	obs::{self, LoginStep, StepOutcome, StepSpan},
	provider::{
		Endpoint, TokenCorrelation, TokenFormat,
		payload::{self, value_as_i64, value_as_string},
	},
};

impl<C, M> LoginBroker<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges an authorization code for an access token.
	///
	/// `return_url` must be the URL passed to [`LoginBroker::build_login_url`]; its path-only
	/// form is repeated as `redirect_uri` for providers that check it.
	///
	/// Returns `Ok(None)` when the provider answers with nothing usable: an empty body, a body
	/// that does not parse, or one without an `access_token`. Error payloads inside a 2xx
	/// response surface as [`Error::Protocol`].
	pub async fn exchange_code(&self, return_url: &Url, code: &str) -> Result<Option<TokenResult>> {
		const STEP: LoginStep = LoginStep::TokenExchange;

		let provider = self.provider_name();
		let span = StepSpan::new(provider, STEP);

		obs::record_step_outcome(provider, STEP, StepOutcome::Attempt);

		let result = span.instrument(self.request_token(return_url, code)).await;

		obs::record_step_outcome(provider, STEP, StepOutcome::of(&result));

		result
	}

	async fn request_token(&self, return_url: &Url, code: &str) -> Result<Option<TokenResult>> {
		let descriptor = &self.config.descriptor;
		let quirks = &descriptor.quirks;
		let (redirect_uri, _) = split_return_url(return_url)?;
		let mut call =
			ProviderCall::new(Endpoint::Token, quirks.token_method, &descriptor.endpoints.token)
				.param("grant_type", "authorization_code")
				.param("code", code)
				.param(&quirks.client_id_param, &self.config.client_id)
				.param(&quirks.client_secret_param, self.config.client_secret.expose());

		if quirks.send_redirect_uri_on_token {
			call = call.param("redirect_uri", redirect_uri.as_str());
		}

		let Some(body) = self.dispatcher().send(call).await? else {
			obs::trace_empty_response(Endpoint::Token, "empty body");

			return Ok(None);
		};
		let Some(mut fields) = payload::parse_object(&body, quirks.token_format) else {
			obs::trace_empty_response(Endpoint::Token, "unparseable body");

			return Ok(None);
		};

		if let Some(fault) = self.strategy.token_fault(&fields) {
			return Err(self.protocol_error(Endpoint::Token, fault));
		}

		let Some(access_token) = fields.remove("access_token").as_ref().and_then(value_as_string)
		else {
			obs::trace_empty_response(Endpoint::Token, "missing access_token");

			return Ok(None);
		};
		let correlation_id = match &quirks.token_correlation {
			TokenCorrelation::None => None,
			TokenCorrelation::Field { pointer } => pointer_text(&fields, pointer),
			TokenCorrelation::Lookup => match self.lookup_correlation(&access_token).await? {
				Some(id) => Some(id),
				None => return Ok(None),
			},
		};
		let mut builder = TokenResult::builder().access_token(access_token);

		if let Some(id) = correlation_id {
			builder = builder.correlation_id(id);
		}
		if let Some(secs) = fields.get("expires_in").and_then(value_as_i64) {
			builder = builder.expires_in(Duration::seconds(secs));
		}
		if let Some(refresh) = fields.remove("refresh_token").as_ref().and_then(value_as_string) {
			builder = builder.refresh_token(refresh);
		}

		builder.extra(fields).build().map(Some).map_err(|_| {
			ResponseError::MissingField { endpoint: Endpoint::Token, field: "access_token" }.into()
		})
	}

	/// Resolves the provider user id through the descriptor's correlation endpoint.
	///
	/// The lookup is part of the exchange: when it yields nothing the exchange yields nothing.
	async fn lookup_correlation(&self, access_token: &str) -> Result<Option<String>> {
		const STEP: LoginStep = LoginStep::CorrelationLookup;

		let provider = self.provider_name();
		let span = StepSpan::new(provider, STEP);

		obs::record_step_outcome(provider, STEP, StepOutcome::Attempt);

		let result = span.instrument(self.request_correlation(access_token)).await;

		obs::record_step_outcome(provider, STEP, StepOutcome::of(&result));

		result
	}

	async fn request_correlation(&self, access_token: &str) -> Result<Option<String>> {
		let descriptor = &self.config.descriptor;
		let url = descriptor.endpoints.correlation.as_ref().ok_or_else(|| {
			ConfigError::MissingCorrelationId { provider: self.provider_name().to_owned() }
		})?;
		let call =
			ProviderCall::new(Endpoint::Correlation, descriptor.quirks.correlation_method, url)
				.param("access_token", access_token);
		let Some(body) = self.dispatcher().send(call).await? else {
			obs::trace_empty_response(Endpoint::Correlation, "empty body");

			return Ok(None);
		};
		// Lookup endpoints answer in JSON or JSONP regardless of the token format.
		let Some(fields) = payload::parse_object(&body, TokenFormat::Json) else {
			obs::trace_empty_response(Endpoint::Correlation, "unparseable body");

			return Ok(None);
		};

		if let Some(fault) = self.strategy.token_fault(&fields) {
			return Err(self.protocol_error(Endpoint::Correlation, fault));
		}

		let id = self.strategy.correlation_from_lookup(&fields);

		if id.is_none() {
			obs::trace_empty_response(Endpoint::Correlation, "missing identifier");
		}

		Ok(id)
	}
}

/// Reads a string or number at an RFC 6901 pointer inside a JSON object.
fn pointer_text(fields: &JsonMap<String, JsonValue>, pointer: &str) -> Option<String> {
	let mut segments =
		pointer.strip_prefix('/')?.split('/').map(|s| s.replace("~1", "/").replace("~0", "~"));
	let first = segments.next()?;
	let mut current = fields.get(&first)?;

	for segment in segments {
		current = match current {
			JsonValue::Object(map) => map.get(&segment)?,
			JsonValue::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
			_ => return None,
		};
	}

	value_as_string(current)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn object(raw: &str) -> JsonMap<String, JsonValue> {
		serde_json::from_str(raw).expect("Fixture should be a JSON object.")
	}

	#[test]
	fn pointer_text_walks_nested_objects() {
		let fields = object("{\"user\":{\"id\":327864940,\"name\":\"王小明\"},\"uid\":\"U\"}");

		assert_eq!(pointer_text(&fields, "/user/id").as_deref(), Some("327864940"));
		assert_eq!(pointer_text(&fields, "/uid").as_deref(), Some("U"));
		assert_eq!(pointer_text(&fields, "/user/missing"), None);
		assert_eq!(pointer_text(&fields, "uid"), None);
	}
}
