//! End-to-end callback handling.
//!
//! [`LoginBroker::complete_login`] is the single entry point a hosting authentication pipeline
//! needs once the provider redirects back: it reads the callback query, exchanges the code, and
//! fetches the profile. Soft failures come back as [`LoginOutcome::Declined`] so the caller can
//! tell "the provider sent nothing" apart from a hard error.

// std
use std::task::Poll;
// crates.io
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{NormalizedIdentity, TokenResult},
	flows::LoginBroker,
	http::ProviderHttpClient,
	oauth::TransportErrorMapper,
	obs::{self, LoginStep, StepOutcome, StepSpan},
	provider::Endpoint,
};

/// Parameters a provider appends to the return URL.
///
/// Empty values are treated as absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackParams {
	/// Authorization code.
	pub code: Option<String>,
	/// Echoed `state`.
	pub state: Option<String>,
	/// Error code sent instead of a code, e.g. `access_denied`.
	pub error: Option<String>,
	/// Human-readable companion to `error`.
	pub error_description: Option<String>,
}
impl CallbackParams {
	/// Parses a raw query string, with or without the leading `?`.
	pub fn from_query(query: &str) -> Self {
		let query = query.strip_prefix('?').unwrap_or(query);
		let mut params = Self::default();

		for (key, value) in form_urlencoded::parse(query.as_bytes()) {
			if value.is_empty() {
				continue;
			}

			let slot = match key.as_ref() {
				"code" => &mut params.code,
				"state" => &mut params.state,
				"error" => &mut params.error,
				"error_description" => &mut params.error_description,
				_ => continue,
			};

			// First occurrence wins.
			if slot.is_none() {
				*slot = Some(value.into_owned());
			}
		}

		params
	}

	/// Parses the query of a full callback URL.
	pub fn from_url(url: &Url) -> Self {
		Self::from_query(url.query().unwrap_or_default())
	}
}

/// Result of a completed callback.
#[derive(Clone, Debug)]
pub enum LoginOutcome {
	/// The user is known to the provider.
	Authenticated {
		/// Normalized profile.
		identity: NormalizedIdentity,
		/// Token used to fetch it.
		token: TokenResult,
	},
	/// No identity could be established; see [`LoginDecline`].
	Declined(LoginDecline),
}
impl LoginOutcome {
	/// Returns the identity when the login succeeded.
	pub fn identity(&self) -> Option<&NormalizedIdentity> {
		match self {
			Self::Authenticated { identity, .. } => Some(identity),
			Self::Declined(_) => None,
		}
	}

	/// Returns `true` for [`LoginOutcome::Authenticated`].
	pub fn is_authenticated(&self) -> bool {
		matches!(self, Self::Authenticated { .. })
	}
}

/// Why a callback produced no identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginDecline {
	/// The provider redirected back with `error` (the user refused consent, for example).
	ProviderDenied {
		/// Provider error code.
		error: String,
		/// Optional description.
		description: Option<String>,
	},
	/// The callback carried neither `code` nor `error`.
	MissingCode,
	/// The token endpoint answered without a usable token.
	NoToken,
	/// The profile endpoint answered with an empty body.
	NoProfile,
}
impl LoginDecline {
	/// Returns a stable label for logs.
	pub const fn as_str(&self) -> &'static str {
		match self {
			Self::ProviderDenied { .. } => "provider_denied",
			Self::MissingCode => "missing_code",
			Self::NoToken => "no_token",
			Self::NoProfile => "no_profile",
		}
	}
}
impl Display for LoginDecline {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

impl<C, M> LoginBroker<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Finishes a login from the provider's callback query.
	///
	/// `return_url` must be the URL originally passed to [`LoginBroker::build_login_url`].
	pub async fn complete_login(
		&self,
		return_url: &Url,
		callback_query: &str,
	) -> Result<LoginOutcome> {
		const STEP: LoginStep = LoginStep::CompleteLogin;

		let provider = self.provider_name();
		let span = StepSpan::new(provider, STEP);

		obs::record_step_outcome(provider, STEP, StepOutcome::Attempt);

		let result = span.instrument(self.run_callback(return_url, callback_query)).await;

		obs::record_step_outcome(provider, STEP, match &result {
			Ok(LoginOutcome::Authenticated { .. }) => StepOutcome::Success,
			Ok(LoginOutcome::Declined(_)) => StepOutcome::Empty,
			Err(_) => StepOutcome::Failure,
		});

		result
	}

	/// Same as [`LoginBroker::complete_login`], abandoned as soon as `cancel` resolves.
	///
	/// The in-flight provider call is dropped and [`Error::Cancelled`] is returned. `cancel` is
	/// polled first, so an already-resolved signal wins over a ready login.
	pub async fn complete_login_until<F>(
		&self,
		return_url: &Url,
		callback_query: &str,
		cancel: F,
	) -> Result<LoginOutcome>
	where
		F: Future,
	{
		let mut login = std::pin::pin!(self.complete_login(return_url, callback_query));
		let mut cancel = std::pin::pin!(cancel);
		// `complete_login` records its own attempt on first poll.
		let mut started = false;

		std::future::poll_fn(|cx| {
			if cancel.as_mut().poll(cx).is_ready() {
				let provider = self.provider_name();

				if !started {
					obs::record_step_outcome(
						provider,
						LoginStep::CompleteLogin,
						StepOutcome::Attempt,
					);
				}

				obs::record_step_outcome(provider, LoginStep::CompleteLogin, StepOutcome::Failure);
				obs::trace_login_cancelled(provider, started);

				return Poll::Ready(Err(Error::Cancelled));
			}

			started = true;

			login.as_mut().poll(cx)
		})
		.await
	}

	async fn run_callback(&self, return_url: &Url, callback_query: &str) -> Result<LoginOutcome> {
		let params = CallbackParams::from_query(callback_query);

		if let Some(error) = params.error {
			return Ok(declined(LoginDecline::ProviderDenied {
				error,
				description: params.error_description,
			}));
		}

		let Some(code) = params.code else {
			return Ok(declined(LoginDecline::MissingCode));
		};
		let token = match self.exchange_code(return_url, &code).await {
			Ok(Some(token)) => token,
			Ok(None) => return Ok(declined(LoginDecline::NoToken)),
			Err(e) => {
				obs::trace_call_failure(Endpoint::Token, &e);

				return Err(e);
			},
		};

		match self.fetch_profile(&token).await {
			Ok(Some(identity)) => Ok(LoginOutcome::Authenticated { identity, token }),
			Ok(None) => Ok(declined(LoginDecline::NoProfile)),
			Err(e) => {
				obs::trace_call_failure(Endpoint::UserInfo, &e);

				Err(e)
			},
		}
	}
}

fn declined(reason: LoginDecline) -> LoginOutcome {
	obs::trace_login_declined(reason.as_str());

	LoginOutcome::Declined(reason)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn callback_params_read_known_keys() {
		let params = CallbackParams::from_query(
			"?code=0a1b2c&state=__provider__%3Dweibo%26sid%3D42&code=ignored&extra=1",
		);

		assert_eq!(params.code.as_deref(), Some("0a1b2c"));
		assert_eq!(params.state.as_deref(), Some("__provider__=weibo&sid=42"));
		assert_eq!(params.error, None);
	}

	#[test]
	fn empty_values_count_as_absent() {
		let params = CallbackParams::from_url(
			&Url::parse(
				"https://app.example.com/cb?code=&error=access_denied&error_description=user+refused",
			)
			.expect("Callback URL should parse."),
		);

		assert_eq!(params.code, None);
		assert_eq!(params.error.as_deref(), Some("access_denied"));
		assert_eq!(params.error_description.as_deref(), Some("user refused"));
	}

	#[test]
	fn decline_labels_are_stable() {
		assert_eq!(LoginDecline::NoProfile.to_string(), "no_profile");
		assert_eq!(
			LoginDecline::ProviderDenied { error: "access_denied".into(), description: None }
				.as_str(),
			"provider_denied"
		);
	}

	#[cfg(all(feature = "metrics", feature = "reqwest"))]
	#[test]
	fn cancellation_before_the_first_poll_still_records_an_attempt() {
		// std
		use std::task::{Context, Waker};
		// self
		use crate::{flows::ReqwestLoginBroker, provider::ProviderKind};

		let recorder = OutcomeRecorder::default();
		let broker = ReqwestLoginBroker::for_provider(ProviderKind::Weibo, "3849613291", "s3cr3t")
			.expect("Broker should build.");
		let return_url =
			Url::parse("https://app.example.com/login/callback").expect("Return URL should parse.");
		let polled = metrics::with_local_recorder(&recorder, || {
			let mut login = std::pin::pin!(broker.complete_login_until(
				&return_url,
				"code=CODE",
				std::future::ready(()),
			));

			login.as_mut().poll(&mut Context::from_waker(Waker::noop()))
		});

		assert!(matches!(polled, Poll::Ready(Err(Error::Cancelled))));
		assert_eq!(recorder.outcomes(), ["attempt", "failure"]);
	}

	#[cfg(all(feature = "metrics", feature = "reqwest"))]
	#[derive(Clone, Default)]
	struct OutcomeRecorder(Arc<Mutex<Vec<String>>>);
	#[cfg(all(feature = "metrics", feature = "reqwest"))]
	impl OutcomeRecorder {
		fn outcomes(&self) -> Vec<String> {
			self.0.lock().clone()
		}
	}
	#[cfg(all(feature = "metrics", feature = "reqwest"))]
	impl metrics::Recorder for OutcomeRecorder {
		fn describe_counter(
			&self,
			_: metrics::KeyName,
			_: Option<metrics::Unit>,
			_: metrics::SharedString,
		) {
		}

		fn describe_gauge(
			&self,
			_: metrics::KeyName,
			_: Option<metrics::Unit>,
			_: metrics::SharedString,
		) {
		}

		fn describe_histogram(
			&self,
			_: metrics::KeyName,
			_: Option<metrics::Unit>,
			_: metrics::SharedString,
		) {
		}

		fn register_counter(
			&self,
			key: &metrics::Key,
			_: &metrics::Metadata<'_>,
		) -> metrics::Counter {
			let outcome = key
				.labels()
				.find(|label| label.key() == "outcome")
				.map(|label| label.value().to_owned())
				.unwrap_or_default();

			metrics::Counter::from_arc(Arc::new(OutcomeCounter { outcome, seen: self.0.clone() }))
		}

		fn register_gauge(&self, _: &metrics::Key, _: &metrics::Metadata<'_>) -> metrics::Gauge {
			metrics::Gauge::noop()
		}

		fn register_histogram(
			&self,
			_: &metrics::Key,
			_: &metrics::Metadata<'_>,
		) -> metrics::Histogram {
			metrics::Histogram::noop()
		}
	}

	#[cfg(all(feature = "metrics", feature = "reqwest"))]
	struct OutcomeCounter {
		outcome: String,
		seen: Arc<Mutex<Vec<String>>>,
	}
	#[cfg(all(feature = "metrics", feature = "reqwest"))]
	impl metrics::CounterFn for OutcomeCounter {
		fn increment(&self, _: u64) {
			self.seen.lock().push(self.outcome.clone());
		}

		fn absolute(&self, _: u64) {}
	}
}
