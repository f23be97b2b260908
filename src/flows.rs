//! Login flow orchestrators powered by one provider-agnostic engine.
//!
//! [`LoginBroker`] owns a validated [`ProviderConfig`], the provider's [`ProviderStrategy`], and
//! the transport pair. Each step of the authorization-code login lives in its own module:
//! `login_url` (redirect construction), `token_exchange` (code for token, plus correlation
//! lookup), `profile` (identity retrieval), and `callback` (the end-to-end helper).

pub mod callback;
pub mod login_url;

mod profile;
mod token_exchange;

pub use callback::*;
pub use login_url::*;

// self
use crate::{
	_prelude::*,
	error::ProtocolError,
	http::ProviderHttpClient,
	oauth::{Dispatcher, TransportErrorMapper},
	obs,
	provider::{Endpoint, ProviderConfig, ProviderFault, ProviderStrategy},
};
#[cfg(feature = "reqwest")]
use crate::{
	error::ConfigError,
	http::ReqwestHttpClient,
	oauth::ReqwestTransportErrorMapper,
	provider::{ProviderKind, ProviderSettings},
};

#[cfg(feature = "reqwest")]
/// Broker specialized for the crate's default reqwest transport stack.
pub type ReqwestLoginBroker = LoginBroker<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Runs the OAuth 2.0 authorization-code login against a single provider.
///
/// The broker holds only immutable state behind `Arc`s, so one instance can serve any number of
/// concurrent login attempts. Nothing about an attempt is stored between calls; the caller
/// carries the return URL, code, and [`TokenResult`](crate::auth::TokenResult) from step to
/// step.
#[derive(Clone)]
pub struct LoginBroker<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound provider request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Validated registration with the provider.
	pub config: ProviderConfig,
	/// Strategy that interprets the provider's payloads.
	pub strategy: Arc<dyn ProviderStrategy>,
}
impl<C, M> LoginBroker<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a broker that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		config: ProviderConfig,
		strategy: Arc<dyn ProviderStrategy>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self { http_client: http_client.into(), transport_mapper: mapper.into(), config, strategy }
	}

	/// Provider identifier used in errors, spans, and metric labels.
	pub fn provider_name(&self) -> &str {
		self.config.provider_name()
	}

	pub(crate) fn dispatcher(&self) -> Dispatcher<'_, C, M> {
		Dispatcher {
			http_client: self.http_client.as_ref(),
			transport_mapper: self.transport_mapper.as_ref(),
		}
	}

	pub(crate) fn protocol_error(&self, endpoint: Endpoint, fault: ProviderFault) -> Error {
		obs::trace_provider_fault(endpoint, &fault.code, fault.message.as_deref());

		ProtocolError {
			provider: self.provider_name().to_owned(),
			endpoint,
			code: fault.code,
			message: fault.message,
		}
		.into()
	}
}
#[cfg(feature = "reqwest")]
impl LoginBroker<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a broker backed by a fresh reqwest client (10 s timeout, no redirects).
	pub fn new(config: ProviderConfig, strategy: Arc<dyn ProviderStrategy>) -> Result<Self> {
		Ok(Self::with_http_client(
			config,
			strategy,
			ReqwestHttpClient::new()?,
			Arc::new(ReqwestTransportErrorMapper),
		))
	}

	/// Creates a broker for a built-in provider using its default scopes.
	pub fn for_provider(
		kind: ProviderKind,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Result<Self> {
		let descriptor = kind.descriptor().map_err(ConfigError::from)?;
		let config = ProviderConfig::new(descriptor, client_id, client_secret)?;

		Self::new(config, kind.strategy())
	}

	/// Creates a broker from deserialized settings.
	pub fn from_settings(settings: ProviderSettings) -> Result<Self> {
		let strategy = settings.provider.strategy();

		Self::new(settings.into_config()?, strategy)
	}
}
impl<C, M> Debug for LoginBroker<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LoginBroker")
			.field("provider", &self.config.descriptor.id)
			.field("client_id", &self.config.client_id)
			.field("scopes", &self.config.scopes)
			.finish()
	}
}
