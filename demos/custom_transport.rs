//! Demonstrates plugging a custom HTTP client and mapper into [`LoginBroker`].
//!
//! 1. Implement [`ProviderHttpClient`] so the transport records [`ResponseMetadata`] via the
//!    provided [`ResponseMetadataSlot`].
//! 2. Provide a [`TransportErrorMapper`] that understands both the transport error type and the
//!    captured metadata.
//! 3. Pass both to [`LoginBroker::with_http_client`].
//!
//! The mock transport answers the QQ token, `openid` lookup, and profile calls without touching
//! the network.

// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	future::Future,
	pin::Pin,
	sync::Arc,
};
// crates.io
use color_eyre::Result;
use url::Url;
// self
use social_oauth2_broker::{
	error::{Error, TransportError},
	flows::{LoginBroker, LoginOutcome},
	http::{ProviderHttpClient, ResponseMetadata, ResponseMetadataSlot},
	oauth::{
		TransportErrorMapper,
		oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse},
	},
	provider::{Endpoint, ProviderConfig, ProviderKind},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let kind = ProviderKind::Qq;
	let config = ProviderConfig::new(kind.descriptor()?, "100330589", "demo-secret")?;
	let mapper = Arc::new(MockTransportErrorMapper);
	let broker: LoginBroker<MockHttpClient, MockTransportErrorMapper> =
		LoginBroker::with_http_client(
			config.clone(),
			kind.strategy(),
			MockHttpClient::default(),
			Arc::clone(&mapper),
		);
	let return_url = Url::parse("https://app.example.com/login/callback?__provider__=qq")?;

	match broker.complete_login(&return_url, "code=mock-code&state=__provider__%3Dqq").await? {
		LoginOutcome::Authenticated { identity, token } => println!(
			"Mock transport signed in {} with openid {:?}.",
			identity.name(),
			token.correlation_id()
		),
		LoginOutcome::Declined(reason) => println!("Mock transport declined the login: {reason}."),
	}

	let failing_broker: LoginBroker<MockHttpClient, MockTransportErrorMapper> =
		LoginBroker::with_http_client(
			config,
			kind.strategy(),
			MockHttpClient::transport_error(MockTransportError::DnsFailure { host: "graph.qq.com" }),
			mapper,
		);

	match failing_broker.complete_login(&return_url, "code=mock-code").await {
		Ok(_) => println!("Mock transport unexpectedly succeeded."),
		Err(e) => println!("Transport error mapped by the broker: {e}."),
	}

	Ok(())
}

#[derive(Clone, Debug)]
enum MockTransportError {
	DnsFailure { host: &'static str },
}
impl Display for MockTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::DnsFailure { host } => write!(f, "DNS lookup failed for {host}"),
		}
	}
}
impl StdError for MockTransportError {}

#[derive(Clone, Default)]
struct MockHttpClient {
	failure: Option<MockTransportError>,
}
impl MockHttpClient {
	fn transport_error(error: MockTransportError) -> Self {
		Self { failure: Some(error) }
	}
}
impl ProviderHttpClient for MockHttpClient {
	type Handle = MockHttpHandle;
	type TransportError = MockTransportError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		MockHttpHandle { slot, failure: self.failure.clone() }
	}
}

struct MockHttpHandle {
	slot: ResponseMetadataSlot,
	failure: Option<MockTransportError>,
}
impl<'a> AsyncHttpClient<'a> for MockHttpHandle {
	type Error = HttpClientError<MockTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>>;

	fn call(&'a self, request: HttpRequest) -> Self::Future {
		let slot = self.slot.clone();
		let failure = self.failure.clone();
		let path = request.uri().path().to_owned();

		Box::pin(async move {
			slot.take();

			if let Some(error) = failure {
				slot.store(ResponseMetadata { status: None, retry_after: None });

				// `HttpClientError::Reqwest` carries any boxed transport error.
				return Err(HttpClientError::Reqwest(Box::new(error)));
			}

			let body: &[u8] = match path.as_str() {
				"/oauth2.0/token" => b"access_token=mock-access&expires_in=7776000",
				"/oauth2.0/me" =>
					b"callback( {\"client_id\":\"100330589\",\"openid\":\"MOCKOPENID\"} );",
				"/user/get_user_info" => b"{\"ret\":0,\"msg\":\"\",\"nickname\":\"mock user\"}",
				_ => b"",
			};

			slot.store(ResponseMetadata { status: Some(200), retry_after: None });

			Ok(HttpResponse::new(body.to_vec()))
		})
	}
}

#[derive(Clone, Default)]
struct MockTransportErrorMapper;
impl TransportErrorMapper<MockTransportError> for MockTransportErrorMapper {
	fn map_transport_error(
		&self,
		endpoint: Endpoint,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<MockTransportError>,
	) -> Error {
		let status = metadata.and_then(|meta| meta.status);

		match error {
			HttpClientError::Reqwest(inner) => TransportError::network(endpoint, *inner).into(),
			HttpClientError::Other(message) => TransportError::Other { endpoint, message }.into(),
			_ => TransportError::Other {
				endpoint,
				message: format!("mock transport failed (status {status:?})"),
			}
			.into(),
		}
	}
}
