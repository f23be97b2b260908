//! Provider call dispatch shared by every flow.
//!
//! Flows describe a call as a [`ProviderCall`] (endpoint, verb, parameters, optional
//! `Authorization` header); [`Dispatcher`] turns it into an [`HttpRequest`], runs it through the
//! configured [`ProviderHttpClient`], and folds transport failures and non-2xx statuses into the
//! broker taxonomy.

pub use oauth2;

// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest,
	http::{Method, Request, header},
};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
	http::{ProviderHttpClient, ResponseMetadata, ResponseMetadataSlot},
	provider::{Endpoint, HttpMethod},
};

const BODY_PREVIEW_LIMIT: usize = 256;

/// Maps HTTP transport failures into broker [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a broker error.
	fn map_transport_error(
		&self,
		endpoint: Endpoint,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		endpoint: Endpoint,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(endpoint, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => TransportError::Other { endpoint, message }.into(),
			_ => TransportError::Other {
				endpoint,
				message: match meta.and_then(|meta| meta.status) {
					Some(status) => format!("unrecognized transport failure after HTTP {status}"),
					None => "unrecognized transport failure".into(),
				},
			}
			.into(),
		}
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(endpoint: Endpoint, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return TransportError::Timeout { endpoint }.into();
	}

	TransportError::network(endpoint, err).into()
}

/// Single provider request, described independently of any HTTP stack.
#[derive(Clone, Debug)]
pub(crate) struct ProviderCall<'a> {
	pub(crate) endpoint: Endpoint,
	pub(crate) method: HttpMethod,
	pub(crate) url: &'a Url,
	pub(crate) params: Vec<(&'a str, &'a str)>,
	pub(crate) authorization: Option<String>,
}
impl<'a> ProviderCall<'a> {
	pub(crate) fn new(endpoint: Endpoint, method: HttpMethod, url: &'a Url) -> Self {
		Self { endpoint, method, url, params: Vec::new(), authorization: None }
	}

	pub(crate) fn param(mut self, name: &'a str, value: &'a str) -> Self {
		self.params.push((name, value));

		self
	}

	pub(crate) fn authorization(mut self, value: String) -> Self {
		self.authorization = Some(value);

		self
	}

	/// Builds the transport-neutral request. `GET` calls append parameters to the query string;
	/// `POST` calls send them as a form body.
	pub(crate) fn into_request(self) -> Result<HttpRequest> {
		let mut url = self.url.clone();
		let mut builder = Request::builder().header(header::ACCEPT, "application/json, */*");
		let body = match self.method {
			HttpMethod::Get => {
				if !self.params.is_empty() {
					url.query_pairs_mut().extend_pairs(&self.params);
				}

				builder = builder.method(Method::GET);

				Vec::new()
			},
			HttpMethod::Post => {
				builder = builder
					.method(Method::POST)
					.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");

				form_urlencoded::Serializer::new(String::new())
					.extend_pairs(&self.params)
					.finish()
					.into_bytes()
			},
		};

		if let Some(value) = self.authorization {
			builder = builder.header(header::AUTHORIZATION, value);
		}

		builder.uri(url.as_str()).body(body).map_err(|e| ConfigError::from(e).into())
	}
}

/// Runs [`ProviderCall`]s through a transport and its error mapper.
pub(crate) struct Dispatcher<'a, C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) http_client: &'a C,
	pub(crate) transport_mapper: &'a M,
}
impl<C, M> Dispatcher<'_, C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Sends the call and returns the trimmed body, or `None` when the provider sent nothing.
	///
	/// Non-2xx statuses become [`TransportError::HttpStatus`] carrying a body preview.
	pub(crate) async fn send(&self, call: ProviderCall<'_>) -> Result<Option<String>> {
		let endpoint = call.endpoint;
		let request = call.into_request()?;
		let slot = ResponseMetadataSlot::default();
		let handle = self.http_client.with_metadata(slot.clone());
		let response = handle.call(request).await.map_err(|e| {
			self.transport_mapper.map_transport_error(endpoint, slot.take().as_ref(), e)
		})?;
		let status = response.status();
		let meta = slot.take();
		let body = String::from_utf8_lossy(response.body());
		let body = body.trim();

		if !status.is_success() {
			return Err(TransportError::HttpStatus {
				endpoint,
				status: status.as_u16(),
				retry_after: meta.and_then(|meta| meta.retry_after),
				body_preview: body_preview(body),
			}
			.into());
		}

		Ok((!body.is_empty()).then(|| body.to_owned()))
	}
}

fn body_preview(body: &str) -> Option<String> {
	if body.is_empty() {
		return None;
	}
	if body.chars().count() <= BODY_PREVIEW_LIMIT {
		return Some(body.to_owned());
	}

	let mut buf = body.chars().take(BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	Some(buf)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(raw: &str) -> Url {
		Url::parse(raw).expect("Test URL should parse.")
	}

	#[test]
	fn get_calls_extend_the_query() {
		let endpoint = url("https://eco.taobao.com/router/rest?v=2.0");
		let request = ProviderCall::new(Endpoint::UserInfo, HttpMethod::Get, &endpoint)
			.param("access_token", "a b")
			.param("format", "json")
			.into_request()
			.expect("GET request should build.");

		assert_eq!(request.method(), Method::GET);
		assert_eq!(
			request.uri().to_string(),
			"https://eco.taobao.com/router/rest?v=2.0&access_token=a+b&format=json"
		);
		assert!(request.body().is_empty());
	}

	#[test]
	fn post_calls_send_a_form_body() {
		let endpoint = url("https://graph.qq.com/oauth2.0/me");
		let request = ProviderCall::new(Endpoint::Correlation, HttpMethod::Post, &endpoint)
			.param("access_token", "FE04")
			.authorization("Bearer FE04".into())
			.into_request()
			.expect("POST request should build.");

		assert_eq!(request.method(), Method::POST);
		assert_eq!(request.body().as_slice(), b"access_token=FE04");
		assert_eq!(
			request.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
			Some("application/x-www-form-urlencoded")
		);
		assert_eq!(
			request.headers().get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()),
			Some("Bearer FE04")
		);
	}

	#[test]
	fn body_preview_truncates_long_bodies() {
		let long = "x".repeat(BODY_PREVIEW_LIMIT + 10);
		let preview = body_preview(&long).expect("Non-empty bodies have a preview.");

		assert_eq!(preview.chars().count(), BODY_PREVIEW_LIMIT + 1);
		assert!(preview.ends_with('…'));
		assert_eq!(body_preview(""), None);
	}
}
