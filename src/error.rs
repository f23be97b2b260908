//! Broker-level error types shared across flows, providers, and transports.

// self
use crate::{_prelude::*, provider::Endpoint};

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
///
/// Empty provider responses are not errors; flows report them as `None` so callers can tell
/// "nothing came back" apart from "the provider said no".
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout, non-2xx status).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Provider reported an application-level error inside a successful HTTP response.
	#[error(transparent)]
	Protocol(#[from] ProtocolError),
	/// Provider response could not be decoded into the expected shape.
	#[error(transparent)]
	Response(#[from] ResponseError),

	/// Caller-supplied cancellation resolved before the login attempt finished.
	#[error("Login attempt was cancelled by the caller.")]
	Cancelled,
}

/// Configuration and validation failures raised by the broker.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Provider descriptor failed validation.
	#[error(transparent)]
	InvalidDescriptor(#[from] crate::provider::ProviderDescriptorError),
	/// Client identifier is missing or malformed.
	#[error("Client identifier is invalid.")]
	InvalidClientId(#[from] crate::auth::IdentifierError),
	/// Client secret is empty or whitespace only.
	#[error("Client secret cannot be empty.")]
	EmptyClientSecret,
	/// Requested scopes cannot be normalized or are empty.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// Return URL is not an absolute HTTP(S) URL.
	#[error("Return URL must be an absolute http(s) URL: {url}.")]
	InvalidReturnUrl {
		/// Offending URL as supplied by the caller.
		url: String,
	},
	/// Profile endpoint requires a correlation identifier that the token result lacks.
	#[error("Provider `{provider}` requires a correlation identifier for the profile call.")]
	MissingCorrelationId {
		/// Provider identifier string.
		provider: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, HTTP status).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the {endpoint} endpoint.")]
	Network {
		/// Endpoint being called.
		endpoint: Endpoint,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling a provider endpoint.")]
	Io(#[from] std::io::Error),
	/// Request exceeded the configured timeout.
	#[error("Request to the {endpoint} endpoint timed out.")]
	Timeout {
		/// Endpoint being called.
		endpoint: Endpoint,
	},
	/// Provider answered with a non-success HTTP status.
	#[error("The {endpoint} endpoint returned HTTP {status}.")]
	HttpStatus {
		/// Endpoint being called.
		endpoint: Endpoint,
		/// HTTP status code.
		status: u16,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
		/// Truncated response body for diagnostics.
		body_preview: Option<String>,
	},
	/// Transport reported a failure that carries no structured error.
	#[error("HTTP client error occurred while calling the {endpoint} endpoint: {message}.")]
	Other {
		/// Endpoint being called.
		endpoint: Endpoint,
		/// Transport-supplied message.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(endpoint: Endpoint, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { endpoint, source: Box::new(src) }
	}

	/// HTTP status code associated with the failure, when one was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::HttpStatus { status, .. } => Some(*status),
			_ => None,
		}
	}
}

/// Application-level error reported by a provider inside an HTTP 2xx response.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Provider `{provider}` rejected the {endpoint} call with code {code}.")]
pub struct ProtocolError {
	/// Provider identifier string.
	pub provider: String,
	/// Endpoint that produced the error payload.
	pub endpoint: Endpoint,
	/// Provider error code (`errcode`, `error`, `status`, ...), rendered as a string.
	pub code: String,
	/// Human-readable message, when the provider supplied one.
	pub message: Option<String>,
}

/// Response decoding failures.
#[derive(Debug, ThisError)]
pub enum ResponseError {
	/// Response body is not valid JSON or does not match the expected shape.
	#[error("The {endpoint} endpoint returned a malformed payload.")]
	Malformed {
		/// Endpoint that produced the payload.
		endpoint: Endpoint,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Response is well-formed but lacks a field the identity mapping needs.
	#[error("The {endpoint} endpoint response is missing `{field}`.")]
	MissingField {
		/// Endpoint that produced the payload.
		endpoint: Endpoint,
		/// Missing field name.
		field: &'static str,
	},
}
