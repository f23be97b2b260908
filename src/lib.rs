//! Social login for Chinese identity providers: one OAuth 2.0 authorization-code engine,
//! per-provider dialects expressed as data, and transport-aware observability.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
#[cfg(feature = "reqwest")]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for unit and integration tests.

	pub use crate::_prelude::*;

	// self
	use crate::{
		flows::LoginBroker,
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		provider::{ProviderConfig, ProviderDescriptor, ProviderKind},
	};

	/// Broker type alias used by reqwest-backed integration tests.
	pub type ReqwestTestBroker = LoginBroker<ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(reqwest::redirect::Policy::none())
			.timeout(std::time::Duration::from_secs(5))
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Re-targets every endpoint of `descriptor` at `base` while keeping the provider's paths.
	///
	/// The catalog pins real provider hosts, so tests swap the origin for the mock server's.
	pub fn rebase_descriptor(mut descriptor: ProviderDescriptor, base: &str) -> ProviderDescriptor {
		let base = Url::parse(base).expect("Mock server base URL should parse successfully.");
		let rebase = |endpoint: &Url| {
			let mut url = base.join(endpoint.path()).expect("Endpoint path should join cleanly.");

			url.set_query(endpoint.query());

			url
		};

		descriptor.endpoints.authorization = rebase(&descriptor.endpoints.authorization);
		descriptor.endpoints.token = rebase(&descriptor.endpoints.token);
		descriptor.endpoints.user_info = rebase(&descriptor.endpoints.user_info);
		descriptor.endpoints.correlation = descriptor.endpoints.correlation.as_ref().map(rebase);

		descriptor
	}

	/// Constructs a [`LoginBroker`] for a catalog provider whose endpoints point at `base`.
	pub fn build_reqwest_test_broker(
		kind: ProviderKind,
		base: &str,
		client_id: &str,
		client_secret: &str,
	) -> ReqwestTestBroker {
		build_reqwest_test_broker_with_scopes(kind, base, client_id, client_secret, None)
	}

	/// Same as [`build_reqwest_test_broker`] but overrides the requested scopes.
	pub fn build_reqwest_test_broker_with_scopes(
		kind: ProviderKind,
		base: &str,
		client_id: &str,
		client_secret: &str,
		scopes: Option<&[&str]>,
	) -> ReqwestTestBroker {
		let descriptor = rebase_descriptor(
			kind.descriptor().expect("Catalog descriptor should build successfully."),
			base,
		);
		let mut builder = ProviderConfig::builder(descriptor)
			.client_id(client_id)
			.client_secret(client_secret);

		if let Some(scopes) = scopes {
			builder = builder.scopes(scopes.iter().copied());
		}

		let config = builder.build().expect("Test provider configuration should build.");

		LoginBroker::with_http_client(
			config,
			kind.strategy(),
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map as JsonMap, Value as JsonValue};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _, tokio as _};
