// self
use crate::_prelude::*;

/// HTTP verb used for a provider call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
	/// Parameters travel in the query string.
	Get,
	/// Parameters travel as an `application/x-www-form-urlencoded` body.
	#[default]
	Post,
}

/// Encoding of a successful token response body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenFormat {
	/// `access_token=..&expires_in=..` pairs. JSON and JSONP bodies are still recognized, since
	/// form-encoded providers report failures that way.
	Form,
	/// JSON object.
	#[default]
	Json,
}

/// How the provider user identifier is obtained after a code exchange.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TokenCorrelation {
	/// The provider does not report one.
	#[default]
	None,
	/// Read from the token response at the given JSON pointer (e.g. `/uid`, `/user/id`).
	Field {
		/// JSON pointer into the token response.
		pointer: String,
	},
	/// Resolved by a follow-up call to the descriptor's correlation endpoint.
	Lookup,
}

/// How the access token is presented to the profile endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ProfileAuth {
	/// As a request parameter with the given name.
	QueryParam {
		/// Parameter name, usually `access_token`.
		name: String,
	},
	/// As an `Authorization: <scheme> <token>` header.
	Header {
		/// Authorization scheme, usually `Bearer`.
		scheme: String,
	},
}
impl Default for ProfileAuth {
	fn default() -> Self {
		Self::QueryParam { name: "access_token".into() }
	}
}

/// Provider-specific marker appended to the authorization URL.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum AuthorizeMarker {
	/// URL fragment, e.g. `wechat_redirect`.
	Fragment(String),
	/// Bare query flag appended after the standard parameters.
	QueryFlag(String),
}

/// Provider dialect toggles that influence how flows build requests and read responses.
///
/// Defaults describe a plain RFC 6749 provider: `client_id`/`client_secret`, space-delimited
/// scopes, a JSON token response fetched with `POST`, and an `access_token` query parameter on
/// the profile endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderQuirks {
	/// Parameter carrying the client identifier (`client_id`, or `appid` for WeChat).
	pub client_id_param: String,
	/// Parameter carrying the client secret on the token endpoint.
	pub client_secret_param: String,
	/// Whether the token request repeats `redirect_uri`.
	pub send_redirect_uri_on_token: bool,
	/// Character used to join scopes when constructing `scope` parameters.
	pub scope_delimiter: char,
	/// Marker appended to the authorization URL.
	pub authorize_marker: Option<AuthorizeMarker>,
	/// Verb used for the token request.
	pub token_method: HttpMethod,
	/// Token response encoding.
	pub token_format: TokenFormat,
	/// Source of the provider user identifier.
	pub token_correlation: TokenCorrelation,
	/// Verb used for the correlation lookup.
	pub correlation_method: HttpMethod,
	/// Verb used for the profile request.
	pub profile_method: HttpMethod,
	/// How the access token reaches the profile endpoint.
	pub profile_auth: ProfileAuth,
	/// Parameter that forwards the correlation id to the profile endpoint (`uid`, `openid`).
	pub profile_correlation_param: Option<String>,
	/// Parameter that forwards the client id to the profile endpoint (`oauth_consumer_key`).
	pub profile_client_id_param: Option<String>,
	/// Constant parameters sent with every profile request.
	pub profile_extra_params: Vec<(String, String)>,
}
impl ProviderQuirks {
	/// Returns every parameter name the quirks declare, for validation.
	pub(crate) fn parameter_names(&self) -> impl Iterator<Item = (&'static str, &str)> {
		let profile_auth = match &self.profile_auth {
			ProfileAuth::QueryParam { name } => Some(("profile_auth", name.as_str())),
			ProfileAuth::Header { scheme } => Some(("profile_auth", scheme.as_str())),
		};

		[
			Some(("client_id_param", self.client_id_param.as_str())),
			Some(("client_secret_param", self.client_secret_param.as_str())),
			profile_auth,
			self.profile_correlation_param.as_deref().map(|name| ("profile_correlation_param", name)),
			self.profile_client_id_param.as_deref().map(|name| ("profile_client_id_param", name)),
		]
		.into_iter()
		.flatten()
		.chain(self.profile_extra_params.iter().map(|(name, _)| ("profile_extra_params", name.as_str())))
	}
}
impl Default for ProviderQuirks {
	fn default() -> Self {
		Self {
			client_id_param: "client_id".into(),
			client_secret_param: "client_secret".into(),
			send_redirect_uri_on_token: true,
			scope_delimiter: ' ',
			authorize_marker: None,
			token_method: HttpMethod::Post,
			token_format: TokenFormat::Json,
			token_correlation: TokenCorrelation::None,
			correlation_method: HttpMethod::Post,
			profile_method: HttpMethod::Get,
			profile_auth: ProfileAuth::default(),
			profile_correlation_param: None,
			profile_client_id_param: None,
			profile_extra_params: Vec::new(),
		}
	}
}
