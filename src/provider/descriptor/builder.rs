// self
use crate::{
	_prelude::*,
	auth::{IdentifierError, ProviderId, ScopeList, ScopeValidationError},
	provider::{Endpoint, ProviderDescriptor, ProviderEndpoints, ProviderQuirks, TokenCorrelation},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ProviderDescriptorError {
	/// Descriptor identifier failed validation.
	#[error("Descriptor identifier is invalid.")]
	InvalidId(#[source] IdentifierError),
	/// Authorization endpoint is required to build login URLs.
	#[error("Missing authorization endpoint.")]
	MissingAuthorizationEndpoint,
	/// Token endpoint is required for the code exchange.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// Profile endpoint is required to normalize identities.
	#[error("Missing user info endpoint.")]
	MissingUserInfoEndpoint,
	/// Endpoint literal failed to parse.
	#[error("The {endpoint} endpoint is not a valid URL.")]
	InvalidEndpointUrl {
		/// Which endpoint failed to parse.
		endpoint: Endpoint,
		/// Underlying parse error.
		#[source]
		source: url::ParseError,
	},
	/// Endpoints must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: Endpoint,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Reject scope delimiters that are control characters.
	#[error("Scope delimiter must be a printable character.")]
	InvalidScopeDelimiter {
		/// Invalid delimiter that was supplied.
		delimiter: char,
	},
	/// Default scopes failed validation.
	#[error("Default scopes are invalid.")]
	InvalidDefaultScopes(#[source] ScopeValidationError),
	/// Correlation lookup was requested without a correlation endpoint.
	#[error("Correlation lookup requires a correlation endpoint.")]
	LookupWithoutCorrelationEndpoint,
	/// Parameter names declared by quirks must not be empty.
	#[error("Quirk `{quirk}` declares an empty parameter name.")]
	EmptyParameterName {
		/// Offending quirk field.
		quirk: &'static str,
	},
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Identifier for the descriptor being constructed.
	pub id: ProviderId,
	/// Authorization endpoint.
	pub authorization_endpoint: Option<Url>,
	/// Token endpoint.
	pub token_endpoint: Option<Url>,
	/// Profile endpoint.
	pub user_info_endpoint: Option<Url>,
	/// Optional correlation lookup endpoint.
	pub correlation_endpoint: Option<Url>,
	/// Raw default scopes, validated on build.
	pub default_scopes: Vec<String>,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder seeded with the provided identifier.
	pub fn new(id: ProviderId) -> Self {
		Self {
			id,
			authorization_endpoint: None,
			token_endpoint: None,
			user_info_endpoint: None,
			correlation_endpoint: None,
			default_scopes: Vec::new(),
			quirks: ProviderQuirks::default(),
		}
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the profile endpoint.
	pub fn user_info_endpoint(mut self, url: Url) -> Self {
		self.user_info_endpoint = Some(url);

		self
	}

	/// Sets the correlation lookup endpoint.
	pub fn correlation_endpoint(mut self, url: Url) -> Self {
		self.correlation_endpoint = Some(url);

		self
	}

	/// Sets the scopes requested when callers do not override them.
	pub fn default_scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.default_scopes = scopes.into_iter().map(Into::into).collect();

		self
	}

	/// Overrides the provider quirks.
	pub fn quirks(mut self, quirks: ProviderQuirks) -> Self {
		self.quirks = quirks;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let authorization = self
			.authorization_endpoint
			.ok_or(ProviderDescriptorError::MissingAuthorizationEndpoint)?;
		let token = self.token_endpoint.ok_or(ProviderDescriptorError::MissingTokenEndpoint)?;
		let user_info =
			self.user_info_endpoint.ok_or(ProviderDescriptorError::MissingUserInfoEndpoint)?;
		let endpoints =
			ProviderEndpoints { authorization, token, user_info, correlation: self.correlation_endpoint };
		let default_scopes = ScopeList::new(self.default_scopes)
			.map_err(ProviderDescriptorError::InvalidDefaultScopes)?;
		let descriptor =
			ProviderDescriptor { id: self.id, endpoints, default_scopes, quirks: self.quirks };

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ProviderDescriptorError> {
		validate_endpoint(Endpoint::Authorization, &self.endpoints.authorization)?;
		validate_endpoint(Endpoint::Token, &self.endpoints.token)?;
		validate_endpoint(Endpoint::UserInfo, &self.endpoints.user_info)?;

		match self.endpoints.correlation.as_ref() {
			Some(correlation) => validate_endpoint(Endpoint::Correlation, correlation)?,
			None if self.quirks.token_correlation == TokenCorrelation::Lookup =>
				return Err(ProviderDescriptorError::LookupWithoutCorrelationEndpoint),
			None => {},
		}

		if let Some((quirk, _)) = self.quirks.parameter_names().find(|(_, name)| name.is_empty()) {
			return Err(ProviderDescriptorError::EmptyParameterName { quirk });
		}

		validate_scope_delimiter(self.quirks.scope_delimiter)?;

		Ok(())
	}
}

/// Parses an endpoint literal, tagging failures with the endpoint they belong to.
pub fn parse_endpoint(endpoint: Endpoint, raw: &str) -> Result<Url, ProviderDescriptorError> {
	Url::parse(raw).map_err(|source| ProviderDescriptorError::InvalidEndpointUrl { endpoint, source })
}

fn validate_endpoint(endpoint: Endpoint, url: &Url) -> Result<(), ProviderDescriptorError> {
	if url.scheme() != "https" {
		Err(ProviderDescriptorError::InsecureEndpoint { endpoint, url: url.to_string() })
	} else {
		Ok(())
	}
}

fn validate_scope_delimiter(delimiter: char) -> Result<(), ProviderDescriptorError> {
	if delimiter.is_control() {
		Err(ProviderDescriptorError::InvalidScopeDelimiter { delimiter })
	} else {
		Ok(())
	}
}
