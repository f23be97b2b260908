//! Client registrations bound to provider descriptors.

// self
use crate::{
	_prelude::*,
	auth::{ClientId, ClientSecret, ScopeList, ScopeValidationError},
	error::ConfigError,
	provider::{ProviderDescriptor, ProviderKind},
};

/// Immutable registration of this application with one provider.
///
/// Holds the descriptor, the app id and secret issued by the provider, and the scopes requested
/// on every login. Validated once at construction; flows never re-check it.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
	/// Descriptor describing the provider.
	pub descriptor: ProviderDescriptor,
	/// App id issued by the provider.
	pub client_id: ClientId,
	/// App secret issued by the provider.
	pub client_secret: ClientSecret,
	/// Scopes requested during login, in request order.
	pub scopes: ScopeList,
}
impl ProviderConfig {
	/// Starts a configuration for `descriptor`.
	pub fn builder(descriptor: ProviderDescriptor) -> ProviderConfigBuilder {
		ProviderConfigBuilder::new(descriptor)
	}

	/// Builds a configuration that requests the descriptor's default scopes.
	pub fn new(
		descriptor: ProviderDescriptor,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Result<Self, ConfigError> {
		Self::builder(descriptor).client_id(client_id).client_secret(client_secret).build()
	}

	/// Stable provider identifier used for logs and metrics.
	pub fn provider_name(&self) -> &str {
		&self.descriptor.id
	}
}

/// Builder for [`ProviderConfig`].
#[derive(Debug)]
pub struct ProviderConfigBuilder {
	descriptor: ProviderDescriptor,
	client_id: Option<String>,
	client_secret: Option<String>,
	scopes: Option<Vec<String>>,
}
impl ProviderConfigBuilder {
	fn new(descriptor: ProviderDescriptor) -> Self {
		Self { descriptor, client_id: None, client_secret: None, scopes: None }
	}

	/// Sets the app id.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the app secret.
	pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
		self.client_secret = Some(client_secret.into());

		self
	}

	/// Overrides the descriptor's default scopes.
	pub fn scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes = Some(scopes.into_iter().map(Into::into).collect());

		self
	}

	/// Validates the registration.
	pub fn build(self) -> Result<ProviderConfig, ConfigError> {
		let client_id = ClientId::new(self.client_id.unwrap_or_default())?;
		let client_secret = self
			.client_secret
			.filter(|secret| !secret.trim().is_empty())
			.map(ClientSecret::new)
			.ok_or(ConfigError::EmptyClientSecret)?;
		let scopes = match self.scopes {
			Some(raw) => ScopeList::new(raw)?,
			None => self.descriptor.default_scopes.clone(),
		};

		if scopes.is_empty() {
			return Err(ScopeValidationError::NoScopes.into());
		}

		Ok(ProviderConfig { descriptor: self.descriptor, client_id, client_secret, scopes })
	}
}

/// Deserializable registration for one built-in provider, e.g. from a settings file.
///
/// ```toml
/// provider = "weibo"
/// client_id = "3849613291"
/// client_secret = "..."
/// scopes = ["email"]
/// ```
#[derive(Clone, Deserialize)]
pub struct ProviderSettings {
	/// Built-in provider to use.
	pub provider: ProviderKind,
	/// App id issued by the provider.
	pub client_id: String,
	/// App secret issued by the provider.
	pub client_secret: ClientSecret,
	/// Scope override; the provider defaults apply when absent.
	#[serde(default)]
	pub scopes: Option<Vec<String>>,
}
impl ProviderSettings {
	/// Resolves the descriptor and validates the registration.
	pub fn into_config(self) -> Result<ProviderConfig, ConfigError> {
		let builder = ProviderConfig::builder(self.provider.descriptor()?)
			.client_id(self.client_id)
			.client_secret(self.client_secret.expose());

		match self.scopes {
			Some(scopes) => builder.scopes(scopes),
			None => builder,
		}
		.build()
	}
}
impl Debug for ProviderSettings {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProviderSettings")
			.field("provider", &self.provider)
			.field("client_id", &self.client_id)
			.field("client_secret", &self.client_secret)
			.field("scopes", &self.scopes)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn weibo() -> ProviderDescriptor {
		ProviderKind::Weibo.descriptor().expect("Weibo descriptor should build.")
	}

	#[test]
	fn defaults_to_descriptor_scopes() {
		let config = ProviderConfig::new(weibo(), "3849613291", "s3cr3t")
			.expect("Weibo config should build.");

		assert_eq!(config.scopes.joined(' '), "email");
		assert_eq!(config.provider_name(), "weibo");
	}

	#[test]
	fn rejects_empty_secret_and_client_id() {
		assert!(matches!(
			ProviderConfig::new(weibo(), "3849613291", ""),
			Err(ConfigError::EmptyClientSecret)
		));
		assert!(matches!(
			ProviderConfig::new(weibo(), "3849613291", "   "),
			Err(ConfigError::EmptyClientSecret)
		));
		assert!(matches!(
			ProviderConfig::new(weibo(), "3849613291", "\t\n"),
			Err(ConfigError::EmptyClientSecret)
		));
		assert!(matches!(
			ProviderConfig::new(weibo(), "", "s3cr3t"),
			Err(ConfigError::InvalidClientId(_))
		));
	}

	#[test]
	fn rejects_empty_scope_override() {
		let err = ProviderConfig::builder(weibo())
			.client_id("3849613291")
			.client_secret("s3cr3t")
			.scopes(Vec::<String>::new())
			.build()
			.expect_err("An empty scope override must be rejected.");

		assert!(matches!(err, ConfigError::InvalidScope(ScopeValidationError::NoScopes)));
	}

	#[test]
	fn settings_deserialize_and_redact() {
		let settings: ProviderSettings = serde_json::from_str(
			r#"{"provider":"sohu_weibo","client_id":"app","client_secret":"s3cr3t","scopes":["basic","status"]}"#,
		)
		.expect("Settings should deserialize.");

		assert!(!format!("{settings:?}").contains("s3cr3t"));

		let config = settings.into_config().expect("Settings should validate.");

		assert_eq!(config.scopes.joined(' '), "basic status");
		assert_eq!(config.provider_name(), "sohu_weibo");
	}
}
