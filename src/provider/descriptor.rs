//! Provider descriptor data structures shared by all flows.
//!
//! The module exposes validated metadata, supporting builder utilities, and the quirk set
//! that captures how a provider deviates from RFC 6749.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// Provider-specific dialect toggles.
pub mod quirks;

pub use builder::*;
pub use quirks::*;

// self
use crate::{_prelude::*, auth::{ProviderId, ScopeList}};

/// Provider endpoints the broker may call, used to label requests, errors, and telemetry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
	/// Browser-facing authorization endpoint.
	Authorization,
	/// Token endpoint used for the code exchange.
	Token,
	/// Endpoint that resolves the provider user identifier from an access token.
	Correlation,
	/// Profile endpoint.
	UserInfo,
}
impl Endpoint {
	/// Returns a stable label suitable for messages, span fields, and metric labels.
	pub const fn as_str(self) -> &'static str {
		match self {
			Endpoint::Authorization => "authorization",
			Endpoint::Token => "token",
			Endpoint::Correlation => "correlation",
			Endpoint::UserInfo => "user_info",
		}
	}
}
impl Display for Endpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Authorization endpoint the end user is redirected to.
	pub authorization: Url,
	/// Token endpoint used for the authorization-code exchange.
	pub token: Url,
	/// Profile endpoint.
	pub user_info: Url,
	/// Optional endpoint that maps an access token to the provider user identifier.
	pub correlation: Option<Url>,
}

/// Immutable provider descriptor consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Descriptor identifier.
	pub id: ProviderId,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Scopes requested when the caller does not override them.
	pub default_scopes: ScopeList,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProviderId) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id)
	}
}
