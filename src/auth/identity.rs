//! Normalized identity records handed to the hosting authentication pipeline.

// self
use crate::_prelude::*;

/// Key under which every identity stores the provider-scoped user identifier.
pub const ID_KEY: &str = "id";
/// Key under which every identity stores the display name.
pub const NAME_KEY: &str = "name";

/// Provider-independent identity: `id` and `name` plus provider-specific extras.
///
/// Extras with empty values are skipped so consumers can treat key presence as meaningful.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "BTreeMap<String, String>", try_from = "BTreeMap<String, String>")]
pub struct NormalizedIdentity {
	fields: BTreeMap<String, String>,
}
impl NormalizedIdentity {
	/// Creates an identity from its mandatory fields.
	pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
		let mut fields = BTreeMap::new();

		fields.insert(ID_KEY.into(), id.into());
		fields.insert(NAME_KEY.into(), name.into());

		Self { fields }
	}

	/// Adds a provider-specific extra, ignoring empty values and the reserved keys.
	pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		let key = key.into();
		let value = value.into();

		if !value.is_empty() && key != ID_KEY && key != NAME_KEY {
			self.fields.insert(key, value);
		}

		self
	}

	/// Adds an optional extra when present.
	pub fn with_optional_extra(
		self,
		key: impl Into<String>,
		value: Option<impl Into<String>>,
	) -> Self {
		match value {
			Some(value) => self.with_extra(key, value),
			None => self,
		}
	}

	/// Provider-scoped user identifier.
	pub fn id(&self) -> &str {
		self.fields.get(ID_KEY).map(String::as_str).unwrap_or_default()
	}

	/// Display name.
	pub fn name(&self) -> &str {
		self.fields.get(NAME_KEY).map(String::as_str).unwrap_or_default()
	}

	/// Looks up any field, including `id` and `name`.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.fields.get(key).map(String::as_str)
	}

	/// Iterates over every field in key order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	/// Consumes the identity and returns the underlying map.
	pub fn into_map(self) -> BTreeMap<String, String> {
		self.fields
	}
}
impl Debug for NormalizedIdentity {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_map().entries(self.fields.iter()).finish()
	}
}
impl From<NormalizedIdentity> for BTreeMap<String, String> {
	fn from(value: NormalizedIdentity) -> Self {
		value.fields
	}
}
impl TryFrom<BTreeMap<String, String>> for NormalizedIdentity {
	type Error = MissingIdentityField;

	fn try_from(fields: BTreeMap<String, String>) -> Result<Self, Self::Error> {
		for key in [ID_KEY, NAME_KEY] {
			if !fields.contains_key(key) {
				return Err(MissingIdentityField { key });
			}
		}

		Ok(Self { fields })
	}
}

/// Error returned when a map lacks one of the mandatory identity keys.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Identity is missing the `{key}` field.")]
pub struct MissingIdentityField {
	/// Missing key.
	pub key: &'static str,
}
