//! Scope modeling helpers used when building authorization URLs.

// std
use std::collections::HashSet;
// crates.io
use serde::{Deserializer, Serializer, de::Error as DeError, ser::SerializeSeq};
// self
use crate::_prelude::*;

/// Errors emitted when validating scopes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ScopeValidationError {
	/// Empty scope entries are not allowed.
	#[error("Scope entries cannot be empty.")]
	Empty,
	/// Scopes cannot contain embedded whitespace characters.
	#[error("Scope contains whitespace: {scope}.")]
	ContainsWhitespace {
		/// The offending scope string.
		scope: String,
	},
	/// A login request must ask for at least one scope.
	#[error("At least one scope must be requested.")]
	NoScopes,
}

/// Ordered list of OAuth scopes.
///
/// Providers see scopes in the order the caller supplied them, so the list keeps insertion
/// order and only drops repeated entries (the first occurrence wins).
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ScopeList {
	scopes: Arc<[String]>,
}
impl ScopeList {
	/// Creates an ordered scope list from any iterator.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Ok(Self { scopes: normalize(scopes)? })
	}

	/// Number of distinct scopes.
	pub fn len(&self) -> usize {
		self.scopes.len()
	}

	/// Returns true if no scopes are defined.
	pub fn is_empty(&self) -> bool {
		self.scopes.is_empty()
	}

	/// Returns true if the list contains the provided scope.
	pub fn contains(&self, scope: &str) -> bool {
		self.scopes.iter().any(|candidate| candidate == scope)
	}

	/// Iterator over scopes in request order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.scopes.iter().map(|s| s.as_str())
	}

	/// Joins the scopes with `delimiter` for the `scope` request parameter.
	pub fn joined(&self, delimiter: char) -> String {
		let mut buf = String::new();

		for (idx, value) in self.scopes.iter().enumerate() {
			if idx > 0 {
				buf.push(delimiter);
			}

			buf.push_str(value);
		}

		buf
	}
}
impl Debug for ScopeList {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ScopeList").field(&self.scopes).finish()
	}
}
impl Display for ScopeList {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.joined(' '))
	}
}
impl FromStr for ScopeList {
	type Err = ScopeValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.is_empty() {
			return Ok(Self::default());
		}
		if s.chars().all(char::is_whitespace) {
			return Err(ScopeValidationError::Empty);
		}

		Self::new(s.split(|c: char| c.is_whitespace() || c == ',').filter(|s| !s.is_empty()))
	}
}
impl Serialize for ScopeList {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut seq = serializer.serialize_seq(Some(self.scopes.len()))?;

		for scope in self.scopes.iter() {
			seq.serialize_element(scope)?;
		}

		seq.end()
	}
}
impl<'de> Deserialize<'de> for ScopeList {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let values = <Vec<String>>::deserialize(deserializer)?;

		ScopeList::new(values).map_err(DeError::custom)
	}
}

fn normalize<I, S>(scopes: I) -> Result<Arc<[String]>, ScopeValidationError>
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	let mut seen = HashSet::new();
	let mut ordered = Vec::new();

	for scope in scopes {
		let owned: String = scope.into();

		if owned.is_empty() {
			return Err(ScopeValidationError::Empty);
		}
		if owned.chars().any(char::is_whitespace) {
			return Err(ScopeValidationError::ContainsWhitespace { scope: owned });
		}

		if seen.insert(owned.clone()) {
			ordered.push(owned);
		}
	}

	Ok(Arc::from(ordered))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn scopes_keep_request_order_and_drop_repeats() {
		let scopes = ScopeList::new(["get_user_info", "add_share", "get_user_info"])
			.expect("Scope list should be valid.");

		assert_eq!(scopes.len(), 2);
		assert_eq!(scopes.joined(' '), "get_user_info add_share");
		assert_eq!(scopes.joined(','), "get_user_info,add_share");
		assert_eq!(scopes.to_string(), "get_user_info add_share");
	}

	#[test]
	fn scopes_reject_whitespace_padding() {
		let err = ScopeList::new([" email "]).expect_err("Padded scopes must be rejected.");

		assert!(matches!(err, ScopeValidationError::ContainsWhitespace { .. }));
		assert!(ScopeList::new([""]).is_err());
		assert!(ScopeList::from_str("").is_ok(), "Empty string represents an empty scope list.");
		assert!(ScopeList::from_str("   ").is_err(), "Whitespace-only input must be rejected.");
	}

	#[test]
	fn from_str_accepts_space_and_comma_delimiters() {
		let scopes = ScopeList::from_str("snsapi_userinfo, snsapi_base")
			.expect("Scope string should parse successfully.");

		assert!(scopes.contains("snsapi_base"));
		assert_eq!(scopes.iter().collect::<Vec<_>>(), vec!["snsapi_userinfo", "snsapi_base"]);
	}

	#[test]
	fn serde_preserves_order() {
		let scopes: ScopeList = serde_json::from_str("[\"publish_share\",\"read_user_album\"]")
			.expect("Scope list should deserialize.");

		assert_eq!(
			serde_json::to_string(&scopes).expect("Scope list should serialize."),
			"[\"publish_share\",\"read_user_album\"]"
		);
		assert!(serde_json::from_str::<ScopeList>("[\"bad scope\"]").is_err());
	}
}
