//! Provider and client identifiers.
//!
//! Both end up verbatim in authorization URLs, metric labels, and span fields, so they are
//! checked once at construction and then passed around as plain strings.

// std
use std::ops::Deref;
// self
use crate::_prelude::*;

/// Longest accepted provider identifier, in bytes.
pub const PROVIDER_ID_MAX_LEN: usize = 32;
/// Longest accepted client identifier, in bytes.
///
/// Real app ids are short (QQ `100330589`, WeChat `wx520c15f417810387`, Douban's 32-digit hex).
pub const CLIENT_ID_MAX_LEN: usize = 64;

macro_rules! def_id {
	($name:ident, $kind:literal, $validate:path, $doc:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates the identifier after validation.
			pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
				let value = value.into();

				$validate($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				Self::new(value)
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
	};
}

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (provider, client).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (provider, client).
		kind: &'static str,
	},
	/// The identifier contains a character outside the allowed set.
	#[error("{kind} identifier contains invalid character {character:?}.")]
	InvalidCharacter {
		/// Kind of identifier (provider, client).
		kind: &'static str,
		/// First offending character.
		character: char,
	},
	/// The identifier exceeded the allowed length.
	#[error("{kind} identifier exceeds {max} bytes.")]
	TooLong {
		/// Kind of identifier (provider, client).
		kind: &'static str,
		/// Maximum permitted length.
		max: usize,
	},
}

def_id! {
	ProviderId,
	"Provider",
	validate_provider_id,
	"Provider slug such as `weibo` or `sohu_weibo`: lowercase ASCII letters, digits, `_` and `-`, \
	 starting with a letter."
}
def_id! {
	ClientId,
	"Client",
	validate_client_id,
	"App id issued by a provider (`client_id`, `appid`, `app_key`): printable ASCII without \
	 whitespace."
}

fn validate_provider_id(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	check_shape(kind, view, PROVIDER_ID_MAX_LEN)?;

	let mut chars = view.chars();

	if let Some(first) = chars.next().filter(|c| !c.is_ascii_lowercase()) {
		return Err(IdentifierError::InvalidCharacter { kind, character: first });
	}
	if let Some(character) =
		chars.find(|&c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-')))
	{
		return Err(IdentifierError::InvalidCharacter { kind, character });
	}

	Ok(())
}

fn validate_client_id(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	check_shape(kind, view, CLIENT_ID_MAX_LEN)?;

	// Logged verbatim and sent as a query value.
	if let Some(character) = view.chars().find(|c| !c.is_ascii_graphic()) {
		return Err(IdentifierError::InvalidCharacter { kind, character });
	}

	Ok(())
}

fn check_shape(kind: &'static str, view: &str, max: usize) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if view.len() > max {
		return Err(IdentifierError::TooLong { kind, max });
	}

	Ok(())
}
