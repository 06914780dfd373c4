//! Requester identities used as rate-limit keys.

// std
use std::borrow::Borrow;
// self
use crate::_prelude::*;

const IDENTIFIER_MAX_LEN: usize = 128;

/// Opaque key identifying a requester.
///
/// Chat platforms hand out numeric user ids, while API front ends usually key on an API key or
/// account name. Both shapes hash and compare by value only.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identity {
	/// Numeric platform identifier (e.g. a chat user id).
	Numeric(i64),
	/// Validated textual identifier.
	Named(NamedIdentity),
}
impl Identity {
	/// Creates a textual identity after validation.
	pub fn named(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
		NamedIdentity::new(value).map(Self::Named)
	}
}
impl From<i64> for Identity {
	fn from(value: i64) -> Self {
		Self::Numeric(value)
	}
}
impl From<NamedIdentity> for Identity {
	fn from(value: NamedIdentity) -> Self {
		Self::Named(value)
	}
}
impl Debug for Identity {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Numeric(id) => write!(f, "Identity({id})"),
			Self::Named(name) => write!(f, "Identity({name})"),
		}
	}
}
impl Display for Identity {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Numeric(id) => write!(f, "{id}"),
			Self::Named(name) => f.write_str(name.as_ref()),
		}
	}
}

/// Textual identity that is non-empty, whitespace-free, and bounded in length.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NamedIdentity(String);
impl NamedIdentity {
	/// Creates a new identifier after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl AsRef<str> for NamedIdentity {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for NamedIdentity {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<NamedIdentity> for String {
	fn from(value: NamedIdentity) -> Self {
		value.0
	}
}
impl TryFrom<String> for NamedIdentity {
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl Debug for NamedIdentity {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "NamedIdentity({})", self.0)
	}
}
impl Display for NamedIdentity {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for NamedIdentity {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

/// Error returned when identity validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("Identity cannot be empty.")]
	Empty,
	/// The identifier contains whitespace characters.
	#[error("Identity contains whitespace.")]
	ContainsWhitespace,
	/// The identifier exceeded the allowed character count.
	#[error("Identity exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

fn validate_view(view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace);
	}
	if view.chars().count() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn named_identities_validate() {
		assert_eq!(Identity::named(""), Err(IdentifierError::Empty));
		assert_eq!(Identity::named("api key"), Err(IdentifierError::ContainsWhitespace));
		assert!(Identity::named(format!("user{}id", '\u{00A0}')).is_err());

		let exact = "a".repeat(IDENTIFIER_MAX_LEN);

		Identity::named(&exact).expect("Exact length should succeed.");

		assert_eq!(
			Identity::named("a".repeat(IDENTIFIER_MAX_LEN + 1)),
			Err(IdentifierError::TooLong { max: IDENTIFIER_MAX_LEN })
		);
	}

	#[test]
	fn numeric_and_named_identities_stay_distinct() {
		let numeric = Identity::from(42);
		let named = Identity::named("42").expect("Named fixture should be valid.");

		assert_ne!(numeric, named);
		assert_eq!(numeric.to_string(), named.to_string());
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let numeric: Identity =
			serde_json::from_str("1234567").expect("Numeric identity should deserialize.");

		assert_eq!(numeric, Identity::Numeric(1_234_567));

		let named: Identity =
			serde_json::from_str("\"bot-user\"").expect("Named identity should deserialize.");

		assert_eq!(named, Identity::named("bot-user").expect("Fixture should be valid."));
		assert!(serde_json::from_str::<Identity>("\"with space\"").is_err());
	}

	#[test]
	fn borrow_supports_fast_lookup() {
		let map: HashMap<NamedIdentity, u8> = HashMap::from_iter([(
			NamedIdentity::new("user-123").expect("Identity used for lookup should be valid."),
			7_u8,
		)]);

		assert_eq!(map.get("user-123"), Some(&7));
	}
}
