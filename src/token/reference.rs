//! Resource references bound to issued tokens.

// self
use crate::_prelude::*;

/// Error returned when a reference payload is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum ReferenceError {
	/// The payload was empty or only whitespace.
	#[error("Token reference cannot be empty.")]
	Empty,
}

/// Non-empty payload a token resolves to, typically the source URL of a video.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Reference(String);
impl Reference {
	/// Wraps a payload after checking it is not blank.
	pub fn new(value: impl Into<String>) -> Result<Self, ReferenceError> {
		let value = value.into();

		if value.trim().is_empty() {
			return Err(ReferenceError::Empty);
		}

		Ok(Self(value))
	}

	/// Borrows the payload.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for Reference {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl From<Reference> for String {
	fn from(value: Reference) -> Self {
		value.0
	}
}
impl From<Url> for Reference {
	fn from(value: Url) -> Self {
		Self(value.into())
	}
}
impl TryFrom<String> for Reference {
	type Error = ReferenceError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl FromStr for Reference {
	type Err = ReferenceError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Display for Reference {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
