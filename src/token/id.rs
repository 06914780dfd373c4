//! Opaque token identifiers that stay out of logs.

// std
use std::borrow::Borrow;
// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

const TOKEN_ID_BYTES: usize = 24;
const FINGERPRINT_LEN: usize = 12;

/// Bearer identifier of an issued token.
///
/// Whoever holds the value can redeem the token, so the formatters only ever print a short
/// SHA-256 fingerprint. Use [`expose`](Self::expose) when the raw value must be handed out.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId(String);
impl TokenId {
	/// Generates a fresh identifier from the thread-local CSPRNG.
	pub fn generate() -> Self {
		let mut bytes = [0_u8; TOKEN_ID_BYTES];

		rand::rng().fill_bytes(&mut bytes);

		Self(URL_SAFE_NO_PAD.encode(bytes))
	}

	/// Returns the raw identifier. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Short, stable digest of the identifier suitable for logs and metrics.
	pub fn fingerprint(&self) -> String {
		fingerprint(&self.0)
	}
}
impl AsRef<str> for TokenId {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Borrow<str> for TokenId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<&str> for TokenId {
	fn from(value: &str) -> Self {
		Self(value.to_owned())
	}
}
impl Debug for TokenId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenId").field(&self.fingerprint()).finish()
	}
}
impl Display for TokenId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "<token:{}>", self.fingerprint())
	}
}

/// Fingerprints an arbitrary candidate id, e.g. one received on the redemption path.
pub(crate) fn fingerprint(raw: &str) -> String {
	let digest = Sha256::digest(raw.as_bytes());
	let mut encoded = URL_SAFE_NO_PAD.encode(digest);

	encoded.truncate(FINGERPRINT_LEN);

	encoded
}
