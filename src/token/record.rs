//! Issued token records and lifecycle helpers.

// self
use crate::{
	_prelude::*,
	token::{id::TokenId, reference::Reference},
};

/// Lifecycle status for a token record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStatus {
	/// Token can still be redeemed.
	Active,
	/// Token was redeemed under single-use policy.
	Consumed,
	/// Token outlived its expiry instant.
	Expired,
}
impl TokenStatus {
	/// Returns `true` for states a token never leaves.
	pub const fn is_terminal(self) -> bool {
		matches!(self, Self::Consumed | Self::Expired)
	}

	/// Returns a stable label suitable for log or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Active => "active",
			Self::Consumed => "consumed",
			Self::Expired => "expired",
		}
	}
}

/// Snapshot of an issued token.
///
/// `expires_at` is always `issued_at` plus the issuer's TTL and never changes after issuance.
/// The `status` field reflects the last transition the issuer recorded; use
/// [`status_at`](Self::status_at) to account for expiry that nobody has observed yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
	/// Opaque bearer identifier.
	pub id: TokenId,
	/// Payload handed back on successful redemption.
	pub reference: Reference,
	/// Issuance instant.
	pub issued_at: OffsetDateTime,
	/// Last instant at which the token still resolves.
	pub expires_at: OffsetDateTime,
	/// Recorded lifecycle status.
	pub status: TokenStatus,
}
impl Token {
	pub(crate) fn new(
		id: TokenId,
		reference: Reference,
		issued_at: OffsetDateTime,
		ttl: Duration,
	) -> Self {
		Self { id, reference, issued_at, expires_at: issued_at + ttl, status: TokenStatus::Active }
	}

	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> TokenStatus {
		match self.status {
			TokenStatus::Active if instant > self.expires_at => TokenStatus::Expired,
			status => status,
		}
	}

	/// Convenience helper that checks the status using the current UTC instant.
	pub fn status(&self) -> TokenStatus {
		self.status_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` if the token is past its expiry instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant > self.expires_at
	}

	/// Time left before expiry, clamped at zero.
	pub fn remaining_at(&self, instant: OffsetDateTime) -> Duration {
		let remaining = self.expires_at - instant;

		if remaining.is_negative() { Duration::ZERO } else { remaining }
	}

	/// Configured lifetime of the token.
	pub fn ttl(&self) -> Duration {
		self.expires_at - self.issued_at
	}
}
