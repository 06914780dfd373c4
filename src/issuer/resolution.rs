// self
use crate::{_prelude::*, error::TokenError, token::Reference};

/// Outcome kind of a redemption attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolveOutcome {
	/// The token was valid and its reference was returned.
	Resolved,
	/// No token with the requested id exists.
	NotFound,
	/// The token is past its expiry instant.
	Expired,
	/// The token was already redeemed under single-use policy.
	AlreadyConsumed,
}
impl ResolveOutcome {
	/// Returns a stable label suitable for log or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Resolved => "resolved",
			Self::NotFound => "not_found",
			Self::Expired => "expired",
			Self::AlreadyConsumed => "already_consumed",
		}
	}
}
impl Display for ResolveOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Result of [`TokenIssuer::resolve_at`](crate::issuer::TokenIssuer::resolve_at).
///
/// Only [`Resolution::Resolved`] carries the reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
	/// The token was valid.
	Resolved {
		/// Payload bound at issuance.
		reference: Reference,
		/// Expiry instant of the token.
		expires_at: OffsetDateTime,
	},
	/// No token with the requested id exists.
	NotFound,
	/// The token is past its expiry instant.
	Expired {
		/// Expiry instant of the token.
		expired_at: OffsetDateTime,
	},
	/// The token was already redeemed under single-use policy.
	AlreadyConsumed,
}
impl Resolution {
	/// Outcome kind without the payload.
	pub fn outcome(&self) -> ResolveOutcome {
		match self {
			Self::Resolved { .. } => ResolveOutcome::Resolved,
			Self::NotFound => ResolveOutcome::NotFound,
			Self::Expired { .. } => ResolveOutcome::Expired,
			Self::AlreadyConsumed => ResolveOutcome::AlreadyConsumed,
		}
	}

	/// Returns `true` if the reference was handed out.
	pub fn is_resolved(&self) -> bool {
		matches!(self, Self::Resolved { .. })
	}

	/// Borrows the reference of a resolved token.
	pub fn reference(&self) -> Option<&Reference> {
		match self {
			Self::Resolved { reference, .. } => Some(reference),
			_ => None,
		}
	}

	/// Converts the non-resolving outcomes into [`TokenError`].
	pub fn into_result(self) -> Result<Reference, TokenError> {
		match self {
			Self::Resolved { reference, .. } => Ok(reference),
			Self::NotFound => Err(TokenError::NotFound),
			Self::Expired { expired_at } => Err(TokenError::Expired { expired_at }),
			Self::AlreadyConsumed => Err(TokenError::Consumed),
		}
	}
}
