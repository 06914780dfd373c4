// self
use crate::_prelude::*;

/// Result of a rate-limit evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
	/// The request was admitted and recorded.
	Allow {
		/// Requests still available in the current window after this one.
		remaining: usize,
	},
	/// The request was rejected and not recorded.
	Delay(RetryDirective),
}
impl RateLimitDecision {
	/// Returns `true` if the request was admitted.
	pub fn is_allow(&self) -> bool {
		matches!(self, Self::Allow { .. })
	}

	/// Returns a stable label suitable for log or metric fields.
	pub const fn as_str(&self) -> &'static str {
		match self {
			Self::Allow { .. } => "admitted",
			Self::Delay(_) => "denied",
		}
	}

	/// Converts a rejection into [`Error::RateLimitExceeded`].
	pub fn into_result(self) -> Result<usize> {
		match self {
			Self::Allow { remaining } => Ok(remaining),
			Self::Delay(directive) => Err(Error::RateLimitExceeded { directive }),
		}
	}
}

/// Advises callers when to retry after a [`RateLimitDecision::Delay`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryDirective {
	/// Instant at which the oldest counted request leaves the window.
	pub earliest_retry_at: OffsetDateTime,
	/// Time between the evaluation and `earliest_retry_at`.
	pub recommended_backoff: Duration,
}
impl RetryDirective {
	/// Creates a directive relative to the evaluation instant.
	pub fn new(earliest_retry_at: OffsetDateTime, now: OffsetDateTime) -> Self {
		let backoff = earliest_retry_at - now;

		Self {
			earliest_retry_at,
			recommended_backoff: if backoff.is_negative() { Duration::ZERO } else { backoff },
		}
	}
}
