//! Optional observability helpers for limiter and issuer operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `ephemeral_token.op` with the `op`
//!   (operation) and `stage` (call site) fields, plus `debug` events carrying the outcome and
//!   the token fingerprint. Raw token ids never reach a subscriber.
//! - Enable `metrics` to increment the `ephemeral_token_op_total` counter for every outcome,
//!   labeled by `op` + `outcome`, and `ephemeral_token_reaped_total` labeled by `kind`.

mod counter;
mod span;

pub use counter::*;
pub use span::*;

// self
use crate::_prelude::*;

/// Operations observed by the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	/// Rate-limit admission check.
	Admit,
	/// Token issuance.
	Issue,
	/// Token redemption.
	Resolve,
	/// Sweep of idle windows or expired tokens.
	Reap,
}
impl Operation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::Admit => "admit",
			Operation::Issue => "issue",
			Operation::Resolve => "resolve",
			Operation::Reap => "reap",
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
