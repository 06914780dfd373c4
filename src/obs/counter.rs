// self
use crate::obs::Operation;

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_outcome(op: Operation, outcome: &'static str) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"ephemeral_token_op_total",
			"op" => op.as_str(),
			"outcome" => outcome
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (op, outcome);
	}
}

/// Records how many entries an operation removed, labeled by entry kind.
pub fn record_count(op: Operation, kind: &'static str, count: usize) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"ephemeral_token_reaped_total",
			"op" => op.as_str(),
			"kind" => kind
		)
		.increment(u64::try_from(count).unwrap_or(u64::MAX));
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (op, kind, count);
	}
}
