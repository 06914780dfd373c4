//! Reaping of idle rate-limit windows and expired tokens.
//!
//! Neither the limiter nor the issuer drops state on the hot path. Callers bound memory either
//! by calling [`Reap::reap`] from their own maintenance loop or, with the `tokio` feature, by
//! spawning a [`ReaperHandle`] that sweeps on a fixed interval.

// self
use crate::_prelude::*;

/// Component whose idle or expired state can be swept.
pub trait Reap
where
	Self: Send + Sync,
{
	/// Removes state that can no longer influence any outcome at `now`; returns how many
	/// entries were dropped.
	fn reap_at(&self, now: OffsetDateTime) -> usize;

	/// Sweeps at the current UTC instant.
	fn reap(&self) -> usize {
		self.reap_at(OffsetDateTime::now_utc())
	}
}
impl<R> Reap for Arc<R>
where
	R: ?Sized + Reap,
{
	fn reap_at(&self, now: OffsetDateTime) -> usize {
		(**self).reap_at(now)
	}
}

#[cfg(feature = "tokio")]
pub use background::ReaperHandle;

#[cfg(feature = "tokio")]
mod background {
	// crates.io
	use tokio::{task::JoinHandle, time::MissedTickBehavior};
	// self
	use super::*;
	use crate::obs::{OpSpan, Operation};

	/// Background task that periodically sweeps a [`Reap`] target.
	///
	/// The task stops when [`stop`](Self::stop) is called or the handle is dropped.
	#[derive(Debug)]
	pub struct ReaperHandle {
		task: JoinHandle<()>,
	}
	impl ReaperHandle {
		/// Spawns the sweep loop on the current tokio runtime.
		///
		/// Must be called from within a runtime context. A non-positive `interval` is clamped
		/// to one second.
		pub fn spawn<R>(target: Arc<R>, interval: Duration) -> Self
		where
			R: 'static + ?Sized + Reap,
		{
			let period = std::time::Duration::try_from(interval)
				.ok()
				.filter(|period| !period.is_zero())
				.unwrap_or(std::time::Duration::from_secs(1));
			let span = OpSpan::new(Operation::Reap, "background");
			let task = tokio::spawn(span.instrument(async move {
				let mut ticker = tokio::time::interval(period);

				ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

				loop {
					ticker.tick().await;
					target.reap();
				}
			}));

			Self { task }
		}

		/// Stops the sweep loop.
		pub fn stop(self) {
			drop(self);
		}

		/// Returns `true` once the loop has stopped.
		pub fn is_finished(&self) -> bool {
			self.task.is_finished()
		}
	}
	impl Drop for ReaperHandle {
		fn drop(&mut self) {
			self.task.abort();
		}
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;

	#[derive(Default)]
	struct CountingTarget(AtomicUsize);
	impl Reap for CountingTarget {
		fn reap_at(&self, _now: OffsetDateTime) -> usize {
			self.0.fetch_add(1, Ordering::SeqCst);

			0
		}
	}

	#[test]
	fn arc_targets_delegate() {
		let target = Arc::new(CountingTarget::default());

		target.reap();
		Reap::reap(&target);

		assert_eq!(target.0.load(Ordering::SeqCst), 2);
	}

	#[cfg(feature = "tokio")]
	#[tokio::test]
	async fn background_reaper_sweeps_until_stopped() {
		let target = Arc::new(CountingTarget::default());
		let handle = ReaperHandle::spawn(target.clone(), Duration::milliseconds(10));

		tokio::time::sleep(std::time::Duration::from_millis(60)).await;

		assert!(target.0.load(Ordering::SeqCst) >= 2);

		handle.stop();
		tokio::task::yield_now().await;

		let swept = target.0.load(Ordering::SeqCst);

		tokio::time::sleep(std::time::Duration::from_millis(40)).await;

		assert!(target.0.load(Ordering::SeqCst) <= swept + 1);
	}
}
