//! Sliding-window request quotas keyed by requester identity.
//!
//! Every identity owns an [`ActivityWindow`] of recent request timestamps. A check trims the
//! timestamps that fell out of the trailing window, then admits and records the request only
//! while the retained count is below the quota. The window boundary moves with every call, so
//! bursts straddling a fixed bucket edge cannot double the effective rate.

mod decision;
mod window;

pub use decision::*;
pub use window::*;

// self
use crate::{
	_prelude::*,
	config::LimiterConfig,
	ident::Identity,
	obs::{self, OpSpan, Operation},
	reap::Reap,
};

type WindowMap<K> = RwLock<HashMap<K, Arc<Mutex<ActivityWindow>>>>;

/// Thread-safe sliding-window rate limiter.
///
/// The map lock is only taken for structural access; admissions for one identity serialize on
/// that identity's window mutex and never block other identities.
pub struct RateLimiter<K = Identity> {
	config: LimiterConfig,
	windows: WindowMap<K>,
}
impl<K> RateLimiter<K>
where
	K: Clone + Eq + Hash,
{
	/// Creates a limiter from a validated configuration.
	pub fn new(config: LimiterConfig) -> Self {
		Self { config, windows: RwLock::new(HashMap::new()) }
	}

	/// Configuration the limiter was built with.
	pub fn config(&self) -> &LimiterConfig {
		&self.config
	}

	/// Admits and records a request at the current UTC instant.
	pub fn admit(&self, identity: &K) -> bool {
		self.admit_at(identity, OffsetDateTime::now_utc())
	}

	/// Admits and records a request at `now`; returns `false` without recording when the
	/// identity has exhausted its quota.
	pub fn admit_at(&self, identity: &K, now: OffsetDateTime) -> bool {
		self.evaluate_at(identity, now).is_allow()
	}

	/// Evaluates a request at the current UTC instant.
	pub fn evaluate(&self, identity: &K) -> RateLimitDecision {
		self.evaluate_at(identity, OffsetDateTime::now_utc())
	}

	/// Evaluates a request at `now`, recording it when admitted.
	pub fn evaluate_at(&self, identity: &K, now: OffsetDateTime) -> RateLimitDecision {
		let _span = OpSpan::new(Operation::Admit, "evaluate").entered();
		let window = self.window_for(identity);
		let decision = {
			let mut guard = window.lock();

			guard.compact(now - self.config.window);

			if guard.len() >= self.config.max_requests {
				let oldest = guard.oldest().unwrap_or(now);

				RateLimitDecision::Delay(RetryDirective::new(oldest + self.config.window, now))
			} else {
				guard.record(now);

				RateLimitDecision::Allow { remaining: self.config.max_requests - guard.len() }
			}
		};

		obs::record_outcome(Operation::Admit, decision.as_str());

		decision
	}

	/// Requests still available to `identity` at `now`, without recording anything.
	pub fn remaining_at(&self, identity: &K, now: OffsetDateTime) -> usize {
		let Some(window) = self.windows.read().get(identity).cloned() else {
			return self.config.max_requests;
		};
		let mut guard = window.lock();

		guard.compact(now - self.config.window);

		self.config.max_requests.saturating_sub(guard.len())
	}

	/// Number of identities currently holding a window.
	pub fn tracked_identities(&self) -> usize {
		self.windows.read().len()
	}

	/// Drops every window.
	pub fn clear(&self) {
		self.windows.write().clear();
	}

	fn window_for(&self, identity: &K) -> Arc<Mutex<ActivityWindow>> {
		if let Some(window) = self.windows.read().get(identity) {
			return window.clone();
		}

		self.windows.write().entry(identity.clone()).or_default().clone()
	}
}
impl<K> Reap for RateLimiter<K>
where
	K: Clone + Eq + Hash + Send + Sync,
{
	/// Removes windows that hold no timestamp inside the trailing window.
	///
	/// A window whose `Arc` is shared belongs to an in-flight admission and is left alone; with
	/// the map write lock held nobody can pick up a new handle in the meantime.
	fn reap_at(&self, now: OffsetDateTime) -> usize {
		let _span = OpSpan::new(Operation::Reap, "limiter").entered();
		let cutoff = now - self.config.window;
		let mut windows = self.windows.write();
		let before = windows.len();

		windows.retain(|_, window| {
			if Arc::strong_count(window) > 1 {
				return true;
			}

			let mut guard = window.lock();

			guard.compact(cutoff);

			!guard.is_empty()
		});

		let reaped = before - windows.len();

		obs::record_count(Operation::Reap, "windows", reaped);

		reaped
	}
}
impl<K> Debug for RateLimiter<K> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RateLimiter")
			.field("config", &self.config)
			.field("tracked_identities", &self.windows.read().len())
			.finish()
	}
}
