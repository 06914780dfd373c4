// self
use crate::_prelude::*;

/// Chronologically ordered request timestamps for a single identity.
#[derive(Clone, Debug, Default)]
pub struct ActivityWindow {
	stamps: VecDeque<OffsetDateTime>,
}
impl ActivityWindow {
	/// Drops every timestamp at or before `cutoff`.
	pub fn compact(&mut self, cutoff: OffsetDateTime) {
		while self.stamps.front().is_some_and(|stamp| *stamp <= cutoff) {
			self.stamps.pop_front();
		}
	}

	/// Appends a request timestamp.
	///
	/// A stamp older than the newest retained one is recorded as the newest one so the window
	/// stays sorted and `compact` can trim from the front.
	pub fn record(&mut self, now: OffsetDateTime) {
		let stamp = self.stamps.back().map_or(now, |newest| now.max(*newest));

		self.stamps.push_back(stamp);
	}

	/// Oldest retained timestamp.
	pub fn oldest(&self) -> Option<OffsetDateTime> {
		self.stamps.front().copied()
	}

	/// Number of retained timestamps.
	pub fn len(&self) -> usize {
		self.stamps.len()
	}

	/// Returns `true` when nothing is retained.
	pub fn is_empty(&self) -> bool {
		self.stamps.is_empty()
	}
}
