//! Thread-safe in-memory [`TokenCache`] implementation.

// self
use crate::{
	_prelude::*,
	auth::CachedToken,
	cache::{DEFAULT_SAFETY_BUFFER, TokenCache},
};

/// Singleton token slot guarded by a read-write lock.
///
/// Constructed once per process and shared by reference into the orchestrator, so tests can use
/// fresh instances instead of an implicit global.
#[derive(Debug)]
pub struct MemoryTokenCache {
	slot: RwLock<Option<CachedToken>>,
	safety_buffer: Duration,
}
impl MemoryTokenCache {
	/// Creates an empty cache using the provided safety buffer.
	pub fn new(safety_buffer: Duration) -> Self {
		Self { slot: RwLock::new(None), safety_buffer }
	}

	/// Returns the configured safety buffer.
	pub fn safety_buffer(&self) -> Duration {
		self.safety_buffer
	}
}
impl Default for MemoryTokenCache {
	fn default() -> Self {
		Self::new(DEFAULT_SAFETY_BUFFER)
	}
}
impl TokenCache for MemoryTokenCache {
	fn fresh(&self, now: OffsetDateTime) -> Option<CachedToken> {
		self.slot.read().clone().filter(|token| token.is_fresh_at(now, self.safety_buffer))
	}

	fn store(&self, token: CachedToken) {
		*self.slot.write() = Some(token);
	}

	fn invalidate(&self) {
		self.slot.write().take();
	}
}
