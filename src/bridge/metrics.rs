// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for resolve invocations.
#[derive(Debug, Default)]
pub struct ResolveMetrics {
	attempts: AtomicU64,
	successes: AtomicU64,
	failures: AtomicU64,
	cache_hits: AtomicU64,
	cache_misses: AtomicU64,
	lookup_retries: AtomicU64,
}
impl ResolveMetrics {
	/// Returns the total number of resolve invocations.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of invocations that produced a record.
	pub fn successes(&self) -> u64 {
		self.successes.load(Ordering::Relaxed)
	}

	/// Returns the number of invocations that terminated with an error.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	/// Returns the number of invocations served from the token cache.
	pub fn cache_hits(&self) -> u64 {
		self.cache_hits.load(Ordering::Relaxed)
	}

	/// Returns the number of invocations that had to issue a fresh token.
	pub fn cache_misses(&self) -> u64 {
		self.cache_misses.load(Ordering::Relaxed)
	}

	/// Returns the number of lookup retries performed across all invocations.
	pub fn lookup_retries(&self) -> u64 {
		self.lookup_retries.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.successes.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_cache_hit(&self) {
		self.cache_hits.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_cache_miss(&self) {
		self.cache_misses.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_lookup_retry(&self) {
		self.lookup_retries.fetch_add(1, Ordering::Relaxed);
	}
}
