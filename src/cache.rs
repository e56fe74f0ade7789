//! Cache contract and built-in backend for the process-local bearer token.

pub mod memory;

pub use memory::MemoryTokenCache;

// self
use crate::{_prelude::*, auth::CachedToken};

/// Margin subtracted from a token's stated expiry before it is treated as unusable.
pub const DEFAULT_SAFETY_BUFFER: Duration = Duration::seconds(60);

/// Process-local store of at most one bearer token.
///
/// Implementations own the singleton token exclusively; the orchestrator never mutates it
/// directly. Staleness is detected lazily on read, there is no eviction timer, and the cache
/// deliberately does not deduplicate concurrent refills: two invocations that both observe an
/// absent token may both issue one, and the later write wins wholesale.
pub trait TokenCache
where
	Self: Send + Sync,
{
	/// Returns the cached token only while it is comfortably ahead of expiry at `now`.
	///
	/// A read never mutates state; an expired or buffered-out entry simply reports absent.
	fn fresh(&self, now: OffsetDateTime) -> Option<CachedToken>;

	/// Replaces the singleton entry wholesale; concurrent readers observe either the previous or
	/// the new complete token, never a mix.
	fn store(&self, token: CachedToken);

	/// Drops the cached token so the next invocation reissues.
	fn invalidate(&self);
}
