//! Single-slot credential cache with single-flight refresh.
//!
//! Readers take a short `RwLock` read to answer "is the cached value still usable". Misses
//! funnel through one async guard, so at most one refresh runs per cache; callers queued behind
//! it re-check the slot and reuse whatever the winner stored. A failed refresh stores no token,
//! but callers that were already queued behind it receive its error as [`Error::Shared`]
//! instead of starting a refresh of their own. Callers arriving afterwards retry.

// std
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
// self
use crate::{
	_prelude::*,
	auth::{CachedToken, TokenSecret},
	clock::Clock,
};

/// Holds at most one [`CachedToken`] and coordinates its refresh.
#[derive(Default)]
pub struct CredentialCache {
	slot: RwLock<Option<CachedToken>>,
	refresh_guard: AsyncMutex<()>,
	closed: AtomicBool,
	// Bumped each time a refresh completes, successfully or not.
	generation: AtomicU64,
	// Callers currently queued on `refresh_guard`.
	waiting: AtomicUsize,
	last_failure: Mutex<Option<(u64, Arc<Error>)>>,
}
impl CredentialCache {
	/// Creates an empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the cached header value if it is usable at `now`.
	pub fn usable_at(&self, now: OffsetDateTime) -> Option<TokenSecret> {
		self.slot
			.read()
			.as_ref()
			.filter(|token| token.is_usable_at(now))
			.map(|token| token.header_value.clone())
	}

	/// Returns a copy of the cached token regardless of freshness.
	pub fn current(&self) -> Option<CachedToken> {
		self.slot.read().clone()
	}

	/// Replaces the cached token. Ignored once the cache is closed.
	pub fn store(&self, token: CachedToken) {
		let mut slot = self.slot.write();

		if !self.is_closed() {
			*slot = Some(token);
		}
	}

	/// Zeroizes and removes the cached token.
	pub fn clear(&self) {
		if let Some(mut token) = self.slot.write().take() {
			token.clear();
		}
	}

	/// Clears the slot and rejects all further reads and refreshes. Idempotent.
	pub fn close(&self) {
		let mut slot = self.slot.write();

		self.closed.store(true, Ordering::Release);

		if let Some(mut token) = slot.take() {
			token.clear();
		}

		self.last_failure.lock().take();
	}

	/// Returns `true` once [`close`](Self::close) has run.
	pub fn is_closed(&self) -> bool {
		self.closed.load(Ordering::Acquire)
	}

	/// Returns the cached value, running `refresh` first when the slot is empty or stale.
	///
	/// Concurrent callers that miss together share one `refresh` invocation and its outcome.
	/// Dropping the returned future releases the guard, so cancelling a hung refresh unblocks
	/// the others.
	pub async fn get_or_refresh<F, Fut>(
		&self,
		clock: &dyn Clock,
		refresh: F,
	) -> Result<TokenSecret>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<CachedToken>>,
	{
		if let Some(value) = self.fresh(clock)? {
			return Ok(value);
		}

		let queued = Queued::enter(&self.waiting);
		let observed = self.generation.load(Ordering::SeqCst);
		let _singleflight = self.refresh_guard.lock().await;

		drop(queued);

		if let Some(value) = self.fresh(clock)? {
			return Ok(value);
		}
		if let Some(e) = self.failure_since(observed) {
			return Err(Error::Shared(e));
		}

		let result = refresh().await;
		let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
		let token = match result {
			Ok(token) => token,
			Err(e) => return Err(self.record_failure(generation, e)),
		};
		let value = token.header_value.clone();
		let mut slot = self.slot.write();

		if self.is_closed() {
			return Err(Error::Disposed);
		}

		*slot = Some(token);

		Ok(value)
	}

	fn fresh(&self, clock: &dyn Clock) -> Result<Option<TokenSecret>> {
		if self.is_closed() {
			return Err(Error::Disposed);
		}

		Ok(self.usable_at(clock.now()))
	}

	// Failure of the refresh that finished while the caller was queued, if that is the latest.
	fn failure_since(&self, observed: u64) -> Option<Arc<Error>> {
		let current = self.generation.load(Ordering::SeqCst);

		if current == observed {
			return None;
		}

		self.last_failure
			.lock()
			.as_ref()
			.filter(|(generation, _)| *generation == current)
			.map(|(_, e)| e.clone())
	}

	fn record_failure(&self, generation: u64, e: Error) -> Error {
		// Nobody queued behind this refresh, so the error stays unwrapped.
		if self.waiting.load(Ordering::SeqCst) == 0 {
			return e;
		}

		let shared = Arc::new(e);

		*self.last_failure.lock() = Some((generation, shared.clone()));

		Error::Shared(shared)
	}
}
impl Debug for CredentialCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialCache")
			.field("slot", &*self.slot.read())
			.field("closed", &self.is_closed())
			.field("generation", &self.generation.load(Ordering::Relaxed))
			.finish()
	}
}

// Counts a caller as queued until it holds the guard or gives up.
struct Queued<'a>(&'a AtomicUsize);
impl<'a> Queued<'a> {
	fn enter(counter: &'a AtomicUsize) -> Self {
		counter.fetch_add(1, Ordering::SeqCst);

		Self(counter)
	}
}
impl Drop for Queued<'_> {
	fn drop(&mut self) {
		self.0.fetch_sub(1, Ordering::SeqCst);
	}
}
