//! Caller-owned lookup table for reusing configured authorizers.
//!
//! The registry never owns an authorizer: entries are weak references tagged with the identity
//! they were registered under. Dropped or disposed authorizers are skipped on lookup and swept
//! on the next registration or by [`AuthorizerRegistry::prune`].

// std
use std::sync::Weak;
// self
use crate::{
	_prelude::*,
	auth::{self, DelegateId, IssuerId, TokenFingerprint},
	authorizer::Authorizer,
};

/// Identity an authorizer was registered under.
///
/// Keys of different variants never match each other, even when they share an issuer.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryKey {
	/// Self-signed authorizer for an issuer.
	SelfSigned(IssuerId),
	/// Delegated authorizer for an issuer/delegate pair.
	Delegated(IssuerId, DelegateId),
	/// Passthrough authorizer, keyed by its token's SHA-256 digest.
	Passthrough(TokenFingerprint),
}
impl RegistryKey {
	/// Derives the key of `authorizer`, or `None` when it is already disposed.
	pub fn of(authorizer: &Authorizer) -> Option<Self> {
		match authorizer {
			Authorizer::SelfSigned(inner) => Some(Self::SelfSigned(inner.issuer_id())),
			Authorizer::Delegated(inner) =>
				Some(Self::Delegated(inner.issuer_id(), inner.delegate_id())),
			Authorizer::Passthrough(inner) => inner.fingerprint().map(Self::Passthrough),
		}
	}
}
impl Debug for RegistryKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::SelfSigned(issuer) => f.debug_tuple("SelfSigned").field(issuer).finish(),
			Self::Delegated(issuer, delegate) =>
				f.debug_tuple("Delegated").field(issuer).field(delegate).finish(),
			Self::Passthrough(_) => f.debug_tuple("Passthrough").field(&"<fingerprint>").finish(),
		}
	}
}

#[derive(Debug)]
struct Entry {
	key: RegistryKey,
	authorizer: Weak<Authorizer>,
}
impl Entry {
	fn live(&self) -> Option<Arc<Authorizer>> {
		self.authorizer.upgrade().filter(|authorizer| !authorizer.is_disposed())
	}
}

/// Ordered, weakly-held collection of authorizers.
///
/// Duplicate identities are allowed; lookups return the first live match in registration order.
#[derive(Debug, Default)]
pub struct AuthorizerRegistry {
	entries: RwLock<Vec<Entry>>,
}
impl AuthorizerRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends `authorizer`. Returns `false` (and stores nothing) when it is already disposed.
	///
	/// Entries whose authorizer was dropped or disposed are swept out at the same time.
	pub fn register(&self, authorizer: &Arc<Authorizer>) -> bool {
		let Some(key) = RegistryKey::of(authorizer) else {
			return false;
		};
		let mut entries = self.entries.write();

		entries.retain(|entry| entry.live().is_some());
		entries.push(Entry { key, authorizer: Arc::downgrade(authorizer) });

		true
	}

	/// First live self-signed authorizer for `issuer`.
	pub fn find_by_issuer(&self, issuer: IssuerId) -> Option<Arc<Authorizer>> {
		self.find(RegistryKey::SelfSigned(issuer))
	}

	/// First live delegated authorizer for `issuer` acting as `delegate`.
	pub fn find_by_delegate(
		&self,
		issuer: IssuerId,
		delegate: DelegateId,
	) -> Option<Arc<Authorizer>> {
		self.find(RegistryKey::Delegated(issuer, delegate))
	}

	/// First live passthrough authorizer wrapping exactly `token`.
	pub fn find_by_token(&self, token: &str) -> Option<Arc<Authorizer>> {
		self.find(RegistryKey::Passthrough(auth::fingerprint(token)))
	}

	/// Returns the first live authorizer registered under `key`.
	pub fn find(&self, key: RegistryKey) -> Option<Arc<Authorizer>> {
		self.entries.read().iter().filter(|entry| entry.key == key).find_map(Entry::live)
	}

	/// Removes every entry pointing at `authorizer`. Returns `true` if any were found.
	pub fn remove(&self, authorizer: &Arc<Authorizer>) -> bool {
		let target = Arc::as_ptr(authorizer);
		let mut entries = self.entries.write();
		let before = entries.len();

		entries.retain(|entry| !std::ptr::eq(entry.authorizer.as_ptr(), target));

		entries.len() != before
	}

	/// Drops entries whose authorizer was dropped or disposed. Returns how many were removed.
	pub fn prune(&self) -> usize {
		let mut entries = self.entries.write();
		let before = entries.len();

		entries.retain(|entry| entry.live().is_some());

		before - entries.len()
	}

	/// Number of stored entries, including stale ones not yet pruned.
	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	/// Returns `true` when no entries are stored.
	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}
