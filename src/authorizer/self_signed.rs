//! Application authorizer that re-signs on every call.

// std
use std::path::Path;
// self
use crate::{
	_prelude::*,
	auth::{IssuerId, SigningKey},
	clock::{self, Clock},
	error::SigningError,
	signer::{self, SignedToken},
};

/// Authorizes as the application itself with a sixty-second RS256 token.
///
/// Nothing is cached: each call signs a fresh claim set. The variant is mainly used to bootstrap
/// a delegated exchange, which is also why the token window is too short to be worth caching.
pub struct SelfSignedAuthorizer {
	issuer_id: IssuerId,
	key: Arc<SigningKey>,
	clock: Arc<dyn Clock>,
}
impl SelfSignedAuthorizer {
	/// Creates an authorizer that exclusively owns `key`.
	pub fn new(issuer_id: IssuerId, key: SigningKey) -> Self {
		Self::sharing(issuer_id, Arc::new(key), clock::system())
	}

	/// Parses `pem` and creates an authorizer; malformed keys fail here.
	pub fn from_pem(issuer_id: IssuerId, pem: impl AsRef<[u8]>) -> Result<Self> {
		Ok(Self::new(issuer_id, SigningKey::from_pem(pem)?))
	}

	/// Reads a PEM key file and creates an authorizer.
	pub fn from_pem_file(issuer_id: IssuerId, path: impl AsRef<Path>) -> Result<Self> {
		Ok(Self::new(issuer_id, SigningKey::from_pem_file(path)?))
	}

	/// Borrows key material owned by a delegated authorizer for one exchange.
	pub(crate) fn sharing(
		issuer_id: IssuerId,
		key: Arc<SigningKey>,
		clock: Arc<dyn Clock>,
	) -> Self {
		Self { issuer_id, key, clock }
	}

	/// Overrides the clock used for `iat`/`exp`.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Returns the issuer identifier.
	pub fn issuer_id(&self) -> IssuerId {
		self.issuer_id
	}

	/// Signs a fresh token at the clock's current instant.
	pub fn sign(&self) -> Result<SignedToken> {
		signer::sign(self.issuer_id, &self.key, self.clock.now()).map_err(|e| match e {
			SigningError::KeyDisposed => Error::Disposed,
			e => e.into(),
		})
	}

	/// Returns `bearer <jwt>`.
	pub fn header(&self) -> Result<String> {
		let signed = self.sign()?;

		Ok(format!("bearer {}", signed.token.expose()))
	}

	/// Drops the key material. Calling this again is a no-op.
	pub fn dispose(&self) {
		self.key.dispose();
	}

	/// Returns `true` once the key material is gone.
	pub fn is_disposed(&self) -> bool {
		self.key.is_disposed()
	}
}
impl Debug for SelfSignedAuthorizer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SelfSignedAuthorizer")
			.field("issuer_id", &self.issuer_id)
			.field("key", &self.key)
			.finish()
	}
}
