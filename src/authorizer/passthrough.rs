//! Authorizer for credentials obtained elsewhere.

// std
use std::sync::atomic::{AtomicBool, Ordering};
// crates.io
use zeroize::Zeroize;
// self
use crate::{
	_prelude::*,
	auth::{TokenFingerprint, TokenSecret},
};

/// Scheme used when none (or a blank one) is supplied.
pub const DEFAULT_SCHEME: &str = "bearer";

/// Formats a fixed credential as `<scheme> <token>`.
///
/// No validation, caching, or refresh happens here; the authority decides whether the token is
/// any good.
pub struct PassthroughAuthorizer {
	token: RwLock<TokenSecret>,
	scheme: String,
	disposed: AtomicBool,
}
impl PassthroughAuthorizer {
	/// Wraps `token` under the default `bearer` scheme.
	pub fn new(token: impl Into<String>) -> Self {
		Self::with_scheme(token, DEFAULT_SCHEME)
	}

	/// Wraps `token` under `scheme`. Blank schemes fall back to `bearer`; others are kept
	/// verbatim.
	pub fn with_scheme(token: impl Into<String>, scheme: impl Into<String>) -> Self {
		let mut scheme = scheme.into();

		if scheme.trim().is_empty() {
			scheme = DEFAULT_SCHEME.into();
		}

		Self {
			token: RwLock::new(TokenSecret::new(token)),
			scheme,
			disposed: AtomicBool::new(false),
		}
	}

	/// Returns the scheme in use.
	pub fn scheme(&self) -> &str {
		&self.scheme
	}

	/// Returns `<scheme> <token>`.
	pub fn header(&self) -> Result<String> {
		let token = self.token.read();

		if self.is_disposed() {
			return Err(Error::Disposed);
		}

		Ok(format!("{} {}", self.scheme, token.expose()))
	}

	/// Returns `true` when `candidate` is the wrapped token. Always `false` after disposal.
	pub fn matches_token(&self, candidate: &str) -> bool {
		let token = self.token.read();

		!self.is_disposed() && token.expose() == candidate
	}

	/// SHA-256 fingerprint of the wrapped token, or `None` after disposal.
	pub fn fingerprint(&self) -> Option<TokenFingerprint> {
		let token = self.token.read();

		(!self.is_disposed()).then(|| token.fingerprint())
	}

	/// Zeroizes the wrapped token. Calling this again is a no-op.
	pub fn dispose(&self) {
		let mut token = self.token.write();

		self.disposed.store(true, Ordering::Release);
		token.zeroize();
	}

	/// Returns `true` once [`dispose`](Self::dispose) has run.
	pub fn is_disposed(&self) -> bool {
		self.disposed.load(Ordering::Acquire)
	}
}
impl Debug for PassthroughAuthorizer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PassthroughAuthorizer")
			.field("scheme", &self.scheme)
			.field("token", &*self.token.read())
			.field("disposed", &self.is_disposed())
			.finish()
	}
}
