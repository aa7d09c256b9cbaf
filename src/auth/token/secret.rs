//! Secret string wrapper that redacts and zeroizes sensitive material.

// crates.io
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};
// self
use crate::_prelude::*;

/// SHA-256 digest of a secret, safe to keep after the secret itself is gone.
pub type TokenFingerprint = [u8; 32];

/// Redacted secret wrapper keeping tokens and header values out of logs.
///
/// The contents are overwritten when the value is dropped or explicitly
/// [`zeroize`](Zeroize::zeroize)d.
#[derive(Clone, PartialEq, Eq, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns `true` when the secret is empty, e.g. after zeroizing.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Digest of the secret used for identity lookups.
	pub fn fingerprint(&self) -> TokenFingerprint {
		fingerprint(&self.0)
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Digest of an arbitrary secret string.
pub fn fingerprint(value: &str) -> TokenFingerprint {
	Sha256::digest(value.as_bytes()).into()
}
