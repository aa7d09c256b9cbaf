//! The closed set of authorization modes and their shared header contract.
//!
//! [`Authorizer`] is a sum type over exactly three variants. Callers hold it behind an `Arc`,
//! ask it for a header value immediately before dispatching a request, and dispose of it
//! explicitly when the credential should no longer be used.

pub mod delegated;
pub mod passthrough;
pub mod self_signed;

pub use delegated::*;
pub use passthrough::*;
pub use self_signed::*;

// self
use crate::{_prelude::*, obs};

/// Authorization mode labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthMode {
	/// Application identity asserted with a freshly signed JWT.
	SelfSigned,
	/// Installation identity obtained by exchanging an application JWT.
	Delegated,
	/// Externally obtained credential used verbatim.
	Passthrough,
}
impl AuthMode {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AuthMode::SelfSigned => "self_signed",
			AuthMode::Delegated => "delegated",
			AuthMode::Passthrough => "passthrough",
		}
	}
}
impl Display for AuthMode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Produces `Authorization` header values under one of three modes.
#[derive(Debug)]
pub enum Authorizer {
	/// Signs a new application token on every call.
	SelfSigned(SelfSignedAuthorizer),
	/// Exchanges an application token for a cached installation token.
	Delegated(DelegatedAuthorizer),
	/// Formats a fixed credential.
	Passthrough(PassthroughAuthorizer),
}
impl Authorizer {
	/// Returns the variant's mode label.
	pub fn mode(&self) -> AuthMode {
		match self {
			Self::SelfSigned(_) => AuthMode::SelfSigned,
			Self::Delegated(_) => AuthMode::Delegated,
			Self::Passthrough(_) => AuthMode::Passthrough,
		}
	}

	/// Produces the current header value.
	///
	/// Only the delegated variant awaits (on a cache miss). Errors are never swallowed; a
	/// caller that sees one should abort the request it was authorizing.
	pub async fn header(&self) -> Result<String> {
		obs::observe(self.mode(), "header", None, async move {
			match self {
				Self::SelfSigned(inner) => inner.header(),
				Self::Delegated(inner) => inner.header().await,
				Self::Passthrough(inner) => inner.header(),
			}
		})
		.await
	}

	/// Clears key material and cached values. Calling this again is a no-op.
	pub fn dispose(&self) {
		match self {
			Self::SelfSigned(inner) => inner.dispose(),
			Self::Delegated(inner) => inner.dispose(),
			Self::Passthrough(inner) => inner.dispose(),
		}
	}

	/// Returns `true` once [`dispose`](Self::dispose) has run.
	pub fn is_disposed(&self) -> bool {
		match self {
			Self::SelfSigned(inner) => inner.is_disposed(),
			Self::Delegated(inner) => inner.is_disposed(),
			Self::Passthrough(inner) => inner.is_disposed(),
		}
	}
}
impl From<SelfSignedAuthorizer> for Authorizer {
	fn from(inner: SelfSignedAuthorizer) -> Self {
		Self::SelfSigned(inner)
	}
}
impl From<DelegatedAuthorizer> for Authorizer {
	fn from(inner: DelegatedAuthorizer) -> Self {
		Self::Delegated(inner)
	}
}
impl From<PassthroughAuthorizer> for Authorizer {
	fn from(inner: PassthroughAuthorizer) -> Self {
		Self::Passthrough(inner)
	}
}
