//! Cached header values and their validity windows.

// crates.io
use zeroize::Zeroize;
// self
use crate::{_prelude::*, auth::TokenSecret};

/// A previously produced `Authorization` header value.
///
/// `issued_at <= valid_until` always holds; [`CachedToken::new`] clamps an earlier expiry up to
/// the issue instant. A token without `valid_until` never expires.
#[derive(Clone)]
pub struct CachedToken {
	/// Exact header value, including the scheme prefix.
	pub header_value: TokenSecret,
	/// Instant the value was produced. Diagnostic only.
	pub issued_at: OffsetDateTime,
	/// Last instant at which the value may be reused.
	pub valid_until: Option<OffsetDateTime>,
}
impl CachedToken {
	/// Creates a cached value, clamping `valid_until` so it never precedes `issued_at`.
	pub fn new(
		header_value: impl Into<String>,
		issued_at: OffsetDateTime,
		valid_until: Option<OffsetDateTime>,
	) -> Self {
		Self {
			header_value: TokenSecret::new(header_value),
			issued_at,
			valid_until: valid_until.map(|until| until.max(issued_at)),
		}
	}

	/// Returns `true` if the value may still be used at `now` (inclusive bound).
	pub fn is_usable_at(&self, now: OffsetDateTime) -> bool {
		self.valid_until.is_none_or(|until| now <= until)
	}

	/// Overwrites the header value in place.
	pub fn clear(&mut self) {
		self.header_value.zeroize();
	}
}
impl Debug for CachedToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CachedToken")
			.field("header_value", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.field("valid_until", &self.valid_until)
			.finish()
	}
}
