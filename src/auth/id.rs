//! Numeric identifiers assigned by the credential authority.

// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(u64);
		impl $name {
			/// Wraps a raw identifier.
			pub const fn new(value: u64) -> Self {
				Self(value)
			}

			/// Returns the raw identifier.
			pub const fn get(self) -> u64 {
				self.0
			}

			/// Returns `true` for the zero value, which the authority never assigns.
			pub const fn is_unset(self) -> bool {
				self.0 == 0
			}
		}
		impl From<u64> for $name {
			fn from(value: u64) -> Self {
				Self(value)
			}
		}
		impl From<$name> for u64 {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				Display::fmt(&self.0, f)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				s.trim()
					.parse::<u64>()
					.map(Self)
					.map_err(|_| IdentifierError::NotNumeric { kind: $kind, value: s.to_owned() })
			}
		}
	};
}

/// Error returned when parsing an identifier from text fails.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdentifierError {
	/// The input was not an unsigned integer.
	#[error("{kind} identifier `{value}` is not an unsigned integer.")]
	NotNumeric {
		/// Kind of identifier (issuer, delegate).
		kind: &'static str,
		/// Rejected input.
		value: String,
	},
}

def_id! { IssuerId, "Identifier of the top-level credential holder (an application).", "Issuer" }
def_id! { DelegateId, "Identifier of a principal acting for an issuer.", "Delegate" }
