//! Authorizer error types shared across signing, exchange, and configuration paths.

// std
use std::path::PathBuf;
// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by every header-producing API.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Key parsing or JWT signing failure.
	#[error(transparent)]
	Signing(#[from] SigningError),
	/// Delegated credential exchange failure.
	#[error(transparent)]
	Exchange(#[from] ExchangeError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// A failed refresh handed to every caller that was waiting on it.
	#[error(transparent)]
	Shared(Arc<Error>),

	/// The authorizer was disposed and can no longer produce headers.
	#[error("Authorizer has been disposed.")]
	Disposed,
}
impl Error {
	/// HTTP status returned by the credential authority, when one was received.
	pub fn status(&self) -> Option<u16> {
		match self.root() {
			Self::Exchange(e) => e.status(),
			_ => None,
		}
	}

	/// Looks through [`Error::Shared`] to the failure that actually happened.
	pub fn root(&self) -> &Error {
		match self {
			Self::Shared(e) => e.root(),
			e => e,
		}
	}
}
impl From<TransportError> for Error {
	fn from(e: TransportError) -> Self {
		Self::Exchange(e.into())
	}
}

/// Failures raised while loading keys or signing application tokens.
#[derive(Debug, ThisError)]
pub enum SigningError {
	/// The PEM input is not a usable RSA private key.
	#[error("Signing key is not a valid RSA private key.")]
	InvalidKey {
		/// Underlying key parsing failure.
		#[source]
		source: jsonwebtoken::errors::Error,
	},
	/// The key file could not be read.
	#[error("Signing key file `{}` could not be read.", path.display())]
	KeyRead {
		/// Path that was requested.
		path: PathBuf,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// The signature algorithm rejected the claim set.
	#[error("Unable to sign the application token.")]
	Sign {
		/// Underlying signing failure.
		#[source]
		source: jsonwebtoken::errors::Error,
	},
	/// Key material was cleared by a disposal.
	#[error("Signing key has been disposed.")]
	KeyDisposed,
	/// A compact token did not have three dot-separated segments.
	#[error("Token is not a compact JWT: {reason}.")]
	MalformedToken {
		/// Which part of the token was malformed.
		reason: &'static str,
	},
	/// The claims segment could not be decoded.
	#[error("Token claims could not be decoded.")]
	ClaimsDecode {
		/// Underlying JSON failure.
		#[source]
		source: serde_json::Error,
	},
}

/// Failures raised while trading an application token for a delegated token.
#[derive(Debug, ThisError)]
pub enum ExchangeError {
	/// The authority answered with a non-2xx status.
	#[error("Credential exchange returned HTTP {status}: {message}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Bounded preview of the response body.
		message: String,
	},
	/// The authority answered 2xx but the body lacked a string `token` field.
	#[error("Credential exchange returned an unexpected body (HTTP {status}).")]
	InvalidBody {
		/// HTTP status code.
		status: u16,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Transport failure before any status was received.
	#[error(transparent)]
	Transport(#[from] TransportError),
}
impl ExchangeError {
	/// HTTP status code, when the authority answered at all.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } | Self::InvalidBody { status, .. } => Some(*status),
			Self::Transport(_) => None,
		}
	}
}

/// Transport-level failures (network, timeout).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the credential authority.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The exchange call exceeded its configured deadline.
	#[error("Credential authority did not answer before the deadline.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Exchange base URL or path cannot be parsed.
	#[error("Credential authority URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A header value contains characters HTTP forbids.
	#[error("Header `{name}` has an invalid value.")]
	InvalidHeaderValue {
		/// Header name.
		name: &'static str,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
