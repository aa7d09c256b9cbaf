//! Transport seam for the delegated credential exchange.
//!
//! [`CredentialExchangeClient`] is the only HTTP dependency of the authorizers. The delegated
//! authorizer hands it a transient [`SelfSignedAuthorizer`] and a relative path; the client
//! attaches the application token, POSTs an empty body, and returns the raw status and body so
//! the authorizer can classify the outcome itself.

// std
#[cfg(feature = "reqwest")] use std::time::Duration as StdDuration;
// crates.io
#[cfg(feature = "reqwest")]
use reqwest::{
	header::{ACCEPT, AUTHORIZATION, HeaderValue, USER_AGENT},
	redirect::Policy,
};
// self
#[cfg(feature = "reqwest")] use crate::error::TransportError;
use crate::{_prelude::*, authorizer::SelfSignedAuthorizer, error::ConfigError};

/// Default authority base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.github.com/";
/// Default media type requested from the authority.
pub const DEFAULT_ACCEPT: &str = "application/vnd.github.machine-man-preview+json";
/// Default per-request deadline for exchange calls, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const BODY_PREVIEW_LEN: usize = 256;

/// Boxed future returned by [`CredentialExchangeClient::issue_token`].
pub type ExchangeFuture<'a> = Pin<Box<dyn Future<Output = Result<ExchangeResponse>> + 'a + Send>>;

/// Performs the token issuance round trip for delegated authorizers.
///
/// Implementations must attach `authorizer`'s header verbatim and must not retry; the
/// delegated authorizer holds its single-flight guard for the whole call, so implementations
/// should also bound how long a call may take.
pub trait CredentialExchangeClient
where
	Self: Send + Sync,
{
	/// POSTs an empty body to `path` (relative to the authority base URL).
	fn issue_token<'a>(
		&'a self,
		authorizer: &'a SelfSignedAuthorizer,
		path: &'a str,
	) -> ExchangeFuture<'a>;
}

/// Status and body returned by the credential authority.
#[derive(Clone, PartialEq, Eq)]
pub struct ExchangeResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ExchangeResponse {
	/// Creates a response from its parts.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, body: body.into() }
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Lossy, length-bounded body text for error messages.
	pub fn body_preview(&self) -> String {
		String::from_utf8_lossy(&self.body).chars().take(BODY_PREVIEW_LEN).collect()
	}
}
impl Debug for ExchangeResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		// Successful bodies carry the delegated token.
		f.debug_struct("ExchangeResponse")
			.field("status", &self.status)
			.field("body_len", &self.body.len())
			.finish()
	}
}

/// Where and how exchange requests are sent.
#[derive(Clone, Debug)]
pub struct ExchangeConfig {
	/// Authority base URL; always ends with `/`.
	pub base_url: Url,
	/// `Accept` header value.
	pub accept: String,
	/// `User-Agent` header value.
	pub user_agent: String,
	/// Per-request deadline applied by the built-in client.
	pub timeout: Duration,
}
impl ExchangeConfig {
	/// Creates a config rooted at `base_url`.
	pub fn new(mut base_url: Url) -> Self {
		if !base_url.path().ends_with('/') {
			let path = format!("{}/", base_url.path());

			base_url.set_path(&path);
		}

		Self {
			base_url,
			accept: DEFAULT_ACCEPT.into(),
			user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).into(),
			timeout: Duration::seconds(DEFAULT_TIMEOUT_SECS as i64),
		}
	}

	/// Parses `base_url` and creates a config rooted at it.
	pub fn parse(base_url: &str) -> Result<Self, ConfigError> {
		let url = Url::parse(base_url).map_err(|source| ConfigError::InvalidBaseUrl { source })?;

		Ok(Self::new(url))
	}

	/// Overrides the `Accept` header.
	pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
		self.accept = accept.into();

		self
	}

	/// Overrides the `User-Agent` header.
	pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = user_agent.into();

		self
	}

	/// Overrides the per-request deadline; negative values are treated as zero.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = if timeout.is_negative() { Duration::ZERO } else { timeout };

		self
	}

	/// Resolves `path` beneath the base URL. A leading `/` is ignored.
	pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		self.base_url
			.join(path.trim_start_matches('/'))
			.map_err(|source| ConfigError::InvalidBaseUrl { source })
	}
}

/// Reqwest-backed [`CredentialExchangeClient`].
///
/// Redirects are not followed: the authority answers token requests directly.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestExchangeClient {
	client: ReqwestClient,
	config: ExchangeConfig,
}
#[cfg(feature = "reqwest")]
impl ReqwestExchangeClient {
	/// Builds a client that applies `config.timeout` to every request.
	pub fn new(config: ExchangeConfig) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.redirect(Policy::none())
			.timeout(to_std(config.timeout))
			.build()?;

		Ok(Self { client, config })
	}

	/// Wraps a caller-configured reqwest client; its own timeout settings apply.
	pub fn with_client(client: ReqwestClient, config: ExchangeConfig) -> Self {
		Self { client, config }
	}

	/// Returns the active configuration.
	pub fn config(&self) -> &ExchangeConfig {
		&self.config
	}

	async fn post(
		&self,
		authorizer: &SelfSignedAuthorizer,
		path: &str,
	) -> Result<ExchangeResponse> {
		let url = self.config.endpoint(path)?;
		let mut authorization = HeaderValue::from_str(&authorizer.header()?)
			.map_err(|_| ConfigError::InvalidHeaderValue { name: "authorization" })?;

		authorization.set_sensitive(true);

		let accept = HeaderValue::from_str(&self.config.accept)
			.map_err(|_| ConfigError::InvalidHeaderValue { name: "accept" })?;
		let user_agent = HeaderValue::from_str(&self.config.user_agent)
			.map_err(|_| ConfigError::InvalidHeaderValue { name: "user-agent" })?;
		let response = self
			.client
			.post(url)
			.header(AUTHORIZATION, authorization)
			.header(ACCEPT, accept)
			.header(USER_AGENT, user_agent)
			.send()
			.await
			.map_err(TransportError::from)?;
		let status = response.status().as_u16();
		let body = response.bytes().await.map_err(TransportError::from)?;

		Ok(ExchangeResponse::new(status, body.to_vec()))
	}
}
#[cfg(feature = "reqwest")]
impl CredentialExchangeClient for ReqwestExchangeClient {
	fn issue_token<'a>(
		&'a self,
		authorizer: &'a SelfSignedAuthorizer,
		path: &'a str,
	) -> ExchangeFuture<'a> {
		Box::pin(self.post(authorizer, path))
	}
}

#[cfg(feature = "reqwest")]
fn to_std(duration: Duration) -> StdDuration {
	StdDuration::try_from(duration).unwrap_or(StdDuration::ZERO)
}
