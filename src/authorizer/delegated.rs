//! Installation authorizer backed by a single-flight credential exchange.
//!
//! A cache hit returns the stored `token <value>` without touching the key or the network. A
//! miss (cold start or expiry) signs a transient application token, POSTs it to
//! `app/installations/{delegate}/access_tokens`, and caches the result until one minute before
//! the authority's one-hour lifetime ends. Concurrent misses share a single exchange; failures
//! are surfaced unchanged and leave the cache empty so the next call retries.

// std
use std::path::Path;
// self
use crate::{
	_prelude::*,
	auth::{CachedToken, DelegateId, IssuerId, SigningKey, TokenSecret},
	authorizer::{AuthMode, SelfSignedAuthorizer},
	cache::CredentialCache,
	clock::{self, Clock},
	error::ExchangeError,
	http::{CredentialExchangeClient, ExchangeResponse},
	obs::{self, OutcomeCounters},
};

/// Lifetime the authority grants to delegated tokens.
pub const DELEGATED_TOKEN_TTL: Duration = Duration::hours(1);
/// Margin subtracted from [`DELEGATED_TOKEN_TTL`] so tokens never expire mid-request.
pub const DELEGATED_SAFETY_MARGIN: Duration = Duration::minutes(1);

/// Authorizes as an installation acting for an application.
pub struct DelegatedAuthorizer {
	issuer_id: IssuerId,
	delegate_id: DelegateId,
	key: Arc<SigningKey>,
	exchange: Arc<dyn CredentialExchangeClient>,
	cache: CredentialCache,
	clock: Arc<dyn Clock>,
	metrics: Arc<OutcomeCounters>,
}
impl DelegatedAuthorizer {
	/// Creates an authorizer that exclusively owns `key` and exchanges through `exchange`.
	pub fn new(
		issuer_id: IssuerId,
		delegate_id: DelegateId,
		key: SigningKey,
		exchange: Arc<dyn CredentialExchangeClient>,
	) -> Self {
		Self {
			issuer_id,
			delegate_id,
			key: Arc::new(key),
			exchange,
			cache: CredentialCache::new(),
			clock: clock::system(),
			metrics: Default::default(),
		}
	}

	/// Parses `pem` and creates an authorizer; malformed keys fail here.
	pub fn from_pem(
		issuer_id: IssuerId,
		delegate_id: DelegateId,
		pem: impl AsRef<[u8]>,
		exchange: Arc<dyn CredentialExchangeClient>,
	) -> Result<Self> {
		Ok(Self::new(issuer_id, delegate_id, SigningKey::from_pem(pem)?, exchange))
	}

	/// Reads a PEM key file and creates an authorizer.
	pub fn from_pem_file(
		issuer_id: IssuerId,
		delegate_id: DelegateId,
		path: impl AsRef<Path>,
		exchange: Arc<dyn CredentialExchangeClient>,
	) -> Result<Self> {
		Ok(Self::new(issuer_id, delegate_id, SigningKey::from_pem_file(path)?, exchange))
	}

	/// Overrides the clock used for cache freshness and application token claims.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Shares exchange counters, e.g. across authorizers for the same application.
	pub fn with_metrics(mut self, metrics: Arc<OutcomeCounters>) -> Self {
		self.metrics = metrics;

		self
	}

	/// Returns the issuer identifier.
	pub fn issuer_id(&self) -> IssuerId {
		self.issuer_id
	}

	/// Returns the delegate identifier.
	pub fn delegate_id(&self) -> DelegateId {
		self.delegate_id
	}

	/// Exchange counters for this authorizer.
	pub fn metrics(&self) -> &OutcomeCounters {
		&self.metrics
	}

	/// Copy of the cached token, if any, regardless of freshness.
	pub fn cached_token(&self) -> Option<CachedToken> {
		self.cache.current()
	}

	/// Relative path of the token issuance endpoint for this delegate.
	pub fn access_tokens_path(&self) -> String {
		format!("app/installations/{}/access_tokens", self.delegate_id)
	}

	/// Returns the cached `token <value>` header, exchanging for a new one when needed.
	pub async fn header(&self) -> Result<String> {
		let value = self.cache.get_or_refresh(self.clock.as_ref(), || self.exchange()).await?;

		Ok(value.expose().to_owned())
	}

	/// Clears the key and the cached token. Calling this again is a no-op.
	pub fn dispose(&self) {
		self.cache.close();
		self.key.dispose();
	}

	/// Returns `true` once [`dispose`](Self::dispose) has run.
	pub fn is_disposed(&self) -> bool {
		self.cache.is_closed()
	}

	async fn exchange(&self) -> Result<CachedToken> {
		let tally = Some(self.metrics.as_ref());

		obs::observe(AuthMode::Delegated, "exchange", tally, self.exchange_once()).await
	}

	async fn exchange_once(&self) -> Result<CachedToken> {
		let app =
			SelfSignedAuthorizer::sharing(self.issuer_id, self.key.clone(), self.clock.clone());
		let path = self.access_tokens_path();
		let response = self.exchange.issue_token(&app, &path).await?;
		let token = decode_access_token(&response)?;
		let now = self.clock.now();

		Ok(CachedToken::new(
			format!("token {}", token.expose()),
			now,
			Some(now + DELEGATED_TOKEN_TTL - DELEGATED_SAFETY_MARGIN),
		))
	}
}
impl Debug for DelegatedAuthorizer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DelegatedAuthorizer")
			.field("issuer_id", &self.issuer_id)
			.field("delegate_id", &self.delegate_id)
			.field("key", &self.key)
			.field("cache", &self.cache)
			.field("metrics", &self.metrics)
			.finish()
	}
}

#[derive(Deserialize)]
struct AccessTokenResponse {
	token: TokenSecret,
}

fn decode_access_token(response: &ExchangeResponse) -> Result<TokenSecret, ExchangeError> {
	let status = response.status;

	if !response.is_success() {
		return Err(ExchangeError::Status { status, message: response.body_preview() });
	}

	let mut deserializer = serde_json::Deserializer::from_slice(&response.body);
	let parsed: AccessTokenResponse = serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| ExchangeError::InvalidBody { status, source })?;

	Ok(parsed.token)
}
