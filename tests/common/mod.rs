//! Fixtures shared by the integration tests.

#![allow(dead_code)]

// std
use std::{
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration as StdDuration,
};
// crates.io
use httpmock::MockServer;
use reqwest::{Client, redirect::Policy};
// self
use token_authorizer::{
	auth::{DelegateId, IssuerId, SigningKey},
	authorizer::{Authorizer, DelegatedAuthorizer, SelfSignedAuthorizer},
	error::Error,
	http::{
		CredentialExchangeClient, ExchangeConfig, ExchangeFuture, ExchangeResponse,
		ReqwestExchangeClient,
	},
};

pub type TestResult = color_eyre::Result<()>;

pub const RSA_PRIVATE_PEM: &[u8] = include_bytes!("../fixtures/rsa_private.pem");
pub const RSA_PUBLIC_PEM: &[u8] = include_bytes!("../fixtures/rsa_public.pem");
pub const RSA_PRIVATE_PATH: &str =
	concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/rsa_private.pem");

pub const ISSUER: IssuerId = IssuerId::new(123456);
pub const DELEGATE: DelegateId = DelegateId::new(678903);
pub const ACCESS_TOKENS_PATH: &str = "/app/installations/678903/access_tokens";

pub fn signing_key() -> SigningKey {
	SigningKey::from_pem(RSA_PRIVATE_PEM).expect("RSA fixture should parse as a signing key.")
}

/// Builds a reqwest client that accepts the self-signed certificates produced by `httpmock`.
///
/// Mirrors what [`ReqwestExchangeClient::new`] configures: no redirects and a request deadline.
pub fn test_reqwest_client(timeout: StdDuration) -> Client {
	Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.redirect(Policy::none())
		.timeout(timeout)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.")
}

/// Exchange client pointed at a mock authority, with the default deadline.
pub fn mock_exchange(server: &MockServer) -> Arc<ReqwestExchangeClient> {
	mock_exchange_with_timeout(server, StdDuration::from_secs(30))
}

/// Exchange client pointed at a mock authority, giving up after `timeout`.
pub fn mock_exchange_with_timeout(
	server: &MockServer,
	timeout: StdDuration,
) -> Arc<ReqwestExchangeClient> {
	let config =
		ExchangeConfig::parse(&server.base_url()).expect("Mock base URL should parse.");

	Arc::new(ReqwestExchangeClient::with_client(test_reqwest_client(timeout), config))
}

/// Delegated authorizer for [`ISSUER`]/[`DELEGATE`] exchanging against `server`.
pub fn mock_delegated(server: &MockServer) -> Arc<Authorizer> {
	Arc::new(
		DelegatedAuthorizer::new(ISSUER, DELEGATE, signing_key(), mock_exchange(server)).into(),
	)
}

/// In-process exchange client that stalls before answering, to widen race windows.
#[derive(Debug)]
pub struct SlowExchange {
	calls: AtomicUsize,
	delay: StdDuration,
	status: u16,
	body: String,
}
impl SlowExchange {
	pub fn new(delay: StdDuration, status: u16, body: &str) -> Self {
		Self { calls: AtomicUsize::new(0), delay, status, body: body.to_owned() }
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl CredentialExchangeClient for SlowExchange {
	fn issue_token<'a>(
		&'a self,
		authorizer: &'a SelfSignedAuthorizer,
		_path: &'a str,
	) -> ExchangeFuture<'a> {
		Box::pin(async move {
			let _ = authorizer.header()?;

			self.calls.fetch_add(1, Ordering::SeqCst);
			tokio::time::sleep(self.delay).await;

			Ok::<_, Error>(ExchangeResponse::new(self.status, self.body.clone()))
		})
	}
}
