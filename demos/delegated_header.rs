//! Demonstrates exchanging an application JWT for a cached installation token against a mock
//! authority, then reusing it through the registry.

// std
use std::{sync::Arc, time::Duration};
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use token_authorizer::{
	auth::{DelegateId, IssuerId},
	authorizer::{Authorizer, DelegatedAuthorizer},
	http::{ExchangeConfig, ReqwestExchangeClient},
	registry::AuthorizerRegistry,
	reqwest::{Client, redirect::Policy},
};

const PRIVATE_KEY: &[u8] = include_bytes!("../tests/fixtures/rsa_private.pem");

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/app/installations/678903/access_tokens");
			then.status(201)
				.header("content-type", "application/json")
				.body("{\"token\":\"ghs_demo\",\"expires_at\":\"2030-01-01T00:00:00Z\"}");
		})
		.await;
	let config = ExchangeConfig::parse(&server.base_url())?;
	// The mock authority serves a self-signed certificate.
	let client = Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.redirect(Policy::none())
		.timeout(Duration::from_secs(30))
		.build()?;
	let exchange = Arc::new(ReqwestExchangeClient::with_client(client, config));
	let authorizer = Arc::new(Authorizer::from(DelegatedAuthorizer::from_pem(
		IssuerId::new(123456),
		DelegateId::new(678903),
		PRIVATE_KEY,
		exchange,
	)?));
	let registry = AuthorizerRegistry::new();

	registry.register(&authorizer);

	println!("First header: {}.", authorizer.header().await?);

	let reused = registry
		.find_by_delegate(IssuerId::new(123456), DelegateId::new(678903))
		.ok_or_else(|| color_eyre::eyre::eyre!("Registered authorizer should be found."))?;

	println!("Reused header: {}.", reused.header().await?);

	token_mock.assert_async().await;
	authorizer.dispose();

	Ok(())
}
