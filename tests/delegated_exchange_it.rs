mod common;

// std
use std::{sync::Arc, time::Duration as StdDuration};
// crates.io
use httpmock::prelude::*;
use time::{Duration, macros};
// self
use common::*;
use token_authorizer::{
	authorizer::{Authorizer, DelegatedAuthorizer},
	clock::{Clock, ManualClock},
	error::{Error, ExchangeError, TransportError},
	signer,
};

#[tokio::test]
async fn delegated_header_is_exchanged_once_and_reused() -> TestResult {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(ACCESS_TOKENS_PATH)
				.header("accept", "application/vnd.github.machine-man-preview+json")
				.header_exists("authorization");
			then.status(201)
				.header("content-type", "application/json")
				.body("{\"token\":\"abc123\",\"expires_at\":\"2030-01-01T00:00:00Z\"}");
		})
		.await;
	let authorizer = mock_delegated(&server);

	assert_eq!(authorizer.header().await?, "token abc123");
	assert_eq!(authorizer.header().await?, "token abc123");

	mock.assert_calls_async(1).await;

	let Authorizer::Delegated(inner) = authorizer.as_ref() else {
		panic!("Authorizer should be the delegated variant.");
	};

	assert_eq!(inner.metrics().attempts(), 1);
	assert_eq!(inner.metrics().successes(), 1);

	Ok(())
}

#[tokio::test]
async fn rejected_exchange_is_surfaced_and_retried_on_next_call() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(ACCESS_TOKENS_PATH);
			then.status(403).body("{\"message\":\"Integration suspended\"}");
		})
		.await;
	let authorizer = mock_delegated(&server);
	let err = authorizer.header().await.expect_err("A 403 must not produce a header.");

	assert_eq!(err.status(), Some(403));
	assert!(matches!(err, Error::Exchange(ExchangeError::Status { .. })));
	assert!(err.to_string().contains("Integration suspended"));

	authorizer.header().await.expect_err("Failures must not be cached as successes.");

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn redirects_are_not_followed() {
	let server = MockServer::start_async().await;
	let redirect = server
		.mock_async(|when, then| {
			when.method(POST).path(ACCESS_TOKENS_PATH);
			then.status(307).header("location", "/elsewhere");
		})
		.await;
	let elsewhere = server
		.mock_async(|when, then| {
			when.path("/elsewhere");
			then.status(201).body("{\"token\":\"leaked\"}");
		})
		.await;
	let err = mock_delegated(&server)
		.header()
		.await
		.expect_err("A redirect is not a successful exchange.");

	assert_eq!(err.status(), Some(307));

	redirect.assert_async().await;
	elsewhere.assert_calls_async(0).await;
}

#[tokio::test]
async fn slow_authorities_time_out() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path(ACCESS_TOKENS_PATH);
			then.status(201).delay(StdDuration::from_secs(2)).body("{\"token\":\"late\"}");
		})
		.await;
	let exchange = mock_exchange_with_timeout(&server, StdDuration::from_millis(200));
	let authorizer = DelegatedAuthorizer::new(ISSUER, DELEGATE, signing_key(), exchange);
	let err = authorizer.header().await.expect_err("The deadline should abort the exchange.");

	assert!(matches!(
		err,
		Error::Exchange(ExchangeError::Transport(TransportError::Timeout { .. }))
	));
	assert!(authorizer.cached_token().is_none());
}

#[tokio::test]
async fn concurrent_misses_share_one_exchange() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(ACCESS_TOKENS_PATH);
			then.status(201).delay(StdDuration::from_millis(200)).body("{\"token\":\"abc123\"}");
		})
		.await;
	let authorizer = mock_delegated(&server);
	let handles = (0..16)
		.map(|_| {
			let authorizer = authorizer.clone();

			tokio::spawn(async move { authorizer.header().await })
		})
		.collect::<Vec<_>>();

	for handle in handles {
		let header = handle
			.await
			.expect("Header task should not panic.")
			.expect("Every concurrent caller should get the shared token.");

		assert_eq!(header, "token abc123");
	}

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn concurrent_misses_share_one_failed_exchange() {
	let exchange = Arc::new(SlowExchange::new(
		StdDuration::from_millis(100),
		403,
		"{\"message\":\"Resource not accessible by integration\"}",
	));
	let authorizer = Arc::new(Authorizer::from(DelegatedAuthorizer::new(
		ISSUER,
		DELEGATE,
		signing_key(),
		exchange.clone(),
	)));
	let handles = (0..16)
		.map(|_| {
			let authorizer = authorizer.clone();

			tokio::spawn(async move { authorizer.header().await })
		})
		.collect::<Vec<_>>();

	for handle in handles {
		let err = handle
			.await
			.expect("Header task should not panic.")
			.expect_err("Every concurrent caller should see the rejection.");

		assert_eq!(err.status(), Some(403));
		assert!(err.to_string().contains("Resource not accessible"));
	}

	assert_eq!(exchange.calls(), 1);

	authorizer.header().await.expect_err("A later call should retry the exchange.");

	assert_eq!(exchange.calls(), 2);
}

#[tokio::test]
async fn expiry_triggers_exactly_one_new_exchange() {
	let clock = ManualClock::new(macros::datetime!(2025-03-01 12:00 UTC));
	let exchange = Arc::new(SlowExchange::new(
		StdDuration::from_millis(50),
		201,
		"{\"token\":\"abc123\"}",
	));
	let authorizer = Arc::new(Authorizer::from(
		DelegatedAuthorizer::new(ISSUER, DELEGATE, signing_key(), exchange.clone())
			.with_clock(Arc::new(clock.clone())),
	));

	authorizer.header().await.expect("Cold start should exchange.");
	clock.advance(Duration::minutes(58));
	authorizer.header().await.expect("Token should still be cached.");

	assert_eq!(exchange.calls(), 1);

	clock.advance(Duration::minutes(2));

	let (a, b, c) = tokio::join!(authorizer.header(), authorizer.header(), authorizer.header());

	for header in [a, b, c] {
		assert_eq!(header.expect("Refresh should succeed."), "token abc123");
	}

	assert_eq!(exchange.calls(), 2);
}

#[tokio::test]
async fn cancelled_exchange_releases_the_guard() {
	let exchange = Arc::new(SlowExchange::new(
		StdDuration::from_secs(5),
		201,
		"{\"token\":\"abc123\"}",
	));
	let authorizer = DelegatedAuthorizer::new(ISSUER, DELEGATE, signing_key(), exchange.clone());
	let cancelled =
		tokio::time::timeout(StdDuration::from_millis(50), authorizer.header()).await;

	assert!(cancelled.is_err(), "The hung exchange should have been cancelled.");
	assert!(authorizer.cached_token().is_none());

	let retry =
		tokio::time::timeout(StdDuration::from_millis(50), authorizer.header()).await;

	assert!(retry.is_err(), "A second attempt should reach the exchange again, not deadlock.");
	assert_eq!(exchange.calls(), 2);
}

#[tokio::test]
async fn disposal_during_exchange_discards_the_result() {
	let exchange = Arc::new(SlowExchange::new(
		StdDuration::from_millis(100),
		201,
		"{\"token\":\"abc123\"}",
	));
	let authorizer = Arc::new(DelegatedAuthorizer::new(ISSUER, DELEGATE, signing_key(), exchange));
	let pending = tokio::spawn({
		let authorizer = authorizer.clone();

		async move { authorizer.header().await }
	});

	tokio::time::sleep(StdDuration::from_millis(20)).await;
	authorizer.dispose();

	let result = pending.await.expect("Header task should not panic.");

	assert!(matches!(result, Err(Error::Disposed)));
	assert!(authorizer.cached_token().is_none());
}

#[test]
fn application_token_claims_follow_the_clock() {
	let clock = ManualClock::new(macros::datetime!(2025-03-01 12:00 UTC));
	let signed =
		signer::sign(ISSUER, &signing_key(), clock.now()).expect("Signing should succeed.");

	assert_eq!(signed.claims.iss, "123456");
	assert_eq!(signed.claims.exp - signed.claims.iat, 60);
}
