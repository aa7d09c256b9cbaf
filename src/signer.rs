//! Short-lived RS256 application tokens.
//!
//! The credential authority rejects application tokens valid for more than sixty seconds, so
//! [`sign`] always stamps `exp = iat + 60s` from the instant it is given.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use crate::{
	_prelude::*,
	auth::{IssuerId, SigningKey, TokenSecret},
	error::SigningError,
};

/// Lifetime of every self-signed token.
pub const SELF_SIGNED_TTL: Duration = Duration::seconds(60);

/// Registered JWT claims asserted by a self-signed token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
	/// Issued-at, seconds since the Unix epoch.
	pub iat: i64,
	/// Expiry, seconds since the Unix epoch.
	pub exp: i64,
	/// Decimal issuer identifier.
	pub iss: String,
}
impl Claims {
	/// Builds the claim set for `issuer` at `now`.
	pub fn new(issuer: IssuerId, now: OffsetDateTime) -> Self {
		let iat = now.unix_timestamp();

		Self { iat, exp: iat + SELF_SIGNED_TTL.whole_seconds(), iss: issuer.to_string() }
	}
}

/// Compact signed token plus the claims it carries.
#[derive(Clone, Debug)]
pub struct SignedToken {
	/// Compact JWS serialization.
	pub token: TokenSecret,
	/// Claims that were signed.
	pub claims: Claims,
}

/// Signs a fresh claim set for `issuer` at `now`.
pub fn sign(
	issuer: IssuerId,
	key: &SigningKey,
	now: OffsetDateTime,
) -> Result<SignedToken, SigningError> {
	let claims = Claims::new(issuer, now);
	let token = TokenSecret::new(key.sign(&claims)?);

	Ok(SignedToken { token, claims })
}

/// Decodes the claims segment of a compact token without verifying its signature.
pub fn peek_claims(token: &str) -> Result<Claims, SigningError> {
	let mut segments = token.split('.');
	let (Some(_header), Some(payload), Some(_signature), None) =
		(segments.next(), segments.next(), segments.next(), segments.next())
	else {
		return Err(SigningError::MalformedToken { reason: "expected three segments" });
	};
	let raw = URL_SAFE_NO_PAD
		.decode(payload)
		.map_err(|_| SigningError::MalformedToken { reason: "payload is not base64url" })?;

	serde_json::from_slice(&raw).map_err(|source| SigningError::ClaimsDecode { source })
}

#[cfg(test)]
mod tests {
	// crates.io
	use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};
	use time::macros;
	// self
	use super::*;
	use crate::_preludet::*;

	fn validation() -> Validation {
		let mut validation = Validation::new(Algorithm::RS256);

		validation.leeway = 0;
		validation.set_issuer(&["123456"]);

		validation
	}

	#[test]
	fn claims_expire_sixty_seconds_after_issue() {
		let now = macros::datetime!(2025-03-01 10:00:30 UTC);
		let signed = sign(IssuerId::new(123456), &test_signing_key(), now)
			.expect("Signing with the fixture key should succeed.");

		assert_eq!(signed.claims.iat, now.unix_timestamp());
		assert_eq!(signed.claims.exp, now.unix_timestamp() + 60);
		assert_eq!(signed.claims.iss, "123456");
		assert_eq!(
			peek_claims(signed.token.expose()).expect("Signed token should decode."),
			signed.claims
		);
	}

	#[test]
	fn signature_verifies_with_the_public_key() {
		let signed = sign(IssuerId::new(123456), &test_signing_key(), OffsetDateTime::now_utc())
			.expect("Signing with the fixture key should succeed.");
		let decoding =
			DecodingKey::from_rsa_pem(RSA_PUBLIC_PEM).expect("Public fixture should parse.");
		let data = jsonwebtoken::decode::<Claims>(signed.token.expose(), &decoding, &validation())
			.expect("Fresh token should verify.");

		assert_eq!(data.claims, signed.claims);
		assert_eq!(data.header.alg, Algorithm::RS256);
	}

	#[test]
	fn verification_fails_after_the_window() {
		let issued = OffsetDateTime::now_utc() - Duration::seconds(61);
		let signed = sign(IssuerId::new(123456), &test_signing_key(), issued)
			.expect("Signing with the fixture key should succeed.");
		let decoding =
			DecodingKey::from_rsa_pem(RSA_PUBLIC_PEM).expect("Public fixture should parse.");
		let err = jsonwebtoken::decode::<Claims>(signed.token.expose(), &decoding, &validation())
			.expect_err("Token older than its window must not verify.");

		assert!(matches!(err.kind(), ErrorKind::ExpiredSignature));
	}

	#[test]
	fn peek_rejects_malformed_tokens() {
		assert!(matches!(peek_claims("a.b"), Err(SigningError::MalformedToken { .. })));
		assert!(matches!(peek_claims("a.b.c.d"), Err(SigningError::MalformedToken { .. })));
		assert!(matches!(peek_claims("a.!!!.c"), Err(SigningError::MalformedToken { .. })));
		assert!(matches!(
			peek_claims(&format!("a.{}.c", URL_SAFE_NO_PAD.encode("[]"))),
			Err(SigningError::ClaimsDecode { .. })
		));
	}
}
