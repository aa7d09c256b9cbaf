//! Attaches [`Authorizer`] header values to outbound `reqwest` requests.

// crates.io
#[cfg(feature = "reqwest")]
use reqwest::{
	RequestBuilder,
	header::{AUTHORIZATION, HeaderValue},
};
// self
#[cfg(feature = "reqwest")] use crate::error::ConfigError;
use crate::{_prelude::*, authorizer::Authorizer};

/// Boxed future returned by [`AuthorizeRequestExt::authorize`].
pub type AuthorizeFuture<'a, Request> = Pin<Box<dyn Future<Output = Result<Request>> + 'a + Send>>;

/// Injects an authorizer's current header value into a request right before dispatch.
///
/// Errors from the authorizer propagate unchanged so the caller can abort the request instead
/// of sending it unauthenticated.
pub trait AuthorizeRequestExt
where
	Self: Sized + Send,
{
	/// Sets the `Authorization` header on `self` from `authorizer`.
	fn authorize<'a>(self, authorizer: &'a Authorizer) -> AuthorizeFuture<'a, Self>
	where
		Self: 'a;
}
#[cfg(feature = "reqwest")]
impl AuthorizeRequestExt for RequestBuilder {
	fn authorize<'a>(self, authorizer: &'a Authorizer) -> AuthorizeFuture<'a, Self>
	where
		Self: 'a,
	{
		Box::pin(async move {
			let mut value = HeaderValue::from_str(&authorizer.header().await?)
				.map_err(|_| ConfigError::InvalidHeaderValue { name: "authorization" })?;

			value.set_sensitive(true);

			Ok::<_, Error>(self.header(AUTHORIZATION, value))
		})
	}
}
