//! Reqwest transport for `oauth2` token and revocation requests.
//!
//! [`ReqwestHttpClient`] implements [`AsyncHttpClient`] so
//! [`StandardAuthenticator`](crate::authenticator::StandardAuthenticator) can hand it straight to
//! the `oauth2` request builders. Token endpoints answer directly instead of delegating to
//! another URI, so the client built by [`ReqwestHttpClient::without_redirects`] never follows
//! redirects; configure any custom [`ReqwestClient`] the same way.

// std
use std::{ops::Deref, time::Duration as StdDuration};
// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
use reqwest::redirect::Policy;
// self
use crate::{_prelude::*, error::ConfigError};

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Request timeout applied by [`ReqwestHttpClient::without_redirects`].
	pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(30);

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client that never follows redirects and gives up after
	/// [`Self::DEFAULT_TIMEOUT`].
	pub fn without_redirects() -> Result<Self, ConfigError> {
		let client =
			ReqwestClient::builder().redirect(Policy::none()).timeout(Self::DEFAULT_TIMEOUT).build()?;

		Ok(Self(client))
	}
}
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl<'c> AsyncHttpClient<'c> for ReqwestHttpClient {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			let response =
				self.0.execute(request.try_into().map_err(Box::new)?).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
