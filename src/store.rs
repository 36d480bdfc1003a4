//! Personal-access-token storage contract and the built-in in-memory backend.

pub mod memory;

pub use memory::MemoryTokenStore;

// self
use crate::{
	_prelude::*,
	auth::{AuthenticationSubject, TokenSecret, UserId},
};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Externally-owned store of long-lived personal access tokens.
///
/// The broker only reads from it, as the last step of the token fallback chain.
/// Implementations own their timeout discipline; a timeout must surface as
/// [`StoreError::Communication`].
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Finds the personal access token `subject` stored for the SCM at `endpoint_url`.
	fn find<'a>(
		&'a self,
		subject: &'a AuthenticationSubject,
		endpoint_url: &'a Url,
	) -> StoreFuture<'a, Option<PersonalAccessToken>>;
}

/// Long-lived provider credential stored out-of-band.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalAccessToken {
	/// Owner of the token inside the hosting application.
	pub user_id: UserId,
	/// SCM endpoint the token authenticates against.
	pub scm_provider_url: Url,
	/// Account name on the SCM side, when known.
	pub scm_user_name: Option<String>,
	/// Human label chosen when the token was registered.
	pub token_name: Option<String>,
	/// Secret token value.
	pub token: TokenSecret,
}
impl PersonalAccessToken {
	/// Creates a token record for the given owner and SCM endpoint.
	pub fn new(user_id: UserId, scm_provider_url: Url, token: impl Into<String>) -> Self {
		Self {
			user_id,
			scm_provider_url,
			scm_user_name: None,
			token_name: None,
			token: TokenSecret::new(token),
		}
	}

	/// Records the SCM-side account name.
	pub fn with_scm_user_name(mut self, name: impl Into<String>) -> Self {
		self.scm_user_name = Some(name.into());

		self
	}

	/// Records the token label.
	pub fn with_token_name(mut self, name: impl Into<String>) -> Self {
		self.token_name = Some(name.into());

		self
	}
}

/// Error kinds reported by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// The backing service could not be reached or timed out.
	#[error("Token store communication failed: {message}.")]
	Communication {
		/// Human-readable error payload.
		message: String,
	},
	/// The backing service is misconfigured or its data could not be read.
	#[error("Token store configuration is invalid: {message}.")]
	Configuration {
		/// Human-readable error payload.
		message: String,
	},
	/// The stored token exists but the SCM no longer accepts it.
	#[error("Personal access token is not authorized: {message}.")]
	Unauthorized {
		/// Human-readable error payload.
		message: String,
	},
}

/// Compares SCM endpoints ignoring a trailing slash, the way endpoint URLs are
/// usually written interchangeably.
pub fn same_endpoint(lhs: &Url, rhs: &Url) -> bool {
	endpoint_key(lhs) == endpoint_key(rhs)
}

pub(crate) fn endpoint_key(url: &Url) -> String {
	url.as_str().trim_end_matches('/').to_owned()
}
