//! Provider authenticator capability and the registry that binds them to provider names.
//!
//! [`Authenticator`] is the seam to concrete identity providers: it builds authorize URLs,
//! exchanges callback codes, and answers token lookups. The broker never speaks a provider's
//! wire protocol itself. [`AuthenticatorRegistry`] is assembled once at startup and is
//! read-only afterwards, so lookups need no locking.

pub mod registry;
#[cfg(feature = "reqwest")] pub mod standard;

pub use registry::*;
#[cfg(feature = "reqwest")] pub use standard::*;

// self
use crate::{
	_prelude::*,
	auth::{AuthenticationSubject, ScopeList, TokenSecret},
	error::BoxError,
};

/// Boxed future returned by [`Authenticator`] operations.
pub type AuthenticatorFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, AuthenticatorError>> + 'a + Send>>;

/// Provider-specific handshake and token capability.
///
/// Implementations own their network timeouts; a timed-out or cancelled call must resolve to
/// [`AuthenticatorError::Network`] or [`AuthenticatorError::Io`]. The broker never retries.
pub trait Authenticator
where
	Self: Send + Sync,
{
	/// Builds the provider authorization URL for `scopes`, deriving the callback location
	/// from `base_url`. The broker appends its flow state to the returned URL.
	///
	/// The `state` parameter belongs to the broker. Implementations must not set it: a
	/// provider that echoes only `code` and `state` would otherwise return a callback the
	/// broker cannot decode.
	fn authorize_url(&self, base_url: &Url, scopes: &ScopeList) -> Result<Url, AuthenticatorError>;

	/// Exchanges the authorization response carried by the callback URL.
	fn exchange_callback<'a>(&'a self, request: CallbackRequest<'a>) -> AuthenticatorFuture<'a, ()>;

	/// Returns the live token indexed under `identity` (a user id or user name), if any.
	fn token<'a>(&'a self, identity: &'a str) -> AuthenticatorFuture<'a, Option<IssuedToken>>;

	/// Invalidates `token`; resolves to `false` when the provider did not know it.
	fn invalidate_token<'a>(&'a self, token: &'a str) -> AuthenticatorFuture<'a, bool>;

	/// SCM endpoint this authenticator talks to; keys personal access token lookups.
	fn endpoint_url(&self) -> &Url;
}

/// Inputs handed to [`Authenticator::exchange_callback`].
#[derive(Clone, Copy, Debug)]
pub struct CallbackRequest<'a> {
	/// Full inbound callback URL, including the provider's `code`/`error` parameters.
	pub url: &'a Url,
	/// Scopes decoded from the flow state.
	pub scopes: &'a ScopeList,
	/// Authenticated caller of the callback request, when the session carries one.
	pub subject: Option<&'a AuthenticationSubject>,
}

/// Token as held by an authenticator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuedToken {
	/// Secret token value.
	pub secret: TokenSecret,
	/// Expiry instant, when the provider reported one.
	pub expires_at: Option<OffsetDateTime>,
}
impl IssuedToken {
	/// Wraps a token value without expiry.
	pub fn new(secret: impl Into<String>) -> Self {
		Self { secret: TokenSecret::new(secret), expires_at: None }
	}

	/// Attaches an expiry instant.
	pub fn with_expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}
}

/// Failures reported by [`Authenticator`] implementations.
#[derive(Debug, ThisError)]
pub enum AuthenticatorError {
	/// Provider rejected or failed the authorization exchange.
	#[error("Provider rejected the authorization exchange: {reason}.")]
	Exchange {
		/// Provider- or authenticator-supplied reason string.
		reason: String,
	},
	/// Network failure (DNS, TCP, TLS, timeout) talking to the provider.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying I/O failure.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
	/// Authenticator is misconfigured.
	#[error("Authenticator is misconfigured: {message}.")]
	Config {
		/// Human-readable error payload.
		message: String,
	},
}
impl AuthenticatorError {
	/// Builds an [`AuthenticatorError::Exchange`].
	pub fn exchange(reason: impl Into<String>) -> Self {
		Self::Exchange { reason: reason.into() }
	}

	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
