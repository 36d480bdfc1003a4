//! Shared fixtures for broker integration tests.

#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use parking_lot::Mutex;
// self
use scm_oauth_broker::{
	auth::{AuthenticationSubject, ProviderName, ScopeList, UserId},
	authenticator::{
		Authenticator, AuthenticatorError, AuthenticatorFuture, AuthenticatorRegistry,
		CallbackRequest, IssuedToken,
	},
	broker::{BrokerConfig, OAuthBroker, RequestContext},
	store::{MemoryTokenStore, TokenStore},
	url::Url,
};

/// Calls observed by a [`MockAuthenticator`], in arrival order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
	AuthorizeUrl { base_url: String, scopes: Vec<String> },
	ExchangeCallback { scopes: Vec<String>, user_id: Option<String> },
	Token { identity: String },
	InvalidateToken { token: String },
}

/// Scriptable authenticator that records every call it receives.
#[derive(Debug)]
pub struct MockAuthenticator {
	pub authorize_endpoint: Url,
	pub endpoint: Url,
	pub exchange_fails: bool,
	pub invalidate_fails: bool,
	pub tokens: Vec<(String, String)>,
	pub known_tokens: Vec<String>,
	calls: Mutex<Vec<Call>>,
}
impl MockAuthenticator {
	pub fn new(authorize_endpoint: &str, endpoint: &str) -> Self {
		Self {
			authorize_endpoint: url(authorize_endpoint),
			endpoint: url(endpoint),
			exchange_fails: false,
			invalidate_fails: false,
			tokens: Vec::new(),
			known_tokens: Vec::new(),
			calls: Mutex::new(Vec::new()),
		}
	}

	pub fn failing_exchange(mut self) -> Self {
		self.exchange_fails = true;

		self
	}

	pub fn failing_invalidate(mut self) -> Self {
		self.invalidate_fails = true;

		self
	}

	pub fn with_token(mut self, identity: &str, value: &str) -> Self {
		self.tokens.push((identity.into(), value.into()));
		self.known_tokens.push(value.into());

		self
	}

	pub fn calls(&self) -> Vec<Call> {
		self.calls.lock().clone()
	}

	fn record(&self, call: Call) {
		self.calls.lock().push(call);
	}
}
impl Authenticator for MockAuthenticator {
	fn authorize_url(&self, base_url: &Url, scopes: &ScopeList) -> Result<Url, AuthenticatorError> {
		self.record(Call::AuthorizeUrl {
			base_url: base_url.to_string(),
			scopes: scopes.iter().map(str::to_owned).collect(),
		});

		Ok(self.authorize_endpoint.clone())
	}

	fn exchange_callback<'a>(&'a self, request: CallbackRequest<'a>) -> AuthenticatorFuture<'a, ()> {
		Box::pin(async move {
			self.record(Call::ExchangeCallback {
				scopes: request.scopes.iter().map(str::to_owned).collect(),
				user_id: request.subject.map(|subject| subject.user_id.to_string()),
			});

			if self.exchange_fails {
				Err(AuthenticatorError::exchange("bad_verification_code"))
			} else {
				Ok(())
			}
		})
	}

	fn token<'a>(&'a self, identity: &'a str) -> AuthenticatorFuture<'a, Option<IssuedToken>> {
		Box::pin(async move {
			self.record(Call::Token { identity: identity.to_owned() });

			Ok(self
				.tokens
				.iter()
				.find(|(key, _)| key == identity)
				.map(|(_, value)| IssuedToken::new(value.as_str())))
		})
	}

	fn invalidate_token<'a>(&'a self, token: &'a str) -> AuthenticatorFuture<'a, bool> {
		Box::pin(async move {
			self.record(Call::InvalidateToken { token: token.to_owned() });

			if self.invalidate_fails {
				return Err(AuthenticatorError::Io(std::io::Error::other("connection reset")));
			}

			Ok(self.known_tokens.iter().any(|known| known == token))
		})
	}

	fn endpoint_url(&self) -> &Url {
		&self.endpoint
	}
}

pub fn url(value: &str) -> Url {
	Url::parse(value).expect("URL fixture should parse.")
}

pub fn provider(name: &str) -> ProviderName {
	ProviderName::new(name).expect("Provider fixture should be valid.")
}

pub fn subject() -> AuthenticationSubject {
	AuthenticationSubject::new(UserId::new("u-1").expect("User fixture should be valid."), "alice")
}

pub fn request(value: &str) -> RequestContext {
	RequestContext::new(url(value))
}

/// Builds a broker over the given authenticators and PAT store with default configuration.
pub fn broker(
	authenticators: Vec<(&str, Arc<MockAuthenticator>)>,
	store: Arc<dyn TokenStore>,
) -> OAuthBroker {
	let mut builder = AuthenticatorRegistry::builder();

	for (name, authenticator) in authenticators {
		builder = builder.register(provider(name), authenticator).expect("Names should be distinct.");
	}

	OAuthBroker::new(builder.build(), store, BrokerConfig::default())
}

pub fn empty_store() -> Arc<MemoryTokenStore> {
	Arc::new(MemoryTokenStore::default())
}
