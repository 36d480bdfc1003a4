//! Layered resolution of "the current token" for a caller.
//!
//! Providers disagree about which identity field keys their token cache, and some users
//! authenticate with a long-lived personal access token instead of a live OAuth session.
//! [`TokenResolver`] hides both behind a single lookup that tries, in strict order:
//!
//! 1. the authenticator's token for the subject's user id,
//! 2. the authenticator's token for the subject's user name,
//! 3. the token store's personal access token for the authenticator's endpoint,
//!
//! and stops at the first hit. Nothing is retried locally.

// self
use crate::{
	_prelude::*,
	auth::{AuthenticationSubject, ProviderName, Token, TokenSource},
	authenticator::{Authenticator, IssuedToken},
	obs,
	store::{StoreError, TokenStore},
};

/// Fallback-chain token resolver.
#[derive(Clone)]
pub struct TokenResolver {
	store: Arc<dyn TokenStore>,
}
impl TokenResolver {
	/// Creates a resolver backed by the given personal access token store.
	pub fn new(store: Arc<dyn TokenStore>) -> Self {
		Self { store }
	}

	/// Resolves exactly one usable token for `subject` against `authenticator`.
	///
	/// Authenticator I/O failures and store communication or configuration failures surface
	/// as [`Error::Server`]. A store-reported unauthorized token is indistinguishable from a
	/// missing one and surfaces as [`Error::TokenNotFound`].
	pub async fn resolve(
		&self,
		provider: &ProviderName,
		authenticator: &dyn Authenticator,
		subject: &AuthenticationSubject,
	) -> Result<Token> {
		let steps = [
			(subject.user_id.as_ref(), TokenSource::OAuthByUserId),
			(subject.user_name.as_str(), TokenSource::OAuthByUserName),
		];

		for (identity, source) in steps {
			if let Some(issued) = authenticator.token(identity).await.map_err(Error::server)? {
				return Ok(resolved(issued_token(issued, provider, source)));
			}

			obs::fallback_miss(source.as_str());
		}

		match self.store.find(subject, authenticator.endpoint_url()).await {
			Ok(Some(pat)) => Ok(resolved(Token::new(
				pat.token,
				provider.clone(),
				TokenSource::PersonalAccessToken,
			))),
			Ok(None) => {
				obs::fallback_miss(TokenSource::PersonalAccessToken.as_str());

				Err(Error::token_not_found_for_user(&subject.user_id))
			},
			Err(StoreError::Unauthorized { .. }) =>
				Err(Error::token_not_found_for_user(&subject.user_id)),
			Err(e) => Err(Error::server(e)),
		}
	}
}
impl Debug for TokenResolver {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("TokenResolver(..)")
	}
}

fn issued_token(issued: IssuedToken, provider: &ProviderName, source: TokenSource) -> Token {
	let token = Token::new(issued.secret, provider.clone(), source);

	match issued.expires_at {
		Some(instant) => token.with_expires_at(instant),
		None => token,
	}
}

fn resolved(token: Token) -> Token {
	obs::record_token_source(token.source);

	token
}

#[cfg(test)]
mod tests {
	// crates.io
	use parking_lot::Mutex;
	// self
	use super::*;
	use crate::{
		auth::{ScopeList, UserId},
		authenticator::{AuthenticatorError, AuthenticatorFuture, CallbackRequest},
		store::{MemoryTokenStore, PersonalAccessToken, StoreFuture},
	};

	#[derive(Default)]
	struct ScriptedAuthenticator {
		tokens: HashMap<String, String>,
		failing: bool,
		lookups: Mutex<Vec<String>>,
		endpoint: Option<Url>,
	}
	impl ScriptedAuthenticator {
		fn with_token(mut self, identity: &str, value: &str) -> Self {
			self.tokens.insert(identity.into(), value.into());

			self
		}

		fn lookups(&self) -> Vec<String> {
			self.lookups.lock().clone()
		}
	}
	impl Authenticator for ScriptedAuthenticator {
		fn authorize_url(
			&self,
			base_url: &Url,
			_scopes: &ScopeList,
		) -> Result<Url, AuthenticatorError> {
			Ok(base_url.clone())
		}

		fn exchange_callback<'a>(
			&'a self,
			_request: CallbackRequest<'a>,
		) -> AuthenticatorFuture<'a, ()> {
			Box::pin(async { Ok(()) })
		}

		fn token<'a>(&'a self, identity: &'a str) -> AuthenticatorFuture<'a, Option<IssuedToken>> {
			Box::pin(async move {
				self.lookups.lock().push(identity.to_owned());

				if self.failing {
					return Err(AuthenticatorError::Io(std::io::Error::other("socket closed")));
				}

				Ok(self.tokens.get(identity).map(IssuedToken::new))
			})
		}

		fn invalidate_token<'a>(&'a self, _token: &'a str) -> AuthenticatorFuture<'a, bool> {
			Box::pin(async { Ok(true) })
		}

		fn endpoint_url(&self) -> &Url {
			self.endpoint.as_ref().expect("Endpoint fixture should be configured.")
		}
	}

	struct FailingStore(StoreError);
	impl TokenStore for FailingStore {
		fn find<'a>(
			&'a self,
			_subject: &'a AuthenticationSubject,
			_endpoint_url: &'a Url,
		) -> StoreFuture<'a, Option<PersonalAccessToken>> {
			let err = self.0.clone();

			Box::pin(async move { Err(err) })
		}
	}

	fn endpoint() -> Url {
		Url::parse("https://scm.example.com/").expect("Endpoint fixture should parse.")
	}

	fn authenticator() -> ScriptedAuthenticator {
		ScriptedAuthenticator { endpoint: Some(endpoint()), ..Default::default() }
	}

	fn subject() -> AuthenticationSubject {
		AuthenticationSubject::new(UserId::new("u-1").expect("User fixture should be valid."), "alice")
	}

	fn provider() -> ProviderName {
		ProviderName::new("github").expect("Provider fixture should be valid.")
	}

	fn store_with_pat(value: &str) -> Arc<MemoryTokenStore> {
		let store = Arc::new(MemoryTokenStore::default());

		store.save(PersonalAccessToken::new(subject().user_id, endpoint(), value));

		store
	}

	#[tokio::test]
	async fn user_id_token_wins_before_other_sources_are_consulted() {
		let authenticator =
			authenticator().with_token("u-1", "by-id").with_token("alice", "by-name");
		let resolver = TokenResolver::new(store_with_pat("pat"));
		let token = resolver
			.resolve(&provider(), &authenticator, &subject())
			.await
			.expect("Token should resolve.");

		assert_eq!(token.value.expose(), "by-id");
		assert_eq!(token.source, TokenSource::OAuthByUserId);
		assert_eq!(authenticator.lookups(), vec!["u-1".to_owned()]);
	}

	#[tokio::test]
	async fn user_name_token_is_second() {
		let authenticator = authenticator().with_token("alice", "by-name");
		let resolver = TokenResolver::new(store_with_pat("pat"));
		let token = resolver
			.resolve(&provider(), &authenticator, &subject())
			.await
			.expect("Token should resolve.");

		assert_eq!(token.value.expose(), "by-name");
		assert_eq!(token.source, TokenSource::OAuthByUserName);
		assert_eq!(authenticator.lookups(), vec!["u-1".to_owned(), "alice".to_owned()]);
	}

	#[tokio::test]
	async fn personal_access_token_is_last() {
		let resolver = TokenResolver::new(store_with_pat("pat"));
		let token = resolver
			.resolve(&provider(), &authenticator(), &subject())
			.await
			.expect("Token should resolve.");

		assert_eq!(token.value.expose(), "pat");
		assert_eq!(token.source, TokenSource::PersonalAccessToken);
		assert_eq!(token.provider, provider());
	}

	#[tokio::test]
	async fn empty_chain_is_unauthorized_not_server_failure() {
		let resolver = TokenResolver::new(Arc::new(MemoryTokenStore::default()));
		let err = resolver
			.resolve(&provider(), &authenticator(), &subject())
			.await
			.expect_err("Empty chain should fail.");

		assert!(matches!(err, Error::TokenNotFound { .. }));
		assert_eq!(err.to_string(), "OAuth token for user u-1 was not found.");
	}

	#[tokio::test]
	async fn store_failures_map_by_kind() {
		let unauthorized = TokenResolver::new(Arc::new(FailingStore(StoreError::Unauthorized {
			message: "revoked".into(),
		})));
		let err = unauthorized
			.resolve(&provider(), &authenticator(), &subject())
			.await
			.expect_err("Unauthorized store should fail.");

		assert!(matches!(err, Error::TokenNotFound { .. }));

		for failure in [
			StoreError::Communication { message: "timeout".into() },
			StoreError::Configuration { message: "bad secret".into() },
		] {
			let resolver = TokenResolver::new(Arc::new(FailingStore(failure)));
			let err = resolver
				.resolve(&provider(), &authenticator(), &subject())
				.await
				.expect_err("Store failure should fail.");

			assert!(matches!(err, Error::Server { .. }));
			assert!(StdError::source(&err).is_some());
		}
	}

	#[tokio::test]
	async fn authenticator_io_failure_is_server_failure() {
		let authenticator = ScriptedAuthenticator { failing: true, ..authenticator() };
		let resolver = TokenResolver::new(store_with_pat("pat"));
		let err = resolver
			.resolve(&provider(), &authenticator, &subject())
			.await
			.expect_err("Authenticator failure should fail.");

		assert!(matches!(err, Error::Server { .. }));
	}
}
