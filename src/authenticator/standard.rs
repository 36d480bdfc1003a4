//! Generic RFC 6749 authorization-code authenticator backed by `oauth2` + `reqwest`.
//!
//! [`StandardAuthenticator`] covers providers that follow the plain authorization-code grant:
//! it builds the authorize URL itself, exchanges the callback `code` at the token endpoint,
//! and keeps the issued access tokens in memory keyed by the caller's user id. Revocation is
//! best-effort and only attempted when the descriptor names a revocation endpoint.

// std
use std::borrow::Cow;
// crates.io
use oauth2::{
	AccessToken, AuthorizationCode, ClientId, ClientSecret, EndpointMaybeSet, EndpointNotSet,
	EndpointSet, ErrorResponse, HttpClientError, RedirectUrl, RequestTokenError, RevocationUrl,
	StandardRevocableToken, TokenResponse, TokenUrl, basic::BasicClient,
};
// self
use crate::{
	_prelude::*,
	auth::ScopeList,
	authenticator::{
		Authenticator, AuthenticatorError, AuthenticatorFuture, CallbackRequest, IssuedToken,
	},
	error::ConfigError,
	http::ReqwestHttpClient,
};

type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointMaybeSet, EndpointSet>;

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StandardAuthenticatorDescriptorError {
	/// Authorization endpoint is required.
	#[error("Missing authorization endpoint.")]
	MissingAuthorizationEndpoint,
	/// Token endpoint is required.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// Endpoints must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Reject scope delimiters that are control characters.
	#[error("Scope delimiter must be a printable character.")]
	InvalidScopeDelimiter {
		/// Invalid delimiter that was supplied.
		delimiter: char,
	},
	/// Callback path must be absolute.
	#[error("The callback path must start with '/': {path}.")]
	InvalidCallbackPath {
		/// Rejected path.
		path: String,
	},
}

/// Static description of an authorization-code provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardAuthenticatorDescriptor {
	/// SCM endpoint the issued tokens are good for.
	pub endpoint_url: Url,
	/// Provider consent page.
	pub authorization_endpoint: Url,
	/// Code exchange endpoint.
	pub token_endpoint: Url,
	/// Optional RFC 7009 revocation endpoint.
	pub revocation_endpoint: Option<Url>,
	/// Broker path the provider redirects back to.
	pub callback_path: String,
	/// Character used to join scopes in the authorize URL.
	pub scope_delimiter: char,
}
impl StandardAuthenticatorDescriptor {
	/// Default broker callback path.
	pub const DEFAULT_CALLBACK_PATH: &str = "/api/oauth/callback";

	/// Creates a builder for the provider serving `endpoint_url`.
	pub fn builder(endpoint_url: Url) -> StandardAuthenticatorDescriptorBuilder {
		StandardAuthenticatorDescriptorBuilder::new(endpoint_url)
	}

	fn validate(&self) -> Result<(), StandardAuthenticatorDescriptorError> {
		validate_endpoint("authorization", &self.authorization_endpoint)?;
		validate_endpoint("token", &self.token_endpoint)?;

		if let Some(revocation) = self.revocation_endpoint.as_ref() {
			validate_endpoint("revocation", revocation)?;
		}
		if self.scope_delimiter.is_control() {
			return Err(StandardAuthenticatorDescriptorError::InvalidScopeDelimiter {
				delimiter: self.scope_delimiter,
			});
		}
		if !self.callback_path.starts_with('/') {
			return Err(StandardAuthenticatorDescriptorError::InvalidCallbackPath {
				path: self.callback_path.clone(),
			});
		}

		Ok(())
	}
}

/// Builder for [`StandardAuthenticatorDescriptor`] values.
#[derive(Debug)]
pub struct StandardAuthenticatorDescriptorBuilder {
	/// SCM endpoint the issued tokens are good for.
	pub endpoint_url: Url,
	/// Provider consent page.
	pub authorization_endpoint: Option<Url>,
	/// Code exchange endpoint.
	pub token_endpoint: Option<Url>,
	/// Optional revocation endpoint.
	pub revocation_endpoint: Option<Url>,
	/// Broker path the provider redirects back to.
	pub callback_path: String,
	/// Character used to join scopes.
	pub scope_delimiter: char,
}
impl StandardAuthenticatorDescriptorBuilder {
	/// Creates a new builder for the provider serving `endpoint_url`.
	pub fn new(endpoint_url: Url) -> Self {
		Self {
			endpoint_url,
			authorization_endpoint: None,
			token_endpoint: None,
			revocation_endpoint: None,
			callback_path: StandardAuthenticatorDescriptor::DEFAULT_CALLBACK_PATH.into(),
			scope_delimiter: ' ',
		}
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the optional revocation endpoint.
	pub fn revocation_endpoint(mut self, url: Url) -> Self {
		self.revocation_endpoint = Some(url);

		self
	}

	/// Overrides the broker callback path.
	pub fn callback_path(mut self, path: impl Into<String>) -> Self {
		self.callback_path = path.into();

		self
	}

	/// Overrides the scope delimiter (GitHub-style providers use `,`).
	pub fn scope_delimiter(mut self, delimiter: char) -> Self {
		self.scope_delimiter = delimiter;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(
		self,
	) -> Result<StandardAuthenticatorDescriptor, StandardAuthenticatorDescriptorError> {
		let descriptor = StandardAuthenticatorDescriptor {
			endpoint_url: self.endpoint_url,
			authorization_endpoint: self
				.authorization_endpoint
				.ok_or(StandardAuthenticatorDescriptorError::MissingAuthorizationEndpoint)?,
			token_endpoint: self
				.token_endpoint
				.ok_or(StandardAuthenticatorDescriptorError::MissingTokenEndpoint)?,
			revocation_endpoint: self.revocation_endpoint,
			callback_path: self.callback_path,
			scope_delimiter: self.scope_delimiter,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

/// Authorization-code [`Authenticator`] with an in-memory token cache.
pub struct StandardAuthenticator {
	descriptor: StandardAuthenticatorDescriptor,
	oauth_client: ConfiguredBasicClient,
	http_client: ReqwestHttpClient,
	tokens: RwLock<HashMap<String, IssuedToken>>,
}
impl StandardAuthenticator {
	/// Creates an authenticator using a redirect-free reqwest client.
	pub fn new(
		descriptor: StandardAuthenticatorDescriptor,
		client_id: impl Into<String>,
	) -> Result<Self, ConfigError> {
		Ok(Self::with_http_client(descriptor, client_id, ReqwestHttpClient::without_redirects()?))
	}

	/// Creates an authenticator on top of a caller-supplied HTTP client.
	pub fn with_http_client(
		descriptor: StandardAuthenticatorDescriptor,
		client_id: impl Into<String>,
		http_client: ReqwestHttpClient,
	) -> Self {
		let oauth_client = BasicClient::new(ClientId::new(client_id.into()))
			.set_token_uri(TokenUrl::from_url(descriptor.token_endpoint.clone()))
			.set_revocation_url_option(
				descriptor.revocation_endpoint.clone().map(RevocationUrl::from_url),
			);

		Self { descriptor, oauth_client, http_client, tokens: RwLock::new(HashMap::new()) }
	}

	/// Sets the client secret sent to the token endpoint.
	pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
		self.oauth_client = self.oauth_client.set_client_secret(ClientSecret::new(secret.into()));

		self
	}

	/// Descriptor this authenticator was built from.
	pub fn descriptor(&self) -> &StandardAuthenticatorDescriptor {
		&self.descriptor
	}

	fn redirect_uri(&self, base_url: &Url) -> Url {
		let mut redirect = base_url.clone();

		redirect.set_path(&self.descriptor.callback_path);
		redirect.set_query(None);
		redirect.set_fragment(None);

		redirect
	}

	async fn exchange(&self, request: CallbackRequest<'_>) -> Result<(), AuthenticatorError> {
		let mut code = None;

		for (key, value) in request.url.query_pairs() {
			match key.as_ref() {
				"error" => return Err(AuthenticatorError::exchange(value)),
				"code" if code.is_none() => code = Some(value.into_owned()),
				_ => (),
			}
		}

		let code = code.ok_or_else(|| {
			AuthenticatorError::exchange("Callback is missing the authorization code")
		})?;
		let subject = request.subject.ok_or_else(|| {
			AuthenticatorError::exchange("Callback carries no authenticated user")
		})?;
		let redirect = self.redirect_uri(request.url);
		let response = self
			.oauth_client
			.exchange_code(AuthorizationCode::new(code))
			.set_redirect_uri(Cow::Owned(RedirectUrl::from_url(redirect)))
			.request_async(&self.http_client)
			.await
			.map_err(map_request_error)?;
		let issued = IssuedToken::new(response.access_token().secret().to_owned());
		let issued = match response.expires_in().and_then(|ttl| Duration::try_from(ttl).ok()) {
			Some(ttl) => issued.with_expires_at(OffsetDateTime::now_utc() + ttl),
			None => issued,
		};

		self.tokens.write().insert(subject.user_id.to_string(), issued);

		Ok(())
	}

	async fn revoke(&self, token: &str) -> Result<bool, AuthenticatorError> {
		let known = self.tokens.read().values().any(|issued| issued.secret.expose() == token);

		if !known {
			return Ok(false);
		}
		if self.descriptor.revocation_endpoint.is_some() {
			let revocable = StandardRevocableToken::AccessToken(AccessToken::new(token.to_owned()));

			self.oauth_client
				.revoke_token(revocable)
				.map_err(|e| AuthenticatorError::Config { message: e.to_string() })?
				.request_async(&self.http_client)
				.await
				.map_err(map_request_error)?;
		}

		// Dropped only once the provider confirmed the revocation.
		self.tokens.write().retain(|_, issued| issued.secret.expose() != token);

		Ok(true)
	}
}
impl Authenticator for StandardAuthenticator {
	fn authorize_url(&self, base_url: &Url, scopes: &ScopeList) -> Result<Url, AuthenticatorError> {
		let mut url = self.descriptor.authorization_endpoint.clone();
		let redirect_uri = self.redirect_uri(base_url);
		let mut pairs = url.query_pairs_mut();

		pairs
			.append_pair("response_type", "code")
			.append_pair("client_id", self.oauth_client.client_id().as_str())
			.append_pair("redirect_uri", redirect_uri.as_str());

		if let Some(scope) = scopes.join(self.descriptor.scope_delimiter) {
			pairs.append_pair("scope", &scope);
		}

		drop(pairs);

		Ok(url)
	}

	fn exchange_callback<'a>(&'a self, request: CallbackRequest<'a>) -> AuthenticatorFuture<'a, ()> {
		Box::pin(self.exchange(request))
	}

	fn token<'a>(&'a self, identity: &'a str) -> AuthenticatorFuture<'a, Option<IssuedToken>> {
		Box::pin(async move {
			let now = OffsetDateTime::now_utc();
			let tokens = self.tokens.read();

			Ok(tokens
				.get(identity)
				.filter(|issued| issued.expires_at.is_none_or(|instant| instant > now))
				.cloned())
		})
	}

	fn invalidate_token<'a>(&'a self, token: &'a str) -> AuthenticatorFuture<'a, bool> {
		Box::pin(self.revoke(token))
	}

	fn endpoint_url(&self) -> &Url {
		&self.descriptor.endpoint_url
	}
}
impl Debug for StandardAuthenticator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StandardAuthenticator")
			.field("descriptor", &self.descriptor)
			.field("cached_tokens", &self.tokens.read().len())
			.finish()
	}
}

fn validate_endpoint(
	name: &'static str,
	url: &Url,
) -> Result<(), StandardAuthenticatorDescriptorError> {
	if url.scheme() != "https" {
		Err(StandardAuthenticatorDescriptorError::InsecureEndpoint {
			endpoint: name,
			url: url.to_string(),
		})
	} else {
		Ok(())
	}
}

fn map_request_error<T>(
	err: RequestTokenError<HttpClientError<ReqwestError>, T>,
) -> AuthenticatorError
where
	T: ErrorResponse,
{
	match err {
		RequestTokenError::ServerResponse(response) => AuthenticatorError::exchange(format!(
			"Provider returned an OAuth error: {}",
			oauth_error_code(&response)
		)),
		RequestTokenError::Request(error) => map_transport_error(error),
		RequestTokenError::Parse(error, _body) => AuthenticatorError::exchange(format!(
			"Provider response is malformed at `{}`",
			error.path()
		)),
		RequestTokenError::Other(message) => AuthenticatorError::exchange(message),
	}
}

// `error` is the only field every RFC 6749 error body is guaranteed to carry.
fn oauth_error_code<T>(response: &T) -> String
where
	T: ErrorResponse,
{
	serde_json::to_value(response)
		.ok()
		.and_then(|body| body.get("error").and_then(|code| code.as_str()).map(str::to_owned))
		.unwrap_or_else(|| "unknown_error".into())
}

fn map_transport_error(err: HttpClientError<ReqwestError>) -> AuthenticatorError {
	match err {
		HttpClientError::Reqwest(inner) => AuthenticatorError::network(*inner),
		HttpClientError::Http(inner) => AuthenticatorError::network(inner),
		HttpClientError::Io(inner) => AuthenticatorError::Io(inner),
		HttpClientError::Other(message) => AuthenticatorError::network(std::io::Error::other(message)),
		_ => AuthenticatorError::network(std::io::Error::other("Unknown transport failure.")),
	}
}
