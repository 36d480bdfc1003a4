//! Public facade tying the registry, the flow-state codec, and the token resolver together.
//!
//! [`OAuthBroker`] is transport agnostic: callers hand it a [`RequestContext`] describing the
//! inbound request and translate the returned [`Redirect`], [`ProviderDescriptor`] list,
//! [`Token`], or [`Error`] into HTTP themselves ([`Redirect::STATUS_CODE`] and
//! [`Error::class`] carry the status mapping). The broker holds no mutable state, so one
//! instance can be cloned freely across concurrent requests.

pub mod config;
pub mod descriptor;
pub mod request;

pub use config::*;
pub use descriptor::*;
pub use request::*;

// self
use crate::{
	_prelude::*,
	auth::{AuthenticationSubject, ScopeList, Token},
	authenticator::{AuthenticatorError, AuthenticatorRegistry, CallbackRequest},
	flow::{FlowState, FlowStateCodec},
	obs::{self, Operation, OperationSpan, Outcome},
	resolver::TokenResolver,
	store::TokenStore,
};

/// Stateless OAuth broker.
#[derive(Clone)]
pub struct OAuthBroker {
	registry: Arc<AuthenticatorRegistry>,
	resolver: TokenResolver,
	config: Arc<BrokerConfig>,
}
impl OAuthBroker {
	/// Assembles a broker over an immutable registry and a personal access token store.
	pub fn new(
		registry: AuthenticatorRegistry,
		store: Arc<dyn TokenStore>,
		config: BrokerConfig,
	) -> Self {
		Self {
			registry: Arc::new(registry),
			resolver: TokenResolver::new(store),
			config: Arc::new(config),
		}
	}

	/// Registered authenticators.
	pub fn registry(&self) -> &AuthenticatorRegistry {
		&self.registry
	}

	/// Active configuration.
	pub fn config(&self) -> &BrokerConfig {
		&self.config
	}

	/// Starts a flow: redirects the user to `provider`'s consent page with the flow state
	/// attached to the authorize URL.
	///
	/// Unknown providers fail with [`Error::ProviderNotFound`] before any authenticator is
	/// touched. No network call is made.
	pub fn authenticate(
		&self,
		ctx: &RequestContext,
		provider: &str,
		scopes: ScopeList,
		post_login_redirect: Url,
	) -> Result<Redirect> {
		let _guard = OperationSpan::new(Operation::Authenticate, Some(provider)).entered();

		obs::record_outcome(Operation::Authenticate, Outcome::Attempt);

		let result = self.start_flow(ctx, provider, scopes, post_login_redirect);

		record_result(Operation::Authenticate, &result);

		result
	}

	/// Finishes a flow after the provider redirected back to the broker.
	///
	/// `errors` holds every value of the callback's `error` query parameter. If any contains
	/// `access_denied`, the user goes to the configured error page without decoding the
	/// state. Otherwise the state is decoded and the code exchanged; an exchange failure is
	/// reported in-band as `{post_login_redirect}&error=access_denied` rather than as an
	/// error.
	pub async fn callback(&self, ctx: &RequestContext, errors: &[String]) -> Result<Redirect> {
		let span = OperationSpan::new(Operation::Callback, None);

		obs::record_outcome(Operation::Callback, Outcome::Attempt);

		let result = span.instrument(self.finish_flow(ctx, errors)).await;

		record_result(Operation::Callback, &result);

		result
	}

	/// Describes every registered provider, sorted by name.
	pub fn list_providers(&self, ctx: &RequestContext) -> Vec<ProviderDescriptor> {
		let _guard = OperationSpan::new(Operation::ListProviders, None).entered();

		obs::record_outcome(Operation::ListProviders, Outcome::Attempt);

		let href = ctx.with_path(&self.config.authenticate_path);
		let descriptors = self
			.registry
			.iter()
			.map(|(name, authenticator)| ProviderDescriptor {
				name: name.clone(),
				endpoint_url: authenticator.endpoint_url().clone(),
				authenticate_link: Link::authenticate(href.clone(), name),
			})
			.collect();

		obs::record_outcome(Operation::ListProviders, Outcome::Success);

		descriptors
	}

	/// Resolves the current token `subject` holds for `provider`.
	///
	/// Tries the authenticator's token by user id, then by user name, then the personal
	/// access token store, returning the first hit.
	pub async fn get_token(&self, provider: &str, subject: &AuthenticationSubject) -> Result<Token> {
		let span = OperationSpan::new(Operation::GetToken, Some(provider));

		obs::record_outcome(Operation::GetToken, Outcome::Attempt);

		let result = span
			.instrument(async {
				let (name, authenticator) = self.registry.entry(provider)?;

				self.resolver.resolve(name, authenticator.as_ref(), subject).await
			})
			.await;

		record_result(Operation::GetToken, &result);

		result
	}

	/// Resolves the current token for `subject` and asks the provider to invalidate it.
	///
	/// A provider that does not recognize the token yields [`Error::TokenNotFound`].
	pub async fn invalidate_token(
		&self,
		provider: &str,
		subject: &AuthenticationSubject,
	) -> Result<()> {
		let span = OperationSpan::new(Operation::InvalidateToken, Some(provider));

		obs::record_outcome(Operation::InvalidateToken, Outcome::Attempt);

		let result = span
			.instrument(async {
				let (name, authenticator) = self.registry.entry(provider)?;
				let token = self.resolver.resolve(name, authenticator.as_ref(), subject).await?;
				let known = authenticator
					.invalidate_token(token.value.expose())
					.await
					.map_err(Error::server)?;

				if known { Ok(()) } else { Err(Error::token_not_found_for_provider(name)) }
			})
			.await;

		record_result(Operation::InvalidateToken, &result);

		result
	}

	fn start_flow(
		&self,
		ctx: &RequestContext,
		provider: &str,
		scopes: ScopeList,
		post_login_redirect: Url,
	) -> Result<Redirect> {
		let (name, authenticator) = self.registry.entry(provider)?;
		let mut location =
			authenticator.authorize_url(&ctx.base_url(), &scopes).map_err(|e| match e {
				AuthenticatorError::Exchange { reason } => Error::Authorization { reason },
				e => Error::server(e),
			})?;
		let state = FlowState::new(name.clone(), scopes, post_login_redirect);

		FlowStateCodec::apply(&state, &mut location);

		Ok(Redirect::to(location))
	}

	async fn finish_flow(&self, ctx: &RequestContext, errors: &[String]) -> Result<Redirect> {
		if errors.iter().any(|value| value.contains(ACCESS_DENIED)) {
			let error_page = ctx.with_path(&self.config.error_page);

			obs::access_denied(&error_page);

			return Ok(Redirect::to(error_page));
		}

		let state = FlowStateCodec::decode(&ctx.request_url)?;
		let (name, authenticator) = self.registry.entry(&state.provider)?;
		let request = CallbackRequest {
			url: &ctx.request_url,
			scopes: &state.scopes,
			subject: ctx.subject.as_ref(),
		};

		match authenticator.exchange_callback(request).await {
			Ok(()) => Ok(Redirect::to(state.post_login_redirect)),
			Err(e) => {
				obs::exchange_failed(name, &e);

				Ok(Redirect::with_error_marker(&state.post_login_redirect)?)
			},
		}
	}
}
impl Debug for OAuthBroker {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuthBroker")
			.field("registry", &self.registry)
			.field("config", &self.config)
			.finish()
	}
}

fn record_result<T>(operation: Operation, result: &Result<T>) {
	let outcome = if result.is_ok() { Outcome::Success } else { Outcome::Failure };

	obs::record_outcome(operation, outcome);
}
