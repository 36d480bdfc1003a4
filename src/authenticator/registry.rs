//! Immutable provider-name → authenticator mapping.

// self
use crate::{
	_prelude::*,
	auth::ProviderName,
	authenticator::Authenticator,
	error::ConfigError,
	obs,
};

/// Read-only mapping from provider name to its [`Authenticator`].
///
/// Exactly one authenticator is bound per name. Build it with
/// [`AuthenticatorRegistry::builder`]; once built, the registry cannot change, so it can be
/// shared across concurrent requests without locking.
#[derive(Clone, Default)]
pub struct AuthenticatorRegistry {
	authenticators: BTreeMap<ProviderName, Arc<dyn Authenticator>>,
}
impl AuthenticatorRegistry {
	/// Starts an empty registry builder.
	pub fn builder() -> AuthenticatorRegistryBuilder {
		AuthenticatorRegistryBuilder::default()
	}

	/// Resolves the authenticator registered under `name` (case-sensitive).
	pub fn lookup(&self, name: &str) -> Result<&Arc<dyn Authenticator>> {
		self.entry(name).map(|(_, authenticator)| authenticator)
	}

	/// Resolves both the registered name and its authenticator.
	pub fn entry(&self, name: &str) -> Result<(&ProviderName, &Arc<dyn Authenticator>)> {
		self.authenticators.get_key_value(name).ok_or_else(|| {
			obs::unknown_provider(name);

			Error::provider_not_found(name)
		})
	}

	/// Registered provider names in ascending order.
	pub fn names(&self) -> impl Iterator<Item = &ProviderName> {
		self.authenticators.keys()
	}

	/// Name/authenticator pairs in ascending name order.
	pub fn iter(&self) -> impl Iterator<Item = (&ProviderName, &Arc<dyn Authenticator>)> {
		self.authenticators.iter()
	}

	/// Number of registered providers.
	pub fn len(&self) -> usize {
		self.authenticators.len()
	}

	/// Returns true when no provider is registered.
	pub fn is_empty(&self) -> bool {
		self.authenticators.is_empty()
	}
}
impl Debug for AuthenticatorRegistry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthenticatorRegistry")
			.field("providers", &self.authenticators.keys().collect::<Vec<_>>())
			.finish()
	}
}

/// Builder for [`AuthenticatorRegistry`].
#[derive(Default)]
pub struct AuthenticatorRegistryBuilder {
	authenticators: BTreeMap<ProviderName, Arc<dyn Authenticator>>,
}
impl AuthenticatorRegistryBuilder {
	/// Binds `authenticator` to `name`; a second binding for the same name is rejected.
	pub fn register(
		mut self,
		name: ProviderName,
		authenticator: Arc<dyn Authenticator>,
	) -> Result<Self, ConfigError> {
		if self.authenticators.contains_key(&name) {
			return Err(ConfigError::DuplicateProvider { provider: name.into() });
		}

		self.authenticators.insert(name, authenticator);

		Ok(self)
	}

	/// Freezes the mapping.
	pub fn build(self) -> AuthenticatorRegistry {
		AuthenticatorRegistry { authenticators: self.authenticators }
	}
}
impl Debug for AuthenticatorRegistryBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthenticatorRegistryBuilder")
			.field("providers", &self.authenticators.keys().collect::<Vec<_>>())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::ScopeList,
		authenticator::{AuthenticatorError, AuthenticatorFuture, CallbackRequest, IssuedToken},
	};

	struct NullAuthenticator(Url);
	impl Authenticator for NullAuthenticator {
		fn authorize_url(
			&self,
			_base_url: &Url,
			_scopes: &ScopeList,
		) -> Result<Url, AuthenticatorError> {
			Ok(self.0.clone())
		}

		fn exchange_callback<'a>(
			&'a self,
			_request: CallbackRequest<'a>,
		) -> AuthenticatorFuture<'a, ()> {
			Box::pin(async { Ok(()) })
		}

		fn token<'a>(&'a self, _identity: &'a str) -> AuthenticatorFuture<'a, Option<IssuedToken>> {
			Box::pin(async { Ok(None) })
		}

		fn invalidate_token<'a>(&'a self, _token: &'a str) -> AuthenticatorFuture<'a, bool> {
			Box::pin(async { Ok(false) })
		}

		fn endpoint_url(&self) -> &Url {
			&self.0
		}
	}

	fn null(url: &str) -> Arc<dyn Authenticator> {
		Arc::new(NullAuthenticator(Url::parse(url).expect("Fixture URL should parse.")))
	}

	fn name(value: &str) -> ProviderName {
		ProviderName::new(value).expect("Provider fixture should be valid.")
	}

	#[test]
	fn registered_names_resolve_and_unknown_names_fail() {
		let registry = AuthenticatorRegistry::builder()
			.register(name("github"), null("https://github.com"))
			.and_then(|builder| builder.register(name("gitlab"), null("https://gitlab.com")))
			.expect("Distinct registrations should succeed.")
			.build();

		for registered in registry.names() {
			let (entry_name, _) = registry.entry(registered).expect("Registered name should resolve.");

			assert_eq!(entry_name, registered);
		}

		let err = registry.lookup("foo").err().expect("Unknown provider should fail.");

		assert!(matches!(err, Error::ProviderNotFound { ref provider } if provider == "foo"));
		assert!(registry.lookup("GitHub").is_err(), "Lookup must be case-sensitive.");
		assert_eq!(
			registry.names().map(|n| n.as_ref()).collect::<Vec<&str>>(),
			vec!["github", "gitlab"]
		);
	}

	#[test]
	fn duplicate_registration_is_rejected() {
		let err = AuthenticatorRegistry::builder()
			.register(name("github"), null("https://github.com"))
			.and_then(|builder| builder.register(name("github"), null("https://github.com")))
			.expect_err("Binding a name twice should fail.");

		assert!(matches!(err, ConfigError::DuplicateProvider { .. }));
	}

	#[test]
	fn empty_registry_has_no_names() {
		let registry = AuthenticatorRegistry::default();

		assert!(registry.is_empty());
		assert_eq!(registry.names().count(), 0);
	}
}
