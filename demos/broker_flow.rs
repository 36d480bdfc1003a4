//! Registers two providers, starts a flow, lists the discovery descriptors, and shows what
//! the callback handler will read back out of the provider's redirect.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use url::Url;
// self
use scm_oauth_broker::{
	auth::{ProviderName, ScopeList},
	authenticator::{AuthenticatorRegistry, StandardAuthenticator, StandardAuthenticatorDescriptor},
	broker::{BrokerConfig, OAuthBroker, RequestContext},
	flow::FlowStateCodec,
	store::MemoryTokenStore,
};

fn main() -> Result<()> {
	color_eyre::install()?;

	let github = StandardAuthenticatorDescriptor::builder(Url::parse("https://api.github.com/")?)
		.authorization_endpoint(Url::parse("https://github.com/login/oauth/authorize")?)
		.token_endpoint(Url::parse("https://github.com/login/oauth/access_token")?)
		.scope_delimiter(',')
		.build()?;
	let gitlab = StandardAuthenticatorDescriptor::builder(Url::parse("https://gitlab.com/")?)
		.authorization_endpoint(Url::parse("https://gitlab.com/oauth/authorize")?)
		.token_endpoint(Url::parse("https://gitlab.com/oauth/token")?)
		.revocation_endpoint(Url::parse("https://gitlab.com/oauth/revoke")?)
		.build()?;
	let registry = AuthenticatorRegistry::builder()
		.register(
			ProviderName::new("github")?,
			Arc::new(StandardAuthenticator::new(github, "demo-github")?.with_client_secret("s1")),
		)?
		.register(
			ProviderName::new("gitlab")?,
			Arc::new(StandardAuthenticator::new(gitlab, "demo-gitlab")?.with_client_secret("s2")),
		)?
		.build();
	let config = BrokerConfig::from_json_str("{\"error_page\":\"/dashboard/denied\"}")?;
	let broker = OAuthBroker::new(registry, Arc::new(MemoryTokenStore::default()), config);
	let ctx = RequestContext::new(Url::parse("https://che.example.com/api/oauth/authenticate")?);
	let redirect = broker.authenticate(
		&ctx,
		"github",
		ScopeList::new(["repo", "user"])?,
		Url::parse("https://che.example.com/dashboard")?,
	)?;

	println!("Send your user to {}.", redirect.location);

	for descriptor in broker.list_providers(&ctx) {
		println!("{}", serde_json::to_string_pretty(&descriptor)?);
	}

	// The provider echoes `state`; the callback handler reads the flow back from it.
	let state = FlowStateCodec::decode(&redirect.location)?;

	println!(
		"Callback will exchange for {} with scopes [{}] and return to {}.",
		state.provider, state.scopes, state.post_login_redirect
	);

	Ok(())
}
