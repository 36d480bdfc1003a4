mod common;

// std
use std::sync::Arc;
// self
use common::*;
use scm_oauth_broker::{
	auth::ScopeList,
	broker::{ACCESS_DENIED, Link, Redirect, RequestContext},
	error::{Error, ErrorClass},
	flow::{FlowStateCodec, STATE_PARAM},
	url::Url,
};

const GITHUB_AUTHORIZE: &str = "https://github.com/login/oauth/authorize?client_id=che";

fn github() -> Arc<MockAuthenticator> {
	Arc::new(MockAuthenticator::new(GITHUB_AUTHORIZE, "https://api.github.com/"))
}

fn scopes(values: &[&str]) -> ScopeList {
	ScopeList::new(values.iter().copied()).expect("Scope fixture should be valid.")
}

fn authenticate_request() -> RequestContext {
	request("https://che.example.com/api/oauth/authenticate?oauth_provider=github&scope=repo")
}

/// Simulates the provider sending the user back with every authorize parameter echoed.
fn callback_from(location: &Url, extra: &str) -> Url {
	let query = location.query().expect("Authorize URL should carry a query.");

	url(&format!("https://che.example.com/api/oauth/callback?{extra}&{query}"))
}

#[test]
fn authenticate_appends_flow_state_to_the_authorize_url() {
	let authenticator = github();
	let broker = broker(vec![("github", authenticator.clone())], empty_store());
	let redirect = broker
		.authenticate(&authenticate_request(), "github", scopes(&["repo"]), url("https://app/done"))
		.expect("Known provider should start a flow.");
	let location = &redirect.location;
	let pairs = location.query_pairs().into_owned().collect::<Vec<_>>();

	assert_eq!(Redirect::STATUS_CODE, 307);
	assert!(location.as_str().starts_with(GITHUB_AUTHORIZE));
	assert!(pairs.contains(&("oauth_provider".into(), "github".into())));
	assert!(pairs.contains(&("scope".into(), "repo".into())));
	assert!(pairs.contains(&("redirect_after_login".into(), "https://app/done".into())));
	assert!(pairs.iter().any(|(key, _)| key == STATE_PARAM));
	assert!(location.as_str().contains("redirect_after_login=https%3A%2F%2Fapp%2Fdone"));
	assert_eq!(
		authenticator.calls(),
		vec![Call::AuthorizeUrl {
			base_url: "https://che.example.com/".into(),
			scopes: vec!["repo".into()],
		}]
	);

	let decoded = FlowStateCodec::decode(location).expect("Authorize URL should decode.");

	assert_eq!(decoded.provider.as_ref(), "github");
	assert_eq!(decoded.post_login_redirect.as_str(), "https://app/done");
}

#[test]
fn unknown_provider_fails_without_touching_any_authenticator() {
	let authenticator = github();
	let broker = broker(vec![("github", authenticator.clone())], empty_store());
	let err = broker
		.authenticate(&authenticate_request(), "foo", scopes(&[]), url("https://app/done"))
		.expect_err("Unknown provider should fail.");

	assert!(matches!(err, Error::ProviderNotFound { ref provider } if provider == "foo"));
	assert_eq!(err.class(), ErrorClass::NotFound);
	assert_eq!(err.to_string(), "Unsupported OAuth provider foo.");
	assert!(authenticator.calls().is_empty());
}

#[tokio::test]
async fn successful_exchange_returns_to_the_post_login_redirect() {
	let authenticator = github();
	let broker = broker(vec![("github", authenticator.clone())], empty_store());
	let started = broker
		.authenticate(
			&authenticate_request(),
			"github",
			scopes(&["repo", "user"]),
			url("https://app/done?tab=git"),
		)
		.expect("Flow should start.");
	let ctx =
		RequestContext::new(callback_from(&started.location, "code=abc")).with_subject(subject());
	let finished = broker.callback(&ctx, &[]).await.expect("Callback should succeed.");

	assert_eq!(finished.location.as_str(), "https://app/done?tab=git");
	assert_eq!(
		authenticator.calls().last(),
		Some(&Call::ExchangeCallback {
			scopes: vec!["repo".into(), "user".into()],
			user_id: Some("u-1".into()),
		})
	);
}

#[tokio::test]
async fn failed_exchange_is_reported_in_band() {
	let authenticator = Arc::new(
		MockAuthenticator::new(GITHUB_AUTHORIZE, "https://api.github.com/").failing_exchange(),
	);
	let broker = broker(vec![("github", authenticator.clone())], empty_store());
	let started = broker
		.authenticate(&authenticate_request(), "github", scopes(&["repo"]), url("https://app/done"))
		.expect("Flow should start.");
	let ctx = RequestContext::new(callback_from(&started.location, "code=stale"));
	let finished = broker.callback(&ctx, &[]).await.expect("Exchange failures are not errors.");

	assert_eq!(finished.location.as_str(), "https://app/done&error=access_denied");

	let ctx = request(
		"https://che.example.com/api/oauth/callback?oauth_provider=github&redirect_after_login=https://app/done&scope=repo",
	);
	let finished = broker.callback(&ctx, &[]).await.expect("Top-level state should decode.");

	assert_eq!(finished.location.as_str(), "https://app/done&error=access_denied");
}

#[tokio::test]
async fn access_denied_goes_to_the_error_page_without_decoding_state() {
	let authenticator = github();
	let broker = broker(vec![("github", authenticator.clone())], empty_store());

	for errors in [
		vec![ACCESS_DENIED.to_owned()],
		vec!["temporarily_unavailable".to_owned(), "user_access_denied".to_owned()],
	] {
		let ctx = request("https://che.example.com/api/oauth/callback?error=access_denied#frag");
		let redirect = broker.callback(&ctx, &errors).await.expect("Denial should redirect.");

		assert_eq!(redirect.location.as_str(), "https://che.example.com/error/access-denied");
	}

	assert!(authenticator.calls().is_empty());
}

#[tokio::test]
async fn callback_without_round_trip_fields_is_a_bad_request() {
	let authenticator = github();
	let broker = broker(vec![("github", authenticator.clone())], empty_store());
	let err = broker
		.callback(&request("https://che.example.com/api/oauth/callback?code=abc"), &[])
		.await
		.expect_err("Missing state should fail.");

	assert!(matches!(err, Error::Decode(_)));
	assert_eq!(err.class().status_code(), 400);

	let err = broker
		.callback(
			&request(
				"https://che.example.com/api/oauth/callback?code=abc&oauth_provider=gitlab&redirect_after_login=https://app/done",
			),
			&["server_error".to_owned()],
		)
		.await
		.expect_err("Unregistered provider in state should fail.");

	assert!(matches!(err, Error::ProviderNotFound { ref provider } if provider == "gitlab"));
	assert!(authenticator.calls().is_empty());
}

#[test]
fn list_providers_describes_every_registration_in_name_order() {
	let gitlab =
		Arc::new(MockAuthenticator::new("https://gitlab.com/oauth/authorize", "https://gitlab.com/"));
	let broker = broker(vec![("gitlab", gitlab), ("github", github())], empty_store());
	let descriptors =
		broker.list_providers(&request("https://che.example.com:8443/api/oauth?x=1"));

	assert_eq!(
		descriptors.iter().map(|d| d.name.as_ref()).collect::<Vec<&str>>(),
		vec!["github", "gitlab"]
	);
	assert_eq!(descriptors[0].endpoint_url.as_str(), "https://api.github.com/");

	let link = &descriptors[1].authenticate_link;

	assert_eq!(link.method, "GET");
	assert_eq!(link.rel, Link::AUTHENTICATE_REL);
	assert_eq!(link.href.as_str(), "https://che.example.com:8443/api/oauth/authenticate");
	assert_eq!(link.parameters[0].name, "oauth_provider");
	assert_eq!(link.parameters[0].default_value, "gitlab");
	assert!(link.parameters.iter().all(|parameter| parameter.required));
	assert_eq!(link.parameters[1].default_value, "federated_login");

	let json = serde_json::to_value(&descriptors[1]).expect("Descriptor should serialize.");

	assert_eq!(json["endpointUrl"], "https://gitlab.com/");
	assert_eq!(json["authenticateLink"]["parameters"][1]["defaultValue"], "federated_login");
}

#[test]
fn empty_registry_lists_nothing() {
	let broker = broker(Vec::new(), empty_store());

	assert!(broker.list_providers(&request("https://che.example.com/")).is_empty());
}
