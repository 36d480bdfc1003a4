//! Round-trip flow state carried through the provider redirect.
//!
//! The broker keeps no server-side session: everything needed to finish a flow rides in
//! the authorize URL and comes back on the callback URL. [`FlowStateCodec::encode`] writes
//! the provider name, the requested scopes, and the post-login redirect as query
//! parameters; [`FlowStateCodec::apply`] appends them to the authorize URL both at top level
//! and packed into the standard `state` parameter, so the state survives whether a
//! provider echoes all parameters or only `state`. [`FlowStateCodec::decode`] reads them
//! back, preferring a packed `state` value and falling back to top-level parameters.
//!
//! The parameter names are a wire contract with external providers and must not change.

// std
use std::borrow::Cow;
// crates.io
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{IdentifierError, ProviderName, ScopeList, ScopeValidationError},
};

/// Query parameter carrying the provider name.
pub const OAUTH_PROVIDER_PARAM: &str = "oauth_provider";
/// Query parameter carrying one (or a delimited list of) requested scope(s).
pub const SCOPE_PARAM: &str = "scope";
/// Query parameter carrying the post-login redirect target.
pub const REDIRECT_AFTER_LOGIN_PARAM: &str = "redirect_after_login";
/// Standard OAuth parameter providers echo back verbatim.
pub const STATE_PARAM: &str = "state";

/// Errors raised while decoding flow state from a callback URL.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// A required round-trip field is absent.
	#[error("Required parameter `{name}` is missing.")]
	MissingParameter {
		/// Missing parameter name.
		name: &'static str,
	},
	/// The provider name is not a valid identifier.
	#[error("Parameter `oauth_provider` is invalid.")]
	InvalidProvider(#[source] IdentifierError),
	/// The post-login redirect is not an absolute HTTP(S) URL.
	#[error("Parameter `redirect_after_login` is not an absolute HTTP(S) URL: {value}.")]
	InvalidRedirect {
		/// Rejected value.
		value: String,
	},
	/// A scope entry is malformed.
	#[error("Parameter `scope` is invalid.")]
	InvalidScope(#[from] ScopeValidationError),
}

/// Data needed to resume after the user returns from a provider's consent page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowState {
	/// Provider the flow was started against.
	pub provider: ProviderName,
	/// Scopes requested at `authenticate` time, in request order.
	pub scopes: ScopeList,
	/// Where the user lands once the callback completes.
	pub post_login_redirect: Url,
}
impl FlowState {
	/// Creates a flow state.
	pub fn new(provider: ProviderName, scopes: ScopeList, post_login_redirect: Url) -> Self {
		Self { provider, scopes, post_login_redirect }
	}
}

/// Encoder/decoder for [`FlowState`] query parameters.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlowStateCodec;
impl FlowStateCodec {
	/// Serializes `state` into a form-urlencoded query fragment.
	///
	/// Scopes are emitted as repeated `scope` parameters in request order.
	pub fn encode(state: &FlowState) -> String {
		let mut serializer = form_urlencoded::Serializer::new(String::new());

		serializer.append_pair(OAUTH_PROVIDER_PARAM, &state.provider);

		for scope in &state.scopes {
			serializer.append_pair(SCOPE_PARAM, scope);
		}

		serializer.append_pair(REDIRECT_AFTER_LOGIN_PARAM, state.post_login_redirect.as_str());
		serializer.finish()
	}

	/// Appends the encoded state to `url`, top-level and packed into `state`.
	///
	/// A `state` value the authenticator already placed on the URL is left untouched; such a flow
	/// only decodes if the provider echoes the top-level parameters back.
	pub fn apply(state: &FlowState, url: &mut Url) {
		let fragment = Self::encode(state);
		let has_state = url.query_pairs().any(|(key, _)| key == STATE_PARAM);
		let mut pairs = url.query_pairs_mut();

		for (key, value) in form_urlencoded::parse(fragment.as_bytes()) {
			pairs.append_pair(&key, &value);
		}

		if !has_state {
			pairs.append_pair(STATE_PARAM, &fragment);
		}

		drop(pairs);
	}

	/// Extracts the flow state from an inbound callback URL.
	///
	/// Extra and reordered parameters are ignored. There is no default provider: a missing
	/// `oauth_provider` or `redirect_after_login` fails the decode.
	pub fn decode(inbound: &Url) -> Result<FlowState, DecodeError> {
		let top_level = inbound.query_pairs().collect::<Vec<_>>();
		let packed = top_level
			.iter()
			.find(|(key, _)| key == STATE_PARAM)
			.map(|(_, value)| form_urlencoded::parse(value.as_bytes()).collect::<Vec<_>>())
			.filter(|pairs| pairs.iter().any(|(key, _)| key == OAUTH_PROVIDER_PARAM));

		match packed {
			Some(pairs) => decode_pairs(&pairs),
			None => decode_pairs(&top_level),
		}
	}
}

fn decode_pairs(pairs: &[(Cow<'_, str>, Cow<'_, str>)]) -> Result<FlowState, DecodeError> {
	let provider = first_value(pairs, OAUTH_PROVIDER_PARAM)
		.ok_or(DecodeError::MissingParameter { name: OAUTH_PROVIDER_PARAM })?;
	let provider = ProviderName::new(provider).map_err(DecodeError::InvalidProvider)?;
	let redirect = first_value(pairs, REDIRECT_AFTER_LOGIN_PARAM)
		.ok_or(DecodeError::MissingParameter { name: REDIRECT_AFTER_LOGIN_PARAM })?;
	let post_login_redirect = parse_redirect(redirect)?;
	let scopes = ScopeList::parse_delimited(
		pairs.iter().filter(|(key, _)| key == SCOPE_PARAM).map(|(_, value)| value.as_ref()),
	)?;

	Ok(FlowState { provider, scopes, post_login_redirect })
}

fn first_value<'a>(pairs: &'a [(Cow<'_, str>, Cow<'_, str>)], name: &str) -> Option<&'a str> {
	pairs.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_ref())
}

/// Parses a post-login redirect, accepting only absolute HTTP(S) URLs.
pub fn parse_redirect(value: &str) -> Result<Url, DecodeError> {
	match Url::parse(value) {
		Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(url),
		_ => Err(DecodeError::InvalidRedirect { value: value.to_owned() }),
	}
}
