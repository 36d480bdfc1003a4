//! Transport-agnostic request context and redirect result.

// self
use crate::{
	_prelude::*,
	auth::AuthenticationSubject,
	flow::{DecodeError, parse_redirect},
};

/// Query parameter name of the in-band error marker on post-login redirects.
pub const ERROR_QUERY_NAME: &str = "error";
/// Provider error code signalling the user declined consent.
pub const ACCESS_DENIED: &str = "access_denied";

/// Already-parsed view of the inbound HTTP request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestContext {
	/// Full URL of the inbound request, query included.
	pub request_url: Url,
	/// Authenticated caller of the request, if the session carries one.
	pub subject: Option<AuthenticationSubject>,
}
impl RequestContext {
	/// Wraps an inbound request URL.
	pub fn new(request_url: Url) -> Self {
		Self { request_url, subject: None }
	}

	/// Attaches the authenticated caller.
	pub fn with_subject(mut self, subject: AuthenticationSubject) -> Self {
		self.subject = Some(subject);

		self
	}

	/// Scheme, host, and port of the inbound request with an empty path.
	pub fn base_url(&self) -> Url {
		self.with_path("/")
	}

	/// The inbound request's origin with `path` and no query or fragment.
	pub fn with_path(&self, path: &str) -> Url {
		let mut url = self.request_url.clone();

		url.set_path(path);
		url.set_query(None);
		url.set_fragment(None);

		url
	}
}

/// Redirect instruction returned to the transport layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redirect {
	/// Absolute target URL.
	pub location: Url,
}
impl Redirect {
	/// HTTP status used for broker redirects (temporary redirect).
	pub const STATUS_CODE: u16 = 307;

	/// Redirects to `location`.
	pub fn to(location: Url) -> Self {
		Self { location }
	}

	/// Redirects to `target` with `&error=access_denied` appended verbatim.
	///
	/// The marker is concatenated onto the serialized URL rather than added as a proper
	/// query pair; calling applications parse exactly this shape.
	pub fn with_error_marker(target: &Url) -> Result<Self, DecodeError> {
		let marked = format!("{target}&{ERROR_QUERY_NAME}={ACCESS_DENIED}");

		parse_redirect(&marked).map(Self::to)
	}
}
