//! Token values handed back to callers, with redacted formatting.

// self
use crate::{_prelude::*, auth::ProviderName};

/// Redacted token secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Fallback step that produced a [`Token`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSource {
	/// Live OAuth token keyed by the subject's user id.
	OAuthByUserId,
	/// Live OAuth token keyed by the subject's user name.
	OAuthByUserName,
	/// Persisted personal access token.
	PersonalAccessToken,
}
impl TokenSource {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenSource::OAuthByUserId => "user_id",
			TokenSource::OAuthByUserName => "user_name",
			TokenSource::PersonalAccessToken => "personal_access_token",
		}
	}
}
impl Display for TokenSource {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Usable token for one provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
	/// Secret token value.
	pub value: TokenSecret,
	/// Provider the token belongs to.
	pub provider: ProviderName,
	/// Fallback step that produced the token.
	pub source: TokenSource,
	/// Expiry reported by the issuer, when known.
	pub expires_at: Option<OffsetDateTime>,
}
impl Token {
	/// Creates a token without a known expiry.
	pub fn new(value: TokenSecret, provider: ProviderName, source: TokenSource) -> Self {
		Self { value, provider, source, expires_at: None }
	}

	/// Attaches an expiry instant.
	pub fn with_expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}
}
