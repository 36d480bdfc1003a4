//! Caller identity threaded explicitly into token operations.

// self
use crate::{_prelude::*, auth::UserId};

/// Identity of the caller on whose behalf tokens are resolved.
///
/// Providers disagree on which identity field keys their token cache, so both the stable
/// identifier and the display/login name are carried.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthenticationSubject {
	/// Stable user identifier.
	pub user_id: UserId,
	/// Login name; some providers index tokens by this instead of the id.
	pub user_name: String,
}
impl AuthenticationSubject {
	/// Creates a subject from its two identity keys.
	pub fn new(user_id: UserId, user_name: impl Into<String>) -> Self {
		Self { user_id, user_name: user_name.into() }
	}
}
