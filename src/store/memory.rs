//! Thread-safe in-memory [`TokenStore`] for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{AuthenticationSubject, UserId},
	store::{PersonalAccessToken, StoreError, StoreFuture, TokenStore, endpoint_key},
};

type StoreMap = Arc<RwLock<HashMap<StoreKey, StoredToken>>>;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct StoreKey {
	user_id: UserId,
	endpoint: String,
}
impl StoreKey {
	fn new(user_id: &UserId, endpoint_url: &Url) -> Self {
		Self { user_id: user_id.clone(), endpoint: endpoint_key(endpoint_url) }
	}
}

#[derive(Clone, Debug)]
struct StoredToken {
	token: PersonalAccessToken,
	unauthorized: bool,
}

/// Keeps personal access tokens in-process, keyed by owner + SCM endpoint.
#[derive(Clone, Debug, Default)]
pub struct MemoryTokenStore(StoreMap);
impl MemoryTokenStore {
	/// Inserts or replaces the token for its owner + endpoint pair.
	pub fn save(&self, token: PersonalAccessToken) {
		let key = StoreKey::new(&token.user_id, &token.scm_provider_url);

		self.0.write().insert(key, StoredToken { token, unauthorized: false });
	}

	/// Removes and returns the token stored for the pair, if any.
	pub fn remove(&self, user_id: &UserId, endpoint_url: &Url) -> Option<PersonalAccessToken> {
		self.0.write().remove(&StoreKey::new(user_id, endpoint_url)).map(|stored| stored.token)
	}

	/// Flags a stored token as rejected by the SCM; later lookups report
	/// [`StoreError::Unauthorized`]. Returns `false` when nothing is stored for the pair.
	pub fn mark_unauthorized(&self, user_id: &UserId, endpoint_url: &Url) -> bool {
		match self.0.write().get_mut(&StoreKey::new(user_id, endpoint_url)) {
			Some(stored) => {
				stored.unauthorized = true;

				true
			},
			None => false,
		}
	}

	/// Number of stored tokens.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns true when no tokens are stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	fn find_now(
		map: &StoreMap,
		user_id: &UserId,
		endpoint_url: &Url,
	) -> Result<Option<PersonalAccessToken>, StoreError> {
		match map.read().get(&StoreKey::new(user_id, endpoint_url)) {
			Some(stored) if stored.unauthorized => Err(StoreError::Unauthorized {
				message: format!("token for {} was rejected by {endpoint_url}", user_id),
			}),
			Some(stored) => Ok(Some(stored.token.clone())),
			None => Ok(None),
		}
	}
}
impl TokenStore for MemoryTokenStore {
	fn find<'a>(
		&'a self,
		subject: &'a AuthenticationSubject,
		endpoint_url: &'a Url,
	) -> StoreFuture<'a, Option<PersonalAccessToken>> {
		Box::pin(async move { Self::find_now(&self.0, &subject.user_id, endpoint_url) })
	}
}
