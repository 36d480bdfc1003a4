//! Discovery projections returned by `list_providers`.

// self
use crate::{_prelude::*, auth::ProviderName};

/// Parameter advertised on a discovery [`Link`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkParameter {
	/// Query parameter name.
	pub name: String,
	/// Value pre-filled for the caller.
	pub default_value: String,
	/// Whether the parameter must be sent.
	pub required: bool,
}

/// Hypermedia link pointing back at a broker endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
	/// HTTP method.
	pub method: String,
	/// Absolute target URL.
	pub href: Url,
	/// Link relation label.
	pub rel: String,
	/// Parameters the caller should supply.
	pub parameters: Vec<LinkParameter>,
}
impl Link {
	/// Relation label of authenticate links.
	pub const AUTHENTICATE_REL: &str = "Authenticate URL";
	/// Login mode advertised on authenticate links.
	pub const FEDERATED_LOGIN_MODE: &str = "federated_login";

	/// Builds the `GET` authenticate link for `provider`.
	pub fn authenticate(href: Url, provider: &ProviderName) -> Self {
		Self {
			method: "GET".into(),
			href,
			rel: Self::AUTHENTICATE_REL.into(),
			parameters: vec![
				LinkParameter {
					name: crate::flow::OAUTH_PROVIDER_PARAM.into(),
					default_value: provider.to_string(),
					required: true,
				},
				LinkParameter {
					name: "mode".into(),
					default_value: Self::FEDERATED_LOGIN_MODE.into(),
					required: true,
				},
			],
		}
	}
}

/// Read-only view of one registered provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDescriptor {
	/// Registered provider name.
	pub name: ProviderName,
	/// SCM endpoint the provider's authenticator talks to.
	pub endpoint_url: Url,
	/// Link that starts the flow for this provider.
	pub authenticate_link: Link,
}
