//! Broker configuration with validated defaults.

// self
use crate::{_prelude::*, error::ConfigError};

/// Runtime configuration for [`OAuthBroker`](crate::broker::OAuthBroker).
///
/// Both paths are absolute paths on the broker's own host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
	/// Page users land on after a provider reports `access_denied`.
	pub error_page: String,
	/// Path of the `authenticate` endpoint advertised in discovery links.
	pub authenticate_path: String,
}
impl BrokerConfig {
	/// Default access-denied page.
	pub const DEFAULT_ERROR_PAGE: &str = "/error/access-denied";
	/// Default `authenticate` endpoint path.
	pub const DEFAULT_AUTHENTICATE_PATH: &str = "/api/oauth/authenticate";

	/// Starts a builder seeded with the defaults.
	pub fn builder() -> BrokerConfigBuilder {
		BrokerConfigBuilder { config: Self::default() }
	}

	/// Parses a JSON document, reporting the path of the first offending field.
	pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
		let deserializer = &mut serde_json::Deserializer::from_str(raw);
		let config: Self = serde_path_to_error::deserialize(deserializer)?;

		config.validate()?;

		Ok(config)
	}

	/// Checks that both paths are absolute.
	pub fn validate(&self) -> Result<(), ConfigError> {
		validate_path("error_page", &self.error_page)?;
		validate_path("authenticate_path", &self.authenticate_path)
	}
}
impl Default for BrokerConfig {
	fn default() -> Self {
		Self {
			error_page: Self::DEFAULT_ERROR_PAGE.into(),
			authenticate_path: Self::DEFAULT_AUTHENTICATE_PATH.into(),
		}
	}
}

/// Builder for [`BrokerConfig`].
#[derive(Clone, Debug)]
pub struct BrokerConfigBuilder {
	config: BrokerConfig,
}
impl BrokerConfigBuilder {
	/// Overrides the access-denied page path.
	pub fn error_page(mut self, path: impl Into<String>) -> Self {
		self.config.error_page = path.into();

		self
	}

	/// Overrides the advertised `authenticate` endpoint path.
	pub fn authenticate_path(mut self, path: impl Into<String>) -> Self {
		self.config.authenticate_path = path.into();

		self
	}

	/// Validates and returns the configuration.
	pub fn build(self) -> Result<BrokerConfig, ConfigError> {
		self.config.validate()?;

		Ok(self.config)
	}
}

fn validate_path(field: &'static str, value: &str) -> Result<(), ConfigError> {
	if value.starts_with('/') {
		Ok(())
	} else {
		Err(ConfigError::InvalidPath { field, value: value.to_owned() })
	}
}
