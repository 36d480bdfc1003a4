//! Broker-level error types shared across the codec, resolver, and broker facade.

// self
use crate::_prelude::*;

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Requested provider name is not registered.
	#[error("Unsupported OAuth provider {provider}.")]
	ProviderNotFound {
		/// Provider name exactly as supplied by the caller.
		provider: String,
	},
	/// Callback URL lacks (or carries malformed) round-trip fields.
	#[error(transparent)]
	Decode(#[from] crate::flow::DecodeError),
	/// No token could be obtained through any fallback step.
	#[error("{message}")]
	TokenNotFound {
		/// Human-readable description naming the user or provider.
		message: String,
	},
	/// Authenticator refused to build an authorization URL.
	#[error("Provider rejected the authorization request: {reason}.")]
	Authorization {
		/// Authenticator-supplied reason string.
		reason: String,
	},
	/// Collaborator I/O, configuration, or communication failure.
	#[error("{message}")]
	Server {
		/// Summary of the failing collaborator call.
		message: String,
		/// Underlying cause.
		#[source]
		source: BoxError,
	},
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}
impl Error {
	/// Builds a [`Error::ProviderNotFound`] for the supplied name.
	pub fn provider_not_found(provider: impl Into<String>) -> Self {
		Self::ProviderNotFound { provider: provider.into() }
	}

	/// Token lookup for a user found nothing.
	pub fn token_not_found_for_user(user_id: impl Display) -> Self {
		Self::TokenNotFound { message: format!("OAuth token for user {user_id} was not found.") }
	}

	/// Provider reported the token as unknown during invalidation.
	pub fn token_not_found_for_provider(provider: impl Display) -> Self {
		Self::TokenNotFound {
			message: format!("OAuth token for provider {provider} was not found."),
		}
	}

	/// Wraps a collaborator failure, keeping it reachable through [`StdError::source`].
	pub fn server(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Server { message: src.to_string(), source: Box::new(src) }
	}

	/// Classifies the error into the boundary outcome a transport should report.
	pub fn class(&self) -> ErrorClass {
		match self {
			Error::ProviderNotFound { .. } => ErrorClass::NotFound,
			Error::Decode(_) | Error::Authorization { .. } => ErrorClass::BadRequest,
			Error::TokenNotFound { .. } => ErrorClass::Unauthorized,
			Error::Server { .. } | Error::Config(_) => ErrorClass::Server,
		}
	}
}

/// Boundary outcome classes for broker errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorClass {
	/// Unknown provider.
	NotFound,
	/// Malformed request or provider refusal before any exchange.
	BadRequest,
	/// No usable credential for the caller.
	Unauthorized,
	/// Collaborator or configuration failure.
	Server,
}
impl ErrorClass {
	/// HTTP status code conventionally used for this class.
	pub const fn status_code(self) -> u16 {
		match self {
			ErrorClass::NotFound => 404,
			ErrorClass::BadRequest => 400,
			ErrorClass::Unauthorized => 401,
			ErrorClass::Server => 500,
		}
	}
}

/// Configuration and validation failures raised while assembling the broker.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A configured path is not absolute.
	#[error("The {field} path must start with '/': {value}.")]
	InvalidPath {
		/// Configuration field name.
		field: &'static str,
		/// Rejected value.
		value: String,
	},
	/// Configuration document could not be parsed.
	#[error("Configuration is invalid at `{path}`.")]
	Parse {
		/// Path to the offending field inside the document.
		path: String,
		/// Structured parsing failure.
		#[source]
		source: serde_json::Error,
	},
	/// A provider name was registered twice.
	#[error("OAuth provider {provider} is already registered.")]
	DuplicateProvider {
		/// Offending provider name.
		provider: String,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<serde_path_to_error::Error<serde_json::Error>> for ConfigError {
	fn from(e: serde_path_to_error::Error<serde_json::Error>) -> Self {
		let path = e.path().to_string();

		Self::Parse { path, source: e.into_inner() }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
