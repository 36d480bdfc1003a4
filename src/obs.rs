//! Optional observability helpers for broker operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth_broker.operation` with the
//!   `operation` and `provider` fields, plus events for denials, exchange failures, and
//!   fallback misses.
//! - Enable `metrics` to increment the `oauth_broker_operation_total` counter for every
//!   attempt/success/failure, labeled by `operation` + `outcome`, and
//!   `oauth_broker_token_source_total` labeled by the fallback step that produced a token.

mod metrics;
mod tracing;

pub use self::metrics::*;
pub use self::tracing::*;

// self
use crate::_prelude::*;

/// Broker operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	/// Redirect to a provider's consent page.
	Authenticate,
	/// Provider redirect back to the broker.
	Callback,
	/// Provider discovery.
	ListProviders,
	/// Current-token resolution.
	GetToken,
	/// Token invalidation.
	InvalidateToken,
}
impl Operation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::Authenticate => "authenticate",
			Operation::Callback => "callback",
			Operation::ListProviders => "list_providers",
			Operation::GetToken => "get_token",
			Operation::InvalidateToken => "invalidate_token",
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// Entry to a broker operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::Success => "success",
			Outcome::Failure => "failure",
		}
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
