// self
use crate::{
	auth::TokenSource,
	obs::{Operation, Outcome},
};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_outcome(operation: Operation, outcome: Outcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth_broker_operation_total",
			"operation" => operation.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (operation, outcome);
	}
}

/// Records which fallback step produced a resolved token.
pub fn record_token_source(source: TokenSource) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("oauth_broker_token_source_total", "source" => source.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = source;
	}
}
