// self
use crate::{_prelude::*, obs::Operation};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOperation<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOperation<F> = F;

/// Span wrapping one broker operation.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OperationSpan {
	/// Creates a span tagged with the operation and, when known up front, the provider name.
	pub fn new(operation: Operation, provider: Option<&str>) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"oauth_broker.operation",
				operation = operation.as_str(),
				provider
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (operation, provider);

			Self {}
		}
	}

	/// Enters the span for synchronous sections.
	pub fn entered(self) -> OperationSpanGuard {
		#[cfg(feature = "tracing")]
		{
			OperationSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			OperationSpanGuard {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOperation<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// RAII guard returned by [`OperationSpan::entered`].
pub struct OperationSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for OperationSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("OperationSpanGuard(..)")
	}
}

/// A lookup named a provider nobody registered.
pub fn unknown_provider(provider: &str) {
	#[cfg(feature = "tracing")]
	tracing::warn!(provider, "Unsupported OAuth provider.");
	#[cfg(not(feature = "tracing"))]
	let _ = provider;
}

/// The provider reported a denial; the user is sent to the error page.
pub fn access_denied(error_page: &Url) {
	#[cfg(feature = "tracing")]
	tracing::info!(%error_page, "Provider reported access_denied; redirecting to the error page.");
	#[cfg(not(feature = "tracing"))]
	let _ = error_page;
}

/// The code exchange failed and is reported in-band on the post-login redirect.
pub fn exchange_failed(provider: &str, error: &dyn StdError) {
	#[cfg(feature = "tracing")]
	tracing::warn!(provider, error = %error, "Authorization exchange failed.");
	#[cfg(not(feature = "tracing"))]
	let _ = (provider, error);
}

/// A fallback step of the token chain found nothing.
pub fn fallback_miss(step: &'static str) {
	#[cfg(feature = "tracing")]
	tracing::debug!(step, "Token lookup step found nothing.");
	#[cfg(not(feature = "tracing"))]
	let _ = step;
}
