// self
use crate::{_prelude::*, obs::LoginStep, provider::Endpoint};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedStep<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedStep<F> = F;

/// A span builder used by login steps.
#[derive(Clone, Debug)]
pub struct StepSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl StepSpan {
	/// Creates a new span tagged with the provider and step.
	pub fn new(provider: &str, step: LoginStep) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("social_oauth2_broker.step", provider, step = step.as_str());

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (provider, step);

			Self {}
		}
	}

	/// Enters the span for synchronous sections.
	pub fn entered(self) -> StepSpanGuard {
		#[cfg(feature = "tracing")]
		{
			StepSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			StepSpanGuard {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedStep<Fut>
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

/// RAII guard returned by [`StepSpan::entered`].
pub struct StepSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for StepSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("StepSpanGuard(..)")
	}
}

/// Emits a warning for an error code reported inside a 2xx response.
pub fn trace_provider_fault(endpoint: Endpoint, code: &str, message: Option<&str>) {
	#[cfg(feature = "tracing")]
	tracing::warn!(endpoint = endpoint.as_str(), code, detail = message, "provider reported an error");
	#[cfg(not(feature = "tracing"))]
	let _ = (endpoint, code, message);
}

/// Emits a debug event when an endpoint answered without usable content.
pub fn trace_empty_response(endpoint: Endpoint, reason: &'static str) {
	#[cfg(feature = "tracing")]
	tracing::debug!(endpoint = endpoint.as_str(), reason, "provider response carried nothing usable");
	#[cfg(not(feature = "tracing"))]
	let _ = (endpoint, reason);
}

/// Emits a warning when a call fails before a usable response arrives.
pub fn trace_call_failure(endpoint: Endpoint, error: &Error) {
	#[cfg(feature = "tracing")]
	tracing::warn!(endpoint = endpoint.as_str(), error = %error, "provider call failed");
	#[cfg(not(feature = "tracing"))]
	let _ = (endpoint, error);
}

/// Emits a debug event when a login attempt ends without an identity.
pub fn trace_login_declined(reason: &'static str) {
	#[cfg(feature = "tracing")]
	tracing::debug!(reason, "login attempt declined");
	#[cfg(not(feature = "tracing"))]
	let _ = reason;
}

/// Emits a debug event when the caller cancels a login; `started` tells whether any provider
/// call had begun.
pub fn trace_login_cancelled(provider: &str, started: bool) {
	#[cfg(feature = "tracing")]
	tracing::debug!(provider, started, "login attempt cancelled");
	#[cfg(not(feature = "tracing"))]
	let _ = (provider, started);
}
