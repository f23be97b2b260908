//! Optional observability helpers for login steps.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `social_oauth2_broker.step` with the
//!   `provider` and `step` fields, plus warn/debug events for provider faults and empty answers.
//! - Enable `metrics` to increment the `social_oauth2_broker_step_total` counter for every
//!   attempt/success/empty/failure, labeled by `provider` + `step` + `outcome`.
//!
//! Secrets (client secrets, codes, tokens) never reach spans, events, or labels.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Steps of a social login observed by the broker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoginStep {
	/// Authorization URL construction.
	LoginUrl,
	/// Authorization-code exchange.
	TokenExchange,
	/// Follow-up call resolving the provider user id.
	CorrelationLookup,
	/// Profile retrieval and normalization.
	ProfileFetch,
	/// End-to-end callback handling.
	CompleteLogin,
}
impl LoginStep {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			LoginStep::LoginUrl => "login_url",
			LoginStep::TokenExchange => "token_exchange",
			LoginStep::CorrelationLookup => "correlation_lookup",
			LoginStep::ProfileFetch => "profile_fetch",
			LoginStep::CompleteLogin => "complete_login",
		}
	}
}
impl Display for LoginStep {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepOutcome {
	/// Entry to a broker helper.
	Attempt,
	/// Successful completion.
	Success,
	/// The provider answered with nothing usable.
	Empty,
	/// Failure propagated back to the caller.
	Failure,
}
impl StepOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StepOutcome::Attempt => "attempt",
			StepOutcome::Success => "success",
			StepOutcome::Empty => "empty",
			StepOutcome::Failure => "failure",
		}
	}

	/// Classifies a step result: `Ok(Some)` is a success, `Ok(None)` is empty.
	pub fn of<T, E>(result: &Result<Option<T>, E>) -> Self {
		match result {
			Ok(Some(_)) => StepOutcome::Success,
			Ok(None) => StepOutcome::Empty,
			Err(_) => StepOutcome::Failure,
		}
	}
}
impl Display for StepOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
