// self
use crate::obs::{LoginStep, StepOutcome};

/// Records a step outcome via the global metrics recorder (when enabled).
pub fn record_step_outcome(provider: &str, step: LoginStep, outcome: StepOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"social_oauth2_broker_step_total",
			"provider" => provider.to_owned(),
			"step" => step.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (provider, step, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_step_outcome_without_recorder() {
		record_step_outcome("weibo", LoginStep::TokenExchange, StepOutcome::Empty);
	}
}
