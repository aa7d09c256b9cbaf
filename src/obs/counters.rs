// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{authorizer::AuthMode, obs::Outcome};

/// Thread-safe call counters, one per [`Outcome`].
#[derive(Debug, Default)]
pub struct OutcomeCounters([AtomicU64; 3]);
impl OutcomeCounters {
	/// Returns how many times `outcome` was recorded.
	pub fn get(&self, outcome: Outcome) -> u64 {
		self.0[outcome as usize].load(Ordering::Relaxed)
	}

	/// Calls started.
	pub fn attempts(&self) -> u64 {
		self.get(Outcome::Attempt)
	}

	/// Calls that produced a value.
	pub fn successes(&self) -> u64 {
		self.get(Outcome::Success)
	}

	/// Calls that returned an error.
	pub fn failures(&self) -> u64 {
		self.get(Outcome::Failure)
	}

	pub(crate) fn bump(&self, outcome: Outcome) {
		self.0[outcome as usize].fetch_add(1, Ordering::Relaxed);
	}
}

/// Forwards one outcome to the global `metrics` recorder, if compiled in.
pub(crate) fn emit(mode: AuthMode, stage: &'static str, outcome: Outcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"token_authorizer_calls_total",
			"mode" => mode.as_str(),
			"stage" => stage,
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (mode, stage, outcome);
	}
}
