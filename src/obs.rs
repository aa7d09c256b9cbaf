//! Observability for header production and credential exchange.
//!
//! Every observed call runs through one wrapper that opens a span, records the attempt, awaits
//! the call, and records how it ended.
//!
//! # Feature Flags
//!
//! - `tracing`: each call runs inside a `token_authorizer.call` span carrying `mode` (authorizer
//!   variant), `stage` (`header` or `exchange`) and, once known, `outcome`.
//! - `metrics`: each attempt/success/failure increments `token_authorizer_calls_total`, labeled by
//!   `mode`, `stage` and `outcome`.
//!
//! Per-instance [`OutcomeCounters`] are always available regardless of features.

mod counters;
mod span;

pub use counters::OutcomeCounters;

// self
use crate::{_prelude::*, authorizer::AuthMode};
use span::CallSpan;

/// How an observed call progressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// The call started.
	Attempt = 0,
	/// The call produced a value.
	Success = 1,
	/// The call returned an error.
	Failure = 2,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Attempt => "attempt",
			Self::Success => "success",
			Self::Failure => "failure",
		}
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `call` inside a span and records its attempt and result.
///
/// `tally` receives the same outcomes as the global recorder.
pub(crate) async fn observe<T, Fut>(
	mode: AuthMode,
	stage: &'static str,
	tally: Option<&OutcomeCounters>,
	call: Fut,
) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = CallSpan::open(mode, stage);

	note(mode, stage, tally, Outcome::Attempt);

	let result = span.trace(call).await;
	let outcome = if result.is_ok() { Outcome::Success } else { Outcome::Failure };

	span.close(outcome);
	note(mode, stage, tally, outcome);

	result
}

fn note(mode: AuthMode, stage: &'static str, tally: Option<&OutcomeCounters>, outcome: Outcome) {
	counters::emit(mode, stage, outcome);

	if let Some(tally) = tally {
		tally.bump(outcome);
	}
}
