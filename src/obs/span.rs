// self
use crate::{_prelude::*, authorizer::AuthMode, obs::Outcome};

#[cfg(feature = "tracing")]
pub(crate) type Traced<F> = tracing::instrument::Instrumented<F>;
#[cfg(not(feature = "tracing"))]
pub(crate) type Traced<F> = F;

/// Span around one observed call; zero-sized without the `tracing` feature.
#[derive(Clone, Debug)]
pub(crate) struct CallSpan {
	#[cfg(feature = "tracing")]
	inner: tracing::Span,
}
impl CallSpan {
	pub(crate) fn open(mode: AuthMode, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let inner = tracing::info_span!(
				"token_authorizer.call",
				mode = mode.as_str(),
				stage,
				outcome = tracing::field::Empty
			);

			Self { inner }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (mode, stage);

			Self {}
		}
	}

	/// Attaches the span to `fut` for every poll; no guard is held across `.await`.
	pub(crate) fn trace<F>(&self, fut: F) -> Traced<F>
	where
		F: Future,
	{
		#[cfg(feature = "tracing")]
		{
			tracing::Instrument::instrument(fut, self.inner.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}

	pub(crate) fn close(&self, outcome: Outcome) {
		#[cfg(feature = "tracing")]
		{
			self.inner.record("outcome", outcome.as_str());
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = outcome;
		}
	}
}
