//! Optional observability helpers for the resolve pipeline.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `lookup_bridge.stage` with the `stage`
//!   (pipeline step) and `site` (call site) fields.
//! - Enable `metrics` to increment the `lookup_bridge_stage_total` counter for every
//!   attempt/success/failure, labeled by `stage` + `outcome`.
//!
//! Both features are off by default; every helper degrades to a no-op so the resolve pipeline
//! can call them unconditionally.

// self
use crate::_prelude::*;

/// Pipeline stages observed by the bridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageKind {
	/// Whole resolve invocation.
	Resolve,
	/// Credential fetch from the secret store.
	CredentialFetch,
	/// Client-credentials token issuance.
	TokenIssue,
	/// Downstream record lookup (recorded per attempt).
	Lookup,
}
impl StageKind {
	/// Stable label used in span fields and metric labels.
	pub const fn as_str(self) -> &'static str {
		match self {
			StageKind::Resolve => "resolve",
			StageKind::CredentialFetch => "credential_fetch",
			StageKind::TokenIssue => "token_issue",
			StageKind::Lookup => "lookup",
		}
	}
}
impl Display for StageKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageOutcome {
	/// Entry to a pipeline stage.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl StageOutcome {
	/// Stable label used in span fields and metric labels.
	pub const fn as_str(self) -> &'static str {
		match self {
			StageOutcome::Attempt => "attempt",
			StageOutcome::Success => "success",
			StageOutcome::Failure => "failure",
		}
	}
}
impl Display for StageOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records a stage outcome via the global metrics recorder (when enabled).
pub fn record_stage_outcome(kind: StageKind, outcome: StageOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(
		"lookup_bridge_stage_total",
		"stage" => kind.as_str(),
		"outcome" => outcome.as_str()
	)
	.increment(1);

	#[cfg(not(feature = "metrics"))]
	let _ = (kind, outcome);
}

/// Future type produced by [`StageSpan::instrument`] when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedStage<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type used when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedStage<F> = F;

/// Span handle tied to one pipeline stage.
#[derive(Clone, Debug)]
pub struct StageSpan {
	kind: StageKind,
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl StageSpan {
	/// Opens a span for the provided stage kind at the given call site.
	pub fn new(kind: StageKind, site: &'static str) -> Self {
		#[cfg(not(feature = "tracing"))]
		let _ = site;

		Self {
			kind,
			#[cfg(feature = "tracing")]
			span: tracing::info_span!("lookup_bridge.stage", stage = kind.as_str(), site),
		}
	}

	/// Returns the stage this span belongs to.
	pub fn kind(&self) -> StageKind {
		self.kind
	}

	/// Attaches the span to an async block; no guard is held across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedStage<Fut>
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

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn labels_are_stable() {
		assert_eq!(StageKind::CredentialFetch.as_str(), "credential_fetch");
		assert_eq!(StageOutcome::Failure.as_str(), "failure");
	}

	#[test]
	fn record_stage_outcome_noop_without_metrics() {
		record_stage_outcome(StageKind::Lookup, StageOutcome::Failure);
	}

	#[tokio::test]
	async fn instrument_passes_the_future_through() {
		let span = StageSpan::new(StageKind::Resolve, "instrument_passes_the_future_through");

		assert_eq!(span.kind(), StageKind::Resolve);
		assert_eq!(span.instrument(async { 42 }).await, 42);
	}
}
