//! Aggregated arbitration counters fed from the trace stream.

use crate::{OutputResource, TraceEvent, TraceSink, RESOURCE_COUNT};

/// Saturating counters over the trace events of a run.
///
/// Attach one as the [`TraceSink`] of a traced tick loop, or feed it
/// events manually through [`ArbiterStats::record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArbiterStats {
    /// Number of reset ticks observed.
    pub resets_applied: u64,
    /// Total grants registered across all resources.
    pub grants_issued: u64,
    /// Grants registered per output resource, indexed by resource.
    pub grants_by_resource: [u64; RESOURCE_COUNT],
    /// Acknowledgements that consumed a registered grant.
    pub acks_honored: u64,
    /// Ack-gated priority pointer rotations.
    pub pointers_advanced: u64,
    /// Request lanes masked to idle under the lenient decode policy.
    pub requests_masked: u64,
}

impl ArbiterStats {
    /// Creates a zeroed counter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one trace event into the counters.
    #[allow(clippy::missing_const_for_fn)]
    pub fn record(&mut self, event: TraceEvent) {
        match event {
            TraceEvent::ResetApplied => {
                self.resets_applied = self.resets_applied.saturating_add(1);
            }
            TraceEvent::RequestMasked { .. } => {
                self.requests_masked = self.requests_masked.saturating_add(1);
            }
            TraceEvent::GrantIssued { resource, .. } => {
                self.grants_issued = self.grants_issued.saturating_add(1);
                let lane = &mut self.grants_by_resource[resource.index()];
                *lane = lane.saturating_add(1);
            }
            TraceEvent::GrantAcked { .. } => {
                self.acks_honored = self.acks_honored.saturating_add(1);
            }
            TraceEvent::PointerAdvanced { .. } => {
                self.pointers_advanced = self.pointers_advanced.saturating_add(1);
            }
        }
    }

    /// Grants registered for one resource.
    #[must_use]
    pub const fn grants_for(&self, resource: OutputResource) -> u64 {
        self.grants_by_resource[resource.index()]
    }

    /// Clears all counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl TraceSink for ArbiterStats {
    fn on_event(&mut self, event: TraceEvent) {
        self.record(event);
    }
}
