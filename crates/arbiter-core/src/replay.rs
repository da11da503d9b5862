//! Deterministic re-execution of a recorded stimulus stream.
//!
//! The arbiter has no hidden inputs, so a snapshot plus the tick-by-tick
//! stimulus that followed it reproduces the exact same state. This is the
//! mechanism behind divergence checks in the conformance tests and the
//! fingerprint example.

use crate::{
    tick_one, ArbiterConfig, ArbiterSnapshot, ArbiterState, ReplayError, TickInputs, TickOutcome,
};

/// Summary of a completed replay run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayOutcome {
    /// Final state after the last stimulus tick.
    pub state: ArbiterState,
    /// Number of ticks executed, including reset ticks.
    pub ticks_run: u64,
    /// Total grants registered across all run ticks.
    pub grants_issued: u64,
    /// Total ack-gated pointer rotations across all run ticks.
    pub pointers_advanced: u64,
    /// Number of ticks that applied a reset instead of arbitrating.
    pub resets_applied: u64,
}

/// Restores `snapshot` and replays `stimulus` over it tick by tick.
///
/// # Errors
///
/// Returns [`ReplayError::Snapshot`] when the snapshot version is not
/// understood, and [`ReplayError::Tick`] naming the zero-based offending
/// tick when a stimulus entry is rejected under the configured policy.
pub fn replay_from_snapshot(
    snapshot: &ArbiterSnapshot,
    stimulus: &[TickInputs],
    config: &ArbiterConfig,
) -> Result<ReplayOutcome, ReplayError> {
    let mut state = snapshot.restore()?;

    let mut ticks_run = 0_u64;
    let mut grants_issued = 0_u64;
    let mut pointers_advanced = 0_u64;
    let mut resets_applied = 0_u64;

    for (tick, inputs) in stimulus.iter().enumerate() {
        let outcome =
            tick_one(&mut state, inputs, config).map_err(|source| ReplayError::Tick {
                tick,
                source,
            })?;
        ticks_run += 1;
        match outcome {
            TickOutcome::ResetApplied => resets_applied += 1,
            TickOutcome::Advanced {
                grants_issued: grants,
                pointers_advanced: pointers,
            } => {
                grants_issued += u64::from(grants);
                pointers_advanced += u64::from(pointers);
            }
        }
    }

    Ok(ReplayOutcome {
        state,
        ticks_run,
        grants_issued,
        pointers_advanced,
        resets_applied,
    })
}
