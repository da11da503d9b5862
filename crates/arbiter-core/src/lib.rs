//! Round-robin arbitration core for an 8x8 crossbar switch.

/// Input port and output resource identifiers for the 8x8 crossbar.
pub mod port;
pub use port::{InputPort, OutputResource, MAX_REQUEST_VALUE, PORT_COUNT, RESOURCE_COUNT};

/// Fault taxonomy for rejected ticks, snapshots, and replays.
pub mod fault;
pub use fault::{ReplayError, SnapshotError, TickError};

/// Request decode and per-resource eligibility classification.
pub mod classify;
pub use classify::{
    classify_requests, decode_requests, DecodedRequests, EligibilitySet, RequestField,
};

/// Per-resource round-robin winner selection.
pub mod select;
pub use select::{select_winner, GrantDecision};

/// Host-visible arbiter state and canonical reset semantics.
pub mod state;
pub use state::{ArbiterPhase, ArbiterState, GrantOutputs};

/// Public host-facing API contracts for embedding the arbitration core.
pub mod api;
pub use api::{
    ArbiterConfig, ArbiterSnapshot, InvalidRequestPolicy, SnapshotVersion, TickInputs,
    TickOutcome, TraceEvent, TraceSink,
};

/// Tick pipeline: request decode, selection, and the commit/advance stage.
pub mod step;
pub use step::{commit_decision, compute_decision, tick_one, tick_one_traced};

/// Deterministic re-execution of a recorded stimulus stream.
pub mod replay;
pub use replay::{replay_from_snapshot, ReplayOutcome};

/// Aggregated arbitration counters fed from the trace stream.
pub mod stats;
pub use stats::ArbiterStats;

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
