//! Public host-facing API contracts for embedding the arbitration core.

use crate::{
    ArbiterState, InputPort, OutputResource, SnapshotError, PORT_COUNT, RESOURCE_COUNT,
};

/// Policy for request values above the resource selector range.
///
/// The reference design leaves such values undefined; both policies here are
/// deterministic and observable. Clamping is deliberately not offered: it
/// would invent a request the input never made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum InvalidRequestPolicy {
    /// Reject the whole tick with [`crate::TickError::RequestOutOfRange`];
    /// nothing mutates.
    #[default]
    Fault,
    /// Decode the offending lane as idle; the masking is reported through
    /// [`TraceEvent::RequestMasked`] and the diagnostic counters.
    TreatAsIdle,
}

/// Top-level immutable configuration for an arbiter instance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ArbiterConfig {
    /// Out-of-range request handling policy.
    pub invalid_request_policy: InvalidRequestPolicy,
    /// Enables deterministic trace callback dispatch.
    pub tracing_enabled: bool,
}

/// One tick's input stimulus, sampled at the tick boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TickInputs {
    /// Synchronous reset; overrides every other input this tick.
    pub reset: bool,
    /// Raw request value per input port (`0` = idle, `v` = resource `v-1`).
    pub request: [u8; PORT_COUNT],
    /// Acknowledge flag per output resource, matched against the grant that
    /// was visible at the start of this tick.
    pub ack: [bool; RESOURCE_COUNT],
}

impl TickInputs {
    /// Stimulus with reset deasserted and every lane idle.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            reset: false,
            request: [0; PORT_COUNT],
            ack: [false; RESOURCE_COUNT],
        }
    }
}

/// Outcome of one committed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickOutcome {
    /// Reset was asserted; the canonical zero state is now visible.
    ResetApplied,
    /// Normal arbitration tick committed.
    Advanced {
        /// Resources granted by this tick's registered decision.
        grants_issued: u8,
        /// Priority pointers moved by ack-gated rotation.
        pointers_advanced: u8,
    },
}

/// Deterministic trace events emitted in commit order when tracing is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// A reset tick restored the canonical state.
    ResetApplied,
    /// An out-of-range request lane was decoded as idle (lenient policy).
    RequestMasked {
        /// Port whose lane was masked.
        port: InputPort,
        /// Raw out-of-range value supplied on that lane.
        raw_value: u8,
    },
    /// This tick's decision registered a winner for a resource.
    GrantIssued {
        /// Resource being granted.
        resource: OutputResource,
        /// Input port winning the resource.
        winner: InputPort,
    },
    /// The previously visible grant for a resource was consumed by an ack.
    GrantAcked {
        /// Resource whose registered grant was acknowledged.
        resource: OutputResource,
        /// Input port that held the grant.
        winner: InputPort,
    },
    /// Ack-gated rotation moved a priority pointer.
    PointerAdvanced {
        /// Resource whose pointer moved.
        resource: OutputResource,
        /// New round-robin scan start.
        new_priority: InputPort,
    },
}

/// Sink trait for deterministic trace hooks.
pub trait TraceSink {
    /// Records an event in commit order.
    fn on_event(&mut self, event: TraceEvent);
}

/// Stable snapshot wire-version identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u16)]
pub enum SnapshotVersion {
    /// Initial schema revision for arbiter-core v0.1.x.
    V1 = 1,
}

impl SnapshotVersion {
    /// Converts this version to its stable wire value.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Converts a wire value to a known snapshot version.
    #[must_use]
    pub const fn from_u16(version: u16) -> Option<Self> {
        match version {
            1 => Some(Self::V1),
            _ => None,
        }
    }
}

/// Serializable full-state snapshot used for export/import and replay
/// fixtures. Restoring a snapshot is the one sanctioned way to inject state
/// besides reset.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ArbiterSnapshot {
    /// Raw snapshot schema version, kept wire-stable for forward rejection.
    pub version: u16,
    /// Full arbiter state.
    pub state: ArbiterState,
}

impl ArbiterSnapshot {
    /// Captures the current state under the current schema version.
    #[must_use]
    pub fn capture(state: &ArbiterState) -> Self {
        Self {
            version: SnapshotVersion::V1.as_u16(),
            state: state.clone(),
        }
    }

    /// Restores the captured state after validating the schema version.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::UnsupportedVersion`] when the wire version is
    /// not one this build understands.
    pub fn restore(&self) -> Result<ArbiterState, SnapshotError> {
        match SnapshotVersion::from_u16(self.version) {
            Some(SnapshotVersion::V1) => Ok(self.state.clone()),
            None => Err(SnapshotError::UnsupportedVersion {
                found: self.version,
            }),
        }
    }
}
