//! Host-visible arbiter state and canonical reset semantics.

use crate::{GrantDecision, InputPort, OutputResource, PORT_COUNT, RESOURCE_COUNT};

/// Two-phase control state observed at tick boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ArbiterPhase {
    /// Reset was asserted at the most recent tick boundary; state is canonical.
    #[default]
    Reset,
    /// Normal arbitration; selection and commit run every tick.
    Run,
}

/// Externally visible per-input grant register.
///
/// The valid bit and raw grant value projections are always consistent
/// (`is_valid` iff `value != 0`) because both derive from the same lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct GrantOutputs {
    lanes: [Option<OutputResource>; PORT_COUNT],
}

impl GrantOutputs {
    /// All-idle output register.
    pub const IDLE: Self = Self {
        lanes: [None; PORT_COUNT],
    };

    /// Re-expresses a per-resource decision as the per-input grant view.
    #[must_use]
    pub fn from_decision(decision: &GrantDecision) -> Self {
        let mut lanes = [None; PORT_COUNT];
        for resource in OutputResource::ALL {
            if let Some(winner) = decision.winner_of(resource) {
                lanes[winner.index()] = Some(resource);
            }
        }
        Self { lanes }
    }

    /// Resource granted to one input port, if any.
    #[must_use]
    pub const fn granted(&self, port: InputPort) -> Option<OutputResource> {
        self.lanes[port.index()]
    }

    /// Raw grant value for one input port (`0` = none, else resource index + 1).
    #[must_use]
    pub const fn value(&self, port: InputPort) -> u8 {
        match self.lanes[port.index()] {
            Some(resource) => resource.request_value(),
            None => 0,
        }
    }

    /// Valid bit for one input port.
    #[must_use]
    pub const fn is_valid(&self, port: InputPort) -> bool {
        self.lanes[port.index()].is_some()
    }

    /// Raw grant values for all ports, in port order.
    #[must_use]
    pub fn raw_values(&self) -> [u8; PORT_COUNT] {
        InputPort::ALL.map(|port| self.value(port))
    }

    /// Valid bits for all ports, in port order.
    #[must_use]
    pub fn valid_bits(&self) -> [bool; PORT_COUNT] {
        InputPort::ALL.map(|port| self.is_valid(port))
    }

    /// Returns `true` when no port holds a grant.
    #[must_use]
    pub fn is_all_idle(&self) -> bool {
        self.lanes.iter().all(Option::is_none)
    }
}

/// Complete arbiter state, advanced one tick at a time.
///
/// All state is exclusively owned by the instance: inputs are read-only
/// stimuli and outputs are read-only observations. Mutation flows through the
/// tick entry points, [`ArbiterState::reset_canonical`], and snapshot restore;
/// there is no other write path.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ArbiterState {
    phase: ArbiterPhase,
    ticks: u64,
    priority: [InputPort; RESOURCE_COUNT],
    registered: GrantDecision,
    outputs: GrantOutputs,
}

impl Default for ArbiterState {
    fn default() -> Self {
        Self::new()
    }
}

impl ArbiterState {
    /// Creates an arbiter in the canonical reset state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: ArbiterPhase::Reset,
            ticks: 0,
            priority: [InputPort::P0; RESOURCE_COUNT],
            registered: GrantDecision::IDLE,
            outputs: GrantOutputs::IDLE,
        }
    }

    /// Current control phase.
    #[must_use]
    pub const fn phase(&self) -> ArbiterPhase {
        self.phase
    }

    /// Ticks committed since the last canonical reset.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Round-robin priority pointer for one resource.
    #[must_use]
    pub const fn priority_of(&self, resource: OutputResource) -> InputPort {
        self.priority[resource.index()]
    }

    /// Registered per-resource decision currently visible at the outputs.
    #[must_use]
    pub const fn registered(&self) -> &GrantDecision {
        &self.registered
    }

    /// Externally visible per-input grant register.
    #[must_use]
    pub const fn outputs(&self) -> &GrantOutputs {
        &self.outputs
    }

    /// Applies canonical reset semantics: all priority pointers to port 0,
    /// grant records cleared, outputs idle, phase `Reset`, tick count zero.
    pub fn reset_canonical(&mut self) {
        *self = Self::new();
    }

    pub(crate) const fn set_phase(&mut self, phase: ArbiterPhase) {
        self.phase = phase;
    }

    pub(crate) const fn set_priority(&mut self, resource: OutputResource, port: InputPort) {
        self.priority[resource.index()] = port;
    }

    pub(crate) const fn set_registered(&mut self, decision: GrantDecision) {
        self.registered = decision;
    }

    pub(crate) const fn set_outputs(&mut self, outputs: GrantOutputs) {
        self.outputs = outputs;
    }

    pub(crate) const fn bump_ticks(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }
}
