//! Per-resource round-robin winner selection.

use crate::{EligibilitySet, InputPort, OutputResource, PORT_COUNT, RESOURCE_COUNT};

/// Per-resource winner snapshot.
///
/// The same shape serves both sides of the one-tick lag pair: the pending
/// decision computed this tick and the registered decision currently visible
/// at the outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct GrantDecision {
    /// Winning input port per output resource, when one exists.
    pub winners: [Option<InputPort>; RESOURCE_COUNT],
}

impl GrantDecision {
    /// Decision with no winners.
    pub const IDLE: Self = Self {
        winners: [None; RESOURCE_COUNT],
    };

    /// Winner for one resource, if any.
    #[must_use]
    pub const fn winner_of(&self, resource: OutputResource) -> Option<InputPort> {
        self.winners[resource.index()]
    }

    /// Number of resources with a winner.
    #[must_use]
    pub fn grant_count(&self) -> usize {
        self.winners.iter().flatten().count()
    }

    /// Returns `true` when no resource has a winner.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.winners.iter().all(Option::is_none)
    }
}

/// Selects the round-robin winner for one resource.
///
/// Scans offsets `0..8` from the priority pointer, wrapping modulo the port
/// count; the first eligible port wins. The sticky starting position is what
/// bounds waiting time under contention. An empty set yields no winner.
#[must_use]
pub fn select_winner(eligible: EligibilitySet, priority: InputPort) -> Option<InputPort> {
    let start = priority.index();
    for offset in 0..PORT_COUNT {
        let port = InputPort::ALL[(start + offset) % PORT_COUNT];
        if eligible.contains(port) {
            return Some(port);
        }
    }
    None
}
