//! Request decode and per-resource eligibility classification.

use crate::{
    InputPort, InvalidRequestPolicy, OutputResource, TickError, PORT_COUNT, RESOURCE_COUNT,
};

/// Decoded request lane for one input port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RequestField {
    /// Port is not requesting any resource this tick.
    #[default]
    Idle,
    /// Port requests exclusive use of one output resource this tick.
    Target(OutputResource),
}

impl RequestField {
    /// Decodes a raw request value (`0` = idle, `1..=8` = resource selector).
    #[must_use]
    pub const fn from_raw(value: u8) -> Option<Self> {
        if value == 0 {
            Some(Self::Idle)
        } else {
            match OutputResource::from_request_value(value) {
                Some(resource) => Some(Self::Target(resource)),
                None => None,
            }
        }
    }

    /// Raw request value for this lane.
    #[must_use]
    pub const fn to_raw(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Target(resource) => resource.request_value(),
        }
    }

    /// Returns the targeted resource, if any.
    #[must_use]
    pub const fn target(self) -> Option<OutputResource> {
        match self {
            Self::Idle => None,
            Self::Target(resource) => Some(resource),
        }
    }
}

/// Result of decoding one tick's raw request vector under a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedRequests {
    /// Decoded lane per input port.
    pub lanes: [RequestField; PORT_COUNT],
    /// Bitmask of ports whose out-of-range value was masked to idle.
    pub masked_lanes: u8,
}

impl DecodedRequests {
    /// Returns `true` when the policy masked this port's lane to idle.
    #[must_use]
    pub const fn is_masked(&self, port: InputPort) -> bool {
        (self.masked_lanes & (1 << port.index())) != 0
    }
}

/// Decodes the raw request vector, applying the configured out-of-range policy.
///
/// # Errors
///
/// Under [`InvalidRequestPolicy::Fault`], returns
/// [`TickError::RequestOutOfRange`] for the first lane whose value exceeds the
/// resource selector range.
pub fn decode_requests(
    raw: &[u8; PORT_COUNT],
    policy: InvalidRequestPolicy,
) -> Result<DecodedRequests, TickError> {
    let mut lanes = [RequestField::Idle; PORT_COUNT];
    let mut masked_lanes = 0_u8;

    for port in InputPort::ALL {
        let value = raw[port.index()];
        match RequestField::from_raw(value) {
            Some(lane) => lanes[port.index()] = lane,
            None => match policy {
                InvalidRequestPolicy::Fault => {
                    return Err(TickError::RequestOutOfRange {
                        port: port.as_u8(),
                        value,
                    });
                }
                InvalidRequestPolicy::TreatAsIdle => {
                    masked_lanes |= 1 << port.index();
                }
            },
        }
    }

    Ok(DecodedRequests {
        lanes,
        masked_lanes,
    })
}

/// Set of input ports eligible to win one output resource this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EligibilitySet(u8);

impl EligibilitySet {
    /// Set with no eligible ports.
    pub const EMPTY: Self = Self(0);

    /// Builds a set from a raw lane bitmask (bit `i` = input port `i`).
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw lane bitmask.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Marks an input port eligible.
    pub const fn insert(&mut self, port: InputPort) {
        self.0 |= 1 << port.index();
    }

    /// Returns `true` when the port is eligible.
    #[must_use]
    pub const fn contains(self, port: InputPort) -> bool {
        (self.0 & (1 << port.index())) != 0
    }

    /// Returns `true` when no port is eligible.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of eligible ports.
    #[must_use]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }
}

/// Derives the per-resource eligibility sets for one tick.
///
/// Bit `i` of set `r` is set iff input `i` targets resource `r` and `i != r`
/// (self-requests are meaningless and always excluded). Pure function of the
/// decoded lanes; recomputed every tick.
#[must_use]
pub fn classify_requests(lanes: &[RequestField; PORT_COUNT]) -> [EligibilitySet; RESOURCE_COUNT] {
    let mut sets = [EligibilitySet::EMPTY; RESOURCE_COUNT];

    for port in InputPort::ALL {
        if let Some(resource) = lanes[port.index()].target() {
            if port.index() != resource.index() {
                sets[resource.index()].insert(port);
            }
        }
    }

    sets
}
