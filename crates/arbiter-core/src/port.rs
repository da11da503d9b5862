/// Number of symmetric input ports feeding the crossbar (`P0..P7`).
pub const PORT_COUNT: usize = 8;
/// Number of symmetric output resources served by the crossbar (`R0..R7`).
pub const RESOURCE_COUNT: usize = 8;
/// Highest raw request value an input lane may carry (`RESOURCE_COUNT`).
pub const MAX_REQUEST_VALUE: u8 = 8;

/// Crossbar input port identifier.
///
/// Input ports and output resources share the numeric range `0..=7` but are
/// disjoint namespaces; this enum and [`OutputResource`] keep them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum InputPort {
    P0 = 0,
    P1 = 1,
    P2 = 2,
    P3 = 3,
    P4 = 4,
    P5 = 5,
    P6 = 6,
    P7 = 7,
}

impl InputPort {
    /// Ordered list of all input ports.
    pub const ALL: [Self; PORT_COUNT] = [
        Self::P0,
        Self::P1,
        Self::P2,
        Self::P3,
        Self::P4,
        Self::P5,
        Self::P6,
        Self::P7,
    ];

    /// Returns the array index for this port (`0..=7`).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the stable numeric identifier for this port.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Decodes a port index into an input port.
    #[must_use]
    pub const fn from_index(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::P0),
            1 => Some(Self::P1),
            2 => Some(Self::P2),
            3 => Some(Self::P3),
            4 => Some(Self::P4),
            5 => Some(Self::P5),
            6 => Some(Self::P6),
            7 => Some(Self::P7),
            _ => None,
        }
    }

    /// Successor in round-robin scan order, wrapping `P7` back to `P0`.
    #[must_use]
    pub const fn wrapping_next(self) -> Self {
        match self {
            Self::P0 => Self::P1,
            Self::P1 => Self::P2,
            Self::P2 => Self::P3,
            Self::P3 => Self::P4,
            Self::P4 => Self::P5,
            Self::P5 => Self::P6,
            Self::P6 => Self::P7,
            Self::P7 => Self::P0,
        }
    }
}

/// Crossbar output resource identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum OutputResource {
    R0 = 0,
    R1 = 1,
    R2 = 2,
    R3 = 3,
    R4 = 4,
    R5 = 5,
    R6 = 6,
    R7 = 7,
}

impl OutputResource {
    /// Ordered list of all output resources.
    pub const ALL: [Self; RESOURCE_COUNT] = [
        Self::R0,
        Self::R1,
        Self::R2,
        Self::R3,
        Self::R4,
        Self::R5,
        Self::R6,
        Self::R7,
    ];

    /// Returns the array index for this resource (`0..=7`).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the stable numeric identifier for this resource.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Decodes a resource index into an output resource.
    #[must_use]
    pub const fn from_index(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::R0),
            1 => Some(Self::R1),
            2 => Some(Self::R2),
            3 => Some(Self::R3),
            4 => Some(Self::R4),
            5 => Some(Self::R5),
            6 => Some(Self::R6),
            7 => Some(Self::R7),
            _ => None,
        }
    }

    /// Raw request value that selects this resource (`index + 1`).
    #[must_use]
    pub const fn request_value(self) -> u8 {
        self as u8 + 1
    }

    /// Decodes a non-idle raw request value (`1..=8`) into a resource.
    #[must_use]
    pub const fn from_request_value(value: u8) -> Option<Self> {
        if value == 0 {
            None
        } else {
            Self::from_index(value - 1)
        }
    }
}
