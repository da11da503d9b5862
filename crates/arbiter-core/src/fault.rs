use thiserror::Error;

/// Per-tick precondition violations, rejected before any state mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum TickError {
    /// A request lane carried a value above the highest resource selector.
    #[error("request value {value} on input port {port} is outside 0..=8")]
    RequestOutOfRange {
        /// Index of the offending input port.
        port: u8,
        /// Raw request value supplied on that lane.
        value: u8,
    },
}

/// Snapshot restore failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum SnapshotError {
    /// Snapshot carried a wire version this build does not understand.
    #[error("unsupported snapshot version {found}")]
    UnsupportedVersion {
        /// Raw version value found in the snapshot header.
        found: u16,
    },
}

/// Replay failures, attributed to the stimulus position that caused them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ReplayError {
    /// The starting snapshot was rejected before any tick ran.
    #[error("replay snapshot rejected: {0}")]
    Snapshot(#[from] SnapshotError),
    /// A stimulus tick was rejected by the arbiter.
    #[error("stimulus tick {tick} rejected: {source}")]
    Tick {
        /// Zero-based index into the stimulus stream.
        tick: usize,
        /// Underlying per-tick violation.
        source: TickError,
    },
}
