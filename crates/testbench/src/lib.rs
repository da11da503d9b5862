//! Vector-driven testbench library for the crossbar arbitration core.

use arbiter_core as _;
#[cfg(test)]
use tempfile as _;

/// Vector execution engine and pass/fail reporting.
pub mod runner;
/// Parsing for the line-oriented stimulus vector format.
pub mod vectors;
