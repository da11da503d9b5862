//! Vector execution engine and pass/fail reporting.
//!
//! Runs a parsed vector file against a freshly constructed arbiter and
//! evaluates each `expect` directive against the registered outputs that
//! are visible after its tick commits.
//!
//! ## Execution Model
//!
//! 1. Start from the canonical power-on state.
//! 2. For each `tick` directive in file order:
//!    a. Drive the tick's stimulus through one arbitration step.
//!    b. Snapshot the post-commit grant and valid lanes.
//!    c. Evaluate the tick's expectations against that snapshot.
//! 3. Report per-expectation verdicts and summary counts.
//!
//! A tick limit guards against runaway vector files; the limit and the
//! decode policy for out-of-range request lanes are configurable.

use std::fmt;

use arbiter_core::{
    tick_one, ArbiterConfig, ArbiterState, InvalidRequestPolicy, TickError, PORT_COUNT,
};

use crate::vectors::{CompareOp, ExpectField, Expectation, VectorFile};

/// Tick limit applied when the caller does not choose one.
pub const DEFAULT_MAX_TICKS: u64 = 4096;

/// Options for a vector run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// Decode policy for out-of-range request lanes.
    pub policy: InvalidRequestPolicy,
    /// Abort threshold on runaway vector files.
    pub max_ticks: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            policy: InvalidRequestPolicy::Fault,
            max_ticks: DEFAULT_MAX_TICKS,
        }
    }
}

/// Verdict for a single expectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectationResult {
    /// The expectation that was checked.
    pub expectation: Expectation,
    /// Value observed on the output lane.
    pub observed: u8,
    /// Whether the comparison held.
    pub passed: bool,
}

impl fmt::Display for ExpectationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed {
            write!(f, "PASS line {}: {}", self.expectation.line, self.expectation)
        } else {
            write!(
                f,
                "FAIL line {}: {} (observed {})",
                self.expectation.line, self.expectation, self.observed
            )
        }
    }
}

/// Everything observed on one committed tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// 1-indexed source line of the `tick` directive.
    pub line: usize,
    /// Raw grant values visible after the tick committed.
    pub grants: [u8; PORT_COUNT],
    /// Valid strobes visible after the tick committed.
    pub valids: [bool; PORT_COUNT],
    /// Verdicts for the tick's expectations, in file order.
    pub expectations: Vec<ExpectationResult>,
}

impl TickReport {
    /// Returns true if every expectation on this tick held.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.expectations.iter().all(|result| result.passed)
    }
}

impl fmt::Display for TickReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {:>4}: grant=[", self.line)?;
        for (idx, value) in self.grants.iter().enumerate() {
            if idx > 0 {
                write!(f, ",")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, "] valid=[")?;
        for (idx, valid) in self.valids.iter().enumerate() {
            if idx > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", u8::from(*valid))?;
        }
        write!(f, "]")
    }
}

/// Outcome of running one vector file to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorRunResult {
    /// Per-tick reports in execution order.
    pub reports: Vec<TickReport>,
}

impl VectorRunResult {
    /// Returns true if every expectation in the file held.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.reports.iter().all(TickReport::passed)
    }

    /// Returns counts for summary reporting.
    #[must_use]
    pub fn summary(&self) -> VectorSummary {
        let mut passed = 0;
        let mut failed = 0;
        for report in &self.reports {
            for result in &report.expectations {
                if result.passed {
                    passed += 1;
                } else {
                    failed += 1;
                }
            }
        }
        VectorSummary {
            passed,
            failed,
            total: passed + failed,
            ticks: self.reports.len(),
        }
    }
}

/// Summary counts for vector run reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorSummary {
    /// Number of expectations that passed.
    pub passed: usize,
    /// Number of expectations that failed.
    pub failed: usize,
    /// Total number of expectations.
    pub total: usize,
    /// Number of ticks driven.
    pub ticks: usize,
}

impl fmt::Display for VectorSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} passed, {} failed", self.passed, self.failed)
    }
}

/// Execution failure for a vector run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    /// The arbiter rejected one tick's stimulus.
    Tick {
        /// 1-indexed source line of the offending `tick` directive.
        line: usize,
        /// Underlying decode failure.
        source: TickError,
    },
    /// The file drove more ticks than the configured limit.
    TickLimit {
        /// Configured maximum.
        limit: u64,
    },
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tick { line, source } => write!(f, "line {line}: {source}"),
            Self::TickLimit { limit } => write!(f, "tick limit of {limit} exceeded"),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Tick { source, .. } => Some(source),
            Self::TickLimit { .. } => None,
        }
    }
}

/// Runs every tick in `file` against a freshly constructed arbiter.
///
/// # Errors
///
/// Returns [`RunError::Tick`] if the arbiter rejects a tick's stimulus
/// under the configured decode policy, or [`RunError::TickLimit`] if the
/// file drives more ticks than `config.max_ticks`.
pub fn run_vectors(file: &VectorFile, config: &RunConfig) -> Result<VectorRunResult, RunError> {
    let mut state = ArbiterState::new();
    let arbiter_config = ArbiterConfig {
        invalid_request_policy: config.policy,
        tracing_enabled: false,
    };

    let mut reports = Vec::with_capacity(file.ticks.len());
    let mut ticks_run: u64 = 0;

    for tick in &file.ticks {
        if ticks_run == config.max_ticks {
            return Err(RunError::TickLimit {
                limit: config.max_ticks,
            });
        }
        ticks_run += 1;

        tick_one(&mut state, &tick.inputs, &arbiter_config).map_err(|source| RunError::Tick {
            line: tick.line,
            source,
        })?;

        let grants = state.outputs().raw_values();
        let valids = state.outputs().valid_bits();

        let mut expectations = Vec::with_capacity(tick.expectations.len());
        for expectation in &tick.expectations {
            let observed = match expectation.field {
                ExpectField::Grant => grants[expectation.port],
                ExpectField::Valid => u8::from(valids[expectation.port]),
            };
            let passed = match expectation.op {
                CompareOp::Equal => observed == expectation.value,
                CompareOp::NotEqual => observed != expectation.value,
            };
            expectations.push(ExpectationResult {
                expectation: *expectation,
                observed,
                passed,
            });
        }

        reports.push(TickReport {
            line: tick.line,
            grants,
            valids,
            expectations,
        });
    }

    Ok(VectorRunResult { reports })
}
