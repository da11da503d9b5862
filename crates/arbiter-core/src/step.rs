//! Tick pipeline: request decode, selection, and the commit/advance stage.
//!
//! Commit order at each RUN tick boundary:
//! 1. Register this tick's pending decision (selection reads the pointers as
//!    they were before this tick's update).
//! 2. Advance each resource's pointer past its PREVIOUS registered winner,
//!    only when that grant is acknowledged this tick.
//! 3. Publish the per-input grant view of this tick's decision.
//!
//! Reset overrides the whole sequence and restores the canonical state. A
//! rejected tick (fault policy) mutates nothing.

use crate::{
    classify_requests, decode_requests, select_winner, ArbiterConfig, ArbiterPhase, ArbiterState,
    GrantDecision, GrantOutputs, InputPort, OutputResource, RequestField, TickError, TickInputs,
    TickOutcome, TraceEvent, TraceSink, PORT_COUNT, RESOURCE_COUNT,
};

struct NullSink;

impl TraceSink for NullSink {
    fn on_event(&mut self, _event: TraceEvent) {}
}

/// Computes this tick's pending decision from pre-tick state and decoded
/// request lanes.
///
/// Pure: reads the priority pointers, mutates nothing. All eight resources
/// are selected independently, which is what permits up to eight simultaneous
/// disjoint grants in a single tick.
#[must_use]
pub fn compute_decision(
    state: &ArbiterState,
    lanes: &[RequestField; PORT_COUNT],
) -> GrantDecision {
    let sets = classify_requests(lanes);
    let mut decision = GrantDecision::IDLE;
    for resource in OutputResource::ALL {
        decision.winners[resource.index()] =
            select_winner(sets[resource.index()], state.priority_of(resource));
    }
    decision
}

/// Applies the commit/advance stage for one RUN tick and returns the number
/// of pointers moved by ack-gated rotation.
///
/// The ack vector is matched against the registered record from before this
/// call, which is the grant that was externally visible when the ack was
/// raised. Ack bits for resources without a valid registered grant are a
/// no-op.
pub fn commit_decision(
    state: &mut ArbiterState,
    pending: &GrantDecision,
    ack: &[bool; RESOURCE_COUNT],
) -> u8 {
    commit_with_sink(state, pending, ack, &mut NullSink, false)
}

fn commit_with_sink(
    state: &mut ArbiterState,
    pending: &GrantDecision,
    ack: &[bool; RESOURCE_COUNT],
    sink: &mut dyn TraceSink,
    emit: bool,
) -> u8 {
    let previous = *state.registered();

    state.set_phase(ArbiterPhase::Run);
    state.set_registered(*pending);
    if emit {
        for resource in OutputResource::ALL {
            if let Some(winner) = pending.winner_of(resource) {
                sink.on_event(TraceEvent::GrantIssued { resource, winner });
            }
        }
    }

    let mut advanced = 0_u8;
    for resource in OutputResource::ALL {
        if let Some(winner) = previous.winner_of(resource) {
            if ack[resource.index()] {
                let next = winner.wrapping_next();
                state.set_priority(resource, next);
                advanced += 1;
                if emit {
                    sink.on_event(TraceEvent::GrantAcked { resource, winner });
                    sink.on_event(TraceEvent::PointerAdvanced {
                        resource,
                        new_priority: next,
                    });
                }
            }
        }
    }

    state.set_outputs(GrantOutputs::from_decision(pending));
    state.bump_ticks();
    advanced
}

/// Advances the arbiter one tick.
///
/// Reset handling, request decode policy, pending selection, and the commit
/// stage compose in that order; the returned outcome reports what committed.
///
/// # Errors
///
/// Under [`crate::InvalidRequestPolicy::Fault`], returns
/// [`TickError::RequestOutOfRange`] when any request lane exceeds the
/// selector range; the state is left untouched.
pub fn tick_one(
    state: &mut ArbiterState,
    inputs: &TickInputs,
    config: &ArbiterConfig,
) -> Result<TickOutcome, TickError> {
    tick_one_traced(state, inputs, config, &mut NullSink)
}

/// Advances the arbiter one tick, dispatching trace events to `sink` when
/// `config.tracing_enabled` is set.
///
/// # Errors
///
/// Same contract as [`tick_one`].
pub fn tick_one_traced(
    state: &mut ArbiterState,
    inputs: &TickInputs,
    config: &ArbiterConfig,
    sink: &mut dyn TraceSink,
) -> Result<TickOutcome, TickError> {
    let emit = config.tracing_enabled;

    if inputs.reset {
        state.reset_canonical();
        if emit {
            sink.on_event(TraceEvent::ResetApplied);
        }
        return Ok(TickOutcome::ResetApplied);
    }

    let decoded = decode_requests(&inputs.request, config.invalid_request_policy)?;
    if emit {
        for port in InputPort::ALL {
            if decoded.is_masked(port) {
                sink.on_event(TraceEvent::RequestMasked {
                    port,
                    raw_value: inputs.request[port.index()],
                });
            }
        }
    }

    let pending = compute_decision(state, &decoded.lanes);
    let mut grants_issued = 0_u8;
    for resource in OutputResource::ALL {
        if pending.winner_of(resource).is_some() {
            grants_issued += 1;
        }
    }

    let pointers_advanced = commit_with_sink(state, &pending, &inputs.ack, sink, emit);

    Ok(TickOutcome::Advanced {
        grants_issued,
        pointers_advanced,
    })
}

#[cfg(test)]
mod tests {
    use super::{commit_decision, compute_decision, tick_one, tick_one_traced};
    use crate::{
        ArbiterConfig, ArbiterPhase, ArbiterState, InputPort, InvalidRequestPolicy,
        OutputResource, RequestField, TickError, TickInputs, TickOutcome, TraceEvent, TraceSink,
    };

    #[derive(Default)]
    struct RecordingSink {
        events: Vec<TraceEvent>,
    }

    impl TraceSink for RecordingSink {
        fn on_event(&mut self, event: TraceEvent) {
            self.events.push(event);
        }
    }

    fn run_config() -> ArbiterConfig {
        ArbiterConfig::default()
    }

    fn traced_config() -> ArbiterConfig {
        ArbiterConfig {
            tracing_enabled: true,
            ..ArbiterConfig::default()
        }
    }

    fn request_only(lane_values: &[(usize, u8)]) -> TickInputs {
        let mut inputs = TickInputs::idle();
        for &(port, value) in lane_values {
            inputs.request[port] = value;
        }
        inputs
    }

    #[test]
    fn single_requester_is_granted_at_the_next_observation_point() {
        let mut state = ArbiterState::new();
        let inputs = request_only(&[(0, 4)]);

        let outcome = tick_one(&mut state, &inputs, &run_config()).expect("valid stimulus");
        assert_eq!(
            outcome,
            TickOutcome::Advanced {
                grants_issued: 1,
                pointers_advanced: 0,
            }
        );

        assert_eq!(state.outputs().value(InputPort::P0), 4);
        assert!(state.outputs().is_valid(InputPort::P0));
        for port in InputPort::ALL.into_iter().skip(1) {
            assert!(!state.outputs().is_valid(port));
        }
        assert_eq!(state.phase(), ArbiterPhase::Run);
        assert_eq!(state.ticks(), 1);
    }

    #[test]
    fn decision_is_registered_one_tick_before_it_can_be_acked() {
        let mut state = ArbiterState::new();
        let request = request_only(&[(2, 6)]);

        tick_one(&mut state, &request, &run_config()).expect("request tick");
        let registered = *state.registered();
        assert_eq!(
            registered.winner_of(OutputResource::R5),
            Some(InputPort::P2)
        );

        // Ack arriving with the grant visible rotates the pointer past P2.
        let mut ack_tick = request;
        ack_tick.ack[OutputResource::R5.index()] = true;
        let outcome = tick_one(&mut state, &ack_tick, &run_config()).expect("ack tick");
        assert_eq!(
            outcome,
            TickOutcome::Advanced {
                grants_issued: 1,
                pointers_advanced: 1,
            }
        );
        assert_eq!(state.priority_of(OutputResource::R5), InputPort::P3);
    }

    #[test]
    fn ack_without_valid_registered_grant_is_a_no_op() {
        let mut state = ArbiterState::new();
        let mut inputs = TickInputs::idle();
        inputs.ack = [true; 8];

        let outcome = tick_one(&mut state, &inputs, &run_config()).expect("idle stimulus");
        assert_eq!(
            outcome,
            TickOutcome::Advanced {
                grants_issued: 0,
                pointers_advanced: 0,
            }
        );
        for resource in OutputResource::ALL {
            assert_eq!(state.priority_of(resource), InputPort::P0);
        }
    }

    #[test]
    fn pointer_is_stable_without_an_ack() {
        let mut state = ArbiterState::new();
        let inputs = request_only(&[(1, 7), (3, 7)]);

        for _ in 0..5 {
            tick_one(&mut state, &inputs, &run_config()).expect("valid stimulus");
            assert_eq!(state.priority_of(OutputResource::R6), InputPort::P0);
            assert_eq!(state.outputs().value(InputPort::P1), 7);
        }
    }

    #[test]
    fn selection_reads_pre_advance_pointers_within_the_same_tick() {
        let mut state = ArbiterState::new();
        let contenders = request_only(&[(0, 7), (1, 7), (2, 7)]);

        // Tick 1: P0 wins from pointer 0, nothing registered to ack yet.
        tick_one(&mut state, &contenders, &run_config()).expect("tick 1");
        assert_eq!(state.outputs().value(InputPort::P0), 7);

        // Tick 2: ack consumes P0's visible grant; selection still ran from
        // pointer 0, so P0 stays visible for this tick pair.
        let mut acked = contenders;
        acked.ack[OutputResource::R6.index()] = true;
        tick_one(&mut state, &acked, &run_config()).expect("tick 2");
        assert_eq!(state.outputs().value(InputPort::P0), 7);
        assert_eq!(state.priority_of(OutputResource::R6), InputPort::P1);

        // Tick 3: the advanced pointer now elects P1.
        tick_one(&mut state, &contenders, &run_config()).expect("tick 3");
        assert_eq!(state.outputs().value(InputPort::P1), 7);
        assert!(!state.outputs().is_valid(InputPort::P0));
    }

    #[test]
    fn reset_overrides_active_requests_and_restores_canonical_state() {
        let mut state = ArbiterState::new();
        let inputs = request_only(&[(0, 7), (1, 7)]);
        tick_one(&mut state, &inputs, &run_config()).expect("warm-up tick");
        let mut acked = inputs;
        acked.ack[OutputResource::R6.index()] = true;
        tick_one(&mut state, &acked, &run_config()).expect("rotation tick");
        assert_ne!(state, ArbiterState::new());

        let mut reset = inputs;
        reset.reset = true;
        let outcome = tick_one(&mut state, &reset, &run_config()).expect("reset tick");
        assert_eq!(outcome, TickOutcome::ResetApplied);
        assert_eq!(state, ArbiterState::new());
    }

    #[test]
    fn fault_policy_rejects_the_tick_and_leaves_state_untouched() {
        let mut state = ArbiterState::new();
        tick_one(&mut state, &request_only(&[(4, 2)]), &run_config()).expect("warm-up tick");
        let before = state.clone();

        let error = tick_one(&mut state, &request_only(&[(6, 9)]), &run_config())
            .expect_err("out-of-range lane must fault");
        assert_eq!(error, TickError::RequestOutOfRange { port: 6, value: 9 });
        assert_eq!(state, before);
    }

    #[test]
    fn lenient_policy_masks_the_lane_and_arbitrates_the_rest() {
        let mut state = ArbiterState::new();
        let config = ArbiterConfig {
            invalid_request_policy: InvalidRequestPolicy::TreatAsIdle,
            ..ArbiterConfig::default()
        };
        let inputs = request_only(&[(0, 9), (1, 5)]);

        let outcome = tick_one(&mut state, &inputs, &config).expect("lenient tick");
        assert_eq!(
            outcome,
            TickOutcome::Advanced {
                grants_issued: 1,
                pointers_advanced: 0,
            }
        );
        assert!(!state.outputs().is_valid(InputPort::P0));
        assert_eq!(state.outputs().value(InputPort::P1), 5);
    }

    #[test]
    fn trace_events_follow_commit_order() {
        let mut state = ArbiterState::new();
        let mut sink = RecordingSink::default();
        let config = ArbiterConfig {
            invalid_request_policy: InvalidRequestPolicy::TreatAsIdle,
            tracing_enabled: true,
        };

        let warm_up = request_only(&[(0, 3)]);
        tick_one_traced(&mut state, &warm_up, &config, &mut sink).expect("warm-up tick");
        assert_eq!(
            sink.events,
            vec![TraceEvent::GrantIssued {
                resource: OutputResource::R2,
                winner: InputPort::P0,
            }]
        );
        sink.events.clear();

        let mut busy = request_only(&[(0, 3), (5, 9)]);
        busy.ack[OutputResource::R2.index()] = true;
        tick_one_traced(&mut state, &busy, &config, &mut sink).expect("busy tick");
        assert_eq!(
            sink.events,
            vec![
                TraceEvent::RequestMasked {
                    port: InputPort::P5,
                    raw_value: 9,
                },
                TraceEvent::GrantIssued {
                    resource: OutputResource::R2,
                    winner: InputPort::P0,
                },
                TraceEvent::GrantAcked {
                    resource: OutputResource::R2,
                    winner: InputPort::P0,
                },
                TraceEvent::PointerAdvanced {
                    resource: OutputResource::R2,
                    new_priority: InputPort::P1,
                },
            ]
        );
    }

    #[test]
    fn reset_tick_traces_a_single_event() {
        let mut state = ArbiterState::new();
        let mut sink = RecordingSink::default();
        let mut inputs = TickInputs::idle();
        inputs.reset = true;

        tick_one_traced(&mut state, &inputs, &traced_config(), &mut sink).expect("reset tick");
        assert_eq!(sink.events, vec![TraceEvent::ResetApplied]);
    }

    #[test]
    fn disabled_tracing_dispatches_nothing() {
        let mut state = ArbiterState::new();
        let mut sink = RecordingSink::default();
        let inputs = request_only(&[(0, 4)]);

        tick_one_traced(&mut state, &inputs, &run_config(), &mut sink).expect("untraced tick");
        assert!(sink.events.is_empty());
    }

    #[test]
    fn compute_decision_is_pure() {
        let mut state = ArbiterState::new();
        tick_one(&mut state, &request_only(&[(0, 2)]), &run_config()).expect("warm-up tick");
        let before = state.clone();

        let mut lanes = [RequestField::Idle; 8];
        lanes[3] = RequestField::Target(OutputResource::R0);
        let first = compute_decision(&state, &lanes);
        let second = compute_decision(&state, &lanes);

        assert_eq!(first, second);
        assert_eq!(state, before);
        assert_eq!(first.winner_of(OutputResource::R0), Some(InputPort::P3));
    }

    #[test]
    fn standalone_commit_matches_the_tick_path() {
        let mut lanes = [RequestField::Idle; 8];
        lanes[4] = RequestField::Target(OutputResource::R1);

        let mut via_commit = ArbiterState::new();
        let pending = compute_decision(&via_commit, &lanes);
        let advanced = commit_decision(&mut via_commit, &pending, &[false; 8]);
        assert_eq!(advanced, 0);

        let mut via_tick = ArbiterState::new();
        tick_one(&mut via_tick, &request_only(&[(4, 2)]), &run_config()).expect("tick path");

        assert_eq!(via_commit, via_tick);
    }
}
