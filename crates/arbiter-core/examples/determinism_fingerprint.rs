//! Deterministic replay fingerprint generator used by CI cross-host comparison.
//!
//! The same scripted run is computed three ways: two full replays from the
//! canonical snapshot and one resumed run from a mid-stream snapshot. All
//! three must land on identical final state before the fingerprint is
//! printed, so a changed line means a real behavior change rather than
//! host-dependent drift.

use arbiter_core::{
    replay_from_snapshot, tick_one, ArbiterConfig, ArbiterSnapshot, ArbiterState, InputPort,
    OutputResource, TickInputs,
};
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

const STIMULUS_TICKS: usize = 256;
const RESUME_POINT: usize = STIMULUS_TICKS / 2;

fn scripted_stimulus() -> Vec<TickInputs> {
    let mut seed: u64 = 0xC0FF_EE00_D15C_0B4A;
    let mut next = |range: u64| {
        seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
        (seed >> 33) % range
    };

    let mut stimulus = Vec::with_capacity(STIMULUS_TICKS);
    for tick in 0..STIMULUS_TICKS {
        let mut inputs = TickInputs::idle();
        inputs.reset = tick % 97 == 0;
        for lane in &mut inputs.request {
            *lane = u8::try_from(next(9)).expect("request range fits");
        }
        for lane in &mut inputs.ack {
            *lane = next(4) == 0;
        }
        stimulus.push(inputs);
    }
    stimulus
}

fn hash_bytes(hash: &mut u64, bytes: &[u8]) {
    for byte in bytes {
        *hash ^= u64::from(*byte);
        *hash = hash.wrapping_mul(0x1000_0000_01B3);
    }
}

fn state_fingerprint(state: &ArbiterState) -> String {
    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    hash_bytes(&mut hash, &state.ticks().to_le_bytes());
    hash_bytes(&mut hash, &state.outputs().raw_values());
    hash_bytes(&mut hash, &state.outputs().valid_bits().map(u8::from));
    for resource in OutputResource::ALL {
        hash_bytes(&mut hash, &[state.priority_of(resource).as_u8()]);
    }
    for resource in OutputResource::ALL {
        let winner = state
            .registered()
            .winner_of(resource)
            .map_or(0xFF, InputPort::as_u8);
        hash_bytes(&mut hash, &[winner]);
    }

    format!("{hash:016x}")
}

fn replayed_state(stimulus: &[TickInputs], config: &ArbiterConfig) -> ArbiterState {
    let snapshot = ArbiterSnapshot::capture(&ArbiterState::new());
    replay_from_snapshot(&snapshot, stimulus, config)
        .expect("scripted replay should succeed")
        .state
}

fn resumed_state(stimulus: &[TickInputs], config: &ArbiterConfig) -> ArbiterState {
    let mut state = ArbiterState::new();
    for inputs in &stimulus[..RESUME_POINT] {
        tick_one(&mut state, inputs, config).expect("scripted tick should succeed");
    }

    let snapshot = ArbiterSnapshot::capture(&state);
    replay_from_snapshot(&snapshot, &stimulus[RESUME_POINT..], config)
        .expect("resumed replay should succeed")
        .state
}

fn main() {
    let stimulus = scripted_stimulus();
    let config = ArbiterConfig::default();

    let first = state_fingerprint(&replayed_state(&stimulus, &config));
    let second = state_fingerprint(&replayed_state(&stimulus, &config));
    let resumed = state_fingerprint(&resumed_state(&stimulus, &config));

    assert_eq!(first, second, "repeated replay diverged");
    assert_eq!(first, resumed, "mid-stream resume diverged");

    println!("{first}");
}
