#![no_main]

use arbiter_core::{
    tick_one, ArbiterConfig, ArbiterState, InputPort, InvalidRequestPolicy, TickInputs,
};
use libfuzzer_sys::fuzz_target;

// Each tick of stimulus is ten bytes: one control byte (bit 0 = reset),
// eight raw request lanes, one ack bitmask.
const TICK_STRIDE: usize = 10;

fuzz_target!(|data: &[u8]| {
    let strict = ArbiterConfig::default();
    let lenient = ArbiterConfig {
        invalid_request_policy: InvalidRequestPolicy::TreatAsIdle,
        ..ArbiterConfig::default()
    };

    let mut strict_state = ArbiterState::new();
    let mut lenient_state = ArbiterState::new();

    for chunk in data.chunks_exact(TICK_STRIDE) {
        let mut inputs = TickInputs::idle();
        inputs.reset = (chunk[0] & 1) != 0;
        inputs.request.copy_from_slice(&chunk[1..9]);
        for (bit, lane) in inputs.ack.iter_mut().enumerate() {
            *lane = ((chunk[9] >> bit) & 1) != 0;
        }

        let _ = tick_one(&mut strict_state, &inputs, &strict);
        tick_one(&mut lenient_state, &inputs, &lenient)
            .expect("lenient policy accepts any byte pattern");

        for state in [&strict_state, &lenient_state] {
            let mut claimed = [false; 8];
            for port in InputPort::ALL {
                let value = state.outputs().value(port);
                assert_eq!(state.outputs().is_valid(port), value != 0);
                if value == 0 {
                    continue;
                }
                assert!(value <= 8);
                let resource = usize::from(value - 1);
                assert_ne!(resource, port.index());
                assert!(!claimed[resource]);
                claimed[resource] = true;
            }
        }
    }
});
