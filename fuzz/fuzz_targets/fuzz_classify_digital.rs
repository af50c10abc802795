//! Fuzz target: `classify_observation`
//!
//! The first byte selects the pin and the three probe reads, every further
//! byte is one sample (low bit). Asserts the decision table never panics,
//! reports a period shorter than half the window, and stays deterministic.
//!
//! cargo fuzz run fuzz_classify_digital

#![no_main]

use libfuzzer_sys::fuzz_target;
use pinprobe::classifier::digital::{PinObservation, PullProbe, SignalClass, classify_observation};

fuzz_target!(|data: &[u8]| {
    let Some((&head, rest)) = data.split_first() else {
        return;
    };
    let probe = PullProbe {
        up: head & 1 != 0,
        down: head & 2 != 0,
        floating: head & 4 != 0,
    };
    let samples: Vec<bool> = rest.iter().map(|b| b & 1 != 0).collect();
    let obs = PinObservation::from_samples(head >> 3, probe, &samples);

    let result = classify_observation(&obs);
    if let Some(p) = result.characteristics.period {
        assert!(p >= 2 && p < obs.samples.len() / 2);
    }
    if result.class == SignalClass::CommunicationLike {
        assert!(result.characteristics.transitions > 5);
    }
    assert_eq!(result, classify_observation(&obs));
});
