//! Fuzz target: `classify_analog`
//!
//! Bytes are read as 10-bit ADC codes (two bytes each) and normalised the
//! way the MCP3008 driver does.
//!
//! cargo fuzz run fuzz_classify_analog

#![no_main]

use libfuzzer_sys::fuzz_target;
use pinprobe::classifier::analog::{FLOOR, classify_analog};

fuzz_target!(|data: &[u8]| {
    let samples: Vec<f32> = data
        .chunks_exact(2)
        .take(32)
        .map(|c| f32::from(u16::from_le_bytes([c[0], c[1]]) & 0x3FF) / 1023.0)
        .collect();

    match classify_analog(&samples) {
        Some(r) => {
            assert!(r.characteristics.mean > FLOOR);
            assert!(r.characteristics.variance >= 0.0);
        }
        None => {
            if !samples.is_empty() {
                let mean = samples.iter().sum::<f32>() / samples.len() as f32;
                assert!(mean <= FLOOR + f32::EPSILON);
            }
        }
    }
});
