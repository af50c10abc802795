//! Signal classification heuristics.
//!
//! Sampling goes through the [`PinProbePort`](crate::app::ports::PinProbePort)
//! and [`AnalogPort`](crate::app::ports::AnalogPort) traits; the decision
//! tables themselves are pure functions over the collected samples.

pub mod analog;
pub mod digital;
pub mod signal;
pub mod suggestions;

use serde::Serialize;

pub use analog::{AnalogClass, AnalogClassification, AnalogTraits, classify_analog};
pub use digital::{
    DigitalClassification, DigitalTraits, PinObservation, PinSignalClassifier, PullProbe,
    SamplingPlan, SignalClass, classify_observation,
};
pub use suggestions::suggestions;

/// Confidence reported for every matched pattern.
pub const PATTERN_CONFIDENCE: f32 = 0.7;

/// A class tag, its confidence in `[0, 1]` and the evidence behind it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassificationResult<C, T> {
    pub class: C,
    pub confidence: f32,
    pub characteristics: T,
}

/// Class tags that carry a fixed confidence.
pub trait Scored: Copy {
    fn confidence(self) -> f32;
}

impl Scored for SignalClass {
    fn confidence(self) -> f32 {
        SignalClass::confidence(self)
    }
}

impl Scored for AnalogClass {
    fn confidence(self) -> f32 {
        AnalogClass::confidence(self)
    }
}

impl<C: Scored, T> ClassificationResult<C, T> {
    pub fn new(class: C, characteristics: T) -> Self {
        Self {
            class,
            confidence: class.confidence(),
            characteristics,
        }
    }
}
