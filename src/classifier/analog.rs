//! Analog channel classification from mean and variance.
//!
//! Thresholds are applied in a fixed order and deliberately overlap
//! (e.g. a joystick mean also satisfies the potentiometer band). First
//! match wins.

use embedded_hal::delay::DelayNs;
use serde::Serialize;

use super::digital::PinSignalClassifier;
use super::{ClassificationResult, PATTERN_CONFIDENCE};
use crate::app::ports::AnalogPort;
use crate::config::MAX_SAMPLES;
use crate::error::HwError;

/// Means at or below this are an unconnected channel.
pub const FLOOR: f32 = 0.01;
/// Above this a channel counts as moving.
pub const MOVING_VARIANCE: f32 = 0.001;

const UNKNOWN_ANALOG_CONFIDENCE: f32 = 0.3;

/// What an analog channel most likely has attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalogClass {
    Joystick,
    Photoresistor,
    Potentiometer,
    LowSignal,
    UnknownAnalog,
    MaxedOut,
    MinimalSignal,
    StableAnalog,
}

impl AnalogClass {
    pub const fn confidence(self) -> f32 {
        match self {
            Self::UnknownAnalog => UNKNOWN_ANALOG_CONFIDENCE,
            _ => PATTERN_CONFIDENCE,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Joystick => "joystick",
            Self::Photoresistor => "photoresistor",
            Self::Potentiometer => "potentiometer",
            Self::LowSignal => "low_signal",
            Self::UnknownAnalog => "unknown_analog",
            Self::MaxedOut => "maxed_out",
            Self::MinimalSignal => "minimal_signal",
            Self::StableAnalog => "stable_analog",
        }
    }
}

impl core::fmt::Display for AnalogClass {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnalogTraits {
    pub mean: f32,
    pub variance: f32,
}

impl AnalogTraits {
    /// Arithmetic mean and population variance. `None` for an empty slice.
    pub fn of(samples: &[f32]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let n = samples.len() as f32;
        let mean = samples.iter().sum::<f32>() / n;
        let variance = samples.iter().map(|s| (s - mean) * (s - mean)).sum::<f32>() / n;
        Some(Self { mean, variance })
    }
}

pub type AnalogClassification = ClassificationResult<AnalogClass, AnalogTraits>;

/// Classify normalised readings. `None` when the channel looks unconnected.
pub fn classify_analog(samples: &[f32]) -> Option<AnalogClassification> {
    let traits = AnalogTraits::of(samples)?;
    if traits.mean <= FLOOR {
        return None;
    }
    Some(ClassificationResult::new(decide(traits), traits))
}

fn decide(AnalogTraits { mean: avg, variance }: AnalogTraits) -> AnalogClass {
    if variance > MOVING_VARIANCE {
        if 0.4 < avg && avg < 0.6 && variance > 0.01 {
            AnalogClass::Joystick
        } else if avg > 0.8 {
            AnalogClass::Photoresistor
        } else if 0.2 < avg && avg < 0.8 && variance > 0.005 {
            AnalogClass::Potentiometer
        } else if avg < 0.3 {
            AnalogClass::LowSignal
        } else {
            AnalogClass::UnknownAnalog
        }
    } else if avg > 0.9 {
        AnalogClass::MaxedOut
    } else if avg < 0.1 {
        AnalogClass::MinimalSignal
    } else {
        AnalogClass::StableAnalog
    }
}

impl PinSignalClassifier {
    /// Read `channel` N times, spaced by the analog sample interval.
    pub fn sample_analog(
        &self,
        port: &mut impl AnalogPort,
        delay: &mut impl DelayNs,
        channel: u8,
    ) -> Result<heapless::Vec<f32, MAX_SAMPLES>, HwError> {
        let plan = &self.analog;
        let mut samples = heapless::Vec::new();
        for i in 0..plan.sample_count {
            if i > 0 {
                delay.delay_ms(plan.sample_interval_ms);
            }
            let _ = samples.push(port.read_normalised(channel)?);
        }
        Ok(samples)
    }
}
