//! Digital pin classification.
//!
//! ## Probe sequence
//!
//! | Step | Pull      | Action                                   |
//! |------|-----------|------------------------------------------|
//! | 1    | up        | settle, read `state_up`                  |
//! | 2    | down      | settle, read `state_down`                |
//! | 3    | floating  | settle, read `state_float`               |
//! | 4    | up        | settle, read N samples spaced `interval` |
//!
//! ## Decision table (first match wins)
//!
//! | Condition                                  | Class                               |
//! |--------------------------------------------|-------------------------------------|
//! | `up != down`, window constant, up=1 down=0 | `Button`                            |
//! | `up != down`, window constant              | `DigitalSensorActiveLow`/`High`     |
//! | transitions > 5                            | `CommunicationLike`                 |
//! | transitions == 2                           | `MotionLike`                        |
//! | window constant 1                          | `DigitalSensorActiveHigh`/`Button`  |
//! | window constant 0                          | `DrivenLow`                         |
//! | smallest period found                      | `PwmSignal`                         |
//! | otherwise                                  | `Unknown`                           |
//!
//! The order of the pull-response row and the transition rows is not an
//! orthogonal priority; it is kept exactly as listed.

use embedded_hal::delay::DelayNs;
use heapless::Vec;
use log::debug;
use serde::Serialize;

use super::signal::SignalProfile;
use super::{ClassificationResult, PATTERN_CONFIDENCE};
use crate::app::ports::{PinProbePort, Pull};
use crate::config::{DetectorConfig, MAX_SAMPLES};
use crate::error::HwError;
use crate::pins;

/// More transitions than this in one window is too busy for a switch or sensor.
pub const COMMUNICATION_TRANSITIONS: usize = 5;
/// One clean rise/fall pair, e.g. a PIR pulse inside the window.
pub const MOTION_TRANSITIONS: usize = 2;

// ── Classes ───────────────────────────────────────────────────

/// Electrical behaviour of a digital input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalClass {
    Button,
    DigitalSensorActiveHigh,
    DigitalSensorActiveLow,
    PwmSignal,
    MotionLike,
    CommunicationLike,
    /// Held low by something stronger than the pull-up; not a sensor.
    DrivenLow,
    Unknown,
}

impl SignalClass {
    pub const fn confidence(self) -> f32 {
        match self {
            Self::Unknown => 0.0,
            Self::Button
            | Self::DigitalSensorActiveHigh
            | Self::DigitalSensorActiveLow
            | Self::PwmSignal
            | Self::MotionLike
            | Self::CommunicationLike
            | Self::DrivenLow => PATTERN_CONFIDENCE,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::DigitalSensorActiveHigh => "digital_sensor_active_high",
            Self::DigitalSensorActiveLow => "digital_sensor_active_low",
            Self::PwmSignal => "pwm_signal",
            Self::MotionLike => "motion_like",
            Self::CommunicationLike => "communication_like",
            Self::DrivenLow => "driven_low",
            Self::Unknown => "unknown",
        }
    }
}

impl core::fmt::Display for SignalClass {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Observation ───────────────────────────────────────────────

/// Single reads taken under each bias configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PullProbe {
    pub up: bool,
    pub down: bool,
    pub floating: bool,
}

impl PullProbe {
    /// The two pulled reads differ: nothing drives the pin hard.
    pub fn responds_to_pull(&self) -> bool {
        self.up != self.down
    }

    /// Reads high when pulled up and low when pulled down.
    pub fn follows_pulls(&self) -> bool {
        self.up && !self.down
    }

    /// The floating read disagrees with both pulled reads.
    pub fn floating_differs(&self) -> bool {
        self.floating != self.up && self.floating != self.down
    }
}

/// Everything read from one pin during one probe sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinObservation {
    pub pin: u8,
    pub probe: PullProbe,
    /// Bias active while `samples` were taken.
    pub window_pull: Pull,
    pub samples: Vec<bool, MAX_SAMPLES>,
}

impl PinObservation {
    /// Build an observation from an injected window (tests, replay).
    ///
    /// Samples beyond [`MAX_SAMPLES`] are dropped.
    pub fn from_samples(pin: u8, probe: PullProbe, samples: &[bool]) -> Self {
        let mut window = Vec::new();
        for &s in samples.iter().take(MAX_SAMPLES) {
            let _ = window.push(s);
        }
        Self {
            pin,
            probe,
            window_pull: Pull::Up,
            samples: window,
        }
    }
}

/// Characteristics reported alongside a digital class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DigitalTraits {
    pub probe: PullProbe,
    pub transitions: usize,
    pub constant_level: Option<bool>,
    pub period: Option<usize>,
    pub hardware_pwm: bool,
}

pub type DigitalClassification = ClassificationResult<SignalClass, DigitalTraits>;

// ── Decision table ────────────────────────────────────────────

/// Apply the decision table to an observation. Pure and deterministic.
pub fn classify_observation(obs: &PinObservation) -> DigitalClassification {
    let profile = SignalProfile::analyse(&obs.samples);
    let class = decide(&obs.probe, &profile);
    ClassificationResult::new(
        class,
        DigitalTraits {
            probe: obs.probe,
            transitions: profile.transitions,
            constant_level: profile.constant_level,
            period: profile.period,
            hardware_pwm: pins::is_hardware_pwm(obs.pin),
        },
    )
}

fn decide(probe: &PullProbe, profile: &SignalProfile) -> SignalClass {
    if probe.responds_to_pull() {
        // A responsive pin with a moving window falls through to the
        // transition rules below.
        match profile.constant_level {
            // The idle level is the inactive one.
            Some(_) if probe.follows_pulls() => return SignalClass::Button,
            Some(true) => return SignalClass::DigitalSensorActiveLow,
            Some(false) => return SignalClass::DigitalSensorActiveHigh,
            None => {}
        }
    }

    if profile.transitions > COMMUNICATION_TRANSITIONS {
        return SignalClass::CommunicationLike;
    }
    if profile.transitions == MOTION_TRANSITIONS {
        return SignalClass::MotionLike;
    }

    match profile.constant_level {
        Some(true) if probe.floating_differs() => SignalClass::DigitalSensorActiveHigh,
        Some(true) => SignalClass::Button,
        Some(false) => SignalClass::DrivenLow,
        None if profile.period.is_some() => SignalClass::PwmSignal,
        None => SignalClass::Unknown,
    }
}

// ── Sampling ──────────────────────────────────────────────────

/// Timing of the probe sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingPlan {
    pub settle_ms: u32,
    pub sample_count: usize,
    pub sample_interval_ms: u32,
}

impl SamplingPlan {
    pub fn digital(config: &DetectorConfig) -> Self {
        Self {
            settle_ms: config.settle_ms,
            sample_count: (config.sample_count as usize).min(MAX_SAMPLES),
            sample_interval_ms: config.sample_interval_ms,
        }
    }

    pub fn analog(config: &DetectorConfig) -> Self {
        Self {
            settle_ms: 0,
            sample_count: (config.analog_sample_count as usize).min(MAX_SAMPLES),
            sample_interval_ms: config.analog_sample_interval_ms,
        }
    }
}

impl Default for SamplingPlan {
    fn default() -> Self {
        Self::digital(&DetectorConfig::default())
    }
}

/// Samples pins and channels, then applies the decision tables.
///
/// Holds no hardware; ports and the delay are injected per call.
#[derive(Debug, Clone, Copy)]
pub struct PinSignalClassifier {
    pub(crate) digital: SamplingPlan,
    pub(crate) analog: SamplingPlan,
}

impl PinSignalClassifier {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            digital: SamplingPlan::digital(config),
            analog: SamplingPlan::analog(config),
        }
    }

    /// Run the four-step probe sequence on `pin`.
    ///
    /// Strictly sequential: every reconfiguration settles before the next read.
    pub fn observe(
        &self,
        port: &mut impl PinProbePort,
        delay: &mut impl DelayNs,
        pin: u8,
    ) -> Result<PinObservation, HwError> {
        let plan = &self.digital;

        let probe = PullProbe {
            up: probe_read(port, delay, pin, Pull::Up, plan.settle_ms)?,
            down: probe_read(port, delay, pin, Pull::Down, plan.settle_ms)?,
            floating: probe_read(port, delay, pin, Pull::Floating, plan.settle_ms)?,
        };

        port.configure_input(pin, Pull::Up)?;
        delay.delay_ms(plan.settle_ms);
        let mut samples = Vec::new();
        for i in 0..plan.sample_count {
            if i > 0 {
                delay.delay_ms(plan.sample_interval_ms);
            }
            let _ = samples.push(port.read_level(pin)?);
        }

        Ok(PinObservation {
            pin,
            probe,
            window_pull: Pull::Up,
            samples,
        })
    }

    /// Probe and classify one pin. Best-effort: a hardware failure is
    /// logged at debug level and yields `None`.
    ///
    /// The pin is released afterwards whatever the outcome.
    pub fn classify_digital(
        &self,
        port: &mut impl PinProbePort,
        delay: &mut impl DelayNs,
        pin: u8,
    ) -> Option<DigitalClassification> {
        let observed = self.observe(port, delay, pin);
        port.release(pin);
        match observed {
            Ok(obs) => Some(classify_observation(&obs)),
            Err(e) => {
                debug!("GPIO{}: probe failed ({}), skipped", pin, e);
                None
            }
        }
    }
}

fn probe_read(
    port: &mut impl PinProbePort,
    delay: &mut impl DelayNs,
    pin: u8,
    pull: Pull,
    settle_ms: u32,
) -> Result<bool, HwError> {
    port.configure_input(pin, pull)?;
    delay.delay_ms(settle_ms);
    port.read_level(pin)
}
