//! Mock hardware adapters for integration tests.
//!
//! Records every pin call and delay so tests can assert on the exact probe
//! sequence without touching real GPIO registers.

use std::collections::HashMap;

use embedded_hal::delay::DelayNs;
use pinprobe::app::events::DetectionEvent;
use pinprobe::app::ports::{AnalogPort, EventSink, PinProbePort, Pull};
use pinprobe::error::HwError;

// ── Pin call record ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinCall {
    Configure(u8, Pull),
    Read(u8),
    Release(u8),
}

/// What a scripted pin answers: the three probe reads, then the window.
#[derive(Debug, Clone)]
pub struct Script {
    pub up: bool,
    pub down: bool,
    pub floating: bool,
    pub window: Vec<bool>,
    /// Fail every read from this index on (0 = first probe read).
    pub fail_from_read: Option<usize>,
}

impl Script {
    pub fn new(probe: [bool; 3], window: &str) -> Self {
        Self {
            up: probe[0],
            down: probe[1],
            floating: probe[2],
            window: window.chars().map(|c| c == '1').collect(),
            fail_from_read: None,
        }
    }

    pub fn failing_at(mut self, read: usize) -> Self {
        self.fail_from_read = Some(read);
        self
    }
}

// ── MockPins ──────────────────────────────────────────────────

#[derive(Default)]
pub struct MockPins {
    pub calls: Vec<PinCall>,
    scripts: HashMap<u8, Script>,
    reads: HashMap<u8, usize>,
}

#[allow(dead_code)]
impl MockPins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, pin: u8, script: Script) -> Self {
        self.scripts.insert(pin, script);
        self
    }

    pub fn calls_for(&self, pin: u8) -> Vec<PinCall> {
        self.calls
            .iter()
            .copied()
            .filter(|c| match c {
                PinCall::Configure(p, _) | PinCall::Read(p) | PinCall::Release(p) => *p == pin,
            })
            .collect()
    }

    pub fn released(&self, pin: u8) -> bool {
        self.calls_for(pin).last() == Some(&PinCall::Release(pin))
    }
}

impl PinProbePort for MockPins {
    fn configure_input(&mut self, pin: u8, pull: Pull) -> Result<(), HwError> {
        self.calls.push(PinCall::Configure(pin, pull));
        if self.scripts.contains_key(&pin) {
            Ok(())
        } else {
            Err(HwError::PinUnavailable(pin))
        }
    }

    fn read_level(&mut self, pin: u8) -> Result<bool, HwError> {
        self.calls.push(PinCall::Read(pin));
        let script = self.scripts.get(&pin).ok_or(HwError::ReadFailed(pin))?;
        let n = self.reads.entry(pin).or_insert(0);
        let idx = *n;
        *n += 1;
        if script.fail_from_read.is_some_and(|k| idx >= k) {
            return Err(HwError::ReadFailed(pin));
        }
        Ok(match idx {
            0 => script.up,
            1 => script.down,
            2 => script.floating,
            i => script.window[(i - 3) % script.window.len()],
        })
    }

    fn release(&mut self, pin: u8) {
        self.calls.push(PinCall::Release(pin));
        self.reads.remove(&pin);
    }
}

// ── MockDelay ─────────────────────────────────────────────────

/// Records every delay in milliseconds instead of sleeping.
#[derive(Default)]
pub struct MockDelay {
    pub ms: Vec<u32>,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.ms.push(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.ms.push(ms);
    }
}

// ── MockAdc ───────────────────────────────────────────────────

/// Channel → readings returned in rotation. Unlisted channels fail.
#[derive(Default)]
pub struct MockAdc {
    channels: HashMap<u8, (Vec<f32>, usize)>,
}

#[allow(dead_code)]
impl MockAdc {
    pub fn with(mut self, channel: u8, readings: &[f32]) -> Self {
        self.channels.insert(channel, (readings.to_vec(), 0));
        self
    }
}

impl AnalogPort for MockAdc {
    fn read_normalised(&mut self, channel: u8) -> Result<f32, HwError> {
        let (readings, next) = self
            .channels
            .get_mut(&channel)
            .ok_or(HwError::SpiTransferFailed)?;
        let v = readings[*next % readings.len()];
        *next += 1;
        Ok(v)
    }
}

// ── CollectSink ───────────────────────────────────────────────

#[derive(Default)]
pub struct CollectSink {
    pub events: Vec<DetectionEvent>,
}

#[allow(dead_code)]
impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn detected_keys(&self) -> Vec<pinprobe::registry::DeviceKey> {
        self.events
            .iter()
            .filter_map(|e| match e {
                DetectionEvent::Detected { key, .. } => Some(key.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn lost_keys(&self) -> Vec<pinprobe::registry::DeviceKey> {
        self.events
            .iter()
            .filter_map(|e| match e {
                DetectionEvent::Lost(key) => Some(key.clone()),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for CollectSink {
    fn emit(&mut self, event: &DetectionEvent) {
        self.events.push(event.clone());
    }
}
