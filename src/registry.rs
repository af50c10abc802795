//! Shared device table and per-pin exclusion.
//!
//! The table maps a [`DeviceKey`] to the last [`Detection`] seen there.
//! Every polling thread writes into the same [`DeviceRegistry`]; compound
//! operations (compare-then-write, check-age-then-delete) happen under a
//! single lock acquisition.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;

use crate::bus::i2c::I2cDevice;
use crate::classifier::{AnalogClassification, DigitalClassification};
use crate::error::HwError;

// ── Keys and detections ───────────────────────────────────────

/// Where a device was found.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "source", content = "id", rename_all = "snake_case")]
pub enum DeviceKey {
    Gpio(u8),
    Analog(u8),
    I2c(u8),
    OneWire(String),
    Spi(u8),
}

impl core::fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Gpio(pin) => write!(f, "GPIO{}", pin),
            Self::Analog(ch) => write!(f, "ADC ch{}", ch),
            Self::I2c(addr) => write!(f, "I2C 0x{:02x}", addr),
            Self::OneWire(id) => write!(f, "1-Wire {}", id),
            Self::Spi(bus) => write!(f, "SPI{}", bus),
        }
    }
}

/// What was found.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Detection {
    Digital(DigitalClassification),
    Analog(AnalogClassification),
    I2c(I2cDevice),
    /// DS18B20-family temperature probe on the 1-Wire pin.
    OneWireTemperature { gpio: u8 },
    SpiInterface,
}

impl Detection {
    /// Short label used to decide whether a detection changed.
    ///
    /// Characteristics (transition counts, means) jitter from pass to pass;
    /// only a different label counts as a change.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Digital(r) => r.class.as_str(),
            Self::Analog(r) => r.class.as_str(),
            Self::I2c(dev) => dev.name,
            Self::OneWireTemperature { .. } => "ds18b20_temperature",
            Self::SpiInterface => "spi_interface",
        }
    }
}

/// Table entry.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionRecord {
    pub detection: Detection,
    pub first_seen: Instant,
    pub last_seen: Instant,
    pub last_announced: Instant,
}

/// Result of writing a detection into the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    New,
    Changed { previous: &'static str },
    /// Same label as before. `announce` is set once the re-detection
    /// window has elapsed since the last announcement.
    Refreshed { announce: bool },
}

impl RecordOutcome {
    pub fn should_announce(self) -> bool {
        match self {
            Self::New | Self::Changed { .. } => true,
            Self::Refreshed { announce } => announce,
        }
    }
}

// ── Registry ──────────────────────────────────────────────────

/// Mutex-guarded device table. Share it behind an `Arc`.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: Mutex<BTreeMap<DeviceKey, DetectionRecord>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for `key`.
    pub fn record(
        &self,
        key: DeviceKey,
        detection: Detection,
        now: Instant,
        redetect_window: Duration,
    ) -> RecordOutcome {
        let mut devices = self.devices.lock();
        let rec = match devices.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(DetectionRecord {
                    detection,
                    first_seen: now,
                    last_seen: now,
                    last_announced: now,
                });
                return RecordOutcome::New;
            }
            Entry::Occupied(slot) => slot.into_mut(),
        };

        let previous = rec.detection.label();
        let changed = previous != detection.label();
        rec.detection = detection;
        rec.last_seen = now;
        if changed {
            rec.first_seen = now;
            rec.last_announced = now;
            return RecordOutcome::Changed { previous };
        }
        let announce = now.saturating_duration_since(rec.last_announced) >= redetect_window;
        if announce {
            rec.last_announced = now;
        }
        RecordOutcome::Refreshed { announce }
    }

    /// Remove every entry not seen within `max_age` of `now`.
    ///
    /// Returns the removed keys. Check and delete happen under one lock.
    pub fn expire_stale(&self, now: Instant, max_age: Duration) -> Vec<DeviceKey> {
        let mut devices = self.devices.lock();
        let stale: Vec<DeviceKey> = devices
            .iter()
            .filter(|(_, rec)| now.saturating_duration_since(rec.last_seen) > max_age)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &stale {
            devices.remove(key);
        }
        stale
    }

    pub fn get(&self, key: &DeviceKey) -> Option<DetectionRecord> {
        self.devices.lock().get(key).cloned()
    }

    pub fn forget(&self, key: &DeviceKey) -> Option<DetectionRecord> {
        self.devices.lock().remove(key)
    }

    /// Copy of the whole table, ordered by key.
    pub fn snapshot(&self) -> Vec<(DeviceKey, DetectionRecord)> {
        self.devices
            .lock()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.devices.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.lock().is_empty()
    }
}

// ── Pin exclusion ─────────────────────────────────────────────

/// One bit per BCM pin. A set bit means a classifier owns the pin.
#[derive(Debug, Default)]
pub struct PinLocks {
    mask: AtomicU64,
}

impl PinLocks {
    pub const fn new() -> Self {
        Self {
            mask: AtomicU64::new(0),
        }
    }

    /// Take exclusive use of `pin` until the lease is dropped.
    pub fn try_acquire(&self, pin: u8) -> Result<PinLease<'_>, HwError> {
        let bit = 1u64.checked_shl(u32::from(pin)).ok_or(HwError::PinUnavailable(pin))?;
        let prev = self.mask.fetch_or(bit, Ordering::AcqRel);
        if prev & bit != 0 {
            return Err(HwError::PinBusy(pin));
        }
        Ok(PinLease { locks: self, bit })
    }

    pub fn is_leased(&self, pin: u8) -> bool {
        1u64.checked_shl(u32::from(pin))
            .is_some_and(|bit| self.mask.load(Ordering::Acquire) & bit != 0)
    }
}

/// Exclusive claim on one pin. Released on drop.
#[derive(Debug)]
#[must_use = "the pin is released as soon as the lease is dropped"]
pub struct PinLease<'a> {
    locks: &'a PinLocks,
    bit: u64,
}

impl Drop for PinLease<'_> {
    fn drop(&mut self) {
        self.locks.mask.fetch_and(!self.bit, Ordering::AcqRel);
    }
}
