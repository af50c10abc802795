//! Detection service: the hexagonal core.
//!
//! [`DetectionService`] owns the configuration and classifier and shares the
//! device table and pin locks with every other polling thread. All I/O flows
//! through port traits injected at call sites, so each pass is testable with
//! mock adapters.
//!
//! ```text
//!  PinProbePort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!    AnalogPort ──▶ │     DetectionService     │
//!           I2c ──▶ │  classify · record · age │ ──▶ DeviceRegistry
//!  1-Wire / SPI ──▶ └──────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, info, warn};
use serde::Serialize;

use crate::bus::i2c;
use crate::classifier::suggestions::{AnyClass, suggestions};
use crate::classifier::{PinSignalClassifier, SignalClass, classify_analog};
use crate::config::DetectorConfig;
use crate::error::HwError;
use crate::pins;
use crate::registry::{Detection, DeviceKey, DeviceRegistry, PinLocks, RecordOutcome};

use super::events::{DetectionEvent, PassSummary, Source};
use super::ports::{AnalogPort, EventSink, OneWirePort, PinProbePort, SpiProbePort};

/// SPI0 is the only bus the boot flag controls.
const SPI_BUS: u8 = 0;

// ───────────────────────────────────────────────────────────────
// DetectionService
// ───────────────────────────────────────────────────────────────

/// Runs detection passes and records what it finds.
///
/// Cheap to clone: each polling thread gets its own copy sharing the same
/// registry and pin locks.
#[derive(Debug, Clone)]
pub struct DetectionService {
    config: DetectorConfig,
    classifier: PinSignalClassifier,
    registry: Arc<DeviceRegistry>,
    locks: Arc<PinLocks>,
}

impl DetectionService {
    pub fn new(config: DetectorConfig, registry: Arc<DeviceRegistry>, locks: Arc<PinLocks>) -> Self {
        let classifier = PinSignalClassifier::new(&config);
        Self {
            config,
            classifier,
            registry,
            locks,
        }
    }

    /// Service with a private registry and lock set.
    pub fn standalone(config: DetectorConfig) -> Self {
        Self::new(config, Arc::default(), Arc::default())
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&self, sink: &mut impl EventSink) {
        sink.emit(&DetectionEvent::Started {
            gpio_pins: self.config.gpio_pins.len(),
            analog_channels: self.config.analog_channels.len(),
        });
        info!(
            "Detection started: {} GPIO pins, {} ADC channels",
            self.config.gpio_pins.len(),
            self.config.analog_channels.len()
        );
    }

    // ── Passes ────────────────────────────────────────────────

    /// Probe and classify every configured GPIO pin.
    ///
    /// A pin leased by another classifier, or one that faults mid-probe, is
    /// skipped; the pass continues with the next pin. `unknown` pins are
    /// examined but not recorded.
    pub fn scan_gpio(
        &self,
        port: &mut impl PinProbePort,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) -> PassSummary {
        let mut summary = PassSummary::new(Source::Gpio);
        for &pin in &self.config.gpio_pins {
            if pins::is_i2c(pin) {
                continue;
            }
            let _lease = match self.locks.try_acquire(pin) {
                Ok(lease) => lease,
                Err(e) => {
                    debug!("GPIO{}: {}, skipped", pin, e);
                    summary.skipped += 1;
                    continue;
                }
            };
            let Some(result) = self.classifier.classify_digital(port, delay, pin) else {
                summary.skipped += 1;
                continue;
            };
            summary.probed += 1;
            if result.class == SignalClass::Unknown {
                continue;
            }
            self.record(DeviceKey::Gpio(pin), Detection::Digital(result), sink);
            summary.detected += 1;
        }
        self.finish(summary, sink)
    }

    /// Sample and classify every configured ADC channel.
    pub fn scan_analog(
        &self,
        port: &mut impl AnalogPort,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) -> PassSummary {
        let mut summary = PassSummary::new(Source::Analog);
        for &channel in &self.config.analog_channels {
            let samples = match self.classifier.sample_analog(port, delay, channel) {
                Ok(samples) => samples,
                Err(e) => {
                    debug!("ADC ch{}: {}, skipped", channel, e);
                    summary.skipped += 1;
                    continue;
                }
            };
            summary.probed += 1;
            if let Some(result) = classify_analog(&samples) {
                self.record(DeviceKey::Analog(channel), Detection::Analog(result), sink);
                summary.detected += 1;
            }
        }
        self.finish(summary, sink)
    }

    /// Sweep the configured I²C address range.
    pub fn scan_i2c<I: I2c>(&self, bus: &mut I, sink: &mut impl EventSink) -> PassSummary {
        let mut summary = PassSummary::new(Source::I2c);
        let range = self.config.i2c_first_address..=self.config.i2c_last_address;
        let span = range.clone().count();
        match i2c::sweep(bus, range) {
            Ok(devices) => {
                summary.probed = span;
                for dev in devices {
                    self.record(DeviceKey::I2c(dev.address), Detection::I2c(dev), sink);
                    summary.detected += 1;
                }
            }
            Err(error) => {
                warn!("I2C sweep aborted: {}", error);
                summary.skipped = span;
                sink.emit(&DetectionEvent::Unavailable {
                    source: Source::I2c,
                    error,
                });
            }
        }
        self.finish(summary, sink)
    }

    /// List DS18B20-family probes. A bus without the overlay loaded
    /// detects nothing.
    pub fn scan_onewire(&self, port: &mut impl OneWirePort, sink: &mut impl EventSink) -> PassSummary {
        let mut summary = PassSummary::new(Source::OneWire);
        match port.list_devices() {
            Ok(ids) => {
                summary.probed = ids.len();
                for id in ids {
                    self.record(
                        DeviceKey::OneWire(id),
                        Detection::OneWireTemperature {
                            gpio: pins::ONEWIRE_GPIO,
                        },
                        sink,
                    );
                    summary.detected += 1;
                }
            }
            Err(HwError::FsUnavailable) => debug!("1-Wire not enabled"),
            Err(error) => sink.emit(&DetectionEvent::Unavailable {
                source: Source::OneWire,
                error,
            }),
        }
        self.finish(summary, sink)
    }

    /// Record the SPI interface when the boot configuration enables it.
    pub fn scan_spi(&self, port: &mut impl SpiProbePort, sink: &mut impl EventSink) -> PassSummary {
        let mut summary = PassSummary::new(Source::Spi);
        match port.spi_enabled() {
            Ok(true) => {
                self.record(DeviceKey::Spi(SPI_BUS), Detection::SpiInterface, sink);
                summary.probed = 1;
                summary.detected = 1;
            }
            Ok(false) => summary.probed = 1,
            Err(e) => {
                debug!("SPI probe: {}", e);
                summary.skipped = 1;
            }
        }
        self.finish(summary, sink)
    }

    /// Drop every device not seen for `stale_after_secs`, emitting `Lost`.
    pub fn expire_stale(&self, now: Instant, sink: &mut impl EventSink) -> Vec<DeviceKey> {
        let max_age = Duration::from_secs(u64::from(self.config.stale_after_secs));
        let lost = self.registry.expire_stale(now, max_age);
        for key in &lost {
            info!("{}: lost", key);
            sink.emit(&DetectionEvent::Lost(key.clone()));
        }
        lost
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current table with suggested parts, ordered by key.
    pub fn report(&self, now: Instant) -> Vec<ReportEntry> {
        self.registry
            .snapshot()
            .into_iter()
            .map(|(key, rec)| ReportEntry {
                suggestions: detection_suggestions(&rec.detection),
                seen_for_secs: now.saturating_duration_since(rec.first_seen).as_secs(),
                key,
                detection: rec.detection,
            })
            .collect()
    }

    pub fn registry(&self) -> &Arc<DeviceRegistry> {
        &self.registry
    }

    pub fn locks(&self) -> &Arc<PinLocks> {
        &self.locks
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn record(&self, key: DeviceKey, detection: Detection, sink: &mut impl EventSink) {
        let window = Duration::from_secs(u64::from(self.config.redetect_window_secs));
        let outcome = self
            .registry
            .record(key.clone(), detection.clone(), Instant::now(), window);
        let event = match outcome {
            RecordOutcome::New => DetectionEvent::Detected { key, detection },
            RecordOutcome::Changed { previous } => DetectionEvent::Changed {
                key,
                previous,
                detection,
            },
            RecordOutcome::Refreshed { announce: true } => {
                DetectionEvent::StillPresent { key, detection }
            }
            RecordOutcome::Refreshed { announce: false } => return,
        };
        sink.emit(&event);
    }

    fn finish(&self, summary: PassSummary, sink: &mut impl EventSink) -> PassSummary {
        sink.emit(&DetectionEvent::PassCompleted(summary));
        summary
    }
}

/// One row of the `--once` report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub key: DeviceKey,
    pub detection: Detection,
    pub suggestions: &'static [&'static str],
    pub seen_for_secs: u64,
}

pub fn detection_suggestions(detection: &Detection) -> &'static [&'static str] {
    match detection {
        Detection::Digital(r) => suggestions(AnyClass::Digital(r.class)),
        Detection::Analog(r) => suggestions(AnyClass::Analog(r.class)),
        Detection::I2c(_) | Detection::OneWireTemperature { .. } | Detection::SpiInterface => &[],
    }
}
