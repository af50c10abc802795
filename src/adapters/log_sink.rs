//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing detection events through the `log`
//! facade (`env_logger` on the console in the binary). A dashboard or MQTT
//! adapter would implement the same trait.

use log::{debug, info, warn};

use crate::app::events::DetectionEvent;
use crate::app::ports::EventSink;
use crate::app::service::detection_suggestions;
use crate::registry::Detection;

/// Adapter that logs every [`DetectionEvent`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

fn describe(detection: &Detection) -> String {
    let parts = detection_suggestions(detection);
    match detection {
        Detection::Digital(r) => format!(
            "{} ({:.0}%, t={}) {:?}",
            r.class,
            r.confidence * 100.0,
            r.characteristics.transitions,
            parts
        ),
        Detection::Analog(r) => format!(
            "{} ({:.0}%, avg={:.3} var={:.4}) {:?}",
            r.class,
            r.confidence * 100.0,
            r.characteristics.mean,
            r.characteristics.variance,
            parts
        ),
        Detection::I2c(dev) => match dev.part {
            Some(part) => format!("{} ({})", dev.name, part),
            None => dev.name.to_owned(),
        },
        Detection::OneWireTemperature { gpio } => format!("DS18B20 temperature probe on GPIO{}", gpio),
        Detection::SpiInterface => "SPI interface enabled".to_owned(),
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &DetectionEvent) {
        match event {
            DetectionEvent::Started {
                gpio_pins,
                analog_channels,
            } => {
                info!("START | gpio_pins={} analog_channels={}", gpio_pins, analog_channels);
            }
            DetectionEvent::Detected { key, detection } => {
                info!("FOUND | {} | {}", key, describe(detection));
            }
            DetectionEvent::Changed {
                key,
                previous,
                detection,
            } => {
                info!("CHANGE | {} | {} -> {}", key, previous, describe(detection));
            }
            DetectionEvent::StillPresent { key, detection } => {
                info!("SEEN | {} | {}", key, detection.label());
            }
            DetectionEvent::Lost(key) => {
                info!("LOST | {}", key);
            }
            DetectionEvent::Unavailable { source, error } => {
                warn!("DEGRADED | {:?} | {}", source, error);
            }
            DetectionEvent::PassCompleted(s) => {
                debug!(
                    "PASS | {:?} | probed={} detected={} skipped={}",
                    s.source, s.probed, s.detected, s.skipped
                );
            }
        }
    }
}
