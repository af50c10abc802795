//! Outbound detection events.
//!
//! The [`DetectionService`](super::service::DetectionService) emits these
//! through the [`EventSink`](super::ports::EventSink) port. Adapters on the
//! other side decide what to do with them (log them, print a report, push
//! them to a dashboard).

use serde::Serialize;

use crate::error::HwError;
use crate::registry::{Detection, DeviceKey};

/// Which detection pass produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Gpio,
    Analog,
    I2c,
    OneWire,
    Spi,
}

/// Structured events emitted by the detection core.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionEvent {
    /// The service is about to run its first passes.
    Started { gpio_pins: usize, analog_channels: usize },

    /// Something appeared where nothing was recorded.
    Detected { key: DeviceKey, detection: Detection },

    /// The label at `key` differs from the previous pass.
    Changed {
        key: DeviceKey,
        previous: &'static str,
        detection: Detection,
    },

    /// Unchanged, re-announced after the re-detection window.
    StillPresent { key: DeviceKey, detection: Detection },

    /// Not seen for longer than the stale threshold; removed.
    Lost(DeviceKey),

    /// A whole subsystem could not be probed this pass.
    Unavailable { source: Source, error: HwError },

    /// End-of-pass summary.
    PassCompleted(PassSummary),
}

/// Counters for one pass over one source.
///
/// Every target lands in exactly one of `probed` or `skipped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PassSummary {
    pub source: Source,
    /// Pins, channels or addresses examined to completion.
    pub probed: usize,
    /// Probed and recorded.
    pub detected: usize,
    /// Not examined to completion: leased elsewhere, or a hardware fault
    /// before or during the probe.
    pub skipped: usize,
}

impl PassSummary {
    pub const fn new(source: Source) -> Self {
        Self {
            source,
            probed: 0,
            detected: 0,
            skipped: 0,
        }
    }
}
