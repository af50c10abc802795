//! Port traits: the hexagonal boundary between detection logic and the board.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ DetectionService (domain)
//! ```
//!
//! Driven adapters (GPIO, ADC, sysfs, event sinks, config storage) implement
//! these traits. The [`DetectionService`](super::service::DetectionService)
//! consumes them via generics, so the classification core never touches
//! hardware directly. I²C, SPI and delays use the `embedded-hal` 1.0 traits
//! directly instead of a local port.

use crate::config::DetectorConfig;
use crate::error::HwError;

// ───────────────────────────────────────────────────────────────
// Pin probe port (driven adapter: GPIO → domain)
// ───────────────────────────────────────────────────────────────

/// Internal bias resistor applied to an input pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pull {
    Up,
    Down,
    Floating,
}

/// Reconfigurable digital input access.
///
/// Every call touches a shared physical register; the caller is expected to
/// hold the pin's lease from the [`PinLocks`](crate::registry::PinLocks)
/// for the whole probe sequence.
pub trait PinProbePort {
    /// (Re)configure `pin` as an input with the given bias.
    fn configure_input(&mut self, pin: u8, pull: Pull) -> Result<(), HwError>;

    /// Read the current level of an input-configured pin.
    fn read_level(&mut self, pin: u8) -> Result<bool, HwError>;

    /// Return the pin to its reset state. Never fails.
    fn release(&mut self, pin: u8);
}

// ───────────────────────────────────────────────────────────────
// Analog port (driven adapter: ADC → domain)
// ───────────────────────────────────────────────────────────────

/// Single-ended analog input normalised to `[0, 1]`.
pub trait AnalogPort {
    fn read_normalised(&mut self, channel: u8) -> Result<f32, HwError>;
}

// ───────────────────────────────────────────────────────────────
// Filesystem-backed probes (1-Wire sysfs, boot config)
// ───────────────────────────────────────────────────────────────

/// Lists 1-Wire slave ids (e.g. `28-0316a2795aff`).
pub trait OneWirePort {
    /// `Ok(vec![])` when the bus master exists but no slaves are present;
    /// `Err(FsUnavailable)` when 1-Wire is not enabled at all.
    fn list_devices(&mut self) -> Result<Vec<String>, HwError>;
}

/// Reports whether the SPI interface is enabled on this board.
pub trait SpiProbePort {
    fn spi_enabled(&mut self) -> Result<bool, HwError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`DetectionEvent`](super::events::DetectionEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::DetectionEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists detector configuration.
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`DetectorConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<DetectorConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &DetectorConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
