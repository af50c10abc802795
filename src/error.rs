//! Unified error types for pinprobe.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! polling loops' error handling uniform. All variants are `Copy` so they can
//! be passed through the detection service and logged without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A pin, channel or bus could not be accessed.
    Hardware(HwError),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hardware(e) => write!(f, "hardware: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Hardware access errors
// ---------------------------------------------------------------------------

/// Failures while touching a pin, ADC channel or bus.
///
/// The detection pass never propagates these past the point of occurrence:
/// the affected pin or channel is skipped for the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwError {
    /// The pin does not exist or is owned by another process/driver.
    PinUnavailable(u8),
    /// Another classifier currently holds the pin.
    PinBusy(u8),
    /// A digital level read failed.
    ReadFailed(u8),
    /// The bus device node could not be opened.
    BusUnavailable,
    /// No device acknowledged the address.
    BusNack(u8),
    /// The bus transaction did not complete in time.
    BusTimeout,
    /// An SPI transfer to the ADC failed.
    SpiTransferFailed,
    /// An ADC channel number outside 0–7 was requested.
    InvalidChannel(u8),
    /// A sysfs/boot file could not be read.
    FsUnavailable,
}

impl fmt::Display for HwError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PinUnavailable(pin) => write!(f, "GPIO{pin} unavailable"),
            Self::PinBusy(pin) => write!(f, "GPIO{pin} busy"),
            Self::ReadFailed(pin) => write!(f, "GPIO{pin} read failed"),
            Self::BusUnavailable => write!(f, "bus unavailable"),
            Self::BusNack(addr) => write!(f, "no ACK from 0x{addr:02x}"),
            Self::BusTimeout => write!(f, "bus timeout"),
            Self::SpiTransferFailed => write!(f, "SPI transfer failed"),
            Self::InvalidChannel(ch) => write!(f, "invalid ADC channel {ch}"),
            Self::FsUnavailable => write!(f, "filesystem entry unavailable"),
        }
    }
}

impl std::error::Error for HwError {}

// Lets in-crate bus adapters (simulation, tests) speak embedded-hal directly.
impl embedded_hal::i2c::Error for HwError {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
        match self {
            Self::BusNack(_) => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            Self::BusTimeout => ErrorKind::Overrun,
            _ => ErrorKind::Bus,
        }
    }
}

impl embedded_hal::spi::Error for HwError {
    fn kind(&self) -> embedded_hal::spi::ErrorKind {
        embedded_hal::spi::ErrorKind::Other
    }
}

impl From<HwError> for Error {
    fn from(e: HwError) -> Self {
        Self::Hardware(e)
    }
}

impl From<crate::app::ports::ConfigError> for Error {
    fn from(e: crate::app::ports::ConfigError) -> Self {
        use crate::app::ports::ConfigError;
        match e {
            ConfigError::Corrupted => Self::Config("file is not a valid configuration"),
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
            ConfigError::IoError => Self::Config("file could not be read"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
