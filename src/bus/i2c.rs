//! I²C address sweep and identification by well-known address.
//!
//! Presence is an ACK on a one-byte read. Identification is a table lookup
//! only; nothing is written to the device.

use core::ops::RangeInclusive;

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};
use log::{debug, trace};
use serde::Serialize;

use crate::error::HwError;

/// Valid 7-bit addresses outside the reserved blocks.
pub const PROBE_RANGE: RangeInclusive<u8> = 0x03..=0x77;

/// (address, name, part) for modules that ship in common starter kits.
const KNOWN_DEVICES: [(u8, &str, &str); 7] = [
    (0x27, "lcd", "PCF8574 backpack"),
    (0x3c, "oled", "SSD1306"),
    (0x48, "adc", "ADS1115"),
    (0x53, "accelerometer", "ADXL345"),
    (0x68, "rtc", "DS1307"),
    (0x76, "pressure", "BMP280"),
    (0x77, "pressure", "BMP180"),
];

/// A device that acknowledged its address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct I2cDevice {
    pub address: u8,
    pub name: &'static str,
    /// Likely part number, when the address is a well-known one.
    pub part: Option<&'static str>,
}

impl I2cDevice {
    pub fn identify(address: u8) -> Self {
        match KNOWN_DEVICES.iter().find(|(a, _, _)| *a == address) {
            Some(&(_, name, part)) => Self {
                address,
                name,
                part: Some(part),
            },
            None => Self {
                address,
                name: "unknown_i2c_device",
                part: None,
            },
        }
    }

    pub fn is_known(&self) -> bool {
        self.part.is_some()
    }
}

/// Whether `address` acknowledges a one-byte read.
///
/// A NACK (or an unclassified error, which is what Linux reports for an
/// empty address) means absent. Bus-level failures are returned.
pub fn probe<I: I2c>(bus: &mut I, address: u8) -> Result<bool, HwError> {
    let mut byte = [0u8; 1];
    match bus.read(address, &mut byte) {
        Ok(()) => Ok(true),
        Err(e) => match e.kind() {
            ErrorKind::NoAcknowledge(_) | ErrorKind::Other => {
                trace!("I2C 0x{:02x}: no ACK", address);
                Ok(false)
            }
            ErrorKind::Overrun => Err(HwError::BusTimeout),
            _ => Err(HwError::BusUnavailable),
        },
    }
}

/// Probe every address in `range` and identify the ones that answer.
///
/// The first bus-level failure aborts the sweep.
pub fn sweep<I: I2c>(bus: &mut I, range: RangeInclusive<u8>) -> Result<Vec<I2cDevice>, HwError> {
    let mut found = Vec::new();
    for address in range {
        if probe(bus, address)? {
            let dev = I2cDevice::identify(address);
            debug!("I2C 0x{:02x}: ACK ({})", address, dev.name);
            found.push(dev);
        }
    }
    Ok(found)
}
