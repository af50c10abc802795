//! MCP3008 8-channel 10-bit ADC over SPI.
//!
//! Single-ended conversion, one full-duplex 3-byte transfer per sample:
//!
//! ```text
//!   tx: 0000_0001  SGL D2 D1 D0 xxxx  xxxx_xxxx
//!   rx: xxxx_xxxx  xxxx_x0 B9 B8      B7 ... B0
//! ```

use embedded_hal::spi::SpiDevice;

use crate::app::ports::AnalogPort;
use crate::config::ADC_CHANNELS;
use crate::error::HwError;

/// Full-scale reading.
pub const FULL_SCALE: u16 = 1023;

const START_BIT: u8 = 0x01;
const SINGLE_ENDED: u8 = 0x08;

/// Command frame for a single-ended read of `channel`.
pub const fn request_frame(channel: u8) -> [u8; 3] {
    [START_BIT, (SINGLE_ENDED | channel) << 4, 0x00]
}

/// Extract the 10-bit count from a response frame.
pub const fn decode_frame(rx: [u8; 3]) -> u16 {
    (((rx[1] & 0x03) as u16) << 8) | rx[2] as u16
}

/// MCP3008 on any `embedded-hal` SPI device (chip select owned by the device).
pub struct Mcp3008<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> Mcp3008<SPI> {
    #[must_use]
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Raw 10-bit count for `channel`.
    pub fn read_raw(&mut self, channel: u8) -> Result<u16, HwError> {
        if channel as usize >= ADC_CHANNELS {
            return Err(HwError::InvalidChannel(channel));
        }
        let mut buf = request_frame(channel);
        self.spi
            .transfer_in_place(&mut buf)
            .map_err(|_| HwError::SpiTransferFailed)?;
        Ok(decode_frame(buf))
    }

    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI: SpiDevice> AnalogPort for Mcp3008<SPI> {
    fn read_normalised(&mut self, channel: u8) -> Result<f32, HwError> {
        Ok(f32::from(self.read_raw(channel)?) / f32::from(FULL_SCALE))
    }
}
