//! Raspberry Pi peripherals through `rppal`.
//!
//! Only built with the `rpi` feature on Linux. Every handle here is owned by
//! exactly one polling thread.

use std::collections::BTreeMap;

use log::info;
use rppal::gpio::{Gpio, InputPin};
use rppal::i2c::I2c;
use rppal::spi::{Bus, Mode, SimpleHalSpiDevice, SlaveSelect, Spi};

use crate::app::ports::{PinProbePort, Pull};
use crate::drivers::mcp3008::Mcp3008;
use crate::error::HwError;
use crate::pins;

/// GPIO access with per-call bias reconfiguration.
///
/// `rppal` cannot change the bias of a live `InputPin`, so every
/// reconfiguration drops the previous handle (restoring the pin) and
/// claims it again.
pub struct RpiPins {
    gpio: Gpio,
    claimed: BTreeMap<u8, InputPin>,
}

impl RpiPins {
    pub fn open() -> Result<Self, HwError> {
        let gpio = Gpio::new().map_err(|_| HwError::BusUnavailable)?;
        info!("RpiPins: /dev/gpiomem opened");
        Ok(Self {
            gpio,
            claimed: BTreeMap::new(),
        })
    }
}

impl PinProbePort for RpiPins {
    fn configure_input(&mut self, pin: u8, pull: Pull) -> Result<(), HwError> {
        self.claimed.remove(&pin);
        let raw = self.gpio.get(pin).map_err(|_| HwError::PinUnavailable(pin))?;
        let input = match pull {
            Pull::Up => raw.into_input_pullup(),
            Pull::Down => raw.into_input_pulldown(),
            Pull::Floating => raw.into_input(),
        };
        self.claimed.insert(pin, input);
        Ok(())
    }

    fn read_level(&mut self, pin: u8) -> Result<bool, HwError> {
        self.claimed
            .get(&pin)
            .map(InputPin::is_high)
            .ok_or(HwError::ReadFailed(pin))
    }

    fn release(&mut self, pin: u8) {
        // Dropping the InputPin restores the original mode and bias.
        self.claimed.remove(&pin);
    }
}

/// `/dev/i2c-<bus>` as an `embedded-hal` I²C bus.
pub fn open_i2c(bus: u8) -> Result<I2c, HwError> {
    let i2c = I2c::with_bus(bus).map_err(|_| HwError::BusUnavailable)?;
    info!("I2C: /dev/i2c-{} opened", bus);
    Ok(i2c)
}

/// MCP3008 on SPI0 CE0.
pub fn open_mcp3008() -> Result<Mcp3008<SimpleHalSpiDevice>, HwError> {
    let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, pins::MCP3008_SPI_HZ, Mode::Mode0)
        .map_err(|_| HwError::BusUnavailable)?;
    info!("MCP3008: SPI0.0 at {} Hz", pins::MCP3008_SPI_HZ);
    Ok(Mcp3008::new(SimpleHalSpiDevice::new(spi)))
}
