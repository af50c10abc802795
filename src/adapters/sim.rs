//! Simulated board.
//!
//! Stands in for the Raspberry Pi when the `rpi` feature is off (or `--sim`
//! is given). Each pin carries a [`Wiring`] describing what is electrically
//! attached; the board answers the same port traits as the real adapter.
//! Pins without wiring behave as if claimed by another driver.

use std::collections::BTreeMap;

use embedded_hal::i2c::{ErrorType, I2c, Operation};

use crate::app::ports::{AnalogPort, OneWirePort, PinProbePort, Pull, SpiProbePort};
use crate::config::ADC_CHANNELS;
use crate::error::HwError;

/// What is attached to a simulated pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wiring {
    /// Nothing attached: the level follows the bias; `floating` is what an
    /// unbiased read returns.
    Open { floating: bool },
    /// An external circuit stronger than the internal bias holds `pulled`.
    /// With the bias removed the pin reads `floating`.
    Biased { pulled: bool, floating: bool },
    /// A source steps through `pattern`, one element per read, restarting
    /// when the pin is released.
    Driven(Vec<bool>),
    /// Every access fails.
    Faulty,
}

impl Wiring {
    /// Parse a `"1100"` style pattern.
    pub fn driven(pattern: &str) -> Self {
        Self::Driven(pattern.chars().map(|c| c == '1').collect())
    }
}

#[derive(Debug, Clone)]
struct SimPin {
    wiring: Wiring,
    pull: Option<Pull>,
    step: usize,
}

/// Scriptable board implementing every hardware port.
#[derive(Debug, Clone, Default)]
pub struct SimulatedBoard {
    pins: BTreeMap<u8, SimPin>,
    analog: BTreeMap<u8, (Vec<f32>, usize)>,
    i2c_present: Vec<u8>,
    onewire: Option<Vec<String>>,
    spi_enabled: bool,
}

impl SimulatedBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bench with one of everything the detector knows about.
    pub fn demo() -> Self {
        let mut motion = vec![false; 4];
        motion.extend([true; 4]);
        motion.extend([false; 8]);

        Self::new()
            .with_pin(4, Wiring::driven("10"))
            .with_pin(17, Wiring::Open { floating: false })
            .with_pin(22, Wiring::Biased {
                pulled: false,
                floating: false,
            })
            .with_pin(23, Wiring::driven("1100"))
            .with_pin(24, Wiring::Driven(motion))
            .with_pin(27, Wiring::Biased {
                pulled: true,
                floating: false,
            })
            .with_analog(0, vec![0.25, 0.45])
            .with_analog(1, vec![0.38, 0.62])
            .with_analog(2, vec![0.80, 0.90])
            .with_i2c(&[0x27, 0x76])
            .with_onewire(&["28-0316a2795aff"])
            .with_spi(true)
    }

    pub fn with_pin(mut self, pin: u8, wiring: Wiring) -> Self {
        self.pins.insert(
            pin,
            SimPin {
                wiring,
                pull: None,
                step: 0,
            },
        );
        self
    }

    /// Readings returned in rotation for `channel`.
    pub fn with_analog(mut self, channel: u8, readings: Vec<f32>) -> Self {
        self.analog.insert(channel, (readings, 0));
        self
    }

    pub fn with_i2c(mut self, addresses: &[u8]) -> Self {
        self.i2c_present = addresses.to_vec();
        self
    }

    /// Slave ids listed by the 1-Wire bus. Without a call the bus is absent.
    pub fn with_onewire(mut self, ids: &[&str]) -> Self {
        self.onewire = Some(ids.iter().map(|&id| id.to_owned()).collect());
        self
    }

    pub fn with_spi(mut self, enabled: bool) -> Self {
        self.spi_enabled = enabled;
        self
    }

    /// Bias currently applied to `pin`, `None` when released or unknown.
    pub fn pull_of(&self, pin: u8) -> Option<Pull> {
        self.pins.get(&pin).and_then(|p| p.pull)
    }
}

impl PinProbePort for SimulatedBoard {
    fn configure_input(&mut self, pin: u8, pull: Pull) -> Result<(), HwError> {
        let sim = self.pins.get_mut(&pin).ok_or(HwError::PinUnavailable(pin))?;
        if sim.wiring == Wiring::Faulty {
            return Err(HwError::PinUnavailable(pin));
        }
        sim.pull = Some(pull);
        Ok(())
    }

    fn read_level(&mut self, pin: u8) -> Result<bool, HwError> {
        let sim = self.pins.get_mut(&pin).ok_or(HwError::PinUnavailable(pin))?;
        let pull = sim.pull.ok_or(HwError::ReadFailed(pin))?;
        match &sim.wiring {
            Wiring::Open { floating } => Ok(match pull {
                Pull::Up => true,
                Pull::Down => false,
                Pull::Floating => *floating,
            }),
            Wiring::Biased { pulled, floating } => Ok(match pull {
                Pull::Floating => *floating,
                Pull::Up | Pull::Down => *pulled,
            }),
            Wiring::Driven(pattern) => {
                let level = pattern
                    .get(sim.step % pattern.len().max(1))
                    .copied()
                    .ok_or(HwError::ReadFailed(pin))?;
                sim.step += 1;
                Ok(level)
            }
            Wiring::Faulty => Err(HwError::ReadFailed(pin)),
        }
    }

    fn release(&mut self, pin: u8) {
        if let Some(sim) = self.pins.get_mut(&pin) {
            sim.pull = None;
            sim.step = 0;
        }
    }
}

impl AnalogPort for SimulatedBoard {
    fn read_normalised(&mut self, channel: u8) -> Result<f32, HwError> {
        if channel as usize >= ADC_CHANNELS {
            return Err(HwError::InvalidChannel(channel));
        }
        let Some((readings, next)) = self.analog.get_mut(&channel) else {
            return Ok(0.0);
        };
        let value = readings.get(*next % readings.len().max(1)).copied().unwrap_or(0.0);
        *next += 1;
        Ok(value)
    }
}

impl ErrorType for SimulatedBoard {
    type Error = HwError;
}

impl I2c for SimulatedBoard {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if !self.i2c_present.contains(&address) {
            return Err(HwError::BusNack(address));
        }
        for op in operations {
            if let Operation::Read(buf) = op {
                buf.fill(0);
            }
        }
        Ok(())
    }
}

impl OneWirePort for SimulatedBoard {
    fn list_devices(&mut self) -> Result<Vec<String>, HwError> {
        self.onewire.clone().ok_or(HwError::FsUnavailable)
    }
}

impl SpiProbePort for SimulatedBoard {
    fn spi_enabled(&mut self) -> Result<bool, HwError> {
        Ok(self.spi_enabled)
    }
}
