//! Detector configuration parameters
//!
//! All tunable parameters for the detection passes. Values can be
//! overridden from a JSON file through the [`ConfigPort`](crate::app::ports::ConfigPort).

use std::path::PathBuf;

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::pins;

/// Upper bound on the digital sample window.
pub const MAX_SAMPLES: usize = 32;
/// Upper bound on scanned GPIOs (the 40-pin header exposes 26).
pub const MAX_SCAN_PINS: usize = 28;
/// MCP3008 channel count.
pub const ADC_CHANNELS: usize = 8;

/// Core detector configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    // --- Digital sampling ---
    /// BCM pins probed on every GPIO pass
    pub gpio_pins: Vec<u8, MAX_SCAN_PINS>,
    /// Settle time after each pull reconfiguration (milliseconds)
    pub settle_ms: u32,
    /// Samples in the stability/transition window
    pub sample_count: u8,
    /// Spacing between window samples (milliseconds)
    pub sample_interval_ms: u32,

    // --- Analog sampling ---
    /// MCP3008 channels probed on every analog pass
    pub analog_channels: Vec<u8, ADC_CHANNELS>,
    /// Reads averaged per channel
    pub analog_sample_count: u8,
    /// Spacing between analog reads (milliseconds)
    pub analog_sample_interval_ms: u32,

    // --- I2C ---
    /// Linux I2C bus number (`/dev/i2c-N`)
    pub i2c_bus: u8,
    /// First 7-bit address probed
    pub i2c_first_address: u8,
    /// Last 7-bit address probed (inclusive)
    pub i2c_last_address: u8,

    // --- Filesystem probes ---
    /// w1 sysfs device directory
    pub onewire_dir: PathBuf,
    /// Boot configuration consulted for `dtparam=spi=on`
    pub boot_config_path: PathBuf,

    // --- Timing ---
    /// GPIO pass interval (milliseconds)
    pub gpio_scan_interval_ms: u32,
    /// Analog pass interval (milliseconds)
    pub analog_scan_interval_ms: u32,
    /// I2C sweep interval (seconds)
    pub i2c_scan_interval_secs: u32,
    /// 1-Wire and SPI rescan interval (seconds)
    pub onewire_scan_interval_secs: u32,
    /// An unchanged detection is re-announced at most this often (seconds)
    pub redetect_window_secs: u32,
    /// Devices unseen for this long are dropped (seconds)
    pub stale_after_secs: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        let mut gpio_pins = Vec::new();
        for pin in pins::FIRST_GPIO..=pins::LAST_GPIO {
            if !pins::is_i2c(pin) {
                let _ = gpio_pins.push(pin);
            }
        }
        let mut analog_channels = Vec::new();
        for ch in 0..ADC_CHANNELS as u8 {
            let _ = analog_channels.push(ch);
        }

        Self {
            // Digital
            gpio_pins,
            settle_ms: 10,
            sample_count: 10,
            sample_interval_ms: 10,

            // Analog
            analog_channels,
            analog_sample_count: 10,
            analog_sample_interval_ms: 10,

            // I2C
            i2c_bus: pins::I2C_BUS,
            i2c_first_address: 0x03,
            i2c_last_address: 0x77,

            // Filesystem
            onewire_dir: PathBuf::from("/sys/bus/w1/devices"),
            boot_config_path: PathBuf::from("/boot/config.txt"),

            // Timing
            gpio_scan_interval_ms: 1000,     // 1 Hz
            analog_scan_interval_ms: 5000,   // 0.2 Hz
            i2c_scan_interval_secs: 30,
            onewire_scan_interval_secs: 60,
            redetect_window_secs: 30,
            stale_after_secs: 300,
        }
    }
}

impl DetectorConfig {
    /// Reject out-of-range values. Nothing is clamped.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.settle_ms == 0 {
            return Err("settle_ms must be > 0");
        }
        if self.sample_count < 2 || self.sample_count as usize > MAX_SAMPLES {
            return Err("sample_count must be in 2..=32");
        }
        if self.analog_sample_count == 0 || self.analog_sample_count as usize > MAX_SAMPLES {
            return Err("analog_sample_count must be in 1..=32");
        }
        for (i, &pin) in self.gpio_pins.iter().enumerate() {
            if !(pins::FIRST_GPIO..=pins::LAST_GPIO).contains(&pin) {
                return Err("gpio_pins entry outside BCM 2..=27");
            }
            if pins::is_i2c(pin) {
                return Err("gpio_pins must not include the I2C pins 2 and 3");
            }
            if self.gpio_pins[..i].contains(&pin) {
                return Err("gpio_pins contains a duplicate");
            }
        }
        if self.analog_channels.iter().any(|&ch| ch as usize >= ADC_CHANNELS) {
            return Err("analog_channels entry outside 0..=7");
        }
        if self.i2c_first_address < 0x03
            || self.i2c_last_address > 0x77
            || self.i2c_first_address > self.i2c_last_address
        {
            return Err("I2C address range must lie within 0x03..=0x77");
        }
        if self.gpio_scan_interval_ms == 0
            || self.analog_scan_interval_ms == 0
            || self.i2c_scan_interval_secs == 0
            || self.onewire_scan_interval_secs == 0
        {
            return Err("scan intervals must be > 0");
        }
        if self.stale_after_secs <= self.redetect_window_secs {
            return Err("stale_after_secs must exceed redetect_window_secs");
        }
        Ok(())
    }
}
