//! BCM pin assignments on the Raspberry Pi 40-pin header.
//!
//! Single source of truth. The scanners and the default configuration
//! reference this module rather than hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Header range
// ---------------------------------------------------------------------------

/// Lowest user GPIO on the header.
pub const FIRST_GPIO: u8 = 2;
/// Highest user GPIO on the header.
pub const LAST_GPIO: u8 = 27;

// ---------------------------------------------------------------------------
// I²C bus 1 (fixed 1.8 kΩ pull-ups on the board)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: u8 = 2;
pub const I2C_SCL_GPIO: u8 = 3;
/// `/dev/i2c-1` on every board since the Pi 1 rev 2.
pub const I2C_BUS: u8 = 1;

// ---------------------------------------------------------------------------
// 1-Wire (w1-gpio overlay default)
// ---------------------------------------------------------------------------

pub const ONEWIRE_GPIO: u8 = 4;

// ---------------------------------------------------------------------------
// SPI0 (MCP3008 on CE0)
// ---------------------------------------------------------------------------

pub const SPI0_CE1_GPIO: u8 = 7;
pub const SPI0_CE0_GPIO: u8 = 8;
pub const SPI0_MISO_GPIO: u8 = 9;
pub const SPI0_MOSI_GPIO: u8 = 10;
pub const SPI0_SCLK_GPIO: u8 = 11;
/// MCP3008 maximum SCLK at 3.3 V.
pub const MCP3008_SPI_HZ: u32 = 1_350_000;

// ---------------------------------------------------------------------------
// PWM
// ---------------------------------------------------------------------------

/// Pins routed to the two hardware PWM channels (PWM0: 12/18, PWM1: 13/19).
pub const HARDWARE_PWM_GPIOS: [u8; 4] = [12, 13, 18, 19];

/// Whether `pin` can be driven by a hardware PWM channel.
pub const fn is_hardware_pwm(pin: u8) -> bool {
    matches!(pin, 12 | 13 | 18 | 19)
}

/// Whether `pin` is reserved for the I²C bus and must not be pull-probed.
pub const fn is_i2c(pin: u8) -> bool {
    pin == I2C_SDA_GPIO || pin == I2C_SCL_GPIO
}
