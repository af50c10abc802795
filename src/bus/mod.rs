//! Bus-level discovery: I²C address sweep, 1-Wire sysfs listing and the
//! SPI enable check.

pub mod i2c;
pub mod onewire;
pub mod spi;

pub use i2c::{I2cDevice, sweep};
pub use onewire::SysfsOneWire;
pub use spi::BootConfigSpi;
