//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements                        | Connects to              |
//! |---------------|-----------------------------------|--------------------------|
//! | `sim`         | PinProbePort, AnalogPort, I2c,    | Scripted wiring          |
//! |               | OneWirePort, SpiProbePort         |                          |
//! | `log_sink`    | EventSink                         | `log` facade             |
//! | `config_file` | ConfigPort                        | JSON file on disk        |
//! | `rpi`         | PinProbePort (+ I2c, SPI handles) | rppal GPIO / I²C / SPI   |
//!
//! The 1-Wire and SPI sysfs probes live in [`crate::bus`].

pub mod config_file;
pub mod log_sink;
#[cfg(all(feature = "rpi", target_os = "linux"))]
pub mod rpi;
pub mod sim;
