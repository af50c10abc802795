//! pinprobe library.
//!
//! Component auto-detection for the Raspberry Pi header: GPIO signal
//! classification, MCP3008 analog sampling, I²C sweeps, 1-Wire and SPI
//! discovery. Hardware is reached only through the port traits in
//! [`app::ports`] and `embedded-hal`; the `rpi` feature supplies the real
//! board, everything else runs against [`adapters::sim`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod bus;
pub mod classifier;
pub mod config;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod registry;
pub mod workers;

pub use error::{Error, HwError, Result};
