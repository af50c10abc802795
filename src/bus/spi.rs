//! SPI availability from the boot configuration.

use std::path::PathBuf;

use log::debug;

use crate::app::ports::SpiProbePort;
use crate::error::HwError;

const SPI_ON: &str = "dtparam=spi=on";

/// Whether `boot_config` enables SPI. Commented lines are ignored.
pub fn spi_enabled_in(boot_config: &str) -> bool {
    boot_config
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .any(|line| line == SPI_ON)
}

/// Reads `/boot/config.txt` (or another path) on every probe.
#[derive(Debug, Clone)]
pub struct BootConfigSpi {
    path: PathBuf,
}

impl BootConfigSpi {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SpiProbePort for BootConfigSpi {
    fn spi_enabled(&mut self) -> Result<bool, HwError> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            debug!("SPI: {}: {}", self.path.display(), e);
            HwError::FsUnavailable
        })?;
        Ok(spi_enabled_in(&text))
    }
}
