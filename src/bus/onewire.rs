//! 1-Wire discovery through the `w1-gpio` sysfs tree.
//!
//! With the overlay loaded, `/sys/bus/w1/devices` holds one entry per slave
//! (`28-0316a2795aff`) plus the bus master (`w1_bus_master1`). Without the
//! overlay the directory does not exist.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;

use crate::app::ports::OneWirePort;
use crate::error::HwError;

/// Family code of the DS18B20 and compatible temperature probes.
pub const DS18B20_PREFIX: &str = "28-";

/// Keep DS18B20-family ids, sorted for stable pass-to-pass ordering.
pub fn ds18b20_ids<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut ids: Vec<String> = names
        .into_iter()
        .filter(|n| n.as_ref().starts_with(DS18B20_PREFIX))
        .map(|n| n.as_ref().to_owned())
        .collect();
    ids.sort();
    ids
}

/// Reads slave ids from a w1 sysfs directory.
#[derive(Debug, Clone)]
pub struct SysfsOneWire {
    dir: PathBuf,
}

impl SysfsOneWire {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl OneWirePort for SysfsOneWire {
    fn list_devices(&mut self) -> Result<Vec<String>, HwError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| {
            if e.kind() != ErrorKind::NotFound {
                debug!("1-Wire: {}: {}", self.dir.display(), e);
            }
            HwError::FsUnavailable
        })?;
        let names = entries
            .filter_map(Result::ok)
            .filter_map(|entry| entry.file_name().into_string().ok());
        Ok(ds18b20_ids(names))
    }
}
