//! Application core: detection passes and their outcomes, zero direct I/O.
//!
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`] (plus the `embedded-hal` I²C and delay traits), keeping this
//! layer fully testable without a board attached.

pub mod events;
pub mod ports;
pub mod service;
