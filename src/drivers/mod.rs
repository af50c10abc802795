//! Peripheral drivers and timing helpers.

pub mod delay;
pub mod mcp3008;
