//! Sensor subsystem: the MPR121 touch controller driver and its
//! simulated bus.

pub mod mpr121;
#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use mpr121::{Mpr121, PICAP_ADDRESS};
