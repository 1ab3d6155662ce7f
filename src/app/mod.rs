//! Application core: edge detection and feed naming, zero I/O.
//!
//! All interaction with the sensor and the broker happens through the
//! **port traits** in [`ports`], keeping this layer testable without a
//! Pi Cap or a running broker.

pub mod cancel;
pub mod events;
pub mod ports;
pub mod service;
pub mod topics;
