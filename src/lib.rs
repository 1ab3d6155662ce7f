//! Pi Cap → MQTT touch bridge library.
//!
//! Exposes the edge-detection core, the MPR121 driver and the adapters
//! for integration testing.  Code that needs the Linux I2C bus is gated
//! behind the `linux` feature.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod sensors;
