//! Unified error types for the touch bridge.
//!
//! A single `Error` enum that every subsystem converts into, so the
//! edge-detection loop and `main` handle failures uniformly.  Nothing in
//! here is retried: any error reaching the loop ends it.

use core::fmt;

use embedded_hal::i2c::ErrorKind;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the bridge funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The touch sensor could not be read or brought up.
    Sensor(SensorError),
    /// The broker connection or a publish failed.
    Publish(PublishError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Publish(e) => write!(f, "publish: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorError {
    /// An I2C transaction failed.
    Bus(ErrorKind),
    /// The device answered but CONFIG2 did not hold its reset value.
    /// Carries the value actually read.
    NotDetected(u8),
    /// The bus device node could not be opened.
    Unavailable(String),
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(kind) => write!(f, "I2C transaction failed ({kind:?})"),
            Self::NotDetected(got) => {
                write!(f, "MPR121 not detected (CONFIG2=0x{got:02X}, expected 0x24)")
            }
            Self::Unavailable(msg) => write!(f, "bus unavailable: {msg}"),
        }
    }
}

impl std::error::Error for SensorError {}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Publish errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// The initial connection to the broker failed or was refused.
    Connect(String),
    /// The broker connection dropped after it was established.
    Disconnected(String),
    /// The client refused to queue the message.
    Rejected(String),
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect(msg) => write!(f, "broker connect failed: {msg}"),
            Self::Disconnected(msg) => write!(f, "broker connection lost: {msg}"),
            Self::Rejected(msg) => write!(f, "publish rejected: {msg}"),
        }
    }
}

impl std::error::Error for PublishError {}

impl From<PublishError> for Error {
    fn from(e: PublishError) -> Self {
        Self::Publish(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
