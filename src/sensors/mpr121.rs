//! MPR121 12-channel capacitive touch controller driver.
//!
//! The Pi Cap wires the MPR121 to the Raspberry Pi I2C bus at address
//! 0x5C.  The driver is generic over any `embedded_hal::i2c::I2c`, so the
//! same code runs against `/dev/i2c-1` and against the simulated bus in
//! `sensors::sim` (feature `sim`) in tests.
//!
//! ## Touch snapshots
//!
//! The driver keeps the last two touch-status words.  A channel is a
//! *new touch* when its bit went 0 → 1 between them and a *new release*
//! when it went 1 → 0; the two are mutually exclusive by construction.
//!
//! ## Change detection
//!
//! Without the IRQ line, [`touch_status_changed`](Mpr121::touch_status_changed)
//! reads the status registers and compares against the current snapshot.
//! The word it read is cached so the following
//! [`update_touch_data`](Mpr121::update_touch_data) commits exactly what was
//! compared, without a second bus transaction.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, I2c};
use log::{debug, info};

use crate::app::events::{CHANNEL_COUNT, Channel};
use crate::error::SensorError;

/// Pi Cap default I2C address (ADDR pin tied to SDA).
pub const PICAP_ADDRESS: u8 = 0x5C;

pub const DEFAULT_TOUCH_THRESHOLD: u8 = 40;
pub const DEFAULT_RELEASE_THRESHOLD: u8 = 20;

/// Electrode bits of the touch-status word; bit 15 is the over-current flag.
const TOUCH_MASK: u16 = (1 << CHANNEL_COUNT as u16) - 1;

// ── Register map ──────────────────────────────────────────────

pub(crate) mod reg {
    pub const TOUCH_STATUS_L: u8 = 0x00;
    pub const MHDR: u8 = 0x2B;
    pub const NHDR: u8 = 0x2C;
    pub const NCLR: u8 = 0x2D;
    pub const FDLR: u8 = 0x2E;
    pub const MHDF: u8 = 0x2F;
    pub const NHDF: u8 = 0x30;
    pub const NCLF: u8 = 0x31;
    pub const FDLF: u8 = 0x32;
    pub const NHDT: u8 = 0x33;
    pub const NCLT: u8 = 0x34;
    pub const FDLT: u8 = 0x35;
    pub const TOUCH_TH_0: u8 = 0x41;
    pub const RELEASE_TH_0: u8 = 0x42;
    pub const DEBOUNCE: u8 = 0x5B;
    pub const CONFIG1: u8 = 0x5C;
    pub const CONFIG2: u8 = 0x5D;
    pub const ECR: u8 = 0x5E;
    pub const SOFT_RESET: u8 = 0x80;

    /// Magic value that triggers a soft reset when written to `SOFT_RESET`.
    pub const SOFT_RESET_MAGIC: u8 = 0x63;
    /// CONFIG2 power-on value, used as a presence check.
    pub const CONFIG2_RESET_VALUE: u8 = 0x24;
}

/// ECR run value: baseline tracking on (CL=10), all 12 electrodes enabled.
const ECR_RUN: u8 = 0b1000_0000 | CHANNEL_COUNT;

/// Baseline filter settings, written in order after reset.
const FILTER_SETTINGS: [(u8, u8); 11] = [
    (reg::MHDR, 0x01),
    (reg::NHDR, 0x01),
    (reg::NCLR, 0x0E),
    (reg::FDLR, 0x00),
    (reg::MHDF, 0x01),
    (reg::NHDF, 0x05),
    (reg::NCLF, 0x01),
    (reg::FDLF, 0x00),
    (reg::NHDT, 0x00),
    (reg::NCLT, 0x00),
    (reg::FDLT, 0x00),
];

pub struct Mpr121<I2C> {
    i2c: I2C,
    address: u8,
    touch_data: u16,
    last_touch_data: u16,
    /// Status word read by `touch_status_changed`, not yet committed.
    pending: Option<u16>,
}

impl<I2C: I2c> Mpr121<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            touch_data: 0,
            last_touch_data: 0,
            pending: None,
        }
    }

    /// Soft-reset the controller, verify it answers like an MPR121, and
    /// start sensing on all 12 electrodes with default thresholds.
    pub fn begin(&mut self, delay: &mut impl DelayNs) -> Result<(), SensorError> {
        self.write_register(reg::SOFT_RESET, reg::SOFT_RESET_MAGIC)?;
        delay.delay_ms(1);

        // Stop mode: every config register below is only writable here.
        self.write_register(reg::ECR, 0x00)?;

        let config2 = self.read_register(reg::CONFIG2)?;
        if config2 != reg::CONFIG2_RESET_VALUE {
            return Err(SensorError::NotDetected(config2));
        }

        self.write_thresholds(DEFAULT_TOUCH_THRESHOLD, DEFAULT_RELEASE_THRESHOLD)?;
        for (register, value) in FILTER_SETTINGS {
            self.write_register(register, value)?;
        }
        self.write_register(reg::DEBOUNCE, 0x00)?;
        // 16 µA charge current, 0.5 µs charge time, 1 ms sample interval.
        self.write_register(reg::CONFIG1, 0x10)?;
        self.write_register(reg::CONFIG2, 0x20)?;
        self.write_register(reg::ECR, ECR_RUN)?;

        self.touch_data = 0;
        self.last_touch_data = 0;
        self.pending = None;

        info!("MPR121 ready at 0x{:02X}", self.address);
        Ok(())
    }

    /// Apply the same touch/release thresholds to every electrode.
    pub fn set_thresholds(&mut self, touch: u8, release: u8) -> Result<(), SensorError> {
        self.write_register(reg::ECR, 0x00)?;
        self.write_thresholds(touch, release)?;
        self.write_register(reg::ECR, ECR_RUN)
    }

    /// Raw 12-bit touch-status word, bit *n* set when electrode *n* is touched.
    pub fn read_touch_status(&mut self) -> Result<u16, SensorError> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[reg::TOUCH_STATUS_L], &mut buf)
            .map_err(|e| SensorError::Bus(e.kind()))?;
        Ok(u16::from_le_bytes(buf) & TOUCH_MASK)
    }

    /// Whether the live status differs from the current snapshot.
    /// The snapshot itself is left untouched.
    pub fn touch_status_changed(&mut self) -> Result<bool, SensorError> {
        let status = self.read_touch_status()?;
        if status == self.touch_data {
            self.pending = None;
            Ok(false)
        } else {
            self.pending = Some(status);
            Ok(true)
        }
    }

    /// Shift the current snapshot to previous and load a new current one.
    pub fn update_touch_data(&mut self) -> Result<(), SensorError> {
        let status = match self.pending.take() {
            Some(status) => status,
            None => self.read_touch_status()?,
        };
        self.last_touch_data = self.touch_data;
        self.touch_data = status;
        debug!(
            "touch status 0b{:012b} -> 0b{:012b}",
            self.last_touch_data, self.touch_data
        );
        Ok(())
    }

    pub fn touched(&self, channel: Channel) -> bool {
        self.touch_data & channel.mask() != 0
    }

    pub fn touched_mask(&self) -> u16 {
        self.touch_data
    }

    pub fn is_new_touch(&self, channel: Channel) -> bool {
        self.last_touch_data & channel.mask() == 0 && self.touch_data & channel.mask() != 0
    }

    pub fn is_new_release(&self, channel: Channel) -> bool {
        self.last_touch_data & channel.mask() != 0 && self.touch_data & channel.mask() == 0
    }

    pub fn bus_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    /// Give the bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }

    // ── Internal ──────────────────────────────────────────────

    fn write_thresholds(&mut self, touch: u8, release: u8) -> Result<(), SensorError> {
        for electrode in 0..CHANNEL_COUNT {
            self.write_register(reg::TOUCH_TH_0 + 2 * electrode, touch)?;
            self.write_register(reg::RELEASE_TH_0 + 2 * electrode, release)?;
        }
        Ok(())
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), SensorError> {
        self.i2c
            .write(self.address, &[register, value])
            .map_err(|e| SensorError::Bus(e.kind()))
    }

    fn read_register(&mut self, register: u8) -> Result<u8, SensorError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[register], &mut buf)
            .map_err(|e| SensorError::Bus(e.kind()))?;
        Ok(buf[0])
    }
}
