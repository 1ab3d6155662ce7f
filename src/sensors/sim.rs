//! In-memory MPR121 register model for host-side testing.
//!
//! [`SimBus`] implements `embedded_hal::i2c::I2c` with the MPR121's
//! register-pointer semantics: a write sets the pointer from its first
//! byte and stores the rest at auto-incrementing addresses; a read returns
//! bytes from the pointer onward.  Writing the soft-reset magic restores
//! the power-on register values.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

use super::mpr121::reg;

pub struct SimBus {
    address: u8,
    regs: [u8; 256],
    pointer: u8,
    reset_config2: u8,
    fail_next: Option<ErrorKind>,
    status_reads: usize,
}

impl SimBus {
    pub fn new(address: u8) -> Self {
        let mut bus = Self {
            address,
            regs: [0; 256],
            pointer: 0,
            reset_config2: reg::CONFIG2_RESET_VALUE,
            fail_next: None,
            status_reads: 0,
        };
        bus.power_on();
        bus
    }

    /// Value CONFIG2 takes after the next soft reset.
    pub fn set_reset_config2(&mut self, value: u8) {
        self.reset_config2 = value;
    }

    /// Electrode state as the device would report it.
    pub fn set_touch_mask(&mut self, mask: u16) {
        self.set_status_word(mask & 0x0FFF);
    }

    /// Raw status registers, including the over-current bit.
    pub fn set_status_word(&mut self, word: u16) {
        let [lo, hi] = word.to_le_bytes();
        self.regs[reg::TOUCH_STATUS_L as usize] = lo;
        self.regs[reg::TOUCH_STATUS_L as usize + 1] = hi;
    }

    /// Fail the next transaction with `kind`.
    pub fn fail_next(&mut self, kind: ErrorKind) {
        self.fail_next = Some(kind);
    }

    pub fn register(&self, register: u8) -> u8 {
        self.regs[register as usize]
    }

    /// Reads that started at the touch-status register.
    pub fn status_reads(&self) -> usize {
        self.status_reads
    }

    fn power_on(&mut self) {
        self.regs = [0; 256];
        self.regs[reg::CONFIG1 as usize] = 0x10;
        self.regs[reg::CONFIG2 as usize] = self.reset_config2;
    }

    fn store(&mut self, bytes: &[u8]) {
        let Some((&pointer, data)) = bytes.split_first() else {
            return;
        };
        self.pointer = pointer;
        if pointer == reg::SOFT_RESET {
            if data.first() == Some(&reg::SOFT_RESET_MAGIC) {
                self.power_on();
            }
            return;
        }
        for &byte in data {
            // Status registers are read-only on the device.
            if self.pointer > reg::TOUCH_STATUS_L + 1 {
                self.regs[self.pointer as usize] = byte;
            }
            self.pointer = self.pointer.wrapping_add(1);
        }
    }

    fn load(&mut self, buf: &mut [u8]) {
        if self.pointer == reg::TOUCH_STATUS_L {
            self.status_reads += 1;
        }
        for byte in buf.iter_mut() {
            *byte = self.regs[self.pointer as usize];
            self.pointer = self.pointer.wrapping_add(1);
        }
    }
}

impl ErrorType for SimBus {
    type Error = ErrorKind;
}

impl I2c for SimBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if let Some(kind) = self.fail_next.take() {
            return Err(kind);
        }
        if address != self.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        for op in operations {
            match op {
                Operation::Write(bytes) => self.store(bytes),
                Operation::Read(buf) => self.load(buf),
            }
        }
        Ok(())
    }
}

/// Delay that returns immediately.
pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}
